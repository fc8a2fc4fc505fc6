// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AsyncHttpClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet, HttpClientError, PkceCodeVerifier, RedirectUrl, RequestTokenError, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
	http::{
		HeaderMap, Method, Request,
		header::{ACCEPT, AUTHORIZATION},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{TokenGrant, TokenSecret},
	config::StrategyConfig,
	engine::{
		AuthorizationParams, AuthorizationRequest, EngineFuture, OAuth2Engine, TransportFuture,
	},
	error::{ConfigError, TransportError},
	http::{self, HeaderInjector, ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

#[cfg(feature = "reqwest")]
/// Engine specialized for the crate's default reqwest transport.
pub type ReqwestEngine = BasicEngine<ReqwestHttpClient>;

/// Default [`OAuth2Engine`] backed by the `oauth2` crate and a [`TokenHttpClient`].
///
/// The client secret travels with HTTP Basic auth; an empty secret turns the engine into a
/// public client that only sends `client_id`. Custom headers from the configuration are added
/// to every request, token exchanges and profile reads alike.
pub struct BasicEngine<C>
where
	C: ?Sized + TokenHttpClient,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	headers: HeaderMap,
	authorization_endpoint: Url,
	redirect_uri: Url,
	client_id: String,
	scope_separator: String,
	pkce: bool,
}
impl<C> BasicEngine<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Validates `config` and builds an engine over `http_client`.
	pub fn from_config(
		config: &StrategyConfig,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self, ConfigError> {
		if config.client_id.is_empty() {
			return Err(ConfigError::MissingClientId);
		}

		let authorization_endpoint = Url::parse(&config.authorization_url)
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "authorization", source })?;
		let token_url = TokenUrl::new(config.token_url.clone())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "token", source })?;
		let redirect_uri = Url::parse(&config.callback_url)
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		let headers = http::header_map(&config.custom_headers)?;
		let mut oauth_client = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_auth_uri(AuthUrl::from_url(authorization_endpoint.clone()))
			.set_token_uri(token_url);

		if !config.client_secret.is_empty() {
			oauth_client =
				oauth_client.set_client_secret(ClientSecret::new(config.client_secret.clone()));
		}

		Ok(Self {
			oauth_client,
			http_client: http_client.into(),
			headers,
			authorization_endpoint,
			redirect_uri,
			client_id: config.client_id.clone(),
			scope_separator: config.scope_separator.clone(),
			pkce: config.pkce,
		})
	}

	fn handle(&self, slot: ResponseMetadataSlot) -> HeaderInjector<C::Handle> {
		HeaderInjector::new(self.http_client.with_metadata(slot), self.headers.clone())
	}

	async fn exchange(&self, code: &str, pending: &AuthorizationRequest) -> Result<TokenGrant> {
		let meta = ResponseMetadataSlot::default();
		let handle = self.handle(meta.clone());
		let mut request = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.set_redirect_uri(Cow::Owned(RedirectUrl::from_url(pending.redirect_uri.clone())));

		if let Some(verifier) = pending.pkce_verifier() {
			request = request.set_pkce_verifier(PkceCodeVerifier::new(verifier.to_owned()));
		}

		let response = request
			.request_async(&handle)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;

		Ok(TokenGrant::from(&response))
	}

	async fn authenticated_get(
		&self,
		url: &str,
		access_token: &TokenSecret,
	) -> Result<Vec<u8>, TransportError> {
		let handle = self.handle(ResponseMetadataSlot::default());
		let request = Request::builder()
			.method(Method::GET)
			.uri(url)
			.header(AUTHORIZATION, access_token.bearer_header())
			.header(ACCEPT, "application/json")
			.body(Vec::new())?;
		let response = handle.call(request).await.map_err(map_http_client_error)?;
		let status = response.status();

		if !status.is_success() {
			return Err(TransportError::Status {
				status: status.as_u16(),
				body: String::from_utf8_lossy(response.body()).into_owned(),
			});
		}

		Ok(response.into_body())
	}
}
#[cfg(feature = "reqwest")]
impl BasicEngine<ReqwestHttpClient> {
	/// Builds an engine over a reqwest client that does not follow redirects.
	pub fn reqwest(config: &StrategyConfig) -> Result<Self, ConfigError> {
		Self::from_config(config, ReqwestHttpClient::no_redirects()?)
	}
}
impl<C> OAuth2Engine for BasicEngine<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn authorization_request(&self, scope: &[String]) -> AuthorizationRequest {
		AuthorizationRequest::generate(AuthorizationParams {
			authorization_endpoint: &self.authorization_endpoint,
			client_id: &self.client_id,
			redirect_uri: &self.redirect_uri,
			scope,
			scope_separator: &self.scope_separator,
			pkce: self.pkce,
		})
	}

	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
		pending: &'a AuthorizationRequest,
	) -> EngineFuture<'a, TokenGrant> {
		Box::pin(self.exchange(code, pending))
	}

	fn get<'a>(
		&'a self,
		url: &'a str,
		access_token: &'a TokenSecret,
	) -> TransportFuture<'a, Vec<u8>> {
		Box::pin(self.authenticated_get(url, access_token))
	}
}
impl<C> Debug for BasicEngine<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BasicEngine")
			.field("authorization_endpoint", &self.authorization_endpoint)
			.field("redirect_uri", &self.redirect_uri)
			.field("client_id", &self.client_id)
			.field("custom_headers", &self.headers.len())
			.field("pkce", &self.pkce)
			.finish()
	}
}

fn map_request_error<E>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	let status = meta.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, status),
		RequestTokenError::Request(error) => map_http_client_error(error).into(),
		RequestTokenError::Parse(source, _body) => Error::TokenResponseParse { source, status },
		RequestTokenError::Other(message) => Error::TokenEndpoint { message, status },
	}
}

fn map_server_response_error(response: BasicErrorResponse, status: Option<u16>) -> Error {
	let code = response.error().as_ref();
	let reason = match response.error_description() {
		Some(description) => format!("{code}: {description}"),
		None => code.to_owned(),
	};

	if code.eq_ignore_ascii_case("invalid_grant") || code.eq_ignore_ascii_case("access_denied") {
		Error::InvalidGrant { reason }
	} else if code.eq_ignore_ascii_case("invalid_client")
		|| code.eq_ignore_ascii_case("unauthorized_client")
	{
		Error::InvalidClient { reason }
	} else {
		Error::TokenEndpoint { message: reason, status }
	}
}

fn map_http_client_error<E>(err: HttpClientError<E>) -> TransportError
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::network(*inner),
		HttpClientError::Http(inner) => TransportError::Request(inner),
		HttpClientError::Io(inner) => TransportError::Io(inner),
		HttpClientError::Other(message) => TransportError::Other { message },
		other => TransportError::Other { message: format!("{other:?}") },
	}
}
