// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
// self
use oauth2_nirror::{
	auth::TokenSecret,
	config::StrategyOptions,
	engine::{BasicEngine, OAuth2Engine},
	error::{BoxError, Error, TransportError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::StatusCode},
	strategy::{AuthorizationCallback, NirrorStrategy, VerifyRequest},
};

#[derive(Debug)]
enum FakeTransportError {
	Unreachable,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Unreachable => write!(f, "Transport unreachable."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Copy)]
enum Script {
	Unreachable,
	Respond(u16, &'static str),
}

/// Transport that answers every request from a script and records what it was sent.
#[derive(Clone)]
struct FakeHttpClient {
	script: Script,
	requests: Arc<Mutex<Vec<HttpRequest>>>,
}
impl FakeHttpClient {
	fn new(script: Script) -> Self {
		Self { script, requests: Default::default() }
	}
}
impl TokenHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, client: self.clone() }
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	client: FakeHttpClient,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let script = self.client.script;

		self.client.requests.lock().push(request);

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);

			match script {
				Script::Unreachable =>
					Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Unreachable))),
				Script::Respond(status, body) => {
					slot.store(ResponseMetadata { status: Some(status) });

					let mut response = HttpResponse::new(body.as_bytes().to_vec());

					*response.status_mut() =
						StatusCode::from_u16(status).expect("Scripted status should be valid.");

					Ok(response)
				},
			}
		})
	}
}

fn engine(script: Script) -> (BasicEngine<FakeHttpClient>, FakeHttpClient) {
	engine_with_headers(script, [("X-Tenant", "acme")])
}

fn engine_with_headers<const N: usize>(
	script: Script,
	headers: [(&str, &str); N],
) -> (BasicEngine<FakeHttpClient>, FakeHttpClient) {
	let client = FakeHttpClient::new(script);
	let config = StrategyOptions::new("client-fake", "secret-fake", "https://app.example.com/cb")
		.with_custom_headers(headers)
		.resolve();
	let engine = BasicEngine::from_config(&config, client.clone())
		.expect("Engine should build over the fake transport.");

	(engine, client)
}

async fn reject_all(_request: VerifyRequest) -> Result<Option<()>, BoxError> {
	Ok(None)
}

#[tokio::test]
async fn transport_failures_during_exchange_are_network_errors() {
	let (engine, client) = engine(Script::Unreachable);
	let pending = engine.authorization_request(&[]);
	let err = engine
		.exchange_code("code", &pending)
		.await
		.expect_err("Unreachable transport should fail the exchange.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));

	let requests = client.requests.lock();

	assert_eq!(requests.len(), 1);
	assert_eq!(
		requests[0].headers().get("x-tenant").map(|value| value.as_bytes()),
		Some(&b"acme"[..])
	);
}

#[tokio::test]
async fn unexpected_token_status_carries_http_status() {
	let (engine, _client) = engine(Script::Respond(502, "bad gateway"));
	let pending = engine.authorization_request(&[]);
	let err = engine
		.exchange_code("code", &pending)
		.await
		.expect_err("HTTP 502 without an OAuth error body should fail.");

	assert!(matches!(
		err,
		Error::TokenEndpoint { status: Some(502), .. }
			| Error::TokenResponseParse { status: Some(502), .. }
	));
}

#[tokio::test]
async fn profile_reads_send_bearer_and_custom_headers() {
	let (engine, client) =
		engine(Script::Respond(200, r#"{"uid":"9","email":"fake@example.com"}"#));
	let body = engine
		.get("https://api.nirror.com/account", &TokenSecret::new("access-fake"))
		.await
		.expect("Scripted profile read should succeed.");

	assert!(body.starts_with(b"{\"uid\""));

	let requests = client.requests.lock();
	let headers = requests[0].headers();

	assert_eq!(requests[0].uri(), "https://api.nirror.com/account");
	assert_eq!(
		headers.get("authorization").map(|value| value.as_bytes()),
		Some(&b"Bearer access-fake"[..])
	);
	assert_eq!(headers.get("x-tenant").map(|value| value.as_bytes()), Some(&b"acme"[..]));
}

#[tokio::test]
async fn custom_headers_never_replace_protocol_headers() {
	const CUSTOM_AUTH: &str = "Basic Zm9vOmJhcg==";

	let (engine, client) = engine_with_headers(
		Script::Respond(200, r#"{"uid":"9","email":"fake@example.com"}"#),
		[("Authorization", CUSTOM_AUTH), ("Accept", "text/plain"), ("X-Trace", "1")],
	);

	engine
		.get("https://api.nirror.com/account", &TokenSecret::new("access-fake"))
		.await
		.expect("Scripted profile read should succeed.");

	let pending = engine.authorization_request(&[]);
	// The scripted body is not a token response; only the outgoing headers matter here.
	let _ = engine.exchange_code("code", &pending).await;
	let requests = client.requests.lock();
	let header = |index: usize, name: &str| {
		requests[index].headers().get(name).and_then(|value| value.to_str().ok()).map(str::to_owned)
	};

	assert_eq!(requests.len(), 2);
	assert_eq!(header(0, "authorization").as_deref(), Some("Bearer access-fake"));
	assert_eq!(header(0, "accept").as_deref(), Some("application/json"));
	assert_eq!(header(0, "x-trace").as_deref(), Some("1"));

	let token_auth = header(1, "authorization").expect("Token request should carry client auth.");

	assert!(token_auth.starts_with("Basic "));
	assert_ne!(token_auth, CUSTOM_AUTH);
	assert_eq!(header(1, "x-trace").as_deref(), Some("1"));
}

#[tokio::test]
async fn strategy_runs_over_a_custom_transport() {
	let (engine, _client) = engine(Script::Respond(401, "expired"));
	let config =
		StrategyOptions::new("client-fake", "secret-fake", "https://app.example.com/cb").resolve();
	let strategy = NirrorStrategy::with_engine(config, engine, reject_all);
	let pending = strategy.authorization_request();
	let callback = AuthorizationCallback {
		code: Some("code".into()),
		state: Some(pending.state.clone()),
		..Default::default()
	};
	let err = strategy
		.authenticate(&pending, callback)
		.await
		.expect_err("A 401 token response should fail the login.");

	assert!(!matches!(err, Error::ProfileFetch { .. }));
}
