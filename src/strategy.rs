//! The Nirror login strategy.
//!
//! [`NirrorStrategy`] owns a resolved [`StrategyConfig`], an [`OAuth2Engine`], and the host's
//! [`Verify`] callback. A login attempt is two calls: [`NirrorStrategy::authorization_request`]
//! before redirecting the user agent, then [`NirrorStrategy::authenticate`] with the redirect's
//! query parameters. The profile fetch in between runs exactly once per attempt.

// self
use crate::{
	_prelude::*,
	auth::{TokenGrant, TokenSecret},
	config::{STRATEGY_NAME, StrategyConfig},
	engine::{AuthorizationRequest, OAuth2Engine},
	obs::{Outcome, Stage, StageSpan},
	profile::{NormalizedProfile, ProfileFuture, ProfileProvider},
};
#[cfg(feature = "reqwest")]
use crate::{config::StrategyOptions, engine::ReqwestEngine};

/// Boxed future returned by [`Verify::verify`].
pub type VerifyFuture<'a, U> =
	Pin<Box<dyn Future<Output = Result<Option<U>, BoxError>> + 'a + Send>>;

/// Everything the verify callback receives for one login attempt.
#[derive(Clone, Debug)]
pub struct VerifyRequest {
	/// Access token issued by Nirror.
	pub access_token: TokenSecret,
	/// Refresh token, when issued.
	pub refresh_token: Option<TokenSecret>,
	/// Normalized profile of the signed-in account.
	pub profile: NormalizedProfile,
}

/// Host callback that maps a Nirror identity onto an application user.
///
/// Return `Ok(None)` when the credentials should not sign anyone in, and `Err` for failures.
/// Any `Fn(VerifyRequest) -> impl Future` closure implements the trait.
pub trait Verify: Send + Sync {
	/// Application user type.
	type User: Send;

	/// Looks up or creates the user for `request`.
	fn verify(&self, request: VerifyRequest) -> VerifyFuture<'_, Self::User>;
}
impl<F, Fut, U> Verify for F
where
	F: Send + Sync + Fn(VerifyRequest) -> Fut,
	Fut: 'static + Send + Future<Output = Result<Option<U>, BoxError>>,
	U: Send,
{
	type User = U;

	fn verify(&self, request: VerifyRequest) -> VerifyFuture<'_, Self::User> {
		Box::pin(self(request))
	}
}

/// Query parameters Nirror appends to the callback URL.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizationCallback {
	/// Authorization code.
	pub code: Option<String>,
	/// Returned state.
	pub state: Option<String>,
	/// OAuth error code (e.g. `access_denied`).
	pub error: Option<String>,
	/// Human-readable error description.
	pub error_description: Option<String>,
}
impl AuthorizationCallback {
	/// Extracts the callback parameters from a redirect URL.
	pub fn from_redirect(url: &Url) -> Self {
		let mut callback = Self::default();

		for (key, value) in url.query_pairs() {
			let slot = match key.as_ref() {
				"code" => &mut callback.code,
				"state" => &mut callback.state,
				"error" => &mut callback.error,
				"error_description" => &mut callback.error_description,
				_ => continue,
			};

			*slot = Some(value.into_owned());
		}

		callback
	}
}

/// Result of a completed login attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome<U> {
	/// Verify callback accepted the identity.
	Authenticated(U),
	/// Verify callback returned no user.
	Rejected,
	/// The user declined the consent screen.
	Denied {
		/// Provider-supplied description, if any.
		description: Option<String>,
	},
}

/// Nirror OAuth 2.0 strategy.
pub struct NirrorStrategy<E, V> {
	config: StrategyConfig,
	engine: E,
	verify: V,
}
#[cfg(feature = "reqwest")]
impl<V> NirrorStrategy<ReqwestEngine, V>
where
	V: Verify,
{
	/// Resolves `options` and builds the default reqwest-backed engine.
	pub fn new(options: StrategyOptions, verify: V) -> Result<Self> {
		let config = options.resolve();
		let engine = ReqwestEngine::reqwest(&config)?;

		Ok(Self::with_engine(config, engine, verify))
	}
}
impl<E, V> NirrorStrategy<E, V>
where
	E: OAuth2Engine,
	V: Verify,
{
	/// Composes a strategy from a resolved configuration and any engine.
	pub fn with_engine(config: StrategyConfig, engine: E, verify: V) -> Self {
		Self { config, engine, verify }
	}

	/// Name used by hosts to look the strategy up.
	pub fn name(&self) -> &'static str {
		STRATEGY_NAME
	}

	/// Resolved configuration.
	pub fn config(&self) -> &StrategyConfig {
		&self.config
	}

	/// Underlying engine.
	pub fn engine(&self) -> &E {
		&self.engine
	}

	/// Starts a login attempt using the configured scopes.
	pub fn authorization_request(&self) -> AuthorizationRequest {
		self.authorization_request_with_scope(&self.config.scope)
	}

	/// Starts a login attempt requesting `scope` instead of the configured scopes.
	pub fn authorization_request_with_scope(&self, scope: &[String]) -> AuthorizationRequest {
		let stage = StageSpan::open(Stage::Authorize, "authorization_request");
		let request = stage.in_scope(|| self.engine.authorization_request(scope));

		stage.complete(Outcome::Success);

		request
	}

	/// Completes a login attempt from the redirect parameters.
	pub async fn authenticate(
		&self,
		pending: &AuthorizationRequest,
		callback: AuthorizationCallback,
	) -> Result<AuthOutcome<V::User>> {
		if let Some(error) = callback.error {
			if error == "access_denied" {
				return Ok(AuthOutcome::Denied { description: callback.error_description });
			}

			return Err(Error::Authorization { error, description: callback.error_description });
		}

		pending.validate_state(callback.state.as_deref())?;

		let code = callback.code.ok_or(Error::MissingAuthorizationCode)?;
		let grant = self.exchange(&code, pending).await?;
		let profile = self.user_profile(&grant.access_token).await?;

		self.run_verify(grant, profile).await
	}

	async fn exchange(&self, code: &str, pending: &AuthorizationRequest) -> Result<TokenGrant> {
		let stage = StageSpan::open(Stage::Exchange, "authenticate");
		let result = stage.instrument(self.engine.exchange_code(code, pending)).await;

		stage.finish(&result);

		result
	}

	async fn fetch_profile(&self, access_token: &TokenSecret) -> Result<NormalizedProfile> {
		let stage = StageSpan::open(Stage::Profile, "user_profile");
		let result: Result<NormalizedProfile> = stage
			.instrument(async {
				let body = self
					.engine
					.get(&self.config.profile_url, access_token)
					.await
					.map_err(|source| Error::ProfileFetch { source })?;

				Ok(NormalizedProfile::from_bytes(body)?)
			})
			.await;

		stage.finish(&result);

		result
	}

	async fn run_verify(
		&self,
		grant: TokenGrant,
		profile: NormalizedProfile,
	) -> Result<AuthOutcome<V::User>> {
		let stage = StageSpan::open(Stage::Verify, "authenticate");
		let request = VerifyRequest {
			access_token: grant.access_token,
			refresh_token: grant.refresh_token,
			profile,
		};
		let result = stage
			.instrument(self.verify.verify(request))
			.await
			.map_err(|source| Error::Verify { source });

		stage.finish(&result);

		Ok(match result? {
			Some(user) => AuthOutcome::Authenticated(user),
			None => AuthOutcome::Rejected,
		})
	}
}
impl<E, V> ProfileProvider for NirrorStrategy<E, V>
where
	E: OAuth2Engine,
	V: Verify,
{
	fn user_profile<'a>(&'a self, access_token: &'a TokenSecret) -> ProfileFuture<'a> {
		Box::pin(self.fetch_profile(access_token))
	}
}
impl<E, V> Debug for NirrorStrategy<E, V>
where
	E: Debug,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("NirrorStrategy")
			.field("name", &STRATEGY_NAME)
			.field("config", &self.config)
			.field("engine", &self.engine)
			.finish()
	}
}
