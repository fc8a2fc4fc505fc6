//! Shared fixtures for the integration suites.

#![allow(dead_code)]

// crates.io
use httpmock::MockServer;
// self
use oauth2_nirror::{
	config::StrategyOptions,
	engine::{BasicEngine, ReqwestEngine},
	error::BoxError,
	http::ReqwestHttpClient,
	reqwest::{Client, redirect::Policy},
	strategy::{NirrorStrategy, Verify, VerifyRequest},
};

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const CALLBACK_URL: &str = "https://app.example.com/auth/nirror/callback";
pub const PROFILE_BODY: &str =
	r#"{"uid":"u-1","display_name":"Ada","email":"ada@example.com","plan":"pro"}"#;
pub const TOKEN_BODY: &str = concat!(
	r#"{"access_token":"access-it","refresh_token":"refresh-it","#,
	r#""token_type":"bearer","expires_in":3600}"#
);

/// Options pointing every Nirror endpoint at `server`.
pub fn mock_options(server: &MockServer) -> StrategyOptions {
	StrategyOptions::new(CLIENT_ID, CLIENT_SECRET, CALLBACK_URL)
		.with_authorization_url(server.url("/oauth2/authorize"))
		.with_token_url(server.url("/oauth2/token"))
		.with_profile_url(server.url("/account"))
}

/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
/// `httpmock`, and still refuses to follow redirects.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = Client::builder()
		.redirect(Policy::none())
		.danger_accept_invalid_certs(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

/// Builds a strategy over [`test_reqwest_http_client`] from `options`.
pub fn test_strategy<V>(options: StrategyOptions, verify: V) -> NirrorStrategy<ReqwestEngine, V>
where
	V: Verify,
{
	let config = options.resolve();
	let engine = BasicEngine::from_config(&config, test_reqwest_http_client())
		.expect("Failed to build engine over the test client.");

	NirrorStrategy::with_engine(config, engine, verify)
}

/// Builds a strategy whose endpoints all point at `server`.
pub fn mock_strategy<V>(server: &MockServer, verify: V) -> NirrorStrategy<ReqwestEngine, V>
where
	V: Verify,
{
	test_strategy(mock_options(server), verify)
}

/// Verify callback that signs in every profile under its Nirror identifier.
pub async fn accept_by_id(request: VerifyRequest) -> Result<Option<String>, BoxError> {
	Ok(Some(request.profile.id))
}
