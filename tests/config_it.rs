#![cfg(feature = "reqwest")]

// self
use oauth2_nirror::{
	config::{AUTHORIZATION_URL, PROFILE_URL, StrategyOptions, TOKEN_URL},
	error::{BoxError, ConfigError, Error},
	strategy::{NirrorStrategy, VerifyRequest},
};

async fn accept(_request: VerifyRequest) -> Result<Option<()>, BoxError> {
	Ok(Some(()))
}

#[test]
fn strategy_from_json_uses_nirror_defaults() {
	let options = StrategyOptions::from_json(
		r#"{"clientID":"a","clientSecret":"b","callbackURL":"https://x/cb"}"#,
	)
	.expect("Minimal options should parse.");
	let strategy = NirrorStrategy::new(options, accept).expect("Minimal options should build.");
	let config = strategy.config();

	assert_eq!(strategy.name(), "nirror");
	assert_eq!(config.authorization_url, AUTHORIZATION_URL);
	assert_eq!(config.token_url, TOKEN_URL);
	assert_eq!(config.profile_url, PROFILE_URL);
	assert_eq!(config.scope_separator, ",");
	assert!(config.custom_headers.is_empty());

	let pending = strategy.authorization_request();

	assert_eq!(pending.authorize_url.host_str(), Some("app.nirror.com"));
	assert_eq!(pending.authorize_url.path(), "/oauth2/authorize");
}

#[test]
fn strategy_honors_overrides_from_json() {
	let options = StrategyOptions::from_json(
		r#"{
			"clientID": "a",
			"clientSecret": "b",
			"callbackURL": "https://x/cb",
			"authorizationURL": "https://sso.example.com/authorize",
			"scopeSeparator": " ",
			"scope": ["account_info", "email"],
			"customHeaders": {"User-Agent": "nirror-app"}
		}"#,
	)
	.expect("Options with overrides should parse.");
	let strategy = NirrorStrategy::new(options, accept).expect("Overridden options should build.");
	let pending = strategy.authorization_request();
	let scope = pending
		.authorize_url
		.query_pairs()
		.find(|(key, _)| key == "scope")
		.map(|(_, value)| value.into_owned());

	assert_eq!(pending.authorize_url.host_str(), Some("sso.example.com"));
	assert_eq!(scope.as_deref(), Some("account_info email"));
	assert_eq!(strategy.config().token_url, TOKEN_URL);
}

#[test]
fn strategy_rejects_unusable_options() {
	let err = NirrorStrategy::new(StrategyOptions::new("", "b", "https://x/cb"), accept)
		.expect_err("Missing client id should be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::MissingClientId)));

	let options =
		StrategyOptions::new("a", "b", "https://x/cb").with_custom_headers([("Bad Header", "x")]);
	let err = NirrorStrategy::new(options, accept).expect_err("Invalid header should be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::InvalidHeader { .. })));

	let err = StrategyOptions::from_json(r#"{"clientID": 7}"#)
		.expect_err("Non-string clientID should be rejected.");

	assert!(matches!(
		err,
		ConfigError::Options { ref source } if source.path().to_string() == "clientID"
	));
}
