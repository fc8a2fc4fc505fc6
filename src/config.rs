//! Strategy options and their resolution against Nirror's fixed defaults.
//!
//! [`StrategyOptions`] mirrors what a host application hands over at construction time
//! (`clientID`, `clientSecret`, `callbackURL`, plus optional overrides) and deserializes from the
//! same JSON keys. [`StrategyOptions::resolve`] never fails: anything left out is replaced by the
//! provider constant, and credential validation is left to the engine.

// self
use crate::{_prelude::*, error::ConfigError};

/// Name under which the strategy registers itself, and the `provider` tag on every profile.
pub const STRATEGY_NAME: &str = "nirror";
/// Nirror's authorization endpoint.
pub const AUTHORIZATION_URL: &str = "https://app.nirror.com/oauth2/authorize";
/// Nirror's token endpoint.
pub const TOKEN_URL: &str = "https://api.nirror.com/oauth2/token";
/// Nirror's account (profile) resource.
pub const PROFILE_URL: &str = "https://api.nirror.com/account";
/// Separator Nirror expects between requested scopes.
pub const SCOPE_SEPARATOR: &str = ",";

/// Caller-supplied strategy options.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyOptions {
	/// Application key from the Nirror app console.
	#[serde(rename = "clientID")]
	pub client_id: String,
	/// Application secret from the Nirror app console.
	#[serde(rename = "clientSecret")]
	pub client_secret: String,
	/// URL Nirror redirects to after the user grants access.
	#[serde(rename = "callbackURL")]
	pub callback_url: String,
	/// Overrides [`AUTHORIZATION_URL`].
	#[serde(rename = "authorizationURL", skip_serializing_if = "Option::is_none")]
	pub authorization_url: Option<String>,
	/// Overrides [`TOKEN_URL`].
	#[serde(rename = "tokenURL", skip_serializing_if = "Option::is_none")]
	pub token_url: Option<String>,
	/// Overrides [`PROFILE_URL`].
	///
	/// Nirror documents no such option and serves the account resource at a fixed URL; this
	/// exists to point the strategy at a staging or mock account endpoint.
	#[serde(rename = "profileURL", skip_serializing_if = "Option::is_none")]
	pub profile_url: Option<String>,
	/// Overrides [`SCOPE_SEPARATOR`].
	#[serde(rename = "scopeSeparator", skip_serializing_if = "Option::is_none")]
	pub scope_separator: Option<String>,
	/// Headers attached to every request the engine sends.
	#[serde(rename = "customHeaders", skip_serializing_if = "Option::is_none")]
	pub custom_headers: Option<BTreeMap<String, String>>,
	/// Scopes requested during authorization.
	pub scope: Vec<String>,
	/// Sends an S256 PKCE challenge with the authorization request.
	pub pkce: bool,
}
impl StrategyOptions {
	/// Creates options from the three required credentials.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		callback_url: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			callback_url: callback_url.into(),
			..Default::default()
		}
	}

	/// Parses options from JSON using the `clientID`/`callbackURL` style keys.
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(json);

		serde_path_to_error::deserialize(&mut de).map_err(|source| ConfigError::Options { source })
	}

	/// Overrides the authorization endpoint.
	pub fn with_authorization_url(mut self, url: impl Into<String>) -> Self {
		self.authorization_url = Some(url.into());

		self
	}

	/// Overrides the token endpoint.
	pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
		self.token_url = Some(url.into());

		self
	}

	/// Overrides the profile endpoint. Not a Nirror option; see [`Self::profile_url`].
	pub fn with_profile_url(mut self, url: impl Into<String>) -> Self {
		self.profile_url = Some(url.into());

		self
	}

	/// Overrides the scope separator.
	pub fn with_scope_separator(mut self, separator: impl Into<String>) -> Self {
		self.scope_separator = Some(separator.into());

		self
	}

	/// Replaces the custom header map as a whole.
	pub fn with_custom_headers<I, K, V>(mut self, headers: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.custom_headers =
			Some(headers.into_iter().map(|(name, value)| (name.into(), value.into())).collect());

		self
	}

	/// Sets the scopes requested during authorization.
	pub fn with_scope<I, S>(mut self, scope: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scope = scope.into_iter().map(Into::into).collect();

		self
	}

	/// Enables or disables PKCE.
	pub fn with_pkce(mut self, pkce: bool) -> Self {
		self.pkce = pkce;

		self
	}

	/// Fills every unset option with the provider default.
	///
	/// Empty strings count as unset, so `scopeSeparator: ""` still resolves to `","`.
	pub fn resolve(self) -> StrategyConfig {
		StrategyConfig {
			client_id: self.client_id,
			client_secret: self.client_secret,
			callback_url: self.callback_url,
			authorization_url: or_default(self.authorization_url, AUTHORIZATION_URL),
			token_url: or_default(self.token_url, TOKEN_URL),
			profile_url: or_default(self.profile_url, PROFILE_URL),
			scope_separator: or_default(self.scope_separator, SCOPE_SEPARATOR),
			custom_headers: self.custom_headers.unwrap_or_default(),
			scope: self.scope,
			pkce: self.pkce,
		}
	}
}
impl Debug for StrategyOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyOptions")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("callback_url", &self.callback_url)
			.field("authorization_url", &self.authorization_url)
			.field("token_url", &self.token_url)
			.field("profile_url", &self.profile_url)
			.field("scope_separator", &self.scope_separator)
			.field("custom_headers", &self.custom_headers)
			.field("scope", &self.scope)
			.field("pkce", &self.pkce)
			.finish()
	}
}

/// Fully-resolved configuration consumed by the engine and the strategy.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct StrategyConfig {
	/// OAuth 2.0 client identifier.
	#[serde(rename = "clientID")]
	pub client_id: String,
	/// OAuth 2.0 client secret; empty for public clients.
	#[serde(rename = "clientSecret", skip_serializing)]
	pub client_secret: String,
	/// Redirect URI registered with Nirror.
	#[serde(rename = "callbackURL")]
	pub callback_url: String,
	/// Authorization endpoint.
	#[serde(rename = "authorizationURL")]
	pub authorization_url: String,
	/// Token endpoint.
	#[serde(rename = "tokenURL")]
	pub token_url: String,
	/// Profile endpoint.
	#[serde(rename = "profileURL")]
	pub profile_url: String,
	/// Separator used when joining scopes.
	#[serde(rename = "scopeSeparator")]
	pub scope_separator: String,
	/// Headers attached to every engine request.
	#[serde(rename = "customHeaders")]
	pub custom_headers: BTreeMap<String, String>,
	/// Scopes requested during authorization.
	pub scope: Vec<String>,
	/// Whether PKCE is used.
	pub pkce: bool,
}
impl From<StrategyOptions> for StrategyConfig {
	fn from(options: StrategyOptions) -> Self {
		options.resolve()
	}
}
impl Debug for StrategyConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyConfig")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("callback_url", &self.callback_url)
			.field("authorization_url", &self.authorization_url)
			.field("token_url", &self.token_url)
			.field("profile_url", &self.profile_url)
			.field("scope_separator", &self.scope_separator)
			.field("custom_headers", &self.custom_headers)
			.field("scope", &self.scope)
			.field("pkce", &self.pkce)
			.finish()
	}
}

fn or_default(value: Option<String>, default: &str) -> String {
	value.filter(|value| !value.is_empty()).unwrap_or_else(|| default.to_owned())
}
