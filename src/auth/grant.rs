//! Token material returned by an authorization-code exchange.

// std
use std::time::Duration as StdDuration;
// crates.io
use oauth2::{TokenResponse, basic::BasicTokenResponse};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Tokens issued by the provider for one login attempt.
///
/// The grant is handed to the verify callback and never persisted by the strategy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
	/// Bearer token used to read the profile resource.
	pub access_token: TokenSecret,
	/// Refresh token, when the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Lifetime reported by the provider.
	pub expires_in: Option<StdDuration>,
	/// Scopes echoed back by the provider, if any.
	pub scope: Option<Vec<String>>,
}
impl TokenGrant {
	/// Creates a grant holding only an access token.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: None,
			expires_in: None,
			scope: None,
		}
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(refresh_token));

		self
	}
}
impl From<&BasicTokenResponse> for TokenGrant {
	fn from(response: &BasicTokenResponse) -> Self {
		Self {
			access_token: TokenSecret::new(response.access_token().secret().to_owned()),
			refresh_token: response
				.refresh_token()
				.map(|token| TokenSecret::new(token.secret().to_owned())),
			expires_in: response.expires_in(),
			scope: response
				.scopes()
				.map(|scopes| scopes.iter().map(|scope| scope.as_str().to_owned()).collect()),
		}
	}
}
