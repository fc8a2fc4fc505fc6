//! OAuth 2.0 engine seam consumed by the strategy.
//!
//! The engine owns everything protocol-shaped: building the authorization redirect (state and
//! optional PKCE), exchanging the returned code for tokens, and performing authenticated reads.
//! [`BasicEngine`] is the default implementation on top of the `oauth2` crate; hosts with their
//! own OAuth stack implement [`OAuth2Engine`] directly.

mod basic;
mod session;

pub use basic::*;
pub use session::*;

// self
use crate::{
	_prelude::*,
	auth::{TokenGrant, TokenSecret},
	error::TransportError,
};

/// Boxed future returned by engine operations that surface strategy errors.
pub type EngineFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;
/// Boxed future returned by [`OAuth2Engine::get`].
pub type TransportFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Protocol operations the strategy delegates to.
pub trait OAuth2Engine: Send + Sync {
	/// Builds the redirect the user agent should follow, requesting `scope`.
	fn authorization_request(&self, scope: &[String]) -> AuthorizationRequest;

	/// Exchanges an authorization code issued for `pending`.
	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
		pending: &'a AuthorizationRequest,
	) -> EngineFuture<'a, TokenGrant>;

	/// Performs one authenticated GET against `url`, returning the body of a 2xx response.
	///
	/// Non-success statuses are reported as [`TransportError::Status`].
	fn get<'a>(
		&'a self,
		url: &'a str,
		access_token: &'a TokenSecret,
	) -> TransportFuture<'a, Vec<u8>>;
}
impl<E> OAuth2Engine for Arc<E>
where
	E: ?Sized + OAuth2Engine,
{
	fn authorization_request(&self, scope: &[String]) -> AuthorizationRequest {
		(**self).authorization_request(scope)
	}

	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
		pending: &'a AuthorizationRequest,
	) -> EngineFuture<'a, TokenGrant> {
		(**self).exchange_code(code, pending)
	}

	fn get<'a>(
		&'a self,
		url: &'a str,
		access_token: &'a TokenSecret,
	) -> TransportFuture<'a, Vec<u8>> {
		(**self).get(url, access_token)
	}
}
