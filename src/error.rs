//! Strategy-level error types shared across configuration, the engine, and profile handling.

// self
use crate::{_prelude::*, profile::ProfileParseError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used for transport causes and verify callback failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical strategy error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem detected by the engine.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure while calling the token endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The profile resource could not be fetched.
	#[error("Failed to fetch user profile.")]
	ProfileFetch {
		/// Underlying transport failure or non-success status.
		#[source]
		source: TransportError,
	},
	/// The profile resource could not be parsed.
	#[error("Failed to parse user profile.")]
	ProfileParse(#[from] ProfileParseError),

	/// Provider rejected the grant (e.g., bad or reused authorization code).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Token endpoint returned an unexpected response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Provider- or strategy-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},

	/// Authorization redirect carried an OAuth error other than `access_denied`.
	#[error("Authorization failed with `{error}`.")]
	Authorization {
		/// OAuth `error` parameter.
		error: String,
		/// OAuth `error_description` parameter, if present.
		description: Option<String>,
	},
	/// Returned `state` is missing or does not match the pending request.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// Authorization redirect carried neither a code nor an error.
	#[error("Authorization redirect is missing the code parameter.")]
	MissingAuthorizationCode,
	/// Verify callback failed.
	#[error("Verify callback failed.")]
	Verify {
		/// Error returned by the host application.
		#[source]
		source: BoxError,
	},
}

/// Configuration and validation failures raised while building an engine.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Options JSON could not be parsed.
	#[error("Strategy options are invalid.")]
	Options {
		/// Path-aware parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// `clientID` was empty.
	#[error("The clientID option is required.")]
	MissingClientId,
	/// An endpoint URL cannot be parsed.
	#[error("The {endpoint} URL is invalid.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Callback URL cannot be parsed.
	#[error("The callbackURL option is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// A custom header name or value is not valid HTTP.
	#[error("Custom header `{name}` is invalid.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
}

/// Transport-level failures (network, IO, HTTP status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// HTTP request could not be constructed.
	#[error("HTTP request could not be constructed.")]
	Request(#[from] oauth2::http::Error),
	/// Provider answered with a non-success status.
	#[error("Provider responded with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body, decoded lossily.
		body: String,
	},
	/// HTTP client failed without a structured cause.
	#[error("HTTP client error occurred while calling the provider: {message}.")]
	Other {
		/// Client-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Returns the HTTP status carried by the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn profile_fetch_keeps_transport_cause() {
		let err = Error::ProfileFetch {
			source: TransportError::Status { status: 503, body: "down".into() },
		};

		assert_eq!(err.to_string(), "Failed to fetch user profile.");

		let cause = err.source().expect("Profile fetch errors should expose their cause.");

		assert_eq!(cause.to_string(), "Provider responded with HTTP 503.");
	}

	#[test]
	fn status_helper_only_reports_http_statuses() {
		let io = TransportError::Io(std::io::Error::other("reset"));

		assert_eq!(io.status(), None);
		assert_eq!(TransportError::Status { status: 401, body: String::new() }.status(), Some(401));
	}
}
