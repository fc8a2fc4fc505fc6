//! Normalized identity records built from Nirror's account resource.
//!
//! The account resource returns a JSON object carrying at least `uid` and `email`, optionally
//! `display_name`. [`NormalizedProfile::from_body`] maps those fixed paths onto the normalized
//! shape and keeps the verbatim body plus its parsed form alongside. Fetching is done through
//! [`ProfileProvider`], which the strategy implements on top of its engine.

// std
use std::string::FromUtf8Error;
// crates.io
use serde_json::{Number, Value};
// self
use crate::{_prelude::*, auth::TokenSecret, config::STRATEGY_NAME};

/// Boxed future returned by [`ProfileProvider::user_profile`].
pub type ProfileFuture<'a> = Pin<Box<dyn Future<Output = Result<NormalizedProfile>> + 'a + Send>>;

/// Capability invoked once per login attempt, after the code exchange, to load the profile.
pub trait ProfileProvider: Send + Sync {
	/// Fetches and normalizes the profile reachable with `access_token`.
	fn user_profile<'a>(&'a self, access_token: &'a TokenSecret) -> ProfileFuture<'a>;
}

/// Reasons a profile body could not be normalized.
#[derive(Debug, ThisError)]
pub enum ProfileParseError {
	/// Body is not UTF-8.
	#[error("Profile response is not valid UTF-8.")]
	Encoding(#[from] FromUtf8Error),
	/// Body is not JSON.
	#[error("Profile response is not valid JSON.")]
	Syntax(#[source] serde_json::Error),
	/// Body is JSON but not an object.
	#[error("Profile response is not a JSON object.")]
	NotAnObject,
	/// Required field is missing or has the wrong type.
	#[error("Profile response has an unexpected shape at `{}`.", .0.path())]
	Field(#[source] serde_path_to_error::Error<serde_json::Error>),
}

/// One e-mail address attached to a profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEmail {
	/// Address as reported by the provider.
	pub value: String,
}

/// Provider-independent identity record handed to the verify callback.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedProfile {
	/// Always `"nirror"`.
	pub provider: &'static str,
	/// Nirror account id (`uid`), rendered as a string.
	pub id: String,
	/// Full name (`display_name`), when present.
	pub display_name: Option<String>,
	/// Exactly one entry derived from `email`.
	pub emails: Vec<ProfileEmail>,
	/// Verbatim response body.
	#[serde(rename = "_raw")]
	pub raw: String,
	/// Parsed response body.
	#[serde(rename = "_json")]
	pub json: Value,
}
impl NormalizedProfile {
	/// Normalizes raw profile bytes as returned by the transport.
	pub fn from_bytes(body: Vec<u8>) -> Result<Self, ProfileParseError> {
		Self::from_body(String::from_utf8(body)?)
	}

	/// Normalizes a profile body.
	pub fn from_body(raw: String) -> Result<Self, ProfileParseError> {
		let json = serde_json::from_str::<Value>(&raw).map_err(ProfileParseError::Syntax)?;

		if !json.is_object() {
			return Err(ProfileParseError::NotAnObject);
		}

		let account: NirrorAccount =
			serde_path_to_error::deserialize(&json).map_err(ProfileParseError::Field)?;

		Ok(Self {
			provider: STRATEGY_NAME,
			id: account.uid.into_string(),
			display_name: account.display_name,
			emails: vec![ProfileEmail { value: account.email }],
			raw,
			json,
		})
	}

	/// First (and only) e-mail address.
	pub fn email(&self) -> Option<&str> {
		self.emails.first().map(|email| email.value.as_str())
	}
}

#[derive(Deserialize)]
struct NirrorAccount {
	uid: AccountUid,
	email: String,
	#[serde(default)]
	display_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AccountUid {
	Text(String),
	Number(Number),
}
impl AccountUid {
	fn into_string(self) -> String {
		match self {
			Self::Text(value) => value,
			Self::Number(value) => value.to_string(),
		}
	}
}
