// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Supported PKCE challenge methods surfaced via [`AuthorizationRequest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Inputs for [`AuthorizationRequest::generate`].
#[derive(Clone, Copy, Debug)]
pub struct AuthorizationParams<'a> {
	/// Provider authorization endpoint.
	pub authorization_endpoint: &'a Url,
	/// OAuth 2.0 client identifier.
	pub client_id: &'a str,
	/// Callback URL the provider redirects back to.
	pub redirect_uri: &'a Url,
	/// Requested scopes, in caller order.
	pub scope: &'a [String],
	/// Separator used to join `scope`.
	pub scope_separator: &'a str,
	/// Whether to attach an S256 PKCE challenge.
	pub pkce: bool,
}

/// Pending authorization handed out before redirecting the user agent.
///
/// Hosts keep it (typically keyed by [`state`](Self::state)) until the redirect comes back,
/// then pass it to the strategy so the returned state can be checked and the PKCE verifier
/// replayed.
#[derive(Clone)]
pub struct AuthorizationRequest {
	/// Opaque state value that must round-trip via the redirect handler.
	pub state: String,
	/// Redirect URI supplied when constructing the authorize URL.
	pub redirect_uri: Url,
	/// Requested scopes.
	pub scope: Vec<String>,
	/// Fully-formed authorize URL that callers should send end-users to.
	pub authorize_url: Url,
	pkce: Option<PkcePair>,
}
impl AuthorizationRequest {
	/// Generates a fresh state (and PKCE pair when requested) and builds the authorize URL.
	pub fn generate(params: AuthorizationParams) -> Self {
		let state = random_string(STATE_LEN);
		let pkce = params.pkce.then(PkcePair::generate);
		let authorize_url = build_authorize_url(&params, &state, pkce.as_ref());

		Self {
			state,
			redirect_uri: params.redirect_uri.clone(),
			scope: params.scope.to_vec(),
			authorize_url,
			pkce,
		}
	}

	/// PKCE code challenge derived from the secret verifier.
	pub fn code_challenge(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pkce| pkce.challenge.as_str())
	}

	/// PKCE challenge method, when PKCE is in use.
	pub fn code_challenge_method(&self) -> Option<PkceCodeChallengeMethod> {
		self.pkce.as_ref().map(|pkce| pkce.method)
	}

	/// PKCE verifier to replay during the code exchange. Never log this value.
	pub fn pkce_verifier(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pkce| pkce.verifier.as_str())
	}

	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: Option<&str>) -> Result<()> {
		if returned_state == Some(self.state.as_str()) { Ok(()) } else { Err(Error::StateMismatch) }
	}
}
impl Debug for AuthorizationRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationRequest")
			.field("state", &self.state)
			.field("redirect_uri", &self.redirect_uri)
			.field("scope", &self.scope)
			.field("authorize_url", &self.authorize_url)
			.field("code_challenge", &self.code_challenge())
			.field("code_challenge_method", &self.code_challenge_method())
			.finish()
	}
}

#[derive(Clone)]
struct PkcePair {
	verifier: String,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkcePair {
	fn generate() -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = compute_pkce_challenge(&verifier);

		Self { verifier, challenge, method: PkceCodeChallengeMethod::S256 }
	}
}

fn build_authorize_url(params: &AuthorizationParams, state: &str, pkce: Option<&PkcePair>) -> Url {
	let mut url = params.authorization_endpoint.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", params.client_id);
	pairs.append_pair("redirect_uri", params.redirect_uri.as_str());

	if let Some(scope) = auth::join_scope(params.scope, params.scope_separator) {
		pairs.append_pair("scope", &scope);
	}

	pairs.append_pair("state", state);

	if let Some(pkce) = pkce {
		pairs.append_pair("code_challenge", &pkce.challenge);
		pairs.append_pair("code_challenge_method", pkce.method.as_str());
	}

	drop(pairs);

	url
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(verifier.as_bytes());
	let digest = hasher.finalize();
	URL_SAFE_NO_PAD.encode(digest)
}
