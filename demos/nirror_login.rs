//! Walks through a full Nirror login from a terminal: prints the authorize URL, waits for the
//! redirect URL to be pasted back, then exchanges the code and prints the normalized profile.
//!
//! Credentials come from `NIRROR_CLIENT_ID`, `NIRROR_CLIENT_SECRET`, and `NIRROR_CALLBACK_URL`.

// std
use std::{env, io};
// crates.io
use color_eyre::Result;
// self
use oauth2_nirror::{
	config::StrategyOptions,
	error::BoxError,
	strategy::{AuthOutcome, AuthorizationCallback, NirrorStrategy, VerifyRequest},
	url::Url,
};

async fn verify(request: VerifyRequest) -> Result<Option<String>, BoxError> {
	println!("Signed in as {} ({:?}).", request.profile.id, request.profile.display_name);
	println!("Raw account resource: {}.", request.profile.raw);

	Ok(Some(request.profile.id))
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let options = StrategyOptions::new(
		env::var("NIRROR_CLIENT_ID").unwrap_or_else(|_| "demo-client".into()),
		env::var("NIRROR_CLIENT_SECRET").unwrap_or_else(|_| "demo-secret".into()),
		env::var("NIRROR_CALLBACK_URL")
			.unwrap_or_else(|_| "http://localhost:3000/auth/nirror/callback".into()),
	)
	.with_scope(["account_info"]);
	let strategy = NirrorStrategy::new(options, verify)?;
	let pending = strategy.authorization_request();

	println!("Send your user to {}.", pending.authorize_url);
	println!("Paste the URL Nirror redirected to:");

	let mut line = String::new();

	io::stdin().read_line(&mut line)?;

	let callback = AuthorizationCallback::from_redirect(&Url::parse(line.trim())?);

	match strategy.authenticate(&pending, callback).await? {
		AuthOutcome::Authenticated(user) => println!("Logged in user `{user}`."),
		AuthOutcome::Rejected => println!("Verify callback rejected the account."),
		AuthOutcome::Denied { description } =>
			println!("User declined access: {}.", description.unwrap_or_default()),
	}

	Ok(())
}
