//! Scope joining for authorization requests.

/// Joins requested scopes with the provider's separator, preserving caller order.
///
/// Empty entries are skipped; `None` means the `scope` parameter should be omitted.
pub fn join_scope<S>(scopes: &[S], separator: &str) -> Option<String>
where
	S: AsRef<str>,
{
	let mut buf = String::new();

	for scope in scopes.iter().map(AsRef::as_ref).filter(|scope| !scope.is_empty()) {
		if !buf.is_empty() {
			buf.push_str(separator);
		}

		buf.push_str(scope);
	}

	if buf.is_empty() { None } else { Some(buf) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn scope_joining_handles_custom_separators() {
		let scope = ["account_info", "email"];

		assert_eq!(join_scope(&scope, ","), Some("account_info,email".into()));
		assert_eq!(join_scope(&scope, " "), Some("account_info email".into()));
	}

	#[test]
	fn empty_scopes_are_omitted() {
		assert_eq!(join_scope::<&str>(&[], ","), None);
		assert_eq!(join_scope(&["", "email", ""], ","), Some("email".into()));
	}
}
