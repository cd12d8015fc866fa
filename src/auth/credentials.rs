//! Credential bundles retained alongside a session so it can be refreshed later.

// self
use crate::{_prelude::*, auth::Secret, config::Domain};

/// Inputs for the OAuth username/password grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsernamePasswordCredentials {
	/// Login domain hosting the token endpoint.
	pub domain: Domain,
	/// Salesforce username.
	pub username: String,
	/// Account password.
	pub password: Secret,
	/// Security token appended to the password on the wire.
	pub security_token: Secret,
	/// Connected app consumer key.
	pub consumer_key: String,
	/// Connected app consumer secret.
	pub consumer_secret: Secret,
}
impl UsernamePasswordCredentials {
	/// Bundles the username/password grant inputs.
	pub fn new(
		domain: Domain,
		username: impl Into<String>,
		password: impl Into<Secret>,
		security_token: impl Into<Secret>,
		consumer_key: impl Into<String>,
		consumer_secret: impl Into<Secret>,
	) -> Self {
		Self {
			domain,
			username: username.into(),
			password: password.into(),
			security_token: security_token.into(),
			consumer_key: consumer_key.into(),
			consumer_secret: consumer_secret.into(),
		}
	}

	/// Password concatenated with the security token, as the token endpoint expects it.
	pub(crate) fn password_with_token(&self) -> String {
		format!("{}{}", self.password.expose(), self.security_token.expose())
	}
}

/// Inputs for the OAuth client credentials grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientCredentials {
	/// Domain hosting the token endpoint.
	pub domain: Domain,
	/// Connected app consumer key.
	pub consumer_key: String,
	/// Connected app consumer secret.
	pub consumer_secret: Secret,
}
impl ClientCredentials {
	/// Bundles the client credentials grant inputs.
	pub fn new(
		domain: Domain,
		consumer_key: impl Into<String>,
		consumer_secret: impl Into<Secret>,
	) -> Self {
		Self { domain, consumer_key: consumer_key.into(), consumer_secret: consumer_secret.into() }
	}
}

/// Inputs for the OAuth JWT bearer grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JwtBearerCredentials {
	/// Domain hosting the token endpoint; also used as the assertion audience.
	pub domain: Domain,
	/// Salesforce username placed in the `sub` claim.
	pub username: String,
	/// Connected app consumer key placed in the `iss` claim.
	pub consumer_key: String,
	/// PEM-encoded RSA private key (PKCS#1 or PKCS#8).
	pub private_key_pem: Secret,
	/// Lifetime of the assertion, added to the current time for the `exp` claim.
	pub ttl: Duration,
}
impl JwtBearerCredentials {
	/// Bundles the JWT bearer grant inputs.
	pub fn new(
		domain: Domain,
		username: impl Into<String>,
		consumer_key: impl Into<String>,
		private_key_pem: impl Into<Secret>,
		ttl: Duration,
	) -> Self {
		Self {
			domain,
			username: username.into(),
			consumer_key: consumer_key.into(),
			private_key_pem: private_key_pem.into(),
			ttl,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn password_is_sent_with_security_token_and_debug_redacts() {
		let domain =
			Domain::parse("https://login.salesforce.com").expect("Domain fixture should be valid.");
		let creds = UsernamePasswordCredentials::new(domain, "u", "p", "t", "key", "secret");

		assert_eq!(creds.password_with_token(), "pt");

		let rendered = format!("{creds:?}");

		assert!(!rendered.contains("secret\""));
		assert!(rendered.contains("<redacted>"));
	}
}
