//! Authenticated session state and the grant it was minted from.

// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, JwtBearerCredentials, Secret, UsernamePasswordCredentials},
	error::ValidationError,
};

/// Grant flow that produced a [`Session`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// OAuth username/password grant.
	UsernamePassword,
	/// OAuth client credentials grant.
	ClientCredentials,
	/// OAuth JWT bearer grant.
	JwtBearer,
	/// Session was injected from a raw access token.
	None,
}
impl GrantType {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::UsernamePassword => "username_password",
			GrantType::ClientCredentials => "client_credentials",
			GrantType::JwtBearer => "jwt_bearer",
			GrantType::None => "none",
		}
	}

	/// Value sent as `grant_type` to the token endpoint, if the grant uses it.
	pub const fn oauth_grant_type(self) -> Option<&'static str> {
		match self {
			GrantType::UsernamePassword => Some("password"),
			GrantType::ClientCredentials => Some("client_credentials"),
			GrantType::JwtBearer => Some("urn:ietf:params:oauth:grant-type:jwt-bearer"),
			GrantType::None => None,
		}
	}

	/// Returns `true` when a session minted by this grant can be refreshed.
	pub const fn is_refreshable(self) -> bool {
		!matches!(self, GrantType::None)
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Grant together with the credentials needed to replay it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Grant {
	/// Minted by the username/password grant.
	UsernamePassword(UsernamePasswordCredentials),
	/// Minted by the client credentials grant.
	ClientCredentials(ClientCredentials),
	/// Minted by the JWT bearer grant.
	JwtBearer(JwtBearerCredentials),
	/// Injected from a raw access token; never refreshable.
	None,
}
impl Grant {
	/// Tag of the grant without its credentials.
	pub fn grant_type(&self) -> GrantType {
		match self {
			Grant::UsernamePassword(_) => GrantType::UsernamePassword,
			Grant::ClientCredentials(_) => GrantType::ClientCredentials,
			Grant::JwtBearer(_) => GrantType::JwtBearer,
			Grant::None => GrantType::None,
		}
	}
}

/// Authenticated state used to authorize API calls.
///
/// Sessions are only produced by the broker's grant flows, so the grant tag always names the
/// flow that minted the token. Refreshing yields a brand-new value instead of mutating the
/// existing one; see [`Broker::refresh_session`](crate::flows::Broker::refresh_session).
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
	/// Bearer credential; callers must avoid logging it.
	pub access_token: Secret,
	/// Base URL for subsequent API calls.
	pub instance_url: String,
	/// Identity URL returned by the service.
	pub id: String,
	/// Issuance timestamp exactly as returned by the service.
	pub issued_at: String,
	/// Integrity signature returned by the service.
	pub signature: String,
	grant: Grant,
}
impl Session {
	pub(crate) fn new(token: TokenResponse, grant: Grant) -> Self {
		Self {
			access_token: Secret::new(token.access_token),
			instance_url: token.instance_url,
			id: token.id,
			issued_at: token.issued_at,
			signature: token.signature,
			grant,
		}
	}

	pub(crate) fn injected(instance_url: impl Into<String>, access_token: Secret) -> Self {
		Self {
			access_token,
			instance_url: instance_url.into(),
			id: String::new(),
			issued_at: String::new(),
			signature: String::new(),
			grant: Grant::None,
		}
	}

	/// Grant (with credentials) that minted this session.
	pub fn grant(&self) -> &Grant {
		&self.grant
	}

	/// Tag of the grant that minted this session.
	pub fn grant_type(&self) -> GrantType {
		self.grant.grant_type()
	}

	/// Checks that the session can authorize a request.
	pub fn validate(&self) -> Result<(), ValidationError> {
		validate_auth(self)
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("access_token", &"<redacted>")
			.field("instance_url", &self.instance_url)
			.field("id", &self.id)
			.field("issued_at", &self.issued_at)
			.field("grant_type", &self.grant_type())
			.finish()
	}
}

/// Rejects sessions without an access token. Performs no I/O.
pub fn validate_auth(session: &Session) -> Result<(), ValidationError> {
	if session.access_token.is_empty() {
		return Err(ValidationError::MissingAccessToken);
	}

	Ok(())
}

/// Token endpoint response document.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TokenResponse {
	pub access_token: String,
	pub instance_url: String,
	pub id: String,
	pub issued_at: String,
	pub signature: String,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn session(token: &str) -> Session {
		Session::new(
			TokenResponse {
				access_token: token.into(),
				instance_url: "https://acme.my.salesforce.com".into(),
				..Default::default()
			},
			Grant::None,
		)
	}

	#[test]
	fn validator_requires_access_token() {
		assert!(validate_auth(&session("00Dxx!token")).is_ok());
		assert_eq!(validate_auth(&session("")), Err(ValidationError::MissingAccessToken));
		assert_eq!(session("").validate(), Err(ValidationError::MissingAccessToken));
	}

	#[test]
	fn grant_types_describe_refreshability() {
		assert!(GrantType::UsernamePassword.is_refreshable());
		assert!(GrantType::JwtBearer.is_refreshable());
		assert!(!GrantType::None.is_refreshable());
		assert_eq!(GrantType::None.oauth_grant_type(), None);
		assert_eq!(GrantType::UsernamePassword.oauth_grant_type(), Some("password"));
		assert_eq!(GrantType::ClientCredentials.oauth_grant_type(), Some("client_credentials"));
		assert_eq!(
			GrantType::JwtBearer.oauth_grant_type(),
			Some("urn:ietf:params:oauth:grant-type:jwt-bearer")
		);
		assert_eq!(session("token").grant_type(), GrantType::None);
	}

	#[test]
	fn token_response_tolerates_missing_fields() {
		let token: TokenResponse = serde_json::from_str(
			"{\"access_token\":\"abc\",\"instance_url\":\"https://x\",\"token_type\":\"Bearer\"}",
		)
		.expect("Partial token responses should parse.");

		assert_eq!(token.access_token, "abc");
		assert!(token.signature.is_empty());
	}

	#[test]
	fn debug_redacts_access_token() {
		let rendered = format!("{:?}", session("very-secret-token"));

		assert!(!rendered.contains("very-secret-token"));
	}
}
