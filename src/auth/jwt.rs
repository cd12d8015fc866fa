//! RS256 assertions for the JWT bearer grant.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rsa::{
	RsaPrivateKey,
	pkcs1::DecodeRsaPrivateKey,
	pkcs1v15::SigningKey,
	pkcs8::DecodePrivateKey,
	signature::{SignatureEncoding, Signer},
};
use sha2::Sha256;
// self
use crate::{_prelude::*, auth::JwtBearerCredentials, error::ConfigError};

const HEADER: &str = r#"{"alg":"RS256","typ":"JWT"}"#;

/// Claims carried by the bearer assertion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
	/// Issuer: the connected app consumer key.
	pub iss: String,
	/// Subject: the Salesforce username.
	pub sub: String,
	/// Audience: the login domain.
	pub aud: String,
	/// Expiry as Unix seconds.
	pub exp: i64,
}
impl AssertionClaims {
	/// Derives the claims for `creds`, expiring `creds.ttl` after `now`.
	pub fn new(creds: &JwtBearerCredentials, now: OffsetDateTime) -> Self {
		Self {
			iss: creds.consumer_key.clone(),
			sub: creds.username.clone(),
			aud: creds.domain.to_string(),
			exp: (now + creds.ttl).unix_timestamp(),
		}
	}
}

/// Builds and signs the bearer assertion for `creds`.
pub fn build_assertion(
	creds: &JwtBearerCredentials,
	now: OffsetDateTime,
) -> Result<String, ConfigError> {
	let key = parse_private_key(creds.private_key_pem.expose())?;
	let claims = serde_json::to_vec(&AssertionClaims::new(creds, now))
		.map_err(|e| ConfigError::Assertion { source: Box::new(e) })?;
	let message =
		format!("{}.{}", URL_SAFE_NO_PAD.encode(HEADER), URL_SAFE_NO_PAD.encode(claims));
	let signature = SigningKey::<Sha256>::new(key)
		.try_sign(message.as_bytes())
		.map_err(|e| ConfigError::Assertion { source: Box::new(e) })?;

	Ok(format!("{message}.{}", URL_SAFE_NO_PAD.encode(signature.to_bytes())))
}

/// Reads an RSA private key from PKCS#1 (`RSA PRIVATE KEY`) or PKCS#8 (`PRIVATE KEY`) PEM.
pub fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, ConfigError> {
	RsaPrivateKey::from_pkcs1_pem(pem).or_else(|pkcs1| {
		RsaPrivateKey::from_pkcs8_pem(pem).map_err(|_| ConfigError::InvalidPrivateKey {
			source: Box::new(pkcs1),
		})
	})
}
