//! Fixtures shared by the integration tests.

#![allow(dead_code)]

pub use std::sync::Arc;

pub use serde::Deserialize;
pub use sforce_broker::error::Error;
pub use time::Duration;

// self
use sforce_broker::{
	auth::{ClientCredentials, UsernamePasswordCredentials},
	config::Domain,
	flows::Broker,
	http::{ReqwestHttpClient, ReqwestTransportErrorMapper},
};

/// Broker type alias used by reqwest-backed integration tests.
pub type ReqwestTestBroker = Broker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// PKCS#1 RSA key used to sign JWT bearer assertions.
pub const TEST_RSA_PEM: &str = include_str!("../fixtures/rsa_private_key.pem");

/// Builds a broker backed by a plain reqwest client, suitable for `httpmock` servers.
pub fn build_reqwest_test_broker() -> ReqwestTestBroker {
	Broker::with_http_client(ReqwestHttpClient::default(), Arc::new(ReqwestTransportErrorMapper))
}

/// Parses a mock server base URL into a [`Domain`].
pub fn test_domain(base_url: &str) -> Domain {
	Domain::parse(base_url).expect("Mock server base URL should be a valid domain.")
}

/// Client credentials fixture pointing at the provided domain.
pub fn test_client_credentials(domain: Domain) -> ClientCredentials {
	ClientCredentials::new(domain, "consumer-key", "consumer-secret")
}

/// Username/password credentials fixture pointing at the provided domain.
pub fn test_username_password(domain: Domain) -> UsernamePasswordCredentials {
	UsernamePasswordCredentials::new(
		domain,
		"user@example.com",
		"hunter2",
		"sec-token",
		"consumer-key",
		"consumer-secret",
	)
}

/// Token endpoint response body carrying the provided access token.
pub fn token_body(access_token: &str, instance_url: &str) -> String {
	serde_json::json!({
		"access_token": access_token,
		"instance_url": instance_url,
		"id": "https://login.salesforce.com/id/00D000000000001/005000000000001",
		"issued_at": "1704164645000",
		"signature": "c2lnbmF0dXJl",
		"token_type": "Bearer",
	})
	.to_string()
}
