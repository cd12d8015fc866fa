//! Broker-level error types shared across flows, the query pager, and transports.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token endpoint or verification call rejected the credentials.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Session failed its pre-flight checks.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Session could not be refreshed.
	#[error(transparent)]
	Refresh(#[from] RefreshError),
	/// Transport failure or unexpected API status.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Query page or record decoding failure.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Returns `true` when the API rejected the session as expired or revoked.
	pub fn is_session_expired(&self) -> bool {
		matches!(self, Self::Transport(TransportError::Unauthorized { .. }))
	}
}

/// Failures raised while exchanging credentials for a session.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint returned HTTP {status}: {body}.")]
	TokenEndpoint {
		/// HTTP status code.
		status: u16,
		/// Raw response body, usually an OAuth error document.
		body: String,
	},
	/// Token endpoint responded with a body that is not a token document.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
	},
	/// Token endpoint reported success without issuing an access token.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// The access token supplied by the caller was rejected by the API.
	#[error("Access token verification failed with HTTP {status}: {body}.")]
	Verification {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
}

/// Pre-flight session checks.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Session has no access token.
	#[error("Session does not carry an access token.")]
	MissingAccessToken,
	/// Session has no instance URL to send API calls to.
	#[error("Session does not carry an instance URL.")]
	MissingInstanceUrl,
}

/// Refresh failures that are not plain token endpoint errors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshError {
	/// Session was created from a raw access token and has no grant to replay.
	#[error("Session has no grant type and cannot be refreshed.")]
	NoGrantType,
	/// Token endpoint reported success but the refreshed session has no access token.
	#[error("Refresh succeeded without returning an access token.")]
	EmptyAccessToken,
}

/// Transport-level failures (network, IO, unexpected API status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client gave up waiting for the API.
	#[error("Request timed out while calling the API.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
	/// API rejected the session (HTTP 401).
	#[error("API rejected the session: {body}.")]
	Unauthorized {
		/// Raw response body.
		body: String,
	},
	/// API answered with a non-success status.
	#[error("API returned HTTP {status}: {body}.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// HTTP client error that carries no structured cause.
	#[error("HTTP client error occurred while calling the API: {message}.")]
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

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Classifies a non-success API response.
	pub fn from_status(status: u16, body: String) -> Self {
		if status == 401 { Self::Unauthorized { body } } else { Self::UnexpectedStatus { status, body } }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// Query response decoding failures.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// A query page did not match the `{totalSize, done, nextRecordsUrl, records}` shape.
	#[error("Query page could not be parsed.")]
	Page {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Accumulated records could not be mapped onto the requested type.
	#[error("Query records could not be decoded.")]
	Records {
		/// Structured decoding failure, including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A page reported `done: false` without a `nextRecordsUrl` to continue from.
	#[error("Query page is not done but carries no nextRecordsUrl.")]
	MissingNextRecordsUrl,
}

/// Configuration and input validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Domain or instance URL cannot be parsed.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// Rejected input.
		url: String,
		/// Underlying parsing failure, when the input was not a URL at all.
		#[source]
		source: Option<url::ParseError>,
	},
	/// API version does not look like `v<major>.<minor>`.
	#[error("API version `{0}` must look like `v63.0`.")]
	InvalidApiVersion(String),
	/// RSA private key could not be read from PEM text.
	#[error("RSA private key could not be parsed from PEM.")]
	InvalidPrivateKey {
		/// PKCS#1 or PKCS#8 decoding failure.
		#[source]
		source: BoxError,
	},
	/// JWT assertion could not be assembled.
	#[error("JWT assertion could not be built.")]
	Assertion {
		/// Serialization or signing failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_classification_flags_expired_sessions() {
		let expired: Error = TransportError::from_status(401, "[]".into()).into();
		let failed: Error = TransportError::from_status(500, "boom".into()).into();

		assert!(expired.is_session_expired());
		assert!(!failed.is_session_expired());
		assert!(matches!(failed, Error::Transport(TransportError::UnexpectedStatus { status: 500, .. })));
	}
}
