//! Grant flows, session refresh, and the broker that drives them.

pub mod refresh;

mod access_token;
mod client_credentials;
mod common;
mod jwt_bearer;
mod username_password;

pub use refresh::*;

// self
use crate::{
	_prelude::*,
	config::ApiVersion,
	http::{HttpTransport, TransportErrorMapper},
};
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestHttpClient, ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport stack.
pub type ReqwestBroker = Broker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Entry point for authenticating against Salesforce and querying its REST API.
///
/// The broker owns the HTTP transport, the error mapper applied to transport failures, and
/// the REST API version. It keeps no session state of its own: grant flows return a
/// [`Session`](crate::auth::Session) value that the caller owns and passes back in for
/// refreshes and queries.
#[derive(Clone)]
pub struct Broker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// REST API version used for data endpoints.
	pub api_version: ApiVersion,
	/// Shared metrics recorder for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
}
impl<C, M> Broker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a broker that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(http_client: impl Into<Arc<C>>, mapper: impl Into<Arc<M>>) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			api_version: ApiVersion::default(),
			refresh_metrics: Default::default(),
		}
	}

	/// Overrides the REST API version used for data endpoints.
	pub fn with_api_version(mut self, version: ApiVersion) -> Self {
		self.api_version = version;

		self
	}
}
#[cfg(feature = "reqwest")]
impl Broker<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a broker backed by a default reqwest client.
	pub fn new() -> Self {
		Self::with_http_client(ReqwestHttpClient::default(), Arc::new(ReqwestTransportErrorMapper))
	}
}
#[cfg(feature = "reqwest")]
impl Default for Broker<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	fn default() -> Self {
		Self::new()
	}
}
impl<C, M> Debug for Broker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("api_version", &self.api_version)
			.field("refresh_metrics", &self.refresh_metrics)
			.finish()
	}
}
