//! Transport primitives for token exchanges and API calls.
//!
//! The module exposes [`HttpTransport`] so downstream crates can plug in their own HTTP
//! client, and [`TransportErrorMapper`] so transport-specific failures can be classified
//! before they reach callers. Requests and responses use the `http` types re-exported by
//! [`oauth2`], which keeps the broker independent of any particular client crate.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	obs::FlowKind,
};

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Abstraction over HTTP transports capable of executing broker requests.
///
/// The trait acts as the broker's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so they can be shared across broker clones, and the handles they
/// return must own whatever state the request future needs so it stays `Send`.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle used for a single request.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle for the next request.
	fn handle(&self) -> Self::Handle;
}

/// Maps HTTP transport failures into broker [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a broker error.
	fn map_transport_error(&self, flow: FlowKind, error: HttpClientError<E>) -> Error;
}

/// Mapper that treats every transport-specific error as a network failure.
#[derive(Clone, Debug, Default)]
pub struct NetworkErrorMapper;
impl<E> TransportErrorMapper<E> for NetworkErrorMapper
where
	E: 'static + Send + Sync + StdError,
{
	fn map_transport_error(&self, flow: FlowKind, err: HttpClientError<E>) -> Error {
		let _ = flow;

		match err {
			HttpClientError::Reqwest(inner) => TransportError::network(*inner).into(),
			other => map_generic_client_error(other),
		}
	}
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, flow: FlowKind, err: HttpClientError<ReqwestError>) -> Error {
		// Flow reserved for future use.
		let _ = flow;

		match err {
			HttpClientError::Reqwest(inner) if inner.is_builder() => ConfigError::from(*inner).into(),
			HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
			other => map_generic_client_error(other),
		}
	}
}

fn map_generic_client_error<E>(err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::Other { message }.into(),
		HttpClientError::Reqwest(inner) => TransportError::network(*inner).into(),
		_ => TransportError::Other { message: "unclassified HTTP client error".into() }.into(),
	}
}

/// Executes `request` on a fresh transport handle, classifying transport failures.
pub(crate) async fn execute<C, M>(
	client: &C,
	mapper: &M,
	flow: FlowKind,
	request: HttpRequest,
) -> Result<HttpResponse>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let handle = client.handle();

	handle.call(request).await.map_err(|err| mapper.map_transport_error(flow, err))
}

/// Builds a form-encoded POST.
pub(crate) fn form_post<'a>(
	url: &str,
	pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<HttpRequest> {
	let body = url::form_urlencoded::Serializer::new(String::new()).extend_pairs(pairs).finish();

	Request::builder()
		.method(Method::POST)
		.uri(url)
		.header(CONTENT_TYPE, FORM)
		.header(ACCEPT, JSON)
		.body(body.into_bytes())
		.map_err(|e| ConfigError::from(e).into())
}

/// Builds a bearer-authenticated JSON GET.
pub(crate) fn authorized_get(url: &str, access_token: &str) -> Result<HttpRequest> {
	Request::builder()
		.method(Method::GET)
		.uri(url)
		.header(AUTHORIZATION, format!("Bearer {access_token}"))
		.header(ACCEPT, JSON)
		.body(Vec::new())
		.map_err(|e| ConfigError::from(e).into())
}

/// Lossy UTF-8 view of a response body, used in error messages.
pub(crate) fn body_text(response: &HttpResponse) -> String {
	String::from_utf8_lossy(response.body()).into_owned()
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token requests should not follow redirects: token endpoints return results directly.
/// Configure any custom [`ReqwestClient`] accordingly before handing it to the broker.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self) -> Self::Handle {
		ReqwestHandle(self.0.clone())
	}
}

/// Handle returned by [`ReqwestHttpClient`] that satisfies [`HttpTransport`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
