//! Demonstrates registering a custom HTTP transport and mapper that emit non-reqwest errors.
//!
//! 1. Implement [`HttpTransport`] so the broker can ask for a request handle.
//! 2. Provide a [`TransportErrorMapper`] that classifies the transport's own error type.
//! 3. Pass both to [`Broker::with_http_client`].
//! 4. Observe how the mapped errors surface through the broker's [`Error`] type.

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
};
// crates.io
use color_eyre::Result;
// self
use sforce_broker::{
	auth::ClientCredentials,
	config::Domain,
	error::{Error, TransportError},
	flows::Broker,
	http::{
		HttpTransport, TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
	obs::FlowKind,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let domain = Domain::parse("https://login.salesforce.com")?;
	let creds = ClientCredentials::new(domain, "demo-consumer-key", "demo-consumer-secret");
	let broker: Broker<MockHttpClient, MockTransportErrorMapper> =
		Broker::with_http_client(MockHttpClient::success(), MockTransportErrorMapper);
	let session = broker.client_credentials(creds.clone()).await?;

	println!("Access token issued by the mock transport: {}.", session.access_token.expose());

	let failing_broker: Broker<MockHttpClient, MockTransportErrorMapper> = Broker::with_http_client(
		MockHttpClient::transport_error(MockTransportError::DnsFailure {
			host: "login.salesforce.com",
		}),
		MockTransportErrorMapper,
	);

	match failing_broker.client_credentials(creds.clone()).await {
		Ok(_) => println!("Mock transport unexpectedly succeeded."),
		Err(e) => println!("Transport error mapped by the broker: {e}."),
	}

	let slow_broker: Broker<MockHttpClient, MockTransportErrorMapper> = Broker::with_http_client(
		MockHttpClient::transport_error(MockTransportError::BackendTimeout),
		MockTransportErrorMapper,
	);

	match slow_broker.refresh_session(&session).await {
		Ok(_) => println!("Mock transport unexpectedly refreshed the session."),
		Err(e) => println!("Refresh failed with a timeout: {e}."),
	}

	let other_broker: Broker<MockHttpClient, MockTransportErrorMapper> = Broker::with_http_client(
		MockHttpClient::other_error("upstream connection closed"),
		MockTransportErrorMapper,
	);

	match other_broker.client_credentials(creds).await {
		Ok(_) => println!("Mock transport unexpectedly produced a session."),
		Err(e) => println!("An HttpClientError::Other variant made it through the mapper: {e}."),
	}

	Ok(())
}

#[derive(Clone, Debug)]
enum MockTransportError {
	DnsFailure { host: &'static str },
	BackendTimeout,
}
impl Display for MockTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::DnsFailure { host } => write!(f, "DNS lookup failed for {host}"),
			Self::BackendTimeout => write!(f, "Salesforce did not answer in time"),
		}
	}
}
impl StdError for MockTransportError {}

#[derive(Clone)]
enum MockBehavior {
	Success,
	TransportError(MockTransportError),
	Other(&'static str),
}

#[derive(Clone)]
struct MockHttpClient {
	behavior: MockBehavior,
}
impl MockHttpClient {
	fn success() -> Self {
		Self { behavior: MockBehavior::Success }
	}

	fn transport_error(error: MockTransportError) -> Self {
		Self { behavior: MockBehavior::TransportError(error) }
	}

	fn other_error(message: &'static str) -> Self {
		Self { behavior: MockBehavior::Other(message) }
	}
}
impl HttpTransport for MockHttpClient {
	type Handle = MockHttpHandle;
	type TransportError = MockTransportError;

	fn handle(&self) -> Self::Handle {
		MockHttpHandle { behavior: self.behavior.clone() }
	}
}

struct MockHttpHandle {
	behavior: MockBehavior,
}
impl<'a> AsyncHttpClient<'a> for MockHttpHandle {
	type Error = HttpClientError<MockTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, _request: HttpRequest) -> Self::Future {
		let behavior = self.behavior.clone();

		Box::pin(async move {
			match behavior {
				MockBehavior::Success => Ok(HttpResponse::new(
					b"{\"access_token\":\"00Dmock!access\",\"instance_url\":\"https://acme.my.salesforce.com\"}"
						.to_vec(),
				)),
				// `HttpClientError::Reqwest` carries any boxed transport error despite its name.
				MockBehavior::TransportError(error) => Err(HttpClientError::Reqwest(Box::new(error))),
				MockBehavior::Other(message) => Err(HttpClientError::Other(message.to_owned())),
			}
		})
	}
}

#[derive(Clone, Default)]
struct MockTransportErrorMapper;
impl TransportErrorMapper<MockTransportError> for MockTransportErrorMapper {
	fn map_transport_error(
		&self,
		flow: FlowKind,
		error: HttpClientError<MockTransportError>,
	) -> Error {
		match error {
			HttpClientError::Reqwest(inner) => match *inner {
				MockTransportError::BackendTimeout =>
					TransportError::timeout(MockTransportError::BackendTimeout).into(),
				other => TransportError::network(other).into(),
			},
			HttpClientError::Other(text) => TransportError::Other {
				message: format!("mock transport failed during the {flow} flow: {text}"),
			}
			.into(),
			_ => TransportError::Other { message: format!("mock transport failed during the {flow} flow") }
				.into(),
		}
	}
}
