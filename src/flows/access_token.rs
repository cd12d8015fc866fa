//! Session injection from a caller-supplied access token.

// self
use crate::{
	_prelude::*,
	auth::{Secret, Session},
	config::Domain,
	error::{AuthError, ValidationError},
	flows::Broker,
	http::{self, HttpTransport, TransportErrorMapper},
	obs::{self, FlowKind},
};

const VERIFY_PATH: &str = "/limits";

impl<C, M> Broker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Wraps an existing access token in a session after confirming the API accepts it.
	///
	/// An empty token fails immediately without touching the network. Otherwise a single
	/// authenticated `GET` against the versioned `limits` resource under `domain` verifies the
	/// token. The resulting session has no grant and therefore cannot be refreshed.
	pub async fn set_access_token(
		&self,
		domain: Domain,
		access_token: impl Into<Secret>,
	) -> Result<Session> {
		let access_token = access_token.into();

		obs::observe(FlowKind::AccessToken, "set_access_token", async move {
			if access_token.is_empty() {
				return Err(ValidationError::MissingAccessToken.into());
			}

			let url = domain.data_url(&self.api_version, VERIFY_PATH);
			let request = http::authorized_get(&url, access_token.expose())?;
			let response = http::execute(
				self.http_client.as_ref(),
				self.transport_mapper.as_ref(),
				FlowKind::AccessToken,
				request,
			)
			.await?;

			if !response.status().is_success() {
				return Err(AuthError::Verification {
					status: response.status().as_u16(),
					body: http::body_text(&response),
				}
				.into());
			}

			Ok(Session::injected(domain.as_str(), access_token))
		})
		.await
	}
}
