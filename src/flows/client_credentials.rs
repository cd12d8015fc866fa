//! OAuth client credentials grant.

// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, Grant, GrantType, Session},
	flows::{Broker, common},
	http::{HttpTransport, TransportErrorMapper},
	obs::{self, FlowKind},
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges the connected app's consumer key and secret for a session.
	pub async fn client_credentials(&self, creds: ClientCredentials) -> Result<Session> {
		obs::observe(FlowKind::ClientCredentials, "client_credentials", async move {
			common::require_access_token(self.client_credentials_token(creds).await?)
		})
		.await
	}

	pub(crate) async fn client_credentials_token(&self, creds: ClientCredentials) -> Result<Session> {
		let token = self
			.request_token(GrantType::ClientCredentials, &creds.domain, [
				("client_id", creds.consumer_key.as_str()),
				("client_secret", creds.consumer_secret.expose()),
			])
			.await?;

		Ok(Session::new(token, Grant::ClientCredentials(creds)))
	}
}
