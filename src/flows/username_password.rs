//! OAuth username/password grant.

// self
use crate::{
	_prelude::*,
	auth::{Grant, GrantType, Session, UsernamePasswordCredentials},
	flows::{Broker, common},
	http::{HttpTransport, TransportErrorMapper},
	obs::{self, FlowKind},
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges a username, password, and security token for a session.
	///
	/// The password is sent with the security token appended, together with the connected
	/// app's consumer key and secret. The returned session remembers the credentials so it
	/// can be refreshed with [`Broker::refresh_session`].
	pub async fn username_password(&self, creds: UsernamePasswordCredentials) -> Result<Session> {
		obs::observe(FlowKind::UsernamePassword, "username_password", async move {
			common::require_access_token(self.username_password_token(creds).await?)
		})
		.await
	}

	pub(crate) async fn username_password_token(
		&self,
		creds: UsernamePasswordCredentials,
	) -> Result<Session> {
		let password = creds.password_with_token();
		let token = self
			.request_token(GrantType::UsernamePassword, &creds.domain, [
				("client_id", creds.consumer_key.as_str()),
				("client_secret", creds.consumer_secret.expose()),
				("username", creds.username.as_str()),
				("password", password.as_str()),
			])
			.await?;

		Ok(Session::new(token, Grant::UsernamePassword(creds)))
	}
}
