//! OAuth JWT bearer grant.

// self
use crate::{
	_prelude::*,
	auth::{Grant, GrantType, JwtBearerCredentials, Session, jwt},
	flows::{Broker, common},
	http::{HttpTransport, TransportErrorMapper},
	obs::{self, FlowKind},
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges an RS256-signed assertion for a session.
	///
	/// The assertion is rebuilt on every call (including refreshes) so its `exp` claim is
	/// always `creds.ttl` past the current time. A key that cannot be parsed fails before any
	/// request is sent.
	pub async fn jwt_bearer(&self, creds: JwtBearerCredentials) -> Result<Session> {
		obs::observe(FlowKind::JwtBearer, "jwt_bearer", async move {
			common::require_access_token(self.jwt_bearer_token(creds).await?)
		})
		.await
	}

	pub(crate) async fn jwt_bearer_token(&self, creds: JwtBearerCredentials) -> Result<Session> {
		let assertion = jwt::build_assertion(&creds, OffsetDateTime::now_utc())?;
		let token = self
			.request_token(GrantType::JwtBearer, &creds.domain, [(
				"assertion",
				assertion.as_str(),
			)])
			.await?;

		Ok(Session::new(token, Grant::JwtBearer(creds)))
	}
}
