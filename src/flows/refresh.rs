//! Session refresh by replaying the grant that minted the session.
//!
//! Salesforce sessions minted through the username/password, client credentials, or JWT
//! bearer grants carry no refresh token. Instead the session remembers its grant and the
//! credentials that went with it, and [`Broker::refresh_session`] simply runs the same flow
//! again. Sessions injected through [`Broker::set_access_token`] have no grant and are
//! terminal once they expire.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::Session,
	error::RefreshError,
	flows::Broker,
	http::{HttpTransport, TransportErrorMapper},
	obs::{self, FlowKind},
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Mints a replacement for `session` using the grant and credentials it was created with.
	///
	/// # Errors
	///
	/// - [`RefreshError::NoGrantType`] when the session was injected from a raw access token;
	///   no request is sent.
	/// - Whatever the underlying flow returns (token endpoint rejections, transport errors).
	/// - [`RefreshError::EmptyAccessToken`] when the token endpoint answers with success but
	///   without an access token.
	pub async fn refresh_session(&self, session: &Session) -> Result<Session> {
		obs::observe(FlowKind::Refresh, "refresh_session", async move {
			self.refresh_metrics.record_attempt();

			let grant_type = session.grant_type();

			if !grant_type.is_refreshable() {
				self.refresh_metrics.record_unrefreshable();

				return Err(RefreshError::NoGrantType.into());
			}

			let refreshed = self.mint(session.grant().clone()).await.inspect_err(|_| {
				self.refresh_metrics.record_failure();
			})?;

			if refreshed.access_token.is_empty() {
				self.refresh_metrics.record_failure();

				return Err(RefreshError::EmptyAccessToken.into());
			}

			self.refresh_metrics.record_success();

			Ok(refreshed)
		})
		.await
	}

	/// Refreshes `session` and replaces it on success; on failure it is left untouched.
	pub async fn refresh_in_place(&self, session: &mut Session) -> Result<()> {
		*session = self.refresh_session(session).await?;

		Ok(())
	}
}
