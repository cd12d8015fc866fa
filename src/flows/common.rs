//! Shared helpers for grant flows: token endpoint exchange and grant dispatch.

// std
use std::iter;
// self
use crate::{
	_prelude::*,
	auth::{Grant, GrantType, Session, TokenResponse},
	config::Domain,
	error::{AuthError, RefreshError},
	flows::Broker,
	http::{self, HttpTransport, TransportErrorMapper},
	obs::FlowKind,
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Replays `grant` against its flow, returning the raw session even when the token is
	/// empty so callers can classify that case themselves.
	pub(crate) async fn mint(&self, grant: Grant) -> Result<Session> {
		match grant {
			Grant::UsernamePassword(creds) => self.username_password_token(creds).await,
			Grant::ClientCredentials(creds) => self.client_credentials_token(creds).await,
			Grant::JwtBearer(creds) => self.jwt_bearer_token(creds).await,
			Grant::None => Err(RefreshError::NoGrantType.into()),
		}
	}

	/// Posts `grant`'s form to the domain's token endpoint and parses the token document.
	///
	/// The `grant_type` field is derived from `grant` and prepended to `form`.
	pub(crate) async fn request_token<'a>(
		&self,
		grant: GrantType,
		domain: &Domain,
		form: impl IntoIterator<Item = (&'a str, &'a str)>,
	) -> Result<TokenResponse> {
		let grant_type = grant.oauth_grant_type().ok_or(RefreshError::NoGrantType)?;
		let request = http::form_post(
			&domain.token_url(),
			iter::once(("grant_type", grant_type)).chain(form),
		)?;
		let response = http::execute(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			FlowKind::from(grant),
			request,
		)
		.await?;
		let status = response.status().as_u16();

		if !response.status().is_success() {
			return Err(AuthError::TokenEndpoint { status, body: http::body_text(&response) }.into());
		}

		let mut de = serde_json::Deserializer::from_slice(response.body());

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| AuthError::TokenResponseParse { source, status }.into())
	}
}

/// Rejects sessions minted without an access token.
pub(crate) fn require_access_token(session: Session) -> Result<Session> {
	if session.access_token.is_empty() {
		return Err(AuthError::MissingAccessToken.into());
	}

	Ok(session)
}
