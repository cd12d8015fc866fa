//! Optional observability helpers for broker flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `sforce_broker.flow` with the `flow`
//!   and `stage` (call site) fields, plus a `debug` event for every fetched query page.
//! - Enable `metrics` to increment the `sforce_broker_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`, and the
//!   `sforce_broker_query_pages_total` counter for every fetched page.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, auth::GrantType};

/// Broker operations observed by spans and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Username/password grant.
	UsernamePassword,
	/// Client credentials grant.
	ClientCredentials,
	/// JWT bearer grant.
	JwtBearer,
	/// Direct access token injection.
	AccessToken,
	/// Session refresh.
	Refresh,
	/// Paginated query.
	Query,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::UsernamePassword => "username_password",
			FlowKind::ClientCredentials => "client_credentials",
			FlowKind::JwtBearer => "jwt_bearer",
			FlowKind::AccessToken => "access_token",
			FlowKind::Refresh => "refresh",
			FlowKind::Query => "query",
		}
	}
}
impl From<GrantType> for FlowKind {
	fn from(grant: GrantType) -> Self {
		match grant {
			GrantType::UsernamePassword => FlowKind::UsernamePassword,
			GrantType::ClientCredentials => FlowKind::ClientCredentials,
			GrantType::JwtBearer => FlowKind::JwtBearer,
			GrantType::None => FlowKind::AccessToken,
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a broker helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a flow span, recording attempt and outcome.
pub(crate) async fn observe<T, Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);

	record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_flow_outcome(kind, FlowOutcome::Success),
		Err(_) => record_flow_outcome(kind, FlowOutcome::Failure),
	}

	result
}
