// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"sforce_broker_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records one fetched query page via the global metrics recorder (when enabled).
pub fn record_query_page(records: usize, done: bool) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("sforce_broker_query_pages_total").increment(1);
	}
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(records, done, "fetched query page");
	}

	#[cfg(not(any(feature = "metrics", feature = "tracing")))]
	{
		let _ = (records, done);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_features() {
		record_flow_outcome(FlowKind::Query, FlowOutcome::Failure);
		record_query_page(2, false);
	}
}
