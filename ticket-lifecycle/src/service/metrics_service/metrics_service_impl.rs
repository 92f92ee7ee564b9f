use super::{MetricsService, Operation, Outcome};
use crate::domain::TicketState;
use std::time::Duration;

const OUTCOMES_TOTAL: &str = "ticket_lifecycle_outcomes_total";
const DURATION_SECONDS: &str = "ticket_lifecycle_duration_seconds";
const AMOUNT_DISCREPANCIES_TOTAL: &str = "ticket_lifecycle_amount_discrepancies_total";

const NO_STATE: &str = "none";

///
/// Forwards measurements to the `metrics` facade.
/// Measurements are dropped until a recorder is installed.
///
pub struct MetricsServiceImpl;

impl MetricsService for MetricsServiceImpl {
    fn record_outcome(&self, operation: Operation, outcome: Outcome, state: Option<TicketState>) {
        let operation: &'static str = operation.into();
        let outcome: &'static str = outcome.into();
        let state: &'static str = state.map(Into::into).unwrap_or(NO_STATE);

        metrics::counter!(
            OUTCOMES_TOTAL,
            "operation" => operation,
            "outcome" => outcome,
            "state" => state
        )
        .increment(1);
    }

    fn record_duration(&self, operation: Operation, duration: Duration) {
        let operation: &'static str = operation.into();

        metrics::histogram!(DURATION_SECONDS, "operation" => operation)
            .record(duration.as_secs_f64());
    }

    fn record_amount_discrepancy(&self, operation: Operation) {
        let operation: &'static str = operation.into();

        metrics::counter!(AMOUNT_DISCREPANCIES_TOTAL, "operation" => operation).increment(1);
    }
}
