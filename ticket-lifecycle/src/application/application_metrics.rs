use super::ApplicationEnv;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

const DURATION_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

///
/// Installs Prometheus recorder with HTTP listener serving `/metrics`.
/// Must be called inside tokio runtime.
///
pub fn setup_metrics(env: &ApplicationEnv) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(env.metrics_bind_address)
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            DURATION_BUCKETS,
        )?
        .install()?;

    metrics::describe_counter!(
        "ticket_lifecycle_outcomes_total",
        "Handled deliveries by operation, outcome and final ticket state"
    );
    metrics::describe_histogram!(
        "ticket_lifecycle_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent handling a delivery"
    );
    metrics::describe_counter!(
        "ticket_lifecycle_amount_discrepancies_total",
        "Payments whose amount differs from the ticket amount"
    );

    tracing::info!(address = %env.metrics_bind_address, "metrics exporter started");

    Ok(())
}
