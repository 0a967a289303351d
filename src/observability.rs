use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: transactions run. Labels: op, outcome (committed | collision | invalid_input).
pub const TRANSACTIONS_TOTAL: &str = "slotcal_transactions_total";

/// Histogram: transaction latency in seconds, lock wait included. Labels: op.
pub const TRANSACTION_DURATION_SECONDS: &str = "slotcal_transaction_duration_seconds";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: calendar partitions held in memory.
pub const PARTITIONS: &str = "slotcal_partitions";

/// Histogram: snapshot encode + write duration in seconds.
pub const SNAPSHOT_DURATION_SECONDS: &str = "slotcal_snapshot_duration_seconds";

/// Gauge: size of the last snapshot written.
pub const SNAPSHOT_BYTES: &str = "slotcal_snapshot_bytes";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), metrics_exporter_prometheus::BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}
