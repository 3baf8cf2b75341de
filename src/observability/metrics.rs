//! Metrics collection.
//!
//! # Metrics
//! - `txkit_builds_total` (counter): built transactions by framework, tx type
//! - `txkit_broadcasts_total` (counter): broadcasts by framework, outcome
//! - `txkit_rpc_duration_seconds` (histogram): node call latency by method
//!
//! Recording goes through the `metrics` facade; without an installed
//! recorder every call is a no-op.

use std::time::Duration;

use crate::types::{Framework, TxBroadcastResult, TxType};

/// Record a successful `build_tx`.
pub fn record_build(framework: Framework, tx_type: TxType) {
    metrics::counter!(
        "txkit_builds_total",
        "framework" => framework.as_str(),
        "tx_type" => tx_type.as_str()
    )
    .increment(1);
}

/// Record a broadcast that reached the node.
pub fn record_broadcast(framework: Framework, result: &TxBroadcastResult) {
    let outcome = if result.is_accepted() { "accepted" } else { "rejected" };
    metrics::counter!(
        "txkit_broadcasts_total",
        "framework" => framework.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record the wall time of one node call.
pub fn record_rpc_duration(method: &'static str, elapsed: Duration) {
    metrics::histogram!("txkit_rpc_duration_seconds", "method" => method)
        .record(elapsed.as_secs_f64());
}
