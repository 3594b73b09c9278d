use serde::Serialize;

use crate::api::WalletDetails;
use crate::state::SessionPhase;

/// One tick's outcome, emitted as a JSON line.
#[derive(Debug, Serialize)]
pub struct TickReport {
    pub timestamp: String,
    pub wallet_short_id: String,
    pub phase: SessionPhase,
    pub uptime_ticks: u64,
    pub device_active: bool,
    /// `uptime_ticks × active_rate_per_minute`, present when details were fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_session_earnings: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<WalletDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Final per-account summary printed at shutdown.
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub wallet_short_id: String,
    pub phase: SessionPhase,
    pub uptime_ticks: u64,
    pub completed_cycles: u64,
    pub deactivated: bool,
}

/// Emit a tick report as a single JSON line to stdout.
pub fn report_tick(report: &TickReport) {
    if let Ok(json) = serde_json::to_string(report) {
        println!("{json}");
    }
}

/// Emit the shutdown summaries as pretty-printed JSON to stdout.
pub fn report_summaries(summaries: &[SessionSummary]) {
    if let Ok(json) = serde_json::to_string_pretty(summaries) {
        println!("{json}");
    }
}
