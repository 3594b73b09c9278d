pub mod api;
pub mod assign;
pub mod config;
pub mod reporter;
pub mod session;
pub mod state;

/// Meshbeat REST API base URL (bearer-token auth).
pub const API_BASE: &str = "https://api.meshbeat.io/v1";

/// User-agent sent when no user_agents.txt entry is assigned.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/126.0.0.0 Safari/537.36";

/// Domains reported as relay-whitelisted in every heartbeat payload.
/// The service ignores unknown entries; the list is static for the run.
pub const HEARTBEAT_WHITELIST: &[&str] = &["relay.meshbeat.io", "stats.meshbeat.io"];
