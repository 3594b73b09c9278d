//! keeper — multi-account Meshbeat heartbeat keeper.
//!
//! Loads accounts.json, optionally pairs each account with a proxy and
//! user-agent, and runs one independent heartbeat session per account until
//! Ctrl+C. Tick reports go to stdout as JSON lines; logs go to stderr.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{info, warn};

use meshbeat_keeper::api::ApiClient;
use meshbeat_keeper::assign;
use meshbeat_keeper::config::{
    self, ACCOUNTS_PATH, AppConfig, CONFIG_PATH, PROXIES_PATH, USER_AGENTS_PATH,
};
use meshbeat_keeper::reporter;
use meshbeat_keeper::session::AccountSession;
use meshbeat_keeper::{API_BASE, DEFAULT_USER_AGENT};

/// How long shutdown waits for the sessions' best-effort deactivations.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "keeper", about = "Multi-account Meshbeat heartbeat keeper")]
struct Args {
    /// Accounts file: JSON array of {walletAddress, token, deviceId}
    #[arg(long, default_value = ACCOUNTS_PATH)]
    accounts: PathBuf,

    /// Proxy list, one connection string per line
    #[arg(long, default_value = PROXIES_PATH)]
    proxies: PathBuf,

    /// User-agent list, one per line
    #[arg(long, default_value = USER_AGENTS_PATH)]
    user_agents: PathBuf,

    /// Settings file (TOML)
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Heartbeat interval override in seconds
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Enable proxy usage without prompting
    #[arg(long, conflicts_with = "no_proxy")]
    proxy: bool,

    /// Disable proxy usage without prompting
    #[arg(long, conflicts_with = "proxy")]
    no_proxy: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let app_config = AppConfig::load(&args.config)?;
    let accounts = config::load_accounts(&args.accounts)?;
    if accounts.is_empty() {
        info!("No accounts configured in {} — nothing to do", args.accounts.display());
        return Ok(());
    }
    info!("Loaded {} account(s) from {}", accounts.len(), args.accounts.display());

    let use_proxies = if args.proxy {
        true
    } else if args.no_proxy {
        false
    } else {
        prompt_use_proxies()?
    };

    let proxies = if use_proxies {
        let list = config::load_line_list(&args.proxies);
        if list.is_empty() {
            warn!("Proxy usage enabled but no proxies loaded — running direct");
        } else {
            info!("Loaded {} prox(ies)", list.len());
        }
        list
    } else {
        Vec::new()
    };
    let user_agents = config::load_line_list(&args.user_agents);

    let interval_secs = args
        .interval_secs
        .unwrap_or(app_config.settings.heartbeat_interval_secs);
    let interval = Duration::from_secs(interval_secs);
    let timeout = Duration::from_secs(app_config.settings.request_timeout_secs);
    let api_base = app_config.settings.api_base.as_deref().unwrap_or(API_BASE);

    info!("Heartbeat interval: {interval_secs}s, API base: {api_base}");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut sessions: JoinSet<reporter::SessionSummary> = JoinSet::new();

    for (i, account) in accounts.into_iter().enumerate() {
        let assignment = assign::assign(&proxies, &user_agents, i);
        let user_agent = assignment.user_agent.unwrap_or(DEFAULT_USER_AGENT);
        let short_id = account.short_id().to_string();

        let client = match ApiClient::new(api_base, &account.token, assignment.proxy, user_agent, timeout)
        {
            Ok(client) => client,
            Err(e) => {
                warn!("[{short_id}] Skipping account, could not build client: {e:#}");
                continue;
            }
        };

        info!(
            "[{short_id}] Session scheduled (proxy: {})",
            assignment.proxy.unwrap_or("none"),
        );
        sessions.spawn(AccountSession::new(account, client).run(interval, shutdown_rx.clone()));
    }
    drop(shutdown_rx);

    if sessions.is_empty() {
        anyhow::bail!("no account session could be started");
    }

    info!("{} session(s) running. Press Ctrl+C to stop.", sessions.len());
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown signal received, deactivating devices...");
    let _ = shutdown_tx.send(true);

    let mut summaries = Vec::new();
    let graceful = tokio::time::timeout(SHUTDOWN_GRACE, async {
        while let Some(joined) = sessions.join_next().await {
            match joined {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!("Session task failed: {e}"),
            }
        }
    })
    .await;
    if graceful.is_err() {
        warn!(
            "Grace period ({}s) elapsed with sessions still shutting down",
            SHUTDOWN_GRACE.as_secs()
        );
        sessions.abort_all();
    }

    reporter::report_summaries(&summaries);
    info!("Shutdown complete");
    Ok(())
}

/// Interactive y/N prompt for proxy usage, skipped by --proxy / --no-proxy.
fn prompt_use_proxies() -> Result<bool> {
    eprint!("Enable proxy usage? [y/N]: ");
    std::io::stderr().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read proxy prompt response")?;
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
