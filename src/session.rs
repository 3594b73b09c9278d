use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::api::{RemoteApi, WalletDetails};
use crate::config::Account;
use crate::reporter::{self, SessionSummary, TickReport};
use crate::state::SessionState;

/// Drives one account through its polling lifecycle, independently of all
/// other accounts.
///
/// The session owns its state exclusively; a remote failure here can never
/// stop or corrupt another account's loop. Recovery is deliberately naive:
/// every tick after a failure re-attempts activation once, with no backoff,
/// retry limit, or circuit breaker.
pub struct AccountSession<A> {
    account: Account,
    api: A,
    whitelist: &'static [&'static str],
    state: SessionState,
}

impl<A: RemoteApi> AccountSession<A> {
    pub fn new(account: Account, api: A) -> Self {
        Self {
            account,
            api,
            whitelist: crate::HEARTBEAT_WHITELIST,
            state: SessionState::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Initial activation plus one immediate heartbeat/details poll.
    ///
    /// A failed activation leaves the session Degraded; ticks are still
    /// scheduled and the next one re-attempts activation.
    pub async fn start(&mut self) {
        let short_id = self.account.short_id().to_string();
        info!("[{short_id}] Starting session (device {})", self.account.device_id);
        match self
            .api
            .toggle_device(&self.account.wallet_address, &self.account.device_id, true)
            .await
        {
            Ok(()) => {
                self.state.record_activation(true);
                info!("[{short_id}] Device activated");
            }
            Err(e) => {
                self.state.record_activation(false);
                warn!("[{short_id}] Initial activation failed: {e:#}");
            }
        }
        self.tick().await;
    }

    /// One periodic cycle: re-activate if needed, heartbeat, poll details.
    ///
    /// Failures are reported and mark the session Degraded; they never abort
    /// the schedule or cross the tick boundary.
    pub async fn tick(&mut self) {
        self.state.begin_tick();

        let (details, error) = match self.tick_calls().await {
            Ok(details) => {
                self.state.record_tick_success();
                (Some(details), None)
            }
            Err(e) => {
                self.state.record_tick_failure();
                warn!("[{}] Tick failed: {e:#}", self.account.short_id());
                (None, Some(format!("{e:#}")))
            }
        };

        let estimated = details
            .as_ref()
            .map(|d| self.state.estimated_session_earnings(d.active_rate_per_minute));

        reporter::report_tick(&TickReport {
            timestamp: chrono::Utc::now().to_rfc3339(),
            wallet_short_id: self.account.short_id().to_string(),
            phase: self.state.phase,
            uptime_ticks: self.state.uptime_ticks,
            device_active: self.state.device_active,
            estimated_session_earnings: estimated,
            details,
            error,
        });
    }

    /// The tick's three sequential remote calls: activation (when needed),
    /// heartbeat, details.
    async fn tick_calls(&mut self) -> Result<WalletDetails> {
        if !self.state.device_active {
            self.api
                .toggle_device(&self.account.wallet_address, &self.account.device_id, true)
                .await
                .context("activation")?;
            self.state.record_activation(true);
            info!("[{}] Device re-activated", self.account.short_id());
        }

        self.api
            .send_heartbeat(
                &self.account.wallet_address,
                &self.account.device_id,
                self.state.device_active,
                self.whitelist,
            )
            .await
            .context("heartbeat")?;

        self.api
            .fetch_details(&self.account.wallet_address)
            .await
            .context("details")
    }

    /// Best-effort deactivation (device OFF), then the terminal transition.
    ///
    /// The OFF call is issued exactly once; a failure is logged, never
    /// retried, and never blocks shutdown. Returns whether the call succeeded.
    pub async fn shutdown(&mut self) -> bool {
        let short_id = self.account.short_id().to_string();
        info!("[{short_id}] Stopping session, toggling device OFF");
        let deactivated = match self
            .api
            .toggle_device(&self.account.wallet_address, &self.account.device_id, false)
            .await
        {
            Ok(()) => {
                info!("[{short_id}] Device deactivated");
                true
            }
            Err(e) => {
                warn!("[{short_id}] Deactivation failed: {e:#}");
                false
            }
        };
        self.state.enter_stopped();
        deactivated
    }

    /// Full lifecycle: start, serialized periodic ticks, shutdown on signal.
    ///
    /// Ticks for one account never overlap: the next timer fire is not polled
    /// until the previous tick's calls finish, and a missed fire is delayed
    /// rather than bursted.
    pub async fn run(
        mut self,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> SessionSummary {
        self.start().await;

        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first fire completes immediately; start() already polled once.
        timer.tick().await;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = timer.tick() => {
                    self.tick().await;
                }
            }
        }

        let deactivated = self.shutdown().await;
        SessionSummary {
            wallet_short_id: self.account.short_id().to_string(),
            phase: self.state.phase,
            uptime_ticks: self.state.uptime_ticks,
            completed_cycles: self.state.cycle_count,
            deactivated,
        }
    }
}
