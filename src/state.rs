use serde::Serialize;

/// Lifecycle phase of one account session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Created, initial activation not yet attempted or resolved.
    Starting,
    /// Last activation and tick succeeded.
    Active,
    /// A remote call failed; the next tick re-attempts activation.
    Degraded,
    /// Shutdown completed. Terminal.
    Stopped,
}

/// Mutable per-account session state.
///
/// Owned exclusively by one `AccountSession`; never shared across accounts
/// and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub phase: SessionPhase,
    /// Ticks attempted so far, counted at the start of each tick.
    pub uptime_ticks: u64,
    /// Last known successful toggle-to-ON. Cleared on any tick failure so the
    /// next tick re-attempts activation before its heartbeat.
    pub device_active: bool,
    /// Ticks that completed all three calls.
    pub cycle_count: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Starting,
            uptime_ticks: 0,
            device_active: false,
            cycle_count: 0,
        }
    }

    /// Record the outcome of an activation (toggle ON) call.
    pub fn record_activation(&mut self, success: bool) {
        if success {
            self.device_active = true;
            self.phase = SessionPhase::Active;
        } else {
            self.device_active = false;
            self.phase = SessionPhase::Degraded;
        }
    }

    /// Count a tick before its remote calls run.
    pub fn begin_tick(&mut self) {
        self.uptime_ticks += 1;
    }

    /// Record a remote-call failure within a tick.
    pub fn record_tick_failure(&mut self) {
        self.device_active = false;
        self.phase = SessionPhase::Degraded;
    }

    /// Record a tick that completed every call.
    pub fn record_tick_success(&mut self) {
        self.cycle_count += 1;
        self.phase = SessionPhase::Active;
    }

    /// Terminal transition at shutdown.
    pub fn enter_stopped(&mut self) {
        self.phase = SessionPhase::Stopped;
    }

    /// Estimated earnings accrued this session, for display only:
    /// `uptime_ticks × active_rate_per_minute`.
    pub fn estimated_session_earnings(&self, active_rate_per_minute: f64) -> f64 {
        self.uptime_ticks as f64 * active_rate_per_minute
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_starting() {
        let state = SessionState::new();
        assert_eq!(state.phase, SessionPhase::Starting);
        assert_eq!(state.uptime_ticks, 0);
        assert!(!state.device_active);
        assert_eq!(state.cycle_count, 0);
    }

    #[test]
    fn activation_success_activates() {
        let mut state = SessionState::new();
        state.record_activation(true);
        assert_eq!(state.phase, SessionPhase::Active);
        assert!(state.device_active);
    }

    #[test]
    fn failed_then_successful_activation() {
        // Starting → Degraded → Active
        let mut state = SessionState::new();
        state.record_activation(false);
        assert_eq!(state.phase, SessionPhase::Degraded);
        assert!(!state.device_active);

        state.record_activation(true);
        assert_eq!(state.phase, SessionPhase::Active);
        assert!(state.device_active);
    }

    #[test]
    fn tick_failure_degrades_and_clears_device() {
        let mut state = SessionState::new();
        state.record_activation(true);
        state.begin_tick();
        state.record_tick_failure();
        assert_eq!(state.phase, SessionPhase::Degraded);
        assert!(!state.device_active);
        assert_eq!(state.uptime_ticks, 1);
        assert_eq!(state.cycle_count, 0);
    }

    #[test]
    fn successful_tick_counts_cycle() {
        let mut state = SessionState::new();
        state.record_activation(true);
        state.begin_tick();
        state.record_tick_success();
        assert_eq!(state.phase, SessionPhase::Active);
        assert_eq!(state.cycle_count, 1);
    }

    #[test]
    fn recovery_after_degraded_tick() {
        // Degraded → Active once a later tick re-activates.
        let mut state = SessionState::new();
        state.record_activation(true);
        state.begin_tick();
        state.record_tick_failure();

        state.begin_tick();
        state.record_activation(true);
        state.record_tick_success();
        assert_eq!(state.phase, SessionPhase::Active);
        assert!(state.device_active);
        assert_eq!(state.uptime_ticks, 2);
        assert_eq!(state.cycle_count, 1);
    }

    #[test]
    fn stopped_is_recorded() {
        let mut state = SessionState::new();
        state.record_activation(true);
        state.enter_stopped();
        assert_eq!(state.phase, SessionPhase::Stopped);
    }

    #[test]
    fn estimated_earnings() {
        let mut state = SessionState::new();
        for _ in 0..10 {
            state.begin_tick();
        }
        assert_eq!(state.estimated_session_earnings(0.5), 5.0);
    }

    #[test]
    fn estimated_earnings_zero_ticks() {
        let state = SessionState::new();
        assert_eq!(state.estimated_session_earnings(0.5), 0.0);
    }
}
