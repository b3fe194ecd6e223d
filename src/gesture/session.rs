//! [`GestureSession`] and the poll gate.

/// Why a poll tick did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Role does not own capture, or polling is disabled.
    RoleExcluded,
    /// Interaction is not idle (submitting, loading or showing a result).
    NotIdle,
    SourceNotReady,
    InFlight,
    /// A trigger was accepted and no reset has cleared it yet.
    TriggerPending,
}

/// Facts about the viewport the gate needs at tick time.
#[derive(Debug, Clone, Copy)]
pub struct PollContext {
    pub role_allows: bool,
    pub idle: bool,
    pub source_ready: bool,
}

/// Process-local debounce state for the gesture poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GestureSession {
    in_flight: bool,
    trigger_accepted: bool,
}

impl GestureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn trigger_accepted(&self) -> bool {
        self.trigger_accepted
    }

    /// Decide whether a tick may issue a poll.
    ///
    /// ```
    /// use kiosk_greeter::gesture::{GestureSession, PollContext, SkipReason};
    ///
    /// let mut session = GestureSession::new();
    /// let ctx = PollContext { role_allows: true, idle: true, source_ready: true };
    /// assert_eq!(session.check(ctx), Ok(()));
    ///
    /// session.begin_poll();
    /// assert_eq!(session.check(ctx), Err(SkipReason::InFlight));
    /// ```
    pub fn check(&self, ctx: PollContext) -> Result<(), SkipReason> {
        if !ctx.role_allows {
            return Err(SkipReason::RoleExcluded);
        }
        if !ctx.idle {
            return Err(SkipReason::NotIdle);
        }
        if self.trigger_accepted {
            return Err(SkipReason::TriggerPending);
        }
        if self.in_flight {
            return Err(SkipReason::InFlight);
        }
        if !ctx.source_ready {
            return Err(SkipReason::SourceNotReady);
        }
        Ok(())
    }

    pub fn begin_poll(&mut self) {
        self.in_flight = true;
    }

    /// Record a finished poll.
    ///
    /// Returns `true` exactly once per session: for the first positive
    /// detection that arrives while the viewport is still idle.
    pub fn finish_poll(&mut self, detected: bool, still_idle: bool) -> bool {
        self.in_flight = false;
        if detected && still_idle && !self.trigger_accepted {
            self.trigger_accepted = true;
            return true;
        }
        false
    }

    /// Accept a new trigger without forgetting an outstanding poll.
    pub fn rearm(&mut self) {
        self.trigger_accepted = false;
    }

    /// Clear both flags.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const READY: PollContext = PollContext {
        role_allows: true,
        idle: true,
        source_ready: true,
    };

    #[test]
    fn fresh_session_allows_poll() {
        assert_eq!(GestureSession::new().check(READY), Ok(()));
    }

    #[test]
    fn role_and_state_gates() {
        let s = GestureSession::new();
        assert_eq!(
            s.check(PollContext { role_allows: false, ..READY }),
            Err(SkipReason::RoleExcluded)
        );
        assert_eq!(
            s.check(PollContext { idle: false, ..READY }),
            Err(SkipReason::NotIdle)
        );
        assert_eq!(
            s.check(PollContext { source_ready: false, ..READY }),
            Err(SkipReason::SourceNotReady)
        );
    }

    #[test]
    fn in_flight_blocks_second_poll() {
        let mut s = GestureSession::new();
        s.begin_poll();
        assert_eq!(s.check(READY), Err(SkipReason::InFlight));

        assert!(!s.finish_poll(false, true));
        assert_eq!(s.check(READY), Ok(()));
    }

    #[test]
    fn positive_detection_triggers_once() {
        let mut s = GestureSession::new();
        s.begin_poll();
        assert!(s.finish_poll(true, true));
        assert!(s.trigger_accepted());
        assert_eq!(s.check(READY), Err(SkipReason::TriggerPending));

        // a late duplicate positive never triggers again
        assert!(!s.finish_poll(true, true));
    }

    #[test]
    fn positive_detection_after_leaving_idle_is_ignored() {
        let mut s = GestureSession::new();
        s.begin_poll();
        assert!(!s.finish_poll(true, false));
        assert!(!s.trigger_accepted());
        assert!(!s.in_flight());
    }

    #[test]
    fn rearm_keeps_outstanding_poll() {
        let mut s = GestureSession::new();
        s.begin_poll();
        s.finish_poll(true, true);
        s.begin_poll();
        s.rearm();

        assert!(!s.trigger_accepted());
        assert!(s.in_flight());
        assert_eq!(s.check(READY), Err(SkipReason::InFlight));
    }

    #[test]
    fn reset_rearms() {
        let mut s = GestureSession::new();
        s.begin_poll();
        s.finish_poll(true, true);
        s.reset();
        assert_eq!(s, GestureSession::default());
        assert_eq!(s.check(READY), Ok(()));
    }
}
