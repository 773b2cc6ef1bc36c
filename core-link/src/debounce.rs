//! User-edit debouncer.
//!
//! Holds the "listener is editing the queue" flag. Each arm hands out a
//! ticket for the timer that will clear it; re-arming supersedes earlier
//! tickets, so only the latest timer ends suppression. The timer itself is
//! scheduled by whoever owns the runtime.

use std::time::Duration;

/// Identifies one armed suppression window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SuppressionTicket(u64);

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    generation: u64,
    suppressed: bool,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: 0,
            suppressed: false,
        }
    }

    /// Quiescence period a timer should wait before expiring its ticket.
    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Start or restart the suppression window.
    pub fn arm(&mut self) -> SuppressionTicket {
        self.generation = self.generation.wrapping_add(1);
        self.suppressed = true;
        SuppressionTicket(self.generation)
    }

    /// Timer for `ticket` elapsed. Returns `true` if this ended suppression.
    pub fn expire(&mut self, ticket: SuppressionTicket) -> bool {
        if !self.suppressed || ticket.0 != self.generation {
            return false;
        }
        self.suppressed = false;
        true
    }

    /// Drop suppression immediately, invalidating outstanding tickets.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.suppressed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_then_expire() {
        let mut debouncer = Debouncer::new(Duration::from_millis(250));
        assert!(!debouncer.is_suppressed());

        let ticket = debouncer.arm();
        assert!(debouncer.is_suppressed());
        assert!(debouncer.expire(ticket));
        assert!(!debouncer.is_suppressed());

        // Second expiry of the same ticket is a no-op
        assert!(!debouncer.expire(ticket));
    }

    #[test]
    fn test_rearm_supersedes_previous_ticket() {
        let mut debouncer = Debouncer::new(Duration::from_millis(250));
        let first = debouncer.arm();
        let second = debouncer.arm();
        assert_ne!(first, second);

        assert!(!debouncer.expire(first));
        assert!(debouncer.is_suppressed());
        assert!(debouncer.expire(second));
    }

    #[test]
    fn test_reset_invalidates_tickets() {
        let mut debouncer = Debouncer::new(Duration::from_millis(250));
        let ticket = debouncer.arm();
        debouncer.reset();
        assert!(!debouncer.is_suppressed());

        let fresh = debouncer.arm();
        assert!(!debouncer.expire(ticket));
        assert!(debouncer.expire(fresh));
    }
}
