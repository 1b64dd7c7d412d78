//! Time management for the simulation
//!
//! The simulation operates in whole days counted from the disaster event.
//! Time only moves forward, and only when the scheduling environment fires
//! the next pending timer.

use serde::{Deserialize, Serialize};

/// Logical simulation time in days since the disaster event
pub type SimTime = usize;

/// Monotonic simulation clock
///
/// # Example
/// ```
/// use rebuild_funding_core::SimClock;
///
/// let mut clock = SimClock::new();
/// assert_eq!(clock.now(), 0);
///
/// clock.advance_to(30);
/// assert_eq!(clock.now(), 30);
/// assert_eq!(clock.elapsed_since(10), 20);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    /// Days elapsed since the disaster event
    now: SimTime,
}

impl SimClock {
    /// Create a clock positioned at the disaster event (day 0)
    pub fn new() -> Self {
        Self { now: 0 }
    }

    /// Current simulation day
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Move the clock to `time`
    ///
    /// # Panics
    /// Panics if `time` is earlier than the current day. The event queue is
    /// ordered, so this only fires on a scheduler bug.
    ///
    /// # Example
    /// ```
    /// use rebuild_funding_core::SimClock;
    ///
    /// let mut clock = SimClock::new();
    /// clock.advance_to(5);
    /// clock.advance_to(5); // staying put is allowed
    /// assert_eq!(clock.now(), 5);
    /// ```
    pub fn advance_to(&mut self, time: SimTime) {
        assert!(
            time >= self.now,
            "simulation time cannot move backwards (now {}, requested {})",
            self.now,
            time
        );
        self.now = time;
    }

    /// Days elapsed between `start` and now (saturating at zero)
    pub fn elapsed_since(&self, start: SimTime) -> SimTime {
        self.now.saturating_sub(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "simulation time cannot move backwards")]
    fn test_clock_rejects_backwards_move() {
        let mut clock = SimClock::new();
        clock.advance_to(10);
        clock.advance_to(9);
    }

    #[test]
    fn test_elapsed_since_future_start_is_zero() {
        let clock = SimClock::new();
        assert_eq!(clock.elapsed_since(7), 0);
    }
}
