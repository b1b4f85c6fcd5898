//! Cooperative periodic timer backing Run mode.
//!
//! A `Ticker` never spawns anything: the owner polls it with the current time and performs
//! one step per elapsed tick. Dropping the ticker cancels it.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    /// Starts a ticker whose first tick fires one `interval` after `now`.
    pub fn start(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now + interval,
        }
    }

    /// Returns true if a tick is due at `now` and schedules the following one.
    ///
    /// Missed ticks are not replayed: at most one tick fires per poll.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next = now + self.interval;
        true
    }

    /// Time left until the next tick is due.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_fires_after_interval() {
        let start = Instant::now();
        let mut ticker = Ticker::start(Duration::from_millis(100), start);

        assert!(!ticker.poll(start));
        assert!(!ticker.poll(start + Duration::from_millis(99)));
        assert!(ticker.poll(start + Duration::from_millis(100)));
        assert!(!ticker.poll(start + Duration::from_millis(150)));
        assert!(ticker.poll(start + Duration::from_millis(200)));
    }

    #[test]
    fn test_missed_ticks_collapse_into_one() {
        let start = Instant::now();
        let mut ticker = Ticker::start(Duration::from_millis(10), start);

        let late = start + Duration::from_secs(1);
        assert!(ticker.poll(late));
        assert!(!ticker.poll(late));
        assert_eq!(ticker.remaining(late), Duration::from_millis(10));
    }

    #[test]
    fn test_remaining_saturates() {
        let start = Instant::now();
        let ticker = Ticker::start(Duration::from_millis(5), start);
        assert_eq!(ticker.remaining(start + Duration::from_secs(1)), Duration::ZERO);
        assert_eq!(ticker.interval(), Duration::from_millis(5));
    }
}
