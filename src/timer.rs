//! Wall-clock gate for automatic drops.

use std::time::{Duration, Instant};

/// Timeout used until the engine derives one from the level.
pub const INITIAL_TIMEOUT: Duration = Duration::from_millis(550);

/// Pure stopwatch: fires once at least `timeout` has elapsed since the last fire.
#[derive(Debug, Clone)]
pub struct GameTimer {
    timeout: Duration,
    last_fire: Instant,
    ticks: u64,
}

impl GameTimer {
    pub fn new(timeout: Duration) -> Self {
        Self::started_at(timeout, Instant::now())
    }

    pub fn started_at(timeout: Duration, now: Instant) -> Self {
        Self {
            timeout,
            last_fire: now,
            ticks: 0,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Number of times the timer has fired.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Fire if `now - last_fire >= timeout`. Only a fire updates state.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        let fired = now.saturating_duration_since(self.last_fire) >= self.timeout;
        if fired {
            self.ticks += 1;
            self.last_fire = now;
        }
        fired
    }
}

impl Default for GameTimer {
    fn default() -> Self {
        Self::new(INITIAL_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_after_timeout() {
        let t0 = Instant::now();
        let mut timer = GameTimer::started_at(Duration::from_millis(100), t0);
        assert!(!timer.tick_at(t0 + Duration::from_millis(99)));
        assert!(timer.tick_at(t0 + Duration::from_millis(100)));
        assert_eq!(timer.ticks(), 1);
    }

    #[test]
    fn fire_restarts_the_interval() {
        let t0 = Instant::now();
        let mut timer = GameTimer::started_at(Duration::from_millis(50), t0);
        assert!(timer.tick_at(t0 + Duration::from_millis(60)));
        assert!(!timer.tick_at(t0 + Duration::from_millis(100)));
        assert!(timer.tick_at(t0 + Duration::from_millis(110)));
        assert_eq!(timer.ticks(), 2);
    }

    #[test]
    fn timeout_can_be_rewritten() {
        let t0 = Instant::now();
        let mut timer = GameTimer::started_at(INITIAL_TIMEOUT, t0);
        timer.set_timeout(Duration::from_millis(50));
        assert_eq!(timer.timeout(), Duration::from_millis(50));
        assert!(timer.tick_at(t0 + Duration::from_millis(50)));
    }
}
