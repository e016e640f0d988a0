use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of elapsed time since the solve started.
pub trait Clock {
    fn elapsed(&self) -> Duration;
}

pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Clock that only moves when told to, or by `tick` on every reading.
pub struct ManualClock {
    now: Cell<Duration>,
    tick: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::ticking(Duration::ZERO)
    }

    pub fn ticking(tick: Duration) -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            tick,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        let now = self.now.get();
        self.now.set(now + self.tick);
        now
    }
}

/// Point in time after which no new unit of work is started.
pub struct Deadline<'a> {
    clock: &'a dyn Clock,
    budget: Duration,
}

impl<'a> Deadline<'a> {
    pub fn new(clock: &'a dyn Clock, budget: Duration) -> Self {
        Self { clock, budget }
    }

    /// Deadline at `fraction` of a time limit given in minutes. Limits too large for a
    /// `Duration` never expire; negative or NaN limits are already expired.
    pub fn from_time_limit(clock: &'a dyn Clock, time_limit_minutes: f64, fraction: f64) -> Self {
        let seconds = time_limit_minutes * 60.0 * fraction.clamp(0.0, 1.0);
        let budget = if seconds.is_nan() || seconds <= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
        };
        Self::new(clock, budget)
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.clock.elapsed())
    }

    pub fn expired(&self) -> bool {
        self.remaining().is_zero()
    }
}
