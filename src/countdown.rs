use std::time::Duration;

use crate::util::percent_of;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// No countdown is running.
    Stopped,
    /// A freeze swallowed the tick.
    Frozen,
    Ticked {
        time_left: f64,
        percent: f64,
        expired: bool,
    },
}

/// Per-question countdown measured in ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    duration: f64,
    time_left: f64,
    running: bool,
    frozen: bool,
}

impl Countdown {
    pub fn new(duration: u32) -> Self {
        Self {
            duration: duration.max(1) as f64,
            time_left: duration.max(1) as f64,
            running: false,
            frozen: false,
        }
    }

    pub fn start(&mut self) {
        self.time_left = self.duration;
        self.running = true;
        self.frozen = false;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.frozen = false;
    }

    /// Suppress ticks until the next `start`. Returns false if already frozen or stopped.
    pub fn freeze(&mut self) -> bool {
        if !self.running || self.frozen {
            return false;
        }
        self.frozen = true;
        true
    }

    pub fn tick(&mut self, multiplier: f64) -> TickOutcome {
        if !self.running {
            return TickOutcome::Stopped;
        }
        if self.frozen {
            return TickOutcome::Frozen;
        }

        self.time_left = (self.time_left - multiplier).max(0.0);
        let expired = self.time_left <= 0.0;
        if expired {
            self.running = false;
        }

        TickOutcome::Ticked {
            time_left: self.time_left,
            percent: self.percent(),
            expired,
        }
    }

    pub fn time_left(&self) -> f64 {
        self.time_left
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn percent(&self) -> f64 {
        percent_of(self.time_left, self.duration)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

/// Turns arbitrary elapsed wall time into a whole number of fixed-length ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct Cadence {
    interval: Duration,
    accumulated: Duration,
}

impl Cadence {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            accumulated: Duration::ZERO,
        }
    }

    /// Add `elapsed` and return how many full intervals are now due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed;
        let mut due = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            due += 1;
        }
        due
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}
