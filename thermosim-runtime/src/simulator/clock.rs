use std::time::Duration;

use chrono::{NaiveDateTime, Utc};

use crate::RunConfig;

/// Source of reading timestamps.
pub trait Clock {
    /// Advance the clock by one tick and return the new time.
    fn advance(&mut self) -> NaiveDateTime;
}

/// Virtual clock.
///
/// Every tick moves the clock forward by a fixed interval without waiting.
#[derive(Clone, Debug)]
pub struct SimulatedClock {
    current: NaiveDateTime,
    interval: chrono::Duration,
}

impl SimulatedClock {
    /// Construct a virtual clock starting at the current UTC time.
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(Utc::now().naive_utc(), interval)
    }

    /// Construct a virtual clock starting at the given time.
    pub fn starting_at(start: NaiveDateTime, interval: Duration) -> Self {
        let interval = interval.min(crate::consts::MAX_TICK_INTERVAL);

        Self {
            current: start,
            interval: chrono::Duration::milliseconds(interval.as_millis() as i64),
        }
    }

    /// Current time of the clock.
    #[inline]
    pub fn now(&self) -> NaiveDateTime {
        self.current
    }
}

impl Clock for SimulatedClock {
    fn advance(&mut self) -> NaiveDateTime {
        if let Some(next) = self.current.checked_add_signed(self.interval) {
            self.current = next;
        }
        self.current
    }
}

/// Wall clock.
///
/// Every tick blocks the calling thread for the interval, then samples the
/// UTC wall time.
#[derive(Clone, Debug)]
pub struct WallClock {
    interval: Duration,
}

impl WallClock {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Clock for WallClock {
    fn advance(&mut self) -> NaiveDateTime {
        std::thread::sleep(self.interval);
        Utc::now().naive_utc()
    }
}

/// Clock selected by the run mode.
#[derive(Clone, Debug)]
pub enum RunClock {
    Simulated(SimulatedClock),
    Wall(WallClock),
}

impl RunClock {
    pub fn from_config(config: &RunConfig) -> Self {
        if config.simulate {
            Self::Simulated(SimulatedClock::new(config.tick_interval()))
        } else {
            Self::Wall(WallClock::new(config.tick_interval()))
        }
    }
}

impl Clock for RunClock {
    fn advance(&mut self) -> NaiveDateTime {
        match self {
            Self::Simulated(clock) => clock.advance(),
            Self::Wall(clock) => clock.advance(),
        }
    }
}
