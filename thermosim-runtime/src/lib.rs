// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

/// The `thermosim` library provides the runtime for the sensor temperature simulator.
///
/// The `core` module holds the data model: sensors, temperatures and readings. The
/// `simulator` module contains the reading generator, a stateful random walk with a
/// recurring ramp phase, and the clocks that drive it. The `sink` module writes readings
/// as newline delimited JSON, and the `logger` module sets up logging for the binaries.
///
/// Configuration is loaded through the `config` module, which is re-exported at the crate
/// root. The `rand` crate is re-exported so callers can inject their own generator.
pub mod core;
pub mod logger;
pub mod simulator;
pub mod sink;
pub mod util;

mod config;
mod error;

pub use self::config::*;
pub use self::error::{ConfigErrorKind, Error, Result};
pub use self::simulator::{generate_readings, Simulator};

pub use rand;

/// Thermosim runtime module containing various constants.
pub mod consts {
    use std::time::Duration;

    /// Thermosim runtime version.
    ///
    /// # Example
    ///
    /// ```
    /// use thermosim::consts::VERSION;
    ///
    /// println!("Thermosim runtime version: {}", VERSION);
    /// ```
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Format of the reading timestamp.
    ///
    /// # Example
    ///
    /// ```
    /// use thermosim::consts::TIME_FORMAT;
    ///
    /// assert_eq!(TIME_FORMAT, "%Y-%m-%d %H:%M:%S");
    /// ```
    pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Default number of ticks per simulated hour.
    ///
    /// # Remarks
    ///
    /// The ramp phase repeats every `DEFAULT_TICKS_PER_HOUR` ticks.
    pub const DEFAULT_TICKS_PER_HOUR: usize = 60;

    /// Default number of ticks per hour during which the ramp is applied.
    pub const DEFAULT_RAMP_WINDOW_TICKS: usize = 5;

    /// Default interval between two ticks.
    ///
    /// # Example
    ///
    /// ```
    /// use thermosim::consts::DEFAULT_TICK_INTERVAL;
    /// use std::time::Duration;
    ///
    /// assert_eq!(DEFAULT_TICK_INTERVAL, Duration::from_secs(60));
    /// ```
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);

    /// Longest allowed interval between two ticks.
    pub const MAX_TICK_INTERVAL: Duration = Duration::from_secs(86_400);

    /// Default configuration file.
    pub const DEFAULT_CONFIG_PATH: &str = "configs/sensors.json";

    /// Default output file when neither the configuration nor the command line names one.
    pub const DEFAULT_OUTPUT_FILE: &str = "temperature-readings.json";

    /// Default network address for the HTTP service.
    pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:8080";
}
