//! Reading generator.
//!
//! Every sensor performs an independent random walk bounded by the configured
//! temperature range. During the first ticks of every simulated hour a ramp is
//! added on top of the fluctuation.

use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    core::{Reading, Sensor, Temperature},
    Error, Result, RunConfig,
};

pub use self::clock::{Clock, RunClock, SimulatedClock, WallClock};

pub mod clock;

/// Upper limit of readings reserved up front by [`Simulator::run`].
const MAX_PREALLOCATED_READINGS: usize = 1 << 20;

/// Per sensor state, updated once per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorState {
    /// Current unrounded temperature.
    pub current_temp: f64,
}

/// Stateful reading generator.
///
/// Yields one batch of readings per tick, one reading per sensor in input
/// order. Sensor state is keyed by position, so sensors sharing a name do not
/// share state.
pub struct Simulator<R: Rng, C: Clock> {
    config: RunConfig,
    sensors: Vec<Arc<Sensor>>,
    state: Vec<SensorState>,
    rng: R,
    clock: C,
    tick: usize,
}

impl Simulator<StdRng, RunClock> {
    /// Construct a simulator from the run configuration.
    ///
    /// The random generator is seeded from the configured seed, or from OS
    /// entropy when no seed is configured. The clock follows the run mode.
    pub fn from_config(sensors: Vec<Arc<Sensor>>, config: &RunConfig) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        log::debug!("Random generator seed: {}", seed);

        Self::new(
            sensors,
            config,
            StdRng::seed_from_u64(seed),
            RunClock::from_config(config),
        )
    }
}

impl<R: Rng, C: Clock> Simulator<R, C> {
    /// Construct a simulator.
    ///
    /// The configuration is validated before any state is created.
    pub fn new(sensors: Vec<Arc<Sensor>>, config: &RunConfig, rng: R, clock: C) -> Result<Self> {
        config.validate()?;

        if sensors.is_empty() {
            return Err(Error::EmptySensorList);
        }

        if config.total_ticks.checked_mul(sensors.len()).is_none() {
            return Err(Error::InvalidConfig(format!(
                "totalReadings ({}) for {} sensors is out of range",
                config.total_ticks,
                sensors.len()
            )));
        }

        let state = vec![
            SensorState {
                current_temp: config.starting_temp,
            };
            sensors.len()
        ];

        Ok(Self {
            config: config.clone(),
            sensors,
            state,
            rng,
            clock,
            tick: 0,
        })
    }

    /// Number of ticks already generated.
    #[inline]
    pub fn ticks(&self) -> usize {
        self.tick
    }

    /// Number of ticks left in the run.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.config.total_ticks - self.tick
    }

    /// Current state of every sensor, in sensor order.
    #[inline]
    pub fn state(&self) -> &[SensorState] {
        &self.state
    }

    /// Generate the readings of the next tick.
    ///
    /// Returns `None` once all ticks of the run have been generated.
    pub fn tick(&mut self) -> Option<Vec<Reading>> {
        if self.tick >= self.config.total_ticks {
            return None;
        }

        let time = self
            .clock
            .advance()
            .format(crate::consts::TIME_FORMAT)
            .to_string();

        let ramp = if self.config.is_ramp_phase(self.tick) {
            self.config.ramp_increment()
        } else {
            0.0
        };

        let amplitude = self.config.fluctuation_amplitude;
        let (lower, upper) = self.config.reading_bounds();

        let mut readings = Vec::with_capacity(self.sensors.len());
        for (sensor, state) in self.sensors.iter().zip(self.state.iter_mut()) {
            let fluctuation = self.rng.gen_range(-amplitude..=amplitude);

            let temp = (state.current_temp + fluctuation + ramp)
                .clamp(self.config.min_temp, self.config.max_temp);
            state.current_temp = temp;

            let temperature = Temperature::new(temp.clamp(lower, upper));

            log::trace!("Tick {} {} {}", self.tick, sensor.name, temperature);

            readings.push(Reading {
                time: time.clone(),
                temperature,
                sensor: sensor.clone(),
            });
        }

        self.tick += 1;

        Some(readings)
    }

    /// Generate all remaining ticks.
    pub fn run(mut self) -> Vec<Reading> {
        let capacity = self
            .remaining()
            .saturating_mul(self.sensors.len())
            .min(MAX_PREALLOCATED_READINGS);

        let mut readings = Vec::with_capacity(capacity);
        while let Some(batch) = self.tick() {
            readings.extend(batch);
        }
        readings
    }
}

impl<R: Rng, C: Clock> Iterator for Simulator<R, C> {
    type Item = Vec<Reading>;

    fn next(&mut self) -> Option<Self::Item> {
        self.tick()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

/// Generate the temperature readings for a run.
///
/// Produces `total_ticks` readings per sensor, ordered by tick and then by
/// sensor. Invalid configurations are rejected before generation starts.
pub fn generate_readings(sensors: &[Arc<Sensor>], config: &RunConfig) -> Result<Vec<Reading>> {
    log::info!(
        "Starting temperature generation for {} sensors with {} readings each",
        sensors.len(),
        config.total_ticks
    );

    let readings = Simulator::from_config(sensors.to_vec(), config)?.run();

    log::info!(
        "Completed temperature generation. Total readings generated: {}",
        readings.len()
    );

    Ok(readings)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use std::time::Duration;

    use super::*;

    fn sensors() -> Vec<Arc<Sensor>> {
        vec![
            Arc::new(Sensor::new("SensorA", "001", "v1.0", "LocationA")),
            Arc::new(Sensor::new("SensorB", "002", "v1.1", "LocationB")),
        ]
    }

    fn scenario() -> RunConfig {
        RunConfig {
            total_ticks: 10,
            starting_temp: 20.0,
            max_ramp_amount: 30.0,
            fluctuation_amplitude: 3.0,
            min_temp: -10.0,
            max_temp: 50.0,
            simulate: true,
            ..Default::default()
        }
    }

    fn clock() -> SimulatedClock {
        let start =
            NaiveDateTime::parse_from_str("2023-10-01 12:00:00", crate::consts::TIME_FORMAT)
                .unwrap();
        SimulatedClock::starting_at(start, Duration::from_secs(60))
    }

    fn simulator(config: &RunConfig, seed: u64) -> Simulator<StdRng, SimulatedClock> {
        Simulator::new(sensors(), config, StdRng::seed_from_u64(seed), clock()).unwrap()
    }

    #[test]
    fn test_scenario() {
        let config = scenario();
        let readings = generate_readings(&sensors(), &config).unwrap();

        assert_eq!(readings.len(), 20);
        for reading in &readings {
            let value = reading.temperature.value();
            assert!((-10.0..=50.0).contains(&value), "{}", reading);
        }
    }

    #[test]
    fn test_reading_order() {
        let readings = simulator(&scenario(), 1).run();

        for (i, reading) in readings.iter().enumerate() {
            assert_eq!(reading.sensor, sensors()[i % 2]);
        }

        assert_eq!(readings[0].time, "2023-10-01 12:01:00");
        assert_eq!(readings[1].time, "2023-10-01 12:01:00");
        assert_eq!(readings[19].time, "2023-10-01 12:10:00");
    }

    #[test]
    fn test_time_spacing() {
        let readings = simulator(&scenario(), 2).run();

        let times: Vec<_> = readings
            .iter()
            .filter(|reading| reading.sensor.id == "002")
            .map(|reading| reading.timestamp().unwrap())
            .collect();

        assert_eq!(times.len(), 10);
        for pair in times.windows(2) {
            assert_eq!(pair[1] - pair[0], chrono::Duration::seconds(60));
        }
    }

    #[test]
    fn test_zero_ticks() {
        let config = RunConfig {
            total_ticks: 0,
            ..scenario()
        };

        assert!(generate_readings(&sensors(), &config).unwrap().is_empty());

        let mut simulator = simulator(&config, 3);
        assert_eq!(simulator.remaining(), 0);
        assert!(simulator.tick().is_none());
    }

    #[test]
    fn test_invalid_bounds() {
        let config = RunConfig {
            min_temp: 50.0,
            max_temp: -10.0,
            ..scenario()
        };

        assert!(matches!(
            generate_readings(&sensors(), &config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_sensors() {
        assert!(matches!(
            generate_readings(&[], &scenario()),
            Err(Error::EmptySensorList)
        ));
    }

    #[test]
    fn test_seed_determinism() {
        let config = RunConfig {
            total_ticks: 200,
            ..scenario()
        };

        assert_eq!(simulator(&config, 42).run(), simulator(&config, 42).run());
        assert_ne!(simulator(&config, 42).run(), simulator(&config, 43).run());
    }

    #[test]
    fn test_configured_seed() {
        let config = RunConfig {
            total_ticks: 50,
            seed: Some(9),
            ..scenario()
        };

        let first = generate_readings(&sensors(), &config).unwrap();
        let second = generate_readings(&sensors(), &config).unwrap();

        let temperatures = |readings: &[Reading]| {
            readings
                .iter()
                .map(|reading| reading.temperature)
                .collect::<Vec<_>>()
        };

        assert_eq!(temperatures(&first), temperatures(&second));
    }

    #[test]
    fn test_ramp_without_fluctuation() {
        let config = RunConfig {
            total_ticks: 130,
            starting_temp: 0.0,
            max_ramp_amount: 5.0,
            fluctuation_amplitude: 0.0,
            min_temp: -100.0,
            max_temp: 100.0,
            ..scenario()
        };

        let readings: Vec<_> = simulator(&config, 4)
            .run()
            .into_iter()
            .filter(|reading| reading.sensor.id == "001")
            .map(|reading| reading.temperature.value())
            .collect();

        assert_eq!(&readings[..6], &[1.0, 2.0, 3.0, 4.0, 5.0, 5.0]);
        assert_eq!(readings[59], 5.0);
        assert_eq!(readings[60], 6.0);
        assert_eq!(readings[64], 10.0);
        assert_eq!(readings[65], 10.0);
        assert_eq!(readings[120], 11.0);
        assert_eq!(readings[129], 15.0);
    }

    #[test]
    fn test_clamp_to_bounds() {
        let config = RunConfig {
            total_ticks: 30,
            starting_temp: 20.0,
            max_ramp_amount: 100.0,
            fluctuation_amplitude: 0.0,
            min_temp: 0.0,
            max_temp: 25.0,
            ..scenario()
        };

        let mut simulator = simulator(&config, 5);
        let first = simulator.tick().unwrap();

        assert_eq!(first[0].temperature.value(), 25.0);
        assert_eq!(simulator.state()[0].current_temp, 25.0);

        for reading in simulator.flatten() {
            assert_eq!(reading.temperature.value(), 25.0);
        }
    }

    #[test]
    fn test_reading_count_overflow() {
        let config = RunConfig {
            total_ticks: usize::MAX / 2 + 1,
            ..scenario()
        };

        assert!(matches!(
            generate_readings(&sensors(), &config),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Simulator::new(sensors(), &config, StdRng::seed_from_u64(8), clock()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_bounds_with_three_decimals() {
        let config = RunConfig {
            total_ticks: 3,
            starting_temp: 0.0,
            max_ramp_amount: 50.0,
            fluctuation_amplitude: 0.0,
            min_temp: -0.375,
            max_temp: 0.375,
            ..scenario()
        };

        for reading in simulator(&config, 9).run() {
            assert_eq!(reading.temperature.value(), 0.37);

            let line = serde_json::to_string(&reading).unwrap();
            assert!(line.contains(r#""temperature":0.37,"#), "{}", line);

            let parsed: Reading = serde_json::from_str(&line).unwrap();
            assert_eq!(parsed, reading);
        }

        let config = RunConfig {
            max_ramp_amount: -50.0,
            ..config
        };

        for reading in simulator(&config, 10).run() {
            assert_eq!(reading.temperature.value(), -0.37);
            assert!(serde_json::to_string(&reading)
                .unwrap()
                .contains(r#""temperature":-0.37,"#));
        }
    }

    #[test]
    fn test_independent_sensor_state() {
        let sensors = vec![
            Arc::new(Sensor::new("Probe", "001", "v1", "North")),
            Arc::new(Sensor::new("Probe", "002", "v1", "South")),
        ];

        let config = RunConfig {
            total_ticks: 100,
            fluctuation_amplitude: 2.0,
            ..scenario()
        };

        let mut simulator =
            Simulator::new(sensors, &config, StdRng::seed_from_u64(6), clock()).unwrap();
        while simulator.tick().is_some() {}

        let state = simulator.state();
        assert_eq!(state.len(), 2);
        assert_ne!(state[0], state[1]);
    }

    #[test]
    fn test_iterator() {
        let config = scenario();
        let simulator = simulator(&config, 7);

        assert_eq!(simulator.size_hint(), (10, Some(10)));

        let batches: Vec<_> = simulator.collect();
        assert_eq!(batches.len(), 10);
        assert!(batches.iter().all(|batch| batch.len() == 2));
    }
}
