use std::{path::Path, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{consts, core::Sensor, logger::LogConfig, Error, Result};

pub trait Configurable: Clone {
    fn global(&self) -> &GlobalConfig;
}

/// Thermosim global configuration.
#[derive(Clone, Debug)]
pub struct GlobalConfig {
    /// Name of the binary.
    pub bin_name: String,

    /// Logger configuration.
    pub log: LogConfig,
}

impl Configurable for GlobalConfig {
    fn global(&self) -> &GlobalConfig {
        self
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            bin_name: String::new(),
            log: LogConfig::default(),
        }
    }
}

fn default_ticks_per_hour() -> usize {
    consts::DEFAULT_TICKS_PER_HOUR
}

fn default_ramp_window_ticks() -> usize {
    consts::DEFAULT_RAMP_WINDOW_TICKS
}

fn default_tick_interval_secs() -> u64 {
    consts::DEFAULT_TICK_INTERVAL.as_secs()
}

/// Simulation run configuration.
///
/// The configuration is immutable for the duration of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// Number of ticks to generate. Every tick yields one reading per sensor.
    #[serde(rename = "totalReadings")]
    pub total_ticks: usize,
    /// Initial temperature of every sensor.
    pub starting_temp: f64,
    /// Total temperature increase over one ramp window.
    #[serde(rename = "maxTempIncrease")]
    pub max_ramp_amount: f64,
    /// Maximum random fluctuation applied per tick, in both directions.
    #[serde(rename = "tempFluctuation")]
    pub fluctuation_amplitude: f64,
    /// Lower temperature bound.
    pub min_temp: f64,
    /// Upper temperature bound.
    pub max_temp: f64,
    /// Advance a virtual clock instead of waiting on the wall clock.
    #[serde(default)]
    pub simulate: bool,
    /// Number of ticks in one simulated hour.
    #[serde(default = "default_ticks_per_hour")]
    pub ticks_per_hour: usize,
    /// Number of ticks at the start of every hour during which the ramp is applied.
    #[serde(default = "default_ramp_window_ticks")]
    pub ramp_window_ticks: usize,
    /// Seconds between two ticks.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    /// Random generator seed. A fresh seed is drawn when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Output file name.
    #[serde(default, rename = "outputFileName", skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    /// Log output, either `stdout` or a file path.
    #[serde(default, rename = "logFilePath", skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            total_ticks: consts::DEFAULT_TICKS_PER_HOUR,
            starting_temp: 20.0,
            max_ramp_amount: 5.0,
            fluctuation_amplitude: 0.5,
            min_temp: -10.0,
            max_temp: 50.0,
            simulate: true,
            ticks_per_hour: default_ticks_per_hour(),
            ramp_window_ticks: default_ramp_window_ticks(),
            tick_interval_secs: default_tick_interval_secs(),
            seed: None,
            output_file: None,
            log_file: None,
        }
    }
}

impl RunConfig {
    /// Validate the run parameters.
    ///
    /// Invalid bounds and other out of range parameters are rejected before
    /// any reading is generated.
    pub fn validate(&self) -> Result<()> {
        let scalars = [
            ("startingTemp", self.starting_temp),
            ("maxTempIncrease", self.max_ramp_amount),
            ("tempFluctuation", self.fluctuation_amplitude),
            ("minTemp", self.min_temp),
            ("maxTemp", self.max_temp),
        ];

        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(Error::InvalidConfig(format!("{} is not a finite number", name)));
            }
        }

        if self.min_temp > self.max_temp {
            return Err(Error::InvalidConfig(format!(
                "minTemp ({}) is greater than maxTemp ({})",
                self.min_temp, self.max_temp
            )));
        }
        if !(self.fluctuation_amplitude * 2.0).is_finite() {
            return Err(Error::InvalidConfig(format!(
                "tempFluctuation ({}) is out of range",
                self.fluctuation_amplitude
            )));
        }
        if self.fluctuation_amplitude < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "tempFluctuation ({}) is negative",
                self.fluctuation_amplitude
            )));
        }

        let (lower, upper) = self.reading_bounds();
        if !lower.is_finite() || !upper.is_finite() {
            return Err(Error::InvalidConfig(
                "minTemp and maxTemp are out of range".to_string(),
            ));
        }
        if lower > upper {
            return Err(Error::InvalidConfig(format!(
                "no temperature with two decimals fits between minTemp ({}) and maxTemp ({})",
                self.min_temp, self.max_temp
            )));
        }

        if self.ticks_per_hour == 0 {
            return Err(Error::InvalidConfig("ticksPerHour must be positive".to_string()));
        }
        if self.ramp_window_ticks == 0 {
            return Err(Error::InvalidConfig(
                "rampWindowTicks must be positive".to_string(),
            ));
        }
        if self.tick_interval_secs == 0 {
            return Err(Error::InvalidConfig(
                "tickIntervalSecs must be positive".to_string(),
            ));
        }
        if self.tick_interval() > consts::MAX_TICK_INTERVAL {
            return Err(Error::InvalidConfig(format!(
                "tickIntervalSecs must not exceed {}",
                consts::MAX_TICK_INTERVAL.as_secs()
            )));
        }

        Ok(())
    }

    /// Interval between two ticks.
    #[inline]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    /// Temperature added to every sensor per tick during the ramp phase.
    #[inline]
    pub fn ramp_increment(&self) -> f64 {
        self.max_ramp_amount / self.ramp_window_ticks as f64
    }

    /// Whether the ramp phase is active on the given tick.
    #[inline]
    pub fn is_ramp_phase(&self, tick: usize) -> bool {
        tick % self.ticks_per_hour < self.ramp_window_ticks
    }

    /// Lowest and highest temperature a reading can carry.
    ///
    /// Both are multiples of 0.01 within the configured bounds. Rounding a
    /// clamped value never leaves this range.
    pub fn reading_bounds(&self) -> (f64, f64) {
        let lower = (self.min_temp * 100.0).round();
        let lower = if lower / 100.0 < self.min_temp {
            (lower + 1.0) / 100.0
        } else {
            lower / 100.0
        };

        let upper = (self.max_temp * 100.0).round();
        let upper = if upper / 100.0 > self.max_temp {
            (upper - 1.0) / 100.0
        } else {
            upper / 100.0
        };

        (lower, upper)
    }

    /// Output file name, if one is configured.
    pub fn output_file(&self) -> Option<&str> {
        self.output_file.as_deref().filter(|s| !s.is_empty())
    }

    /// Log output, if one is configured.
    pub fn log_file(&self) -> Option<&str> {
        self.log_file.as_deref().filter(|s| !s.is_empty())
    }
}

impl std::fmt::Display for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use crate::util::OnOffExt;

        write!(
            f,
            "Ticks: {} Start: {:.2} Bounds: [{:.2}, {:.2}] Fluctuation: {:.2} Ramp: {:.2}/{}/{} Simulate: {}",
            self.total_ticks,
            self.starting_temp,
            self.min_temp,
            self.max_temp,
            self.fluctuation_amplitude,
            self.max_ramp_amount,
            self.ramp_window_ticks,
            self.ticks_per_hour,
            self.simulate.as_on_off_str()
        )
    }
}

/// Simulation configuration and the sensors to simulate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Run configuration.
    pub config: RunConfig,
    /// Sensors to simulate.
    #[serde(default)]
    pub sensors: Vec<Sensor>,
}

impl SensorConfig {
    /// Load the configuration from a file.
    ///
    /// Files with a `.toml` extension are parsed as TOML, anything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let sensor_config = Self::read(path).map_err(|e| {
            log::error!("Error loading configuration: {}", e);
            e
        })?;

        sensor_config.check_sensors()?;

        Ok(sensor_config)
    }

    /// Read and parse a configuration file without checking its content.
    ///
    /// Nothing is logged, so the file can be read before a logger is installed.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path).map_err(|e| Error::config_io(path, e))?;

        let is_toml = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            toml::from_str(&contents).map_err(|e| Error::config_parse(path, e))
        } else {
            serde_json::from_str(&contents).map_err(|e| Error::config_parse(path, e))
        }
    }

    /// Parse the configuration from a JSON stream.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        let source = Path::new("-");

        let sensor_config: Self = serde_json::from_reader(std::io::BufReader::new(reader))
            .map_err(|e| {
                log::error!("Error loading configuration: {}", e);

                if e.is_io() {
                    Error::config_io(source, e.into())
                } else {
                    Error::config_parse(source, e)
                }
            })?;

        sensor_config.check_sensors()?;

        Ok(sensor_config)
    }

    /// Check the configuration names at least one sensor.
    pub fn check_sensors(&self) -> Result<()> {
        if self.sensors.is_empty() {
            log::error!("No sensors found in configuration");
            return Err(Error::EmptySensorList);
        }

        log::info!("Loaded {} sensors from configuration", self.sensors.len());

        Ok(())
    }

    /// Validate the sensor list and the run parameters.
    pub fn validate(&self) -> Result<()> {
        if self.sensors.is_empty() {
            return Err(Error::EmptySensorList);
        }

        self.config.validate()
    }

    /// Split into run configuration and shared sensors.
    pub fn into_parts(self) -> (RunConfig, Vec<Arc<Sensor>>) {
        let sensors = self.sensors.into_iter().map(Arc::new).collect();
        (self.config, sensors)
    }
}

impl std::str::FromStr for SensorConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_reader(s.as_bytes())
    }
}

/// Load the run configuration and sensors from a file.
pub fn load(path: impl AsRef<Path>) -> Result<(RunConfig, Vec<Arc<Sensor>>)> {
    Ok(SensorConfig::from_file(path)?.into_parts())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_JSON: &str = r#"{
        "config": {
            "totalReadings": 10,
            "startingTemp": 20.0,
            "maxTempIncrease": 30.0,
            "tempFluctuation": 3.0,
            "minTemp": -10.0,
            "maxTemp": 50.0,
            "outputFileName": "",
            "simulate": true
        },
        "sensors": [
            {"name": "SensorA", "id": "001", "version": "v1.0", "location": "LocationA"},
            {"name": "SensorB", "id": "002", "version": "v1.1", "location": "LocationB"}
        ]
    }"#;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("thermosim-config-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_parse_json() {
        let sensor_config: SensorConfig = CONFIG_JSON.parse().unwrap();

        assert_eq!(sensor_config.sensors.len(), 2);
        assert_eq!(sensor_config.sensors[1].id, "002");

        let config = &sensor_config.config;
        assert_eq!(config.total_ticks, 10);
        assert_eq!(config.max_ramp_amount, 30.0);
        assert_eq!(config.fluctuation_amplitude, 3.0);
        assert!(config.simulate);
        assert_eq!(config.ticks_per_hour, 60);
        assert_eq!(config.ramp_window_ticks, 5);
        assert_eq!(config.tick_interval(), Duration::from_secs(60));
        assert_eq!(config.seed, None);
        assert_eq!(config.output_file(), None);
        assert!(sensor_config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_file() {
        let path = temp_path("sensors.toml");
        std::fs::write(
            &path,
            r#"
            [config]
            totalReadings = 120
            startingTemp = 18.5
            maxTempIncrease = 2.0
            tempFluctuation = 0.25
            minTemp = 0.0
            maxTemp = 30.0
            simulate = true
            seed = 7
            outputFileName = "out.json"

            [[sensors]]
            name = "Sensor A"
            id = "001"
            version = "v1.0"
            location = "Lab"
            "#,
        )
        .unwrap();

        let (config, sensors) = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.total_ticks, 120);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.output_file(), Some("out.json"));
        assert_eq!(sensors.len(), 1);
        assert_eq!(sensors[0].location, "Lab");
    }

    #[test]
    fn test_missing_file() {
        let result = SensorConfig::from_file(temp_path("nonexistent.json"));

        assert!(matches!(
            result,
            Err(Error::ConfigLoad {
                kind: crate::ConfigErrorKind::Io(_),
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_file() {
        let path = temp_path("malformed.json");
        std::fs::write(&path, "{\"config\": {\"totalReadings\": \"ten\"}").unwrap();

        let result = SensorConfig::from_file(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            result,
            Err(Error::ConfigLoad {
                kind: crate::ConfigErrorKind::Parse(_),
                ..
            })
        ));
    }

    #[test]
    fn test_empty_sensor_list() {
        let payload = r#"{"config": {"totalReadings": 1, "startingTemp": 0, "maxTempIncrease": 0,
            "tempFluctuation": 0, "minTemp": 0, "maxTemp": 1}, "sensors": []}"#;

        assert!(matches!(
            payload.parse::<SensorConfig>(),
            Err(Error::EmptySensorList)
        ));
    }

    #[test]
    fn test_reading_bounds() {
        let config = RunConfig {
            min_temp: -0.375,
            max_temp: 0.375,
            ..Default::default()
        };
        assert_eq!(config.reading_bounds(), (-0.37, 0.37));
        assert!(config.validate().is_ok());

        let config = RunConfig {
            min_temp: 0.29,
            max_temp: 0.29,
            ..Default::default()
        };
        assert_eq!(config.reading_bounds(), (0.29, 0.29));
        assert!(config.validate().is_ok());

        let config = RunConfig {
            min_temp: 0.371,
            max_temp: 0.375,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = RunConfig {
            min_temp: -1e308,
            max_temp: 1e308,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_read_skips_sensor_check() {
        let path = temp_path("no-sensors.json");
        std::fs::write(
            &path,
            r#"{"config": {"totalReadings": 1, "startingTemp": 0, "maxTempIncrease": 0,
                "tempFluctuation": 0, "minTemp": 0, "maxTemp": 1, "logFilePath": "sim.log"}}"#,
        )
        .unwrap();

        let read = SensorConfig::read(&path);
        let loaded = SensorConfig::from_file(&path);
        std::fs::remove_file(&path).ok();

        let sensor_config = read.unwrap();
        assert_eq!(sensor_config.config.log_file(), Some("sim.log"));
        assert!(matches!(
            sensor_config.check_sensors(),
            Err(Error::EmptySensorList)
        ));
        assert!(matches!(loaded, Err(Error::EmptySensorList)));
    }

    #[test]
    fn test_validate_bounds() {
        let config = RunConfig {
            min_temp: 10.0,
            max_temp: 5.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = RunConfig {
            min_temp: 5.0,
            max_temp: 5.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_parameters() {
        let invalid = [
            RunConfig {
                fluctuation_amplitude: -1.0,
                ..Default::default()
            },
            RunConfig {
                starting_temp: f64::NAN,
                ..Default::default()
            },
            RunConfig {
                max_temp: f64::INFINITY,
                ..Default::default()
            },
            RunConfig {
                fluctuation_amplitude: f64::MAX,
                ..Default::default()
            },
            RunConfig {
                ticks_per_hour: 0,
                ..Default::default()
            },
            RunConfig {
                ramp_window_ticks: 0,
                ..Default::default()
            },
            RunConfig {
                tick_interval_secs: 0,
                ..Default::default()
            },
            RunConfig {
                tick_interval_secs: 86_401,
                ..Default::default()
            },
        ];

        for config in invalid {
            assert!(config.validate().is_err(), "{:?}", config);
        }
    }

    #[test]
    fn test_ramp_phase() {
        let config = RunConfig::default();

        assert_eq!(config.ramp_increment(), 1.0);
        assert!(config.is_ramp_phase(0));
        assert!(config.is_ramp_phase(4));
        assert!(!config.is_ramp_phase(5));
        assert!(!config.is_ramp_phase(59));
        assert!(config.is_ramp_phase(60));
        assert!(config.is_ramp_phase(64));
        assert!(!config.is_ramp_phase(65));
    }
}
