use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};

use super::Sensor;

/// Temperature in degrees Celsius.
///
/// The value is rounded to two decimals on construction and is always
/// serialized with exactly two decimals, for example `25.50`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Deserialize)]
#[serde(from = "f64")]
pub struct Temperature(f64);

impl Temperature {
    /// Construct new temperature rounded to two decimals.
    pub fn new(value: f64) -> Self {
        let rounded = (value * 100.0).round() / 100.0;
        // Avoid emitting "-0.00".
        if rounded == 0.0 {
            Self(0.0)
        } else {
            Self(rounded)
        }
    }

    /// Temperature value.
    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Temperature {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Temperature> for f64 {
    fn from(value: Temperature) -> Self {
        value.0
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Temperature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::Error;

        let raw = serde_json::value::RawValue::from_string(self.to_string())
            .map_err(S::Error::custom)?;

        raw.serialize(serializer)
    }
}

/// Single temperature reading.
///
/// A reading is immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Time of the reading in UTC.
    pub time: String,
    /// Measured temperature.
    pub temperature: Temperature,
    /// Sensor which produced the reading.
    pub sensor: Arc<Sensor>,
}

impl Reading {
    /// Construct new reading.
    pub fn new(
        time: &NaiveDateTime,
        temperature: impl Into<Temperature>,
        sensor: Arc<Sensor>,
    ) -> Self {
        Self {
            time: time.format(crate::consts::TIME_FORMAT).to_string(),
            temperature: temperature.into(),
            sensor,
        }
    }

    /// Parse the reading time.
    ///
    /// Returns `None` if the time is not in the reading time format.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.time, crate::consts::TIME_FORMAT).ok()
    }
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}°C", self.time, self.sensor.name, self.temperature)
    }
}
