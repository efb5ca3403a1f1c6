use serde::{Deserialize, Serialize};

/// Sensor identity.
///
/// A sensor is never mutated after it has been loaded. Readings share the
/// sensor by reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sensor {
    /// Human readable name of the sensor.
    pub name: String,
    /// Sensor identifier.
    pub id: String,
    /// Sensor hardware or firmware version.
    pub version: String,
    /// Physical location of the sensor.
    pub location: String,
}

impl Sensor {
    /// Construct new sensor.
    pub fn new(
        name: impl ToString,
        id: impl ToString,
        version: impl ToString,
        location: impl ToString,
    ) -> Self {
        Self {
            name: name.to_string(),
            id: id.to_string(),
            version: version.to_string(),
            location: location.to_string(),
        }
    }
}

impl std::fmt::Display for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sensor: {} ID: {} Version: {} Location: {}",
            self.name, self.id, self.version, self.location
        )
    }
}
