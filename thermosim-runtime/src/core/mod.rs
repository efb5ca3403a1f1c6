pub use self::reading::{Reading, Temperature};
pub use self::sensor::Sensor;

mod reading;
mod sensor;
