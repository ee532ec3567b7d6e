//! Interpretation of controller documents
//!
//! Pure functions only; fetching lives in [`crate::client`].

pub mod sensor_registry;
pub mod value_parsers;

pub use sensor_registry::{flatten, parse_menu, MenuNode, SensorMap};
pub use value_parsers::{DataPoint, NormalizedValue, SensorValue, FLOAT_UNITS};
