//! Sensor drivers.
//!
//! The regulator has a single input, a K-type thermocouple behind a
//! MAX6675 amplifier.

pub mod thermocouple;
