//! Unified error types for the oven controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's error handling uniform.  All variants are `Copy` so they
//! can be stored in the regulation state and carried through events
//! without allocation.

use core::fmt;

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The thermocouple could not be read or returned implausible data.
    Sensor(SensorError),
    /// An inbound command frame was rejected.
    Command(CommandError),
    /// Driving the relay output failed.
    Actuator(ActuatorError),
    /// Configuration is invalid or could not be parsed.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// The `SensorUnavailable` condition.  While one of these is active the
/// regulation engine holds the relay and skips evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// MAX6675 reports the thermocouple input as open (unplugged or broken).
    OpenCircuit,
    /// Reading is non-finite or outside the physically plausible range.
    OutOfRange,
    /// The bus transaction itself failed.
    ReadFailed,
}

impl SensorError {
    /// Stable identifier used in the `fault` field of broadcast snapshots.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenCircuit => "open_circuit",
            Self::OutOfRange => "out_of_range",
            Self::ReadFailed => "read_failed",
        }
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenCircuit => write!(f, "thermocouple open circuit"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::ReadFailed => write!(f, "sensor read failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// A known command carried a malformed payload.
    /// The `&'static str` says which part and why.
    InvalidCommand(&'static str),
    /// The frame does not name any known command.
    UnrecognizedCommand,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCommand(reason) => write!(f, "invalid command: {reason}"),
            Self::UnrecognizedCommand => write!(f, "unrecognized command"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
