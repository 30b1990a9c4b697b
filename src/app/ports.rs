//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RegulatorService (domain)
//! ```
//!
//! Driven adapters (thermocouple, relay, event sinks) implement these
//! traits.  The [`RegulatorService`](super::service::RegulatorService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::error::{ActuatorError, SensorError};

/// Degrees Celsius.
pub type Temperature = f32;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per tick.
pub trait SensorPort {
    /// Take one temperature sample.  Must return promptly.
    fn read(&mut self) -> Result<Temperature, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the heating relay.
///
/// Owned exclusively by the [`RegulationEngine`](crate::regulation::RegulationEngine);
/// nothing else drives the output.
pub trait ActuatorPort {
    /// Energize (`true`) or release (`false`) the relay coil.
    ///
    /// On error the output is unchanged and [`get`](Self::get) still
    /// reports the previous level.
    fn set(&mut self, energized: bool) -> Result<(), ActuatorError>;

    /// Current output level, as last successfully driven.
    fn get(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
