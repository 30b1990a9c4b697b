//! Outbound application events.
//!
//! The [`RegulatorService`](super::service::RegulatorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them; on device they go to the serial
//! log.

use crate::error::{ActuatorError, CommandError, SensorError};
use crate::regulation::{Mode, RelayTransition, StateView};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started (carries the initial mode).
    Started(Mode),

    /// Periodic telemetry snapshot.
    Telemetry(StateView),

    /// The relay changed state.
    RelaySwitched(RelayTransition),

    /// The operating mode changed.
    ModeChanged { from: Mode, to: Mode },

    /// The set-point changed.
    TargetChanged { from: f32, to: f32 },

    /// The thermocouple became unavailable.
    SensorFault(SensorError),

    /// A valid sample arrived after a fault.
    SensorRecovered,

    /// A relay write failed; the output kept its previous level.
    ActuatorFault(ActuatorError),

    /// An inbound frame was rejected.
    CommandRejected(CommandError),

    /// An observer connected or disconnected.
    ObserverCountChanged(usize),
}
