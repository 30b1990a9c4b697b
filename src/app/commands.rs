//! Inbound commands to the application service.
//!
//! These are the structured form of the text frames observers send over
//! the message channel.  [`protocol::command::parse`](crate::protocol::command::parse)
//! produces them; [`processor::apply`](super::processor::apply) executes them.

use crate::regulation::Mode;

/// Commands that observers can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Broadcast a snapshot right away.
    GetReadings,

    /// Flip the relay, bypassing dwell time.
    SwitchRelay,

    /// Change the set-point (Celsius).
    SetTargetTemp(f32),

    /// Change the operating mode.
    SetMode(Mode),
}
