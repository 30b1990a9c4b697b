//! Observer message protocol.
//!
//! ```text
//!  observer ── "setMode: pwm" ──▶ command::parse ──▶ AppCommand
//!  observer ◀── {"temperature":…} ── snapshot::encode ◀── StateBroadcaster
//! ```
//!
//! Text frames only, one command or one snapshot per frame, no versioning.

pub mod broadcaster;
pub mod command;
pub mod snapshot;
