//! Command processor: applies parsed commands to the regulation engine.

use log::info;

use crate::error::Result;
use crate::protocol::command;
use crate::regulation::RegulationEngine;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink};

/// Parse `frame` and apply it.
///
/// On success the applied command is returned and the caller publishes a
/// fresh snapshot.  A command error leaves the engine untouched; an
/// actuator error means the command was applied but the relay write was
/// refused.
pub fn handle<A: ActuatorPort>(
    frame: &str,
    engine: &mut RegulationEngine<A>,
    now_ms: u64,
    sink: &mut impl EventSink,
) -> Result<AppCommand> {
    let cmd = command::parse(frame)?;
    apply(cmd, engine, now_ms, sink)?;
    Ok(cmd)
}

/// Execute one structured command against the engine.
pub fn apply<A: ActuatorPort>(
    cmd: AppCommand,
    engine: &mut RegulationEngine<A>,
    now_ms: u64,
    sink: &mut impl EventSink,
) -> Result<()> {
    match cmd {
        AppCommand::GetReadings => {}
        AppCommand::SwitchRelay => {
            info!("Manual relay toggle");
            let t = engine.manual_toggle(now_ms)?;
            sink.emit(&AppEvent::RelaySwitched(t));
        }
        AppCommand::SetTargetTemp(value) => {
            let from = engine.state().target_temp;
            engine.set_target(value)?;
            info!("Target temp set to {:.1}\u{00b0}C", value);
            sink.emit(&AppEvent::TargetChanged { from, to: value });
        }
        AppCommand::SetMode(mode) => {
            let from = engine.mode();
            let transition = engine.set_mode(mode, now_ms);
            if from != mode {
                sink.emit(&AppEvent::ModeChanged { from, to: mode });
            }
            if let Some(t) = transition? {
                sink.emit(&AppEvent::RelaySwitched(t));
            }
        }
    }
    Ok(())
}
