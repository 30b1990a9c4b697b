//! Inbound command frame parser.
//!
//! One plain-text command per frame, no envelope:
//!
//! ```text
//! getReadings
//! switchRelais
//! setTargetTemp250        setTargetTemp: 250
//! setModeauto_switch      setMode: auto_switch
//! ```
//!
//! The browser UI puts `": "` between the command name and its argument;
//! the separator is optional.  Arguments are validated strictly: a number
//! must parse completely and be finite, a mode must be one of the exact
//! wire names.

use crate::app::commands::AppCommand;
use crate::error::CommandError;
use crate::regulation::Mode;

const GET_READINGS: &str = "getReadings";
const SWITCH_RELAY: &str = "switchRelais";
const SET_TARGET_TEMP: &str = "setTargetTemp";
const SET_MODE: &str = "setMode";

/// Parse one inbound frame.
pub fn parse(frame: &str) -> Result<AppCommand, CommandError> {
    let frame = frame.trim_end_matches(['\0', '\r', '\n']);

    match frame {
        GET_READINGS => return Ok(AppCommand::GetReadings),
        SWITCH_RELAY => return Ok(AppCommand::SwitchRelay),
        _ => {}
    }

    if let Some(rest) = frame.strip_prefix(SET_TARGET_TEMP) {
        return parse_target(argument(rest)).map(AppCommand::SetTargetTemp);
    }
    if let Some(rest) = frame.strip_prefix(SET_MODE) {
        return Mode::from_wire(argument(rest))
            .map(AppCommand::SetMode)
            .ok_or(CommandError::InvalidCommand("unknown mode"));
    }

    Err(CommandError::UnrecognizedCommand)
}

/// Strip the optional `:` separator and surrounding blanks.
fn argument(rest: &str) -> &str {
    let rest = rest.trim_start_matches(' ');
    rest.strip_prefix(':').unwrap_or(rest).trim_matches(' ')
}

fn parse_target(arg: &str) -> Result<f32, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::InvalidCommand("missing target temperature"));
    }
    // `f32::from_str` also accepts "inf", "NaN" and exponents; only plain
    // decimal notation is allowed on the wire.
    let plain = arg
        .bytes()
        .enumerate()
        .all(|(i, b)| b.is_ascii_digit() || b == b'.' || (i == 0 && (b == b'-' || b == b'+')));
    if !plain {
        return Err(CommandError::InvalidCommand("target is not a number"));
    }
    match arg.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CommandError::InvalidCommand("target is not a number")),
    }
}
