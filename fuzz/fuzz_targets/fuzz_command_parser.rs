//! Fuzz target: `protocol::command::parse`
//!
//! Feeds arbitrary text frames to the command parser and asserts that it
//! never panics and never yields a non-finite set-point.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use ovenctl::app::commands::AppCommand;
use ovenctl::protocol::command;

fuzz_target!(|data: &[u8]| {
    let Ok(frame) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(AppCommand::SetTargetTemp(v)) = command::parse(frame) {
        assert!(v.is_finite(), "parser produced non-finite target {v}");
    }
});
