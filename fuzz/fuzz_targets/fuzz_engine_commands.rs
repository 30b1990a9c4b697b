//! Fuzz target: command stream against a live engine
//!
//! Splits the input into newline-separated frames, interleaves them with
//! ticks at increasing timestamps and checks that the hysteresis band
//! never inverts and the cached relay state matches the actuator.  A frame
//! starting with `!` toggles relay write failures.
//!
//! cargo fuzz run fuzz_engine_commands

#![no_main]

use std::cell::Cell;
use std::rc::Rc;

use libfuzzer_sys::fuzz_target;
use ovenctl::app::ports::ActuatorPort;
use ovenctl::app::processor;
use ovenctl::app::events::AppEvent;
use ovenctl::app::ports::EventSink;
use ovenctl::config::RegulatorConfig;
use ovenctl::error::ActuatorError;
use ovenctl::regulation::RegulationEngine;

#[derive(Default)]
struct Relay {
    energized: bool,
    broken: Rc<Cell<bool>>,
}

impl ActuatorPort for Relay {
    fn set(&mut self, energized: bool) -> Result<(), ActuatorError> {
        if self.broken.get() {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.energized = energized;
        Ok(())
    }
    fn get(&self) -> bool {
        self.energized
    }
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let relay = Relay::default();
    let broken = relay.broken.clone();
    let mut engine = RegulationEngine::new(&RegulatorConfig::default(), relay);
    let mut now = 0u64;

    for (i, chunk) in data.split(|b| *b == b'\n').enumerate() {
        now += 250;
        let Ok(frame) = core::str::from_utf8(chunk) else {
            continue;
        };
        if frame.starts_with('!') {
            broken.set(!broken.get());
        }
        let _ = processor::handle(frame, &mut engine, now, &mut NullSink);

        let sample = (i as f32) * 7.0 % 600.0;
        let _ = engine.on_tick(sample, now);

        let v = engine.snapshot();
        assert!(v.derived_overshoot <= v.target_temp);
        assert!(v.target_temp <= v.derived_undershoot);
        assert_eq!(v.relay_energized, engine.actuator().get());
    }
});

