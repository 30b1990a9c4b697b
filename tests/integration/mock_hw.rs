//! Mock hardware adapters for integration tests.
//!
//! Records every relay write and every broadcast so tests can assert on
//! the full history without touching real GPIO or sockets.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use ovenctl::app::events::AppEvent;
use ovenctl::app::ports::{ActuatorPort, EventSink, SensorPort, Temperature};
use ovenctl::error::{ActuatorError, SensorError};
use ovenctl::protocol::broadcaster::Subscriber;

// ── MockRelay ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockRelay {
    energized: bool,
    /// Every level written successfully, in order.
    pub writes: Vec<bool>,
    /// While set, every write fails and the output holds.
    pub broken: Rc<Cell<bool>>,
}

impl ActuatorPort for MockRelay {
    fn set(&mut self, energized: bool) -> Result<(), ActuatorError> {
        if self.broken.get() {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.energized = energized;
        self.writes.push(energized);
        Ok(())
    }

    fn get(&self) -> bool {
        self.energized
    }
}

// ── ScriptedSensor ────────────────────────────────────────────

/// Replays queued readings; repeats the last one once the script runs out.
pub struct ScriptedSensor {
    script: VecDeque<Result<Temperature, SensorError>>,
    last: Result<Temperature, SensorError>,
}

#[allow(dead_code)]
impl ScriptedSensor {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            last: Err(SensorError::ReadFailed),
        }
    }

    pub fn steady(celsius: Temperature) -> Self {
        let mut s = Self::new();
        s.last = Ok(celsius);
        s
    }

    pub fn push(&mut self, reading: Result<Temperature, SensorError>) {
        self.script.push_back(reading);
    }

    pub fn set(&mut self, celsius: Temperature) {
        self.script.clear();
        self.last = Ok(celsius);
    }
}

impl SensorPort for ScriptedSensor {
    fn read(&mut self) -> Result<Temperature, SensorError> {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
    }
}

// ── CaptureSubscriber ─────────────────────────────────────────

/// Observer that stores every frame in a shared inbox.
#[derive(Clone, Default)]
pub struct CaptureSubscriber {
    pub inbox: Rc<RefCell<Vec<String>>>,
    pub failing: Rc<RefCell<bool>>,
}

#[allow(dead_code)]
impl CaptureSubscriber {
    pub fn frames(&self) -> Vec<String> {
        self.inbox.borrow().clone()
    }

    pub fn last_json(&self) -> serde_json::Value {
        let inbox = self.inbox.borrow();
        let last = inbox.last().expect("no frame received");
        serde_json::from_str(last).expect("frame is not JSON")
    }

    pub fn count(&self) -> usize {
        self.inbox.borrow().len()
    }
}

impl Subscriber for CaptureSubscriber {
    type Error = &'static str;

    fn send_text(&mut self, frame: &str) -> Result<(), Self::Error> {
        if *self.failing.borrow() {
            return Err("socket closed");
        }
        self.inbox.borrow_mut().push(frame.to_owned());
        Ok(())
    }
}

// ── CaptureSink ───────────────────────────────────────────────

#[derive(Default)]
pub struct CaptureSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl CaptureSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for CaptureSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
