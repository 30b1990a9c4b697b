//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Each line starts with a fixed tag so a serial capture can be grepped.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(v) => match v.temperature {
                Some(t) => info!(
                    "TELEM | T={:.2}\u{00b0}C | target={:.1} | band={:.2}..{:.2} | \
                     relay={} | mode={} | fault={}",
                    t,
                    v.target_temp,
                    v.derived_overshoot,
                    v.derived_undershoot,
                    if v.relay_energized { "ON" } else { "OFF" },
                    v.mode,
                    v.fault.map_or("none", |f| f.as_str()),
                ),
                None => info!(
                    "TELEM | T=n/a | target={:.1} | relay={} | mode={} | fault={}",
                    v.target_temp,
                    if v.relay_energized { "ON" } else { "OFF" },
                    v.mode,
                    v.fault.map_or("none", |f| f.as_str()),
                ),
            },
            AppEvent::RelaySwitched(t) => {
                info!(
                    "RELAY | {} | cause={:?}",
                    if t.energized { "ON" } else { "OFF" },
                    t.cause
                );
            }
            AppEvent::ModeChanged { from, to } => {
                info!("STATE | mode {} -> {}", from, to);
            }
            AppEvent::TargetChanged { from, to } => {
                info!("STATE | target {:.1} -> {:.1}", from, to);
            }
            AppEvent::SensorFault(e) => {
                warn!("FAULT | sensor {}", e.as_str());
            }
            AppEvent::SensorRecovered => {
                info!("FAULT | sensor recovered");
            }
            AppEvent::ActuatorFault(e) => {
                warn!("FAULT | relay {}", e);
            }
            AppEvent::CommandRejected(e) => {
                warn!("CMD | rejected: {}", e);
            }
            AppEvent::ObserverCountChanged(n) => {
                info!("CMD | observers={}", n);
            }
            AppEvent::Started(mode) => {
                info!("START | initial_mode={}", mode);
            }
        }
    }
}
