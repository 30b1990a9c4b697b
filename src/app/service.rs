//! Application service: the hexagonal core.
//!
//! [`RegulatorService`] owns the regulation engine (and through it the
//! relay) plus the snapshot broadcaster.  It exposes the two entry points
//! the scheduler drives: [`tick`](RegulatorService::tick) on every period and
//! [`handle_frame`](RegulatorService::handle_frame) for every inbound
//! message.  All I/O flows through port traits, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │    RegulatorService    │
//! ActuatorPort ◀──│  Engine · Broadcaster  │──▶ Subscriber × N
//!                 └────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::RegulatorConfig;
use crate::error::{ActuatorError, Error};
use crate::protocol::broadcaster::{BroadcastError, ClientId, StateBroadcaster, Subscriber};
use crate::regulation::{RegulationEngine, StateView};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, SensorPort};
use super::processor;

// ───────────────────────────────────────────────────────────────
// RegulatorService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct RegulatorService<A: ActuatorPort, S: Subscriber> {
    engine: RegulationEngine<A>,
    broadcaster: StateBroadcaster<S>,
    /// Ticks between telemetry log events.
    telemetry_every: u64,
    tick_count: u64,
}

impl<A: ActuatorPort, S: Subscriber> RegulatorService<A, S> {
    /// Construct the service.  The relay is handed over to the engine and
    /// is not reachable from anywhere else afterwards.
    pub fn new(config: &RegulatorConfig, relay: A) -> Self {
        Self {
            engine: RegulationEngine::new(config, relay),
            broadcaster: StateBroadcaster::new(),
            telemetry_every: config.telemetry_every_ticks(),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started(self.engine.mode()));
        info!("RegulatorService started in {}", self.engine.mode());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: read sensor → engine → relay → broadcast.
    ///
    /// Returns the number of observers the snapshot reached.
    pub fn tick(
        &mut self,
        sensor: &mut impl SensorPort,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> usize {
        self.tick_count += 1;
        let fault_before = self.engine.fault();

        // 1. Sample + policy
        let outcome = match sensor.read() {
            Ok(celsius) => self.engine.on_tick(celsius, now_ms),
            Err(e) => self.engine.on_sensor_fault(e, now_ms),
        };

        // 2. Fault bookkeeping
        match (fault_before, self.engine.fault()) {
            (None, Some(e)) => {
                warn!("Sensor unavailable: {}", e);
                sink.emit(&AppEvent::SensorFault(e));
            }
            (Some(_), None) => {
                info!("Sensor recovered");
                sink.emit(&AppEvent::SensorRecovered);
            }
            _ => {}
        }

        match outcome {
            Ok(Some(t)) => sink.emit(&AppEvent::RelaySwitched(t)),
            Ok(None) => {}
            Err(e) => actuator_fault(e, sink),
        }

        // 3. Periodic telemetry log
        if self.tick_count % self.telemetry_every == 0 {
            sink.emit(&AppEvent::Telemetry(self.engine.snapshot()));
        }

        // 4. Broadcast
        self.publish()
    }

    // ── Command handling ──────────────────────────────────────

    /// Process one inbound text frame.
    ///
    /// A successful command is followed by an immediate broadcast; a
    /// rejected one leaves state untouched and publishes nothing.  When the
    /// relay refuses the write the command still took effect on the rest of
    /// the state, so observers get the resynced snapshot.
    pub fn handle_frame(
        &mut self,
        frame: &str,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> Result<AppCommand, Error> {
        match processor::handle(frame, &mut self.engine, now_ms, sink) {
            Ok(cmd) => {
                self.publish();
                Ok(cmd)
            }
            Err(Error::Command(e)) => {
                warn!("Rejected frame {:?}: {}", frame, e);
                sink.emit(&AppEvent::CommandRejected(e));
                Err(Error::Command(e))
            }
            Err(Error::Actuator(e)) => {
                actuator_fault(e, sink);
                self.publish();
                Err(Error::Actuator(e))
            }
            Err(e) => Err(e),
        }
    }

    // ── Observers ─────────────────────────────────────────────

    pub fn subscribe(
        &mut self,
        client_id: ClientId,
        subscriber: S,
        sink: &mut impl EventSink,
    ) -> Result<(), BroadcastError> {
        self.broadcaster.subscribe(client_id, subscriber)?;
        sink.emit(&AppEvent::ObserverCountChanged(
            self.broadcaster.subscriber_count(),
        ));
        Ok(())
    }

    pub fn unsubscribe(&mut self, client_id: ClientId, sink: &mut impl EventSink) {
        if self.broadcaster.unsubscribe(client_id).is_some() {
            sink.emit(&AppEvent::ObserverCountChanged(
                self.broadcaster.subscriber_count(),
            ));
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn snapshot(&self) -> StateView {
        self.engine.snapshot()
    }

    pub fn engine(&self) -> &RegulationEngine<A> {
        &self.engine
    }

    pub fn broadcaster(&self) -> &StateBroadcaster<S> {
        &self.broadcaster
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn publish(&mut self) -> usize {
        let view = self.engine.snapshot();
        self.broadcaster.publish(&view)
    }
}

fn actuator_fault(e: ActuatorError, sink: &mut impl EventSink) {
    warn!("Relay unavailable: {}", e);
    sink.emit(&AppEvent::ActuatorFault(e));
}
