//! Regulation engine: the relay decision state machine.
//!
//! [`RegulationEngine`] owns the single [`RegulationState`] and, exclusively,
//! the relay behind an [`ActuatorPort`].  Every tick it is handed the latest
//! thermocouple sample (or the reason there is none) and decides whether to
//! toggle the relay according to the active [`Mode`]:
//!
//! | Mode         | Policy                                                  |
//! |--------------|---------------------------------------------------------|
//! | `Off`        | relay de-energized on entry, no evaluation              |
//! | `AutoSwitch` | ramped hysteresis band, 20 s dwell between transitions  |
//! | `Pwm`        | toggle every 5 s regardless of temperature              |
//!
//! While a sensor fault is active automatic evaluation is suspended and the
//! relay is held; a fault that arrives with the relay energized drops it to
//! the safe (de-energized) state once.
//!
//! A failed relay write leaves the cached state equal to what the actuator
//! reports.  A failed release (mode Off or sensor fault) stays pending and is
//! retried on every following tick until the output actually drops.

pub mod bounds;
pub mod mode;

use log::{debug, warn};

use crate::app::ports::ActuatorPort;
use crate::config::RegulatorConfig;
use crate::error::{ActuatorError, CommandError, SensorError};

use bounds::{TripPoints, ramp_fraction};
pub use mode::Mode;

/// Why the relay changed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchCause {
    /// AutoSwitch crossed a trip point.
    AutoSwitch,
    /// Pwm heartbeat elapsed.
    Pwm,
    /// Operator `switchRelais` command.
    Manual,
    /// Mode changed to Off.
    ModeOff,
    /// Sensor fault onset while energized.
    SensorFault,
}

/// A single relay transition performed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayTransition {
    pub energized: bool,
    pub cause: SwitchCause,
}

/// Mutable regulation state.  Exactly one instance exists, inside the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RegulationState {
    pub mode: Mode,
    pub target_temp: f32,
    pub set_overshoot: f32,
    pub set_undershoot: f32,
    /// `lower` is `derived_overshoot`, `upper` is `derived_undershoot`.
    pub trip: TripPoints,
    pub relay_energized: bool,
    /// Monotonic milliseconds of the last relay transition.
    pub last_switch_ms: u64,
    pub last_temperature: Option<f32>,
    pub fault: Option<SensorError>,
    /// A release that the actuator refused; retried each tick.
    pub pending_release: Option<SwitchCause>,
}

/// Read-only projection of the state for broadcasting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateView {
    pub temperature: Option<f32>,
    pub relay_energized: bool,
    pub target_temp: f32,
    pub derived_overshoot: f32,
    pub derived_undershoot: f32,
    pub mode: Mode,
    pub fault: Option<SensorError>,
}

/// The regulation engine.
pub struct RegulationEngine<A: ActuatorPort> {
    state: RegulationState,
    actuator: A,
    ramp_window_ms: u64,
    auto_switch_dwell_ms: u64,
    pwm_switch_delay_ms: u64,
    sensor_min_c: f32,
    sensor_max_c: f32,
}

impl<A: ActuatorPort> RegulationEngine<A> {
    /// Build the engine in `Off` mode.  The relay cache is seeded from the
    /// actuator; the switch clock starts at boot (t = 0).
    pub fn new(config: &RegulatorConfig, actuator: A) -> Self {
        let relay_energized = actuator.get();
        Self {
            state: RegulationState {
                mode: Mode::Off,
                target_temp: config.target_temp_c,
                set_overshoot: config.set_overshoot_c,
                set_undershoot: config.set_undershoot_c,
                trip: TripPoints::at(config.target_temp_c),
                relay_energized,
                last_switch_ms: 0,
                last_temperature: None,
                fault: None,
                pending_release: None,
            },
            actuator,
            ramp_window_ms: config.ramp_window_ms,
            auto_switch_dwell_ms: config.auto_switch_dwell_ms,
            pwm_switch_delay_ms: config.pwm_switch_delay_ms,
            sensor_min_c: config.sensor_min_c,
            sensor_max_c: config.sensor_max_c,
        }
    }

    // ── Tick entry points ─────────────────────────────────────

    /// Feed a fresh sample and run the mode policy.
    ///
    /// A non-finite or implausible sample is treated exactly like
    /// [`on_sensor_fault`](Self::on_sensor_fault) with
    /// [`SensorError::OutOfRange`]; the engine never acts on it.
    pub fn on_tick(
        &mut self,
        sample: f32,
        now_ms: u64,
    ) -> Result<Option<RelayTransition>, ActuatorError> {
        if !sample.is_finite() || sample < self.sensor_min_c || sample > self.sensor_max_c {
            warn!("Rejecting implausible sample {sample}");
            return self.on_sensor_fault(SensorError::OutOfRange, now_ms);
        }

        self.state.fault = None;
        self.state.last_temperature = Some(sample);
        if let Some(t) = self.retry_release(now_ms)? {
            return Ok(Some(t));
        }
        self.evaluate(now_ms)
    }

    /// Record that no usable sample is available this tick.
    pub fn on_sensor_fault(
        &mut self,
        error: SensorError,
        now_ms: u64,
    ) -> Result<Option<RelayTransition>, ActuatorError> {
        let onset = self.state.fault.is_none();
        self.state.fault = Some(error);

        if let Some(t) = self.retry_release(now_ms)? {
            return Ok(Some(t));
        }
        if onset && self.state.relay_energized {
            return self.release(SwitchCause::SensorFault, now_ms).map(Some);
        }
        Ok(None)
    }

    // ── Operator controls ─────────────────────────────────────

    /// Change the operating mode.  Entering `Off` de-energizes the relay.
    ///
    /// The mode is changed even when the release write fails; the release
    /// is then retried on later ticks.
    pub fn set_mode(
        &mut self,
        mode: Mode,
        now_ms: u64,
    ) -> Result<Option<RelayTransition>, ActuatorError> {
        if mode == self.state.mode {
            return Ok(None);
        }
        debug!("Mode {} -> {}", self.state.mode, mode);
        self.state.mode = mode;
        self.reset_bounds();

        if mode != Mode::Off {
            return Ok(None);
        }
        let was_energized = self.state.relay_energized;
        let t = self.release(SwitchCause::ModeOff, now_ms)?;
        Ok(was_energized.then_some(t))
    }

    /// Change the set-point.  The trip points follow the target, keeping
    /// whatever ramp offset they had accumulated.
    pub fn set_target(&mut self, value: f32) -> Result<(), CommandError> {
        if !value.is_finite() {
            return Err(CommandError::InvalidCommand("target must be finite"));
        }
        let s = &mut self.state;
        s.trip = s
            .trip
            .retarget(s.target_temp, value, s.set_overshoot, s.set_undershoot);
        s.target_temp = value;
        Ok(())
    }

    /// Flip the relay now, ignoring dwell time.
    pub fn manual_toggle(&mut self, now_ms: u64) -> Result<RelayTransition, ActuatorError> {
        let energized = !self.state.relay_energized;
        let t = self.switch(energized, SwitchCause::Manual, now_ms)?;
        self.state.pending_release = None;
        Ok(t)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn snapshot(&self) -> StateView {
        let s = &self.state;
        StateView {
            temperature: s.last_temperature,
            relay_energized: s.relay_energized,
            target_temp: s.target_temp,
            derived_overshoot: s.trip.lower,
            derived_undershoot: s.trip.upper,
            mode: s.mode,
            fault: s.fault,
        }
    }

    pub fn state(&self) -> &RegulationState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn relay_energized(&self) -> bool {
        self.state.relay_energized
    }

    pub fn fault(&self) -> Option<SensorError> {
        self.state.fault
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    // ── Internal ──────────────────────────────────────────────

    fn evaluate(&mut self, now_ms: u64) -> Result<Option<RelayTransition>, ActuatorError> {
        let elapsed = now_ms.saturating_sub(self.state.last_switch_ms);
        match self.state.mode {
            Mode::Off => Ok(None),
            Mode::Pwm if elapsed >= self.pwm_switch_delay_ms => {
                let energized = !self.state.relay_energized;
                self.switch(energized, SwitchCause::Pwm, now_ms).map(Some)
            }
            Mode::Pwm => Ok(None),
            Mode::AutoSwitch => self.evaluate_auto_switch(elapsed, now_ms),
        }
    }

    fn evaluate_auto_switch(
        &mut self,
        elapsed: u64,
        now_ms: u64,
    ) -> Result<Option<RelayTransition>, ActuatorError> {
        let s = &mut self.state;
        let fraction = ramp_fraction(elapsed, self.ramp_window_ms);
        s.trip = TripPoints::ramped(s.target_temp, s.set_overshoot, s.set_undershoot, fraction);

        if elapsed <= self.auto_switch_dwell_ms {
            return Ok(None);
        }
        let Some(temp) = s.last_temperature else {
            return Ok(None);
        };

        if temp > s.trip.upper && s.relay_energized {
            self.switch(false, SwitchCause::AutoSwitch, now_ms).map(Some)
        } else if temp < s.trip.lower && !s.relay_energized {
            self.switch(true, SwitchCause::AutoSwitch, now_ms).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Drive the relay to the safe state, remembering the request if the
    /// actuator refuses it.
    fn release(
        &mut self,
        cause: SwitchCause,
        now_ms: u64,
    ) -> Result<RelayTransition, ActuatorError> {
        match self.switch(false, cause, now_ms) {
            Ok(t) => {
                self.state.pending_release = None;
                Ok(t)
            }
            Err(e) => {
                self.state.pending_release = Some(cause);
                Err(e)
            }
        }
    }

    fn retry_release(&mut self, now_ms: u64) -> Result<Option<RelayTransition>, ActuatorError> {
        let Some(cause) = self.state.pending_release else {
            return Ok(None);
        };
        if !self.state.relay_energized {
            self.state.pending_release = None;
            return Ok(None);
        }
        self.release(cause, now_ms).map(Some)
    }

    /// Write the relay.  Only a successful write moves the cache, the
    /// switch clock and the bounds.
    fn switch(
        &mut self,
        energized: bool,
        cause: SwitchCause,
        now_ms: u64,
    ) -> Result<RelayTransition, ActuatorError> {
        if let Err(e) = self.actuator.set(energized) {
            self.state.relay_energized = self.actuator.get();
            warn!(
                "Relay write ({:?}) failed: {}, output still {}",
                cause,
                e,
                if self.state.relay_energized { "ON" } else { "OFF" }
            );
            return Err(e);
        }
        self.state.relay_energized = energized;
        self.state.last_switch_ms = now_ms;
        self.reset_bounds();
        Ok(RelayTransition { energized, cause })
    }

    fn reset_bounds(&mut self) {
        self.state.trip = TripPoints::at(self.state.target_temp);
    }
}
