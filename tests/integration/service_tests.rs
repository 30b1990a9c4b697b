//! Integration tests for the RegulatorService → engine → relay → observer
//! pipeline.
//!
//! These run on the host (x86_64) and drive the full chain from an inbound
//! text frame or a sensor sample down to relay writes and broadcast JSON.

use super::mock_hw::{CaptureSink, CaptureSubscriber, MockRelay, ScriptedSensor};

use ovenctl::app::commands::AppCommand;
use ovenctl::app::events::AppEvent;
use ovenctl::app::ports::ActuatorPort;
use ovenctl::app::service::RegulatorService;
use ovenctl::config::RegulatorConfig;
use ovenctl::error::{ActuatorError, CommandError, Error, SensorError};
use ovenctl::regulation::{Mode, SwitchCause};

type Service = RegulatorService<MockRelay, CaptureSubscriber>;

fn make_service() -> (Service, CaptureSubscriber, CaptureSink) {
    make_service_with(&RegulatorConfig::default(), MockRelay::default())
}

fn make_service_with(
    config: &RegulatorConfig,
    relay: MockRelay,
) -> (Service, CaptureSubscriber, CaptureSink) {
    let mut sink = CaptureSink::default();
    let mut svc = RegulatorService::new(config, relay);
    let observer = CaptureSubscriber::default();
    svc.start(&mut sink);
    svc.subscribe(1, observer.clone(), &mut sink).expect("subscribe");
    (svc, observer, sink)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-3
}

// ── Reference scenario ────────────────────────────────────────

#[test]
fn auto_switch_scenario_energizes_after_dwell() {
    let (mut svc, observer, mut sink) = make_service();
    let mut sensor = ScriptedSensor::new();

    svc.handle_frame("setMode: auto_switch", 0, &mut sink).expect("mode accepted");

    sensor.set(305.0);
    svc.tick(&mut sensor, 0, &mut sink);
    assert!(!svc.engine().relay_energized());

    sensor.set(295.0);
    svc.tick(&mut sensor, 10_000, &mut sink);
    assert!(!svc.engine().relay_energized(), "inside dwell, no action");

    // 25 s in: lower trip = 300 - 20 * 25/300 = 298.333
    sensor.set(278.0);
    svc.tick(&mut sensor, 25_000, &mut sink);
    assert!(svc.engine().relay_energized());
    assert_eq!(svc.engine().actuator().writes, vec![true]);

    // 5 s after the switch: dwell again, even though 322 is hot.
    sensor.set(322.0);
    svc.tick(&mut sensor, 30_000, &mut sink);
    assert!(svc.engine().relay_energized());

    let json = observer.last_json();
    assert_eq!(json["relais"], 1);
    assert_eq!(json["mode"], "auto_switch");
    assert!(approx(json["temperature"].as_f64().unwrap(), 322.0));
    assert!(approx(json["derived_overshoot"].as_f64().unwrap(), 300.0 - 20.0 / 60.0));
    assert!(approx(json["derived_undershoot"].as_f64().unwrap(), 300.0 + 20.0 / 60.0));

    let auto_switches = sink.count(|e| {
        matches!(e, AppEvent::RelaySwitched(t) if t.cause == SwitchCause::AutoSwitch)
    });
    assert_eq!(auto_switches, 1);
}

#[test]
fn trip_point_is_exact_ramp_value() {
    let (mut svc, _observer, mut sink) = make_service();
    svc.handle_frame("setModeauto_switch", 0, &mut sink).unwrap();

    // 298.333.. is the lower trip at 25 s; just above it holds.
    let mut sensor = ScriptedSensor::steady(298.34);
    svc.tick(&mut sensor, 25_000, &mut sink);
    assert!(!svc.engine().relay_energized());

    sensor.set(298.32);
    svc.tick(&mut sensor, 25_000, &mut sink);
    assert!(svc.engine().relay_energized());
}

#[test]
fn de_energizes_above_upper_trip_after_dwell() {
    let (mut svc, _observer, mut sink) = make_service();
    svc.handle_frame("setMode auto_switch", 0, &mut sink).unwrap();
    svc.handle_frame("switchRelais", 0, &mut sink).unwrap();
    assert!(svc.engine().relay_energized());

    // Fully ramped: upper trip = 320.
    let mut sensor = ScriptedSensor::steady(319.0);
    svc.tick(&mut sensor, 400_000, &mut sink);
    assert!(svc.engine().relay_energized(), "inside the band, hold");

    sensor.set(321.0);
    svc.tick(&mut sensor, 400_250, &mut sink);
    assert!(!svc.engine().relay_energized());
}

// ── Command round-trips ───────────────────────────────────────

#[test]
fn set_target_then_get_readings_broadcasts_new_target() {
    let (mut svc, observer, mut sink) = make_service();

    assert_eq!(
        svc.handle_frame("setTargetTemp250", 0, &mut sink),
        Ok(AppCommand::SetTargetTemp(250.0))
    );
    assert_eq!(svc.handle_frame("getReadings", 0, &mut sink), Ok(AppCommand::GetReadings));

    assert_eq!(observer.count(), 2);
    let json = observer.last_json();
    assert_eq!(json["target_temp"].as_f64(), Some(250.0));
    assert!(json["temperature"].is_null(), "no sample yet");
}

#[test]
fn ui_spelling_of_set_target_is_accepted() {
    let (mut svc, observer, mut sink) = make_service();
    svc.handle_frame("setTargetTemp: 250", 0, &mut sink).unwrap();
    assert_eq!(observer.last_json()["target_temp"].as_f64(), Some(250.0));
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::TargetChanged { from, to } if *from == 300.0 && *to == 250.0
    )));
}

#[test]
fn malformed_target_is_rejected_without_broadcast() {
    let (mut svc, observer, mut sink) = make_service();

    let res = svc.handle_frame("setTargetTempABC", 0, &mut sink);
    assert!(matches!(res, Err(Error::Command(CommandError::InvalidCommand(_)))));
    assert_eq!(svc.snapshot().target_temp, 300.0);
    assert_eq!(observer.count(), 0, "rejected frame must not publish");
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::CommandRejected(_))),
        1
    );
}

#[test]
fn unknown_frame_is_unrecognized() {
    let (mut svc, observer, mut sink) = make_service();
    assert_eq!(
        svc.handle_frame("reboot", 0, &mut sink),
        Err(Error::Command(CommandError::UnrecognizedCommand))
    );
    assert_eq!(
        svc.handle_frame("setMode: turbo", 0, &mut sink),
        Err(Error::Command(CommandError::InvalidCommand("unknown mode")))
    );
    assert_eq!(svc.engine().mode(), Mode::Off);
    assert_eq!(observer.count(), 0);
}

#[test]
fn manual_toggle_ignores_dwell() {
    let (mut svc, observer, mut sink) = make_service();
    svc.handle_frame("setMode: auto_switch", 0, &mut sink).unwrap();

    svc.handle_frame("switchRelais", 1_000, &mut sink).unwrap();
    svc.handle_frame("switchRelais", 1_001, &mut sink).unwrap();
    svc.handle_frame("switchRelais", 1_002, &mut sink).unwrap();

    assert_eq!(svc.engine().actuator().writes, vec![true, false, true]);
    assert_eq!(observer.last_json()["relais"], 1);
    let view = svc.snapshot();
    assert_eq!(view.derived_overshoot, view.target_temp);
    assert_eq!(view.derived_undershoot, view.target_temp);
}

// ── Modes ─────────────────────────────────────────────────────

#[test]
fn mode_off_releases_relay_and_stops_evaluation() {
    let (mut svc, _observer, mut sink) = make_service();
    svc.handle_frame("setMode: pwm", 0, &mut sink).unwrap();
    let mut sensor = ScriptedSensor::steady(100.0);
    svc.tick(&mut sensor, 5_000, &mut sink);
    assert!(svc.engine().relay_energized());

    svc.handle_frame("setMode: off", 6_000, &mut sink).unwrap();
    assert!(!svc.engine().relay_energized());
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::RelaySwitched(t) if t.cause == SwitchCause::ModeOff && !t.energized
    )));

    let writes_after_off = svc.engine().actuator().writes.len();
    for i in 1..=100 {
        sensor.set(if i % 2 == 0 { 0.0 } else { 1000.0 });
        svc.tick(&mut sensor, 6_000 + i * 10_000, &mut sink);
    }
    assert_eq!(svc.engine().actuator().writes.len(), writes_after_off);
}

#[test]
fn pwm_toggles_every_delay_regardless_of_temperature() {
    let (mut svc, _observer, mut sink) = make_service();
    svc.handle_frame("setMode: pwm", 0, &mut sink).unwrap();

    let mut sensor = ScriptedSensor::steady(1000.0);
    // 250 ms ticks for 30 s.
    for t in (250..=30_000).step_by(250) {
        svc.tick(&mut sensor, t, &mut sink);
    }
    assert_eq!(svc.engine().actuator().writes, vec![true, false, true, false, true, false]);
}

#[test]
fn repeating_mode_is_a_no_op() {
    let (mut svc, _observer, mut sink) = make_service();
    svc.handle_frame("setMode: off", 0, &mut sink).unwrap();
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ModeChanged { .. })), 0);
    assert!(svc.engine().actuator().writes.is_empty());
}

// ── Sensor faults ─────────────────────────────────────────────

#[test]
fn sensor_fault_releases_relay_and_surfaces_in_snapshot() {
    let (mut svc, observer, mut sink) = make_service();
    svc.handle_frame("setMode: auto_switch", 0, &mut sink).unwrap();

    let mut sensor = ScriptedSensor::steady(200.0);
    svc.tick(&mut sensor, 30_000, &mut sink);
    assert!(svc.engine().relay_energized());

    sensor.push(Err(SensorError::OpenCircuit));
    sensor.push(Err(SensorError::OpenCircuit));
    svc.tick(&mut sensor, 30_250, &mut sink);
    svc.tick(&mut sensor, 30_500, &mut sink);

    assert!(!svc.engine().relay_energized());
    assert_eq!(svc.engine().actuator().writes, vec![true, false]);
    assert_eq!(observer.last_json()["fault"], "open_circuit");
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SensorFault(_))), 1);

    // Recovery: the next good sample clears the fault and evaluation resumes.
    sensor.push(Ok(200.0));
    svc.tick(&mut sensor, 60_000, &mut sink);
    assert!(svc.engine().fault().is_none());
    assert!(observer.last_json().get("fault").is_none());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SensorRecovered)), 1);
    assert!(svc.engine().relay_energized());
}

#[test]
fn implausible_sample_counts_as_fault() {
    let (mut svc, observer, mut sink) = make_service();
    let mut sensor = ScriptedSensor::steady(f32::NAN);
    svc.tick(&mut sensor, 250, &mut sink);
    assert_eq!(svc.engine().fault(), Some(SensorError::OutOfRange));
    assert_eq!(observer.last_json()["fault"], "out_of_range");

    sensor.set(5_000.0);
    svc.tick(&mut sensor, 500, &mut sink);
    assert_eq!(svc.engine().fault(), Some(SensorError::OutOfRange));
}

// ── Relay faults ──────────────────────────────────────────────

#[test]
fn refused_release_keeps_snapshot_truthful_and_retries() {
    let relay = MockRelay::default();
    let broken = relay.broken.clone();
    let (mut svc, observer, mut sink) = make_service_with(&RegulatorConfig::default(), relay);

    svc.handle_frame("switchRelais", 0, &mut sink).unwrap();
    broken.set(true);

    let mut sensor = ScriptedSensor::new();
    sensor.push(Err(SensorError::OpenCircuit));
    svc.tick(&mut sensor, 250, &mut sink);

    assert!(svc.engine().relay_energized());
    assert_eq!(svc.engine().relay_energized(), svc.engine().actuator().get());
    assert_eq!(observer.last_json()["relais"], 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ActuatorFault(ActuatorError::GpioWriteFailed))),
        1
    );

    broken.set(false);
    svc.tick(&mut sensor, 500, &mut sink);
    assert!(!svc.engine().relay_energized());
    assert_eq!(svc.engine().actuator().writes, vec![true, false]);
    assert_eq!(observer.last_json()["relais"], 0);
}

#[test]
fn toggle_on_dead_relay_reports_actuator_error() {
    let relay = MockRelay::default();
    relay.broken.set(true);
    let (mut svc, observer, mut sink) = make_service_with(&RegulatorConfig::default(), relay);

    assert_eq!(
        svc.handle_frame("switchRelais", 0, &mut sink),
        Err(Error::Actuator(ActuatorError::GpioWriteFailed))
    );
    assert!(!svc.engine().relay_energized());
    assert_eq!(observer.count(), 1);
    assert_eq!(observer.last_json()["relais"], 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::CommandRejected(_))), 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::RelaySwitched(_))), 0);
}

#[test]
fn mode_off_on_dead_relay_still_changes_mode() {
    let relay = MockRelay::default();
    let broken = relay.broken.clone();
    let (mut svc, _observer, mut sink) = make_service_with(&RegulatorConfig::default(), relay);
    svc.handle_frame("setMode: pwm", 0, &mut sink).unwrap();
    svc.handle_frame("switchRelais", 0, &mut sink).unwrap();

    broken.set(true);
    assert!(svc.handle_frame("setMode: off", 1_000, &mut sink).is_err());
    assert_eq!(svc.engine().mode(), Mode::Off);
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ModeChanged { to: Mode::Off, .. }
    )));

    broken.set(false);
    let mut sensor = ScriptedSensor::steady(100.0);
    svc.tick(&mut sensor, 1_250, &mut sink);
    assert!(!svc.engine().relay_energized());
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::RelaySwitched(t) if t.cause == SwitchCause::ModeOff
    )));
}

// ── Observers ─────────────────────────────────────────────────

#[test]
fn every_tick_publishes_to_all_observers() {
    let (mut svc, first, mut sink) = make_service();
    let second = CaptureSubscriber::default();
    svc.subscribe(2, second.clone(), &mut sink).unwrap();

    let mut sensor = ScriptedSensor::steady(21.5);
    let delivered = svc.tick(&mut sensor, 250, &mut sink);
    assert_eq!(delivered, 2);
    assert_eq!(first.frames(), second.frames());

    svc.unsubscribe(2, &mut sink);
    assert_eq!(svc.tick(&mut sensor, 500, &mut sink), 1);
    assert_eq!(second.count(), 1);
    assert!(sink.events.iter().any(|e| matches!(e, AppEvent::ObserverCountChanged(1))));
}

#[test]
fn failing_observer_does_not_block_others() {
    let (mut svc, healthy, mut sink) = make_service();
    let broken = CaptureSubscriber::default();
    *broken.failing.borrow_mut() = true;
    svc.subscribe(2, broken, &mut sink).unwrap();

    let mut sensor = ScriptedSensor::steady(21.5);
    assert_eq!(svc.tick(&mut sensor, 250, &mut sink), 1);
    assert_eq!(healthy.count(), 1);
    assert_eq!(svc.broadcaster().failed_deliveries(), 1);
}

#[test]
fn telemetry_event_every_sixty_seconds() {
    let (mut svc, _observer, mut sink) = make_service();
    let mut sensor = ScriptedSensor::steady(21.5);
    for i in 1..=480u64 {
        svc.tick(&mut sensor, i * 250, &mut sink);
    }
    assert_eq!(svc.tick_count(), 480);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 2);
}

#[test]
fn zero_tick_interval_does_not_panic() {
    let config = RegulatorConfig {
        tick_interval_ms: 0,
        telemetry_interval_secs: 0,
        ..RegulatorConfig::default()
    };
    let (mut svc, _observer, mut sink) = make_service_with(&config, MockRelay::default());
    let mut sensor = ScriptedSensor::steady(21.5);
    svc.tick(&mut sensor, 0, &mut sink);
    svc.tick(&mut sensor, 0, &mut sink);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 2);
}
