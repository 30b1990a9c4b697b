//! Oven controller firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Max6675        RelayDriver     LogEventSink   MonotonicClock  │
//! │  (SensorPort)   (ActuatorPort)  (EventSink)    (time base)     │
//! │  WiFi STA       WS endpoint ──▶ INBOUND / SESSION channels     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           RegulatorService (pure logic)                │    │
//! │  │  RegulationEngine · CommandProcessor · Broadcaster     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Control loop: sleep tick → drain channels → tick → publish    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::hal::gpio::{AnyInputPin, AnyOutputPin, PinDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use ovenctl::adapters::log_sink::LogEventSink;
use ovenctl::adapters::time::MonotonicClock;
use ovenctl::adapters::wifi::{self, Credentials};
use ovenctl::adapters::ws::{self, SESSION_CHANNEL, WsSubscriber};
use ovenctl::app::service::RegulatorService;
use ovenctl::config::RegulatorConfig;
use ovenctl::drivers::relay::{Polarity, RelayDriver};
use ovenctl::error::Error;
use ovenctl::pins;
use ovenctl::sensors::thermocouple::Max6675;
use ovenctl::transport::channels::{INBOUND_CHANNEL, drain_frames, drain_sessions};

// ── Config ────────────────────────────────────────────────────

/// Defaults, optionally overridden by a JSON document baked in at build
/// time.  A bad override is reported and ignored.
fn load_config() -> RegulatorConfig {
    let Some(json) = option_env!("OVENCTL_CONFIG") else {
        return RegulatorConfig::default();
    };
    match RegulatorConfig::from_json(json) {
        Ok(cfg) => {
            info!("Config: build-time override applied");
            cfg
        }
        Err(e) => {
            warn!("Override rejected ({}), using defaults", Error::from(e));
            RegulatorConfig::default()
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  ovenctl v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config();
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 2. Relay first, so the element is released early ──────
    // SAFETY: pin numbers in `pins` are unique and claimed nowhere else.
    let relay_pin = PinDriver::output(unsafe { AnyOutputPin::new(pins::RELAY_GPIO) })?;
    let relay = RelayDriver::new(relay_pin, Polarity::ActiveHigh);

    // ── 3. Thermocouple ───────────────────────────────────────
    // SAFETY: as above.
    let (cs, sck, so) = unsafe {
        (
            AnyOutputPin::new(pins::THERMO_CS_GPIO),
            AnyOutputPin::new(pins::THERMO_SCK_GPIO),
            AnyInputPin::new(pins::THERMO_SO_GPIO),
        )
    };
    let mut thermocouple = Max6675::new(
        PinDriver::output(cs)?,
        PinDriver::output(sck)?,
        PinDriver::input(so)?,
        Ets,
    );

    // ── 4. Network ────────────────────────────────────────────
    let _wifi = match Credentials::from_build_env() {
        Ok(creds) => match wifi::connect_station(peripherals.modem, sysloop, nvs, &creds) {
            Ok(w) => Some(w),
            Err(e) => {
                error!("WiFi bring-up failed: {:#}, regulating offline", e);
                None
            }
        },
        Err(e) => {
            warn!("WiFi: {}, regulating offline", e);
            None
        }
    };
    let _server = ws::start_server()?;

    // ── 5. Application core ───────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut service: RegulatorService<_, WsSubscriber> = RegulatorService::new(&config, relay);
    service.start(&mut sink);

    let clock = MonotonicClock::new();
    info!(
        "Control loop: tick={}ms target={:.0}\u{00b0}C",
        config.tick_interval_ms, config.target_temp_c
    );

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        FreeRtos::delay_ms(config.tick_interval_ms);
        let now_ms = clock.uptime_ms();

        drain_sessions(&SESSION_CHANNEL, &mut service, &mut sink);
        drain_frames(&INBOUND_CHANNEL, &mut service, now_ms, &mut sink);
        service.tick(&mut thermocouple, now_ms, &mut sink);
    }
}
