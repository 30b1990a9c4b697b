//! Heating-element relay driver.
//!
//! A single digital output drives the relay module's coil input.  Modules
//! come in both polarities, so the level that energizes the coil is
//! configurable.
//!
//! ## Dual-target design
//!
//! Generic over [`embedded_hal::digital::OutputPin`]: on ESP-IDF this is an
//! `esp_idf_hal::gpio::PinDriver`; host tests use an in-memory pin.
//!
//! ## Safety contract
//!
//! Construction drives the output to the released level before anything
//! else happens, so a reboot never leaves the element energized.

use embedded_hal::digital::OutputPin;
use log::{error, info};

use crate::app::ports::ActuatorPort;
use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Output HIGH energizes the coil.
    ActiveHigh,
    /// Output LOW energizes the coil.
    ActiveLow,
}

pub struct RelayDriver<P: OutputPin> {
    pin: P,
    polarity: Polarity,
    energized: bool,
}

impl<P: OutputPin> RelayDriver<P> {
    pub fn new(pin: P, polarity: Polarity) -> Self {
        let mut relay = Self {
            pin,
            polarity,
            energized: true,
        };
        if let Err(e) = relay.drive(false) {
            error!("Relay: failed to release at init: {}", e);
        }
        relay
    }

    /// Write the output level for `energized`.  The cached state only
    /// changes if the write succeeded.
    fn drive(&mut self, energized: bool) -> Result<(), ActuatorError> {
        let high = match self.polarity {
            Polarity::ActiveHigh => energized,
            Polarity::ActiveLow => !energized,
        };
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| ActuatorError::GpioWriteFailed)?;
        if self.energized != energized {
            info!("Relay {}", if energized { "ON" } else { "OFF" });
        }
        self.energized = energized;
        Ok(())
    }
}

impl<P: OutputPin> ActuatorPort for RelayDriver<P> {
    fn set(&mut self, energized: bool) -> Result<(), ActuatorError> {
        self.drive(energized).inspect_err(|e| error!("Relay: {}", e))
    }

    fn get(&self) -> bool {
        self.energized
    }
}
