//! MAX6675 K-type thermocouple amplifier.
//!
//! Read-only SPI-like interface, bit-banged on three GPIOs (CS, SCK, SO).
//! Every read clocks out one 16-bit frame, MSB first:
//!
//! ```text
//!  15   14 ............ 3   2      1     0
//! ┌───┬───────────────────┬──────┬─────┬─────┐
//! │ 0 │ 12-bit temp ×0.25 │ open │ ID=0│ tri │
//! └───┴───────────────────┴──────┴─────┴─────┘
//! ```
//!
//! Bit 2 set means the thermocouple input is open.  Bits 15 and 1 are
//! always zero on a healthy bus; seeing them set means the line is
//! floating or shorted.
//!
//! ## Dual-target design
//!
//! Generic over `embedded-hal` pin and delay traits.  On ESP-IDF they are
//! `esp_idf_hal` pin drivers and `Ets`; host tests feed a scripted frame.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::{SensorPort, Temperature};
use crate::error::SensorError;

/// Degrees per LSB of the 12-bit reading.
const CELSIUS_PER_COUNT: f32 = 0.25;
/// Bits that must always read zero.
const ZERO_BITS: u16 = 0x8002;
/// Thermocouple-input-open flag.
const OPEN_BIT: u16 = 0x0004;
/// Half clock period (the chip tops out at 4.3 MHz; stay far below).
const HALF_CLOCK_US: u32 = 10;

/// Decode one raw frame into Celsius.
pub fn decode_frame(raw: u16) -> Result<Temperature, SensorError> {
    if raw & ZERO_BITS != 0 {
        return Err(SensorError::ReadFailed);
    }
    if raw & OPEN_BIT != 0 {
        return Err(SensorError::OpenCircuit);
    }
    Ok(f32::from(raw >> 3) * CELSIUS_PER_COUNT)
}

pub struct Max6675<CS, SCK, SO, D> {
    cs: CS,
    sck: SCK,
    so: SO,
    delay: D,
}

impl<CS, SCK, SO, D> Max6675<CS, SCK, SO, D>
where
    CS: OutputPin,
    SCK: OutputPin,
    SO: InputPin,
    D: DelayNs,
{
    pub fn new(mut cs: CS, mut sck: SCK, so: SO, delay: D) -> Self {
        // Idle bus: chip deselected, clock low.  A failed write here shows
        // up again as ReadFailed on the first read.
        if cs.set_high().is_err() {
            warn!("MAX6675: failed to deselect chip at init");
        }
        if sck.set_low().is_err() {
            warn!("MAX6675: failed to idle clock at init");
        }
        Self { cs, sck, so, delay }
    }

    /// Clock out one raw 16-bit frame.
    pub fn read_raw(&mut self) -> Result<u16, SensorError> {
        self.cs.set_low().map_err(|_| SensorError::ReadFailed)?;
        self.delay.delay_us(HALF_CLOCK_US);

        let frame = self.shift_in();

        // Always deselect, even after a failed bit; this restarts conversion.
        let deselect = self.cs.set_high();
        let frame = frame?;
        deselect.map_err(|_| SensorError::ReadFailed)?;
        Ok(frame)
    }

    fn shift_in(&mut self) -> Result<u16, SensorError> {
        let mut frame: u16 = 0;
        for _ in 0..16 {
            self.sck.set_low().map_err(|_| SensorError::ReadFailed)?;
            self.delay.delay_us(HALF_CLOCK_US);
            let bit = self.so.is_high().map_err(|_| SensorError::ReadFailed)?;
            frame = (frame << 1) | u16::from(bit);
            self.sck.set_high().map_err(|_| SensorError::ReadFailed)?;
            self.delay.delay_us(HALF_CLOCK_US);
        }
        self.sck.set_low().map_err(|_| SensorError::ReadFailed)?;
        Ok(frame)
    }
}

impl<CS, SCK, SO, D> SensorPort for Max6675<CS, SCK, SO, D>
where
    CS: OutputPin,
    SCK: OutputPin,
    SO: InputPin,
    D: DelayNs,
{
    fn read(&mut self) -> Result<Temperature, SensorError> {
        decode_frame(self.read_raw()?)
    }
}
