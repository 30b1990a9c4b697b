//! Regulator configuration parameters
//!
//! All tunable parameters for the oven controller.  Values are compiled
//! in as defaults and can be overridden by a JSON document (on device:
//! the `OVENCTL_CONFIG` build-time environment variable).  Nothing is
//! persisted at runtime.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Core regulator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulatorConfig {
    // --- Set-point ---
    /// Initial target temperature (Celsius)
    pub target_temp_c: f32,
    /// Maximum distance the lower trip point may ramp below target (Celsius)
    pub set_overshoot_c: f32,
    /// Maximum distance the upper trip point may ramp above target (Celsius)
    pub set_undershoot_c: f32,

    // --- Timing ---
    /// Window over which the trip points ramp from target to the full offset
    pub ramp_window_ms: u64,
    /// Minimum time between automatic relay transitions in AutoSwitch mode
    pub auto_switch_dwell_ms: u64,
    /// Fixed toggle period in Pwm mode
    pub pwm_switch_delay_ms: u64,
    /// Control tick + snapshot broadcast period
    pub tick_interval_ms: u32,
    /// Telemetry log interval (seconds)
    pub telemetry_interval_secs: u32,

    // --- Sensor plausibility ---
    /// Lowest plausible thermocouple reading (Celsius)
    pub sensor_min_c: f32,
    /// Highest plausible thermocouple reading (Celsius)
    pub sensor_max_c: f32,
}

impl Default for RegulatorConfig {
    fn default() -> Self {
        Self {
            // Set-point
            target_temp_c: 300.0,
            set_overshoot_c: 20.0,
            set_undershoot_c: 20.0,

            // Timing
            ramp_window_ms: 5 * 60 * 1000, // 5 min
            auto_switch_dwell_ms: 20_000,  // 20 s
            pwm_switch_delay_ms: 5_000,    // 5 s
            tick_interval_ms: 250,         // 4 Hz
            telemetry_interval_secs: 60,   // 1/min

            // MAX6675 measures 0..1023.75 °C; leave headroom either side.
            sensor_min_c: -50.0,
            sensor_max_c: 1100.0,
        }
    }
}

impl RegulatorConfig {
    /// Reject values that would make regulation meaningless or unsafe.
    ///
    /// Invalid values are reported, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.target_temp_c.is_finite() {
            return Err(ConfigError::ValidationFailed("target_temp_c must be finite"));
        }
        if !(self.set_overshoot_c.is_finite() && self.set_overshoot_c >= 0.0) {
            return Err(ConfigError::ValidationFailed("set_overshoot_c must be >= 0"));
        }
        if !(self.set_undershoot_c.is_finite() && self.set_undershoot_c >= 0.0) {
            return Err(ConfigError::ValidationFailed("set_undershoot_c must be >= 0"));
        }
        if self.ramp_window_ms == 0 {
            return Err(ConfigError::ValidationFailed("ramp_window_ms must be > 0"));
        }
        if self.pwm_switch_delay_ms == 0 {
            return Err(ConfigError::ValidationFailed("pwm_switch_delay_ms must be > 0"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_interval_ms must be > 0"));
        }
        if !(self.sensor_min_c.is_finite()
            && self.sensor_max_c.is_finite()
            && self.sensor_min_c < self.sensor_max_c)
        {
            return Err(ConfigError::ValidationFailed(
                "sensor_min_c must be below sensor_max_c",
            ));
        }
        Ok(())
    }

    /// Parse a (partial) JSON override on top of the defaults and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of ticks between telemetry log lines (at least 1).
    pub fn telemetry_every_ticks(&self) -> u64 {
        // Unvalidated configs may carry a zero tick interval.
        let tick_ms = u64::from(self.tick_interval_ms).max(1);
        let ticks = u64::from(self.telemetry_interval_secs) * 1000 / tick_ms;
        ticks.max(1)
    }
}

/// Errors from configuration loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The override document is not valid JSON for this schema.
    Malformed,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "config document malformed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}
