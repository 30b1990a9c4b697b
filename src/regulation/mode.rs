//! Operating modes of the regulation engine.

use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Relay forced off on entry; no automatic evaluation.
    #[default]
    Off,
    /// Hysteresis control with trip points ramping away from the target.
    AutoSwitch,
    /// Fixed-period toggle, independent of temperature.
    Pwm,
}

impl Mode {
    /// Wire name, as used in command frames and snapshots.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::AutoSwitch => "auto_switch",
            Self::Pwm => "pwm",
        }
    }

    /// Exact, case-sensitive lookup of a wire name.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "off" => Some(Self::Off),
            "auto_switch" => Some(Self::AutoSwitch),
            "pwm" => Some(Self::Pwm),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
