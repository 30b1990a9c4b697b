//! Outbound state snapshot (JSON text frame).
//!
//! ```json
//! {"temperature":287.25,"relais":1,"target_temp":300.0,
//!  "derived_overshoot":298.5,"derived_undershoot":301.5,"mode":"auto_switch"}
//! ```
//!
//! `temperature` is `null` until the first valid sample.  `fault` is only
//! present while the thermocouple is unavailable.

use serde::Serialize;

use crate::regulation::{Mode, StateView};

/// Wire representation of a [`StateView`].
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub temperature: Option<f32>,
    pub relais: u8,
    pub target_temp: f32,
    pub derived_overshoot: f32,
    pub derived_undershoot: f32,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<&'static str>,
}

impl From<&StateView> for Snapshot {
    fn from(view: &StateView) -> Self {
        Self {
            temperature: view.temperature,
            relais: u8::from(view.relay_energized),
            target_temp: view.target_temp,
            derived_overshoot: view.derived_overshoot,
            derived_undershoot: view.derived_undershoot,
            mode: view.mode,
            fault: view.fault.map(crate::error::SensorError::as_str),
        }
    }
}

/// Serialize a view into a text frame.
pub fn encode(view: &StateView) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Snapshot::from(view))
}
