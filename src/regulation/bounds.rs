//! Trip-point ramp for AutoSwitch mode.
//!
//! After every relay transition both trip points sit on the target.  The
//! longer the relay holds its state, the further they drift out, linearly,
//! until they reach the configured offsets at the end of the ramp window:
//!
//! ```text
//!   temp
//!    ▲            derived_undershoot (upper trip)
//!    │        ╱‾‾‾‾‾‾‾‾‾‾‾‾‾‾  target + set_undershoot
//!    │      ╱
//!    │ ───●──────────────────  target
//!    │      ╲
//!    │        ╲______________  target - set_overshoot
//!    │            derived_overshoot (lower trip)
//!    └────┬─────────┬────────▶ time since last switch
//!       switch   ramp window
//! ```

/// Fraction of the ramp window elapsed, saturating at 1.0.
pub fn ramp_fraction(elapsed_ms: u64, window_ms: u64) -> f32 {
    if window_ms == 0 {
        return 1.0;
    }
    (elapsed_ms as f64 / window_ms as f64).min(1.0) as f32
}

/// The pair of derived bounds around a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripPoints {
    /// Lower trip point (`derived_overshoot`): energize below this.
    pub lower: f32,
    /// Upper trip point (`derived_undershoot`): de-energize above this.
    pub upper: f32,
}

impl TripPoints {
    /// Both trip points collapsed onto the target (state after a switch).
    pub const fn at(target: f32) -> Self {
        Self {
            lower: target,
            upper: target,
        }
    }

    /// Trip points for a given ramp fraction.
    pub fn ramped(target: f32, set_overshoot: f32, set_undershoot: f32, fraction: f32) -> Self {
        let fraction = fraction.clamp(0.0, 1.0);
        let overshoot_amount = (set_overshoot * fraction).min(set_overshoot);
        let undershoot_amount = (set_undershoot * fraction).min(set_undershoot);
        Self {
            lower: target - overshoot_amount,
            upper: target + undershoot_amount,
        }
    }

    /// Move the band onto a new target, keeping the ramp offsets already
    /// applied (clipped to the configured ceilings).
    pub fn retarget(
        self,
        old_target: f32,
        new_target: f32,
        set_overshoot: f32,
        set_undershoot: f32,
    ) -> Self {
        let below = (old_target - self.lower).clamp(0.0, set_overshoot);
        let above = (self.upper - old_target).clamp(0.0, set_undershoot);
        Self {
            lower: new_target - below,
            upper: new_target + above,
        }
    }
}
