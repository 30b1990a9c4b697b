//! GPIO assignments for the oven controller board.
//!
//! Single source of truth: `main` takes pins by these numbers rather than
//! hard-coding them at the call site.

// ---------------------------------------------------------------------------
// Heating element
// ---------------------------------------------------------------------------

/// Digital output driving the relay module (HIGH = element on).
pub const RELAY_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// MAX6675 thermocouple amplifier (bit-banged)
// ---------------------------------------------------------------------------

/// Serial data out of the MAX6675 (input on our side).
pub const THERMO_SO_GPIO: i32 = 19;
/// Chip select, active LOW.
pub const THERMO_CS_GPIO: i32 = 23;
/// Serial clock.
pub const THERMO_SCK_GPIO: i32 = 5;
