//! Hand-off between the network side and the control loop.
//!
//! The regulation state has exactly one writer, the control loop.  The
//! transport never touches it; it only pushes frames and session events
//! into the bounded queues in [`channels`], which the loop drains once per
//! tick.

pub mod channels;
