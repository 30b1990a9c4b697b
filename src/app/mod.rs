//! Application core: pure domain logic, zero I/O.
//!
//! This module wires the regulation engine, the command processor and the
//! snapshot broadcaster into one service.  All interaction with hardware
//! happens through **port traits** defined in [`ports`], keeping this layer
//! fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod processor;
pub mod service;
