//! Lifecycle control for topup, settlement and refund orders.
//!
//! The crate decides whether, and by whom, an order's status may change:
//! static per-type transition tables, tiered audit escalation for settlement
//! orders, a single authorization gate, and a coordinator that commits each
//! transition with an optimistic-concurrency write.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod telemetry;
