//! Domain layer: order types, transition topology, audit escalation and
//! authorization rules, plus the ports the application layer depends on.

pub mod actor;
pub mod audit;
pub mod authorization;
pub mod events;
pub mod machine;
pub mod order;
pub mod ports;
pub mod status;
pub mod transition;
