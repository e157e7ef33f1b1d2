//! Application layer orchestrating the order lifecycle.
//!
//! `LifecycleCoordinator` is the only writer of order records. Each request
//! is one read and one version-conditioned write against the store port, so
//! requests for different orders never contend and requests for the same
//! order are serialized by the store's compare-and-swap.

pub mod command;
pub mod coordinator;
