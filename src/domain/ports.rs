use super::audit::ThresholdTable;
use super::events::LifecycleEvent;
use super::order::{Order, OrderId, OrderUpdate};
use crate::error::Result;
use async_trait::async_trait;

/// Result of a version-conditioned write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { version: u64 },
    VersionConflict { current: u64 },
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Stores a newly opened order; fails with `DuplicateOrder` if the id is taken.
    async fn insert(&self, order: Order) -> Result<()>;
    async fn load(&self, id: OrderId) -> Result<Option<Order>>;
    /// Applies `update` only if the stored version still equals `expected_version`.
    async fn save(&self, id: OrderId, expected_version: u64, update: OrderUpdate)
    -> Result<SaveOutcome>;
    async fn all_orders(&self) -> Result<Vec<Order>>;
}

#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn audit_thresholds(&self) -> Result<ThresholdTable>;
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn dispatch(&self, event: LifecycleEvent) -> Result<()>;
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type SettingsProviderBox = Box<dyn SettingsProvider>;
pub type EventSinkBox = Box<dyn EventSink>;
