use crate::domain::audit::ThresholdTable;
use crate::domain::events::LifecycleEvent;
use crate::domain::order::{Order, OrderId, OrderUpdate};
use crate::domain::ports::{EventSink, OrderStore, SaveOutcome, SettingsProvider};
use crate::error::{LifecycleError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory order store.
///
/// The version check and the write happen under one write guard, so the
/// conditional save is atomic with respect to every other caller.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(LifecycleError::DuplicateOrder(order.id));
        }
        orders.insert(order.id, order);
        Ok(())
    }

    async fn load(&self, id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn save(
        &self,
        id: OrderId,
        expected_version: u64,
        update: OrderUpdate,
    ) -> Result<SaveOutcome> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&id)
            .ok_or(LifecycleError::OrderNotFound(id))?;

        if order.version != expected_version {
            return Ok(SaveOutcome::VersionConflict {
                current: order.version,
            });
        }
        order.apply(update);
        Ok(SaveOutcome::Saved {
            version: order.version,
        })
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        all.sort_by_key(|o| o.id);
        Ok(all)
    }
}

/// Settings backed by a fixed threshold table.
#[derive(Default, Clone)]
pub struct InMemorySettings {
    thresholds: Arc<RwLock<ThresholdTable>>,
}

impl InMemorySettings {
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self {
            thresholds: Arc::new(RwLock::new(thresholds)),
        }
    }

    /// Replaces the table, as an admin editing the configuration would.
    pub async fn replace(&self, thresholds: ThresholdTable) {
        *self.thresholds.write().await = thresholds;
    }
}

#[async_trait]
impl SettingsProvider for InMemorySettings {
    async fn audit_thresholds(&self) -> Result<ThresholdTable> {
        Ok(self.thresholds.read().await.clone())
    }
}

/// Collects dispatched events in order.
#[derive(Default, Clone)]
pub struct InMemoryEventSink {
    events: Arc<RwLock<Vec<LifecycleEvent>>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<LifecycleEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn dispatch(&self, event: LifecycleEvent) -> Result<()> {
        self.events.write().await.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::Role;
    use crate::domain::order::{Amount, HistoryAction, HistoryEntry};
    use crate::domain::status::{OrderStatus, OrderType, TopupStatus};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn topup(id: u64) -> Order {
        Order::open(
            OrderId(id),
            OrderType::Topup,
            Amount::new(dec!(100.0)).unwrap(),
            None,
        )
    }

    fn to_paying() -> OrderUpdate {
        OrderUpdate {
            status: OrderStatus::Topup(TopupStatus::Paying),
            audit_progress: None,
            history_entry: HistoryEntry {
                from: OrderStatus::Topup(TopupStatus::Pending),
                to: OrderStatus::Topup(TopupStatus::Paying),
                actor_id: "op".to_string(),
                role: Role::Operator,
                action: HistoryAction::Transition,
                at: Utc::now(),
            },
        }
    }

    #[tokio::test]
    async fn test_in_memory_order_store() {
        let store = InMemoryOrderStore::new();
        let order = topup(1);

        store.insert(order.clone()).await.unwrap();
        let retrieved = store.load(OrderId(1)).await.unwrap().unwrap();
        assert_eq!(retrieved, order);

        assert!(store.load(OrderId(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_fails() {
        let store = InMemoryOrderStore::new();
        store.insert(topup(1)).await.unwrap();
        let result = store.insert(topup(1)).await;
        assert!(matches!(result, Err(LifecycleError::DuplicateOrder(OrderId(1)))));
    }

    #[tokio::test]
    async fn test_save_is_version_conditioned() {
        let store = InMemoryOrderStore::new();
        store.insert(topup(1)).await.unwrap();

        let first = store.save(OrderId(1), 1, to_paying()).await.unwrap();
        assert_eq!(first, SaveOutcome::Saved { version: 2 });

        let stale = store.save(OrderId(1), 1, to_paying()).await.unwrap();
        assert_eq!(stale, SaveOutcome::VersionConflict { current: 2 });

        let stored = store.load(OrderId(1)).await.unwrap().unwrap();
        assert_eq!(stored.history.len(), 1);
        assert_eq!(stored.status, OrderStatus::Topup(TopupStatus::Paying));
    }

    #[tokio::test]
    async fn test_save_unknown_order() {
        let store = InMemoryOrderStore::new();
        let result = store.save(OrderId(5), 1, to_paying()).await;
        assert!(matches!(result, Err(LifecycleError::OrderNotFound(OrderId(5)))));
    }

    #[tokio::test]
    async fn test_all_orders_sorted_by_id() {
        let store = InMemoryOrderStore::new();
        for id in [3, 1, 2] {
            store.insert(topup(id)).await.unwrap();
        }
        let ids: Vec<u64> = store
            .all_orders()
            .await
            .unwrap()
            .iter()
            .map(|o| o.id.0)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_settings_replace() {
        let settings = InMemorySettings::default();
        assert_eq!(settings.audit_thresholds().await.unwrap().thresholds().len(), 3);

        settings
            .replace(ThresholdTable::new(Vec::new()).unwrap())
            .await;
        assert!(settings.audit_thresholds().await.unwrap().thresholds().is_empty());
    }
}
