#![allow(dead_code)]

use async_trait::async_trait;
use order_lifecycle::application::coordinator::LifecycleCoordinator;
use order_lifecycle::domain::actor::{Actor, Role};
use order_lifecycle::domain::order::{Amount, Order, OrderId, OrderUpdate};
use order_lifecycle::domain::ports::{OrderStore, OrderStoreBox, SaveOutcome};
use order_lifecycle::error::Result;
use order_lifecycle::infrastructure::in_memory::{
    InMemoryEventSink, InMemoryOrderStore, InMemorySettings,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Barrier;

pub struct Harness {
    pub coordinator: LifecycleCoordinator,
    pub store: InMemoryOrderStore,
    pub settings: InMemorySettings,
    pub events: InMemoryEventSink,
}

pub fn harness() -> Harness {
    harness_with_store(InMemoryOrderStore::new(), |store| -> OrderStoreBox { Box::new(store) })
}

/// Builds a harness whose coordinator sees `store` through `wrap`.
pub fn harness_with_store(
    store: InMemoryOrderStore,
    wrap: impl FnOnce(InMemoryOrderStore) -> OrderStoreBox,
) -> Harness {
    let settings = InMemorySettings::default();
    let events = InMemoryEventSink::new();
    let coordinator = LifecycleCoordinator::new(
        wrap(store.clone()),
        Box::new(settings.clone()),
        Box::new(events.clone()),
    );
    Harness {
        coordinator,
        store,
        settings,
        events,
    }
}

pub fn amount(value: Decimal) -> Amount {
    Amount::new(value).unwrap()
}

pub fn operator() -> Option<Actor> {
    Some(Actor::new("op-1", Role::Operator))
}

pub fn finance() -> Option<Actor> {
    Some(Actor::new("fin-1", Role::Finance))
}

pub fn auditor(level: u8) -> Option<Actor> {
    Some(Actor::auditor(format!("auditor-{level}"), level))
}

/// Order store whose first `parties` loads wait for each other before
/// returning, so that every racing request reads the same version.
pub struct GatedStore {
    inner: InMemoryOrderStore,
    barrier: Arc<Barrier>,
    parties: usize,
    loads: AtomicUsize,
}

impl GatedStore {
    pub fn new(inner: InMemoryOrderStore, parties: usize) -> Self {
        Self {
            inner,
            barrier: Arc::new(Barrier::new(parties)),
            parties,
            loads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl OrderStore for GatedStore {
    async fn insert(&self, order: Order) -> Result<()> {
        self.inner.insert(order).await
    }

    async fn load(&self, id: OrderId) -> Result<Option<Order>> {
        let order = self.inner.load(id).await?;
        if self.loads.fetch_add(1, Ordering::SeqCst) < self.parties {
            self.barrier.wait().await;
        }
        Ok(order)
    }

    async fn save(
        &self,
        id: OrderId,
        expected_version: u64,
        update: OrderUpdate,
    ) -> Result<SaveOutcome> {
        self.inner.save(id, expected_version, update).await
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        self.inner.all_orders().await
    }
}
