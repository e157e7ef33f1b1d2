use crate::domain::order::{Order, OrderId, OrderUpdate};
use crate::domain::ports::{OrderStore, SaveOutcome};
use crate::error::{LifecycleError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing order records.
pub const CF_ORDERS: &str = "orders";

/// A persistent order store using RocksDB.
///
/// Orders are stored as JSON keyed by the big-endian order id. Writes that
/// must observe the current version go through `write_lock`, which makes the
/// read-compare-put sequence of `insert` and `save` atomic for this process.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "orders" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn orders_cf(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_ORDERS).ok_or_else(|| {
            LifecycleError::InternalError(Box::new(std::io::Error::other(
                "Orders column family not found",
            )))
        })
    }

    fn read(&self, id: OrderId) -> Result<Option<Order>> {
        let cf = self.orders_cf()?;
        match self.db.get_cf(cf, id.0.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, order: &Order) -> Result<()> {
        let cf = self.orders_cf()?;
        let value = serde_json::to_vec(order)?;
        self.db.put_cf(cf, order.id.0.to_be_bytes(), value)?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if self.read(order.id)?.is_some() {
            return Err(LifecycleError::DuplicateOrder(order.id));
        }
        self.write(&order)
    }

    async fn load(&self, id: OrderId) -> Result<Option<Order>> {
        self.read(id)
    }

    async fn save(
        &self,
        id: OrderId,
        expected_version: u64,
        update: OrderUpdate,
    ) -> Result<SaveOutcome> {
        let _guard = self.write_lock.lock().await;
        let mut order = self.read(id)?.ok_or(LifecycleError::OrderNotFound(id))?;

        if order.version != expected_version {
            return Ok(SaveOutcome::VersionConflict {
                current: order.version,
            });
        }
        order.apply(update);
        self.write(&order)?;
        Ok(SaveOutcome::Saved {
            version: order.version,
        })
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        let cf = self.orders_cf()?;
        let mut orders = Vec::new();

        // Big-endian keys iterate in ascending id order.
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            orders.push(serde_json::from_slice(&value)?);
        }
        Ok(orders)
    }
}
