use crate::domain::audit::AuditLevel;
use crate::domain::order::OrderId;
use crate::domain::status::OrderType;
use rust_decimal::Decimal;
use thiserror::Error;

/// Renders an optional audit level, using `none` when no level applies.
fn level_or_none(level: &Option<AuditLevel>) -> String {
    level.map_or_else(|| "none".to_string(), |l| l.to_string())
}

#[derive(Error, Debug)]
pub enum LifecycleError {
    /// The requested edge does not exist in the order type's transition table.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("request carries no authenticated actor")]
    Unauthenticated,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error(
        "wrong audit level: expected {}, got {}",
        level_or_none(expected),
        level_or_none(got)
    )]
    WrongAuditLevel {
        expected: Option<AuditLevel>,
        got: Option<AuditLevel>,
    },

    /// An audit decision targeted a level other than the next expected one.
    #[error(
        "out of order audit decision: expected {}, got {got}",
        level_or_none(expected)
    )]
    OutOfOrderAudit {
        expected: Option<AuditLevel>,
        got: AuditLevel,
    },

    #[error("no audit threshold applies to amount {amount}")]
    NoApplicableAuditLevel { amount: Decimal },

    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("order {0} already exists")]
    DuplicateOrder(OrderId),

    #[error("order type mismatch: order is {expected}, request is {got}")]
    OrderTypeMismatch { expected: OrderType, got: OrderType },

    /// The stored version moved between read and conditional write.
    #[error("concurrent modification of order {order_id} (read version {expected_version})")]
    ConcurrentModification {
        order_id: OrderId,
        expected_version: u64,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),

    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl LifecycleError {
    /// Whether the error denies the actor, as opposed to rejecting the edge itself.
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated | Self::Unauthorized(_) | Self::WrongAuditLevel { .. }
        )
    }

    /// Whether re-reading the order and resubmitting could succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
