use super::actor::Role;
use super::audit::{AuditDecision, AuditLevel, AuditProgress};
use super::status::{OrderStatus, OrderType};
use crate::error::LifecycleError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strictly positive order amount.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, LifecycleError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LifecycleError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LifecycleError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryAction {
    Transition,
    AuditDecision {
        level: AuditLevel,
        decision: AuditDecision,
    },
    AuditLevelsRecomputed {
        required: Vec<AuditLevel>,
    },
}

/// One applied change, kept for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub actor_id: String,
    pub role: Role,
    pub action: HistoryAction,
    pub at: DateTime<Utc>,
}

/// Everything a conditional write replaces or appends.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderUpdate {
    pub status: OrderStatus,
    pub audit_progress: Option<AuditProgress>,
    pub history_entry: HistoryEntry,
}

/// An order under lifecycle control.
///
/// Orders are never deleted; they end in a terminal status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_type: OrderType,
    pub status: OrderStatus,
    /// Optimistic-concurrency token, bumped by every write.
    pub version: u64,
    pub amount: Amount,
    /// Settlement orders only. `None` on a settlement order means no
    /// threshold matched its amount when it was opened.
    pub audit_progress: Option<AuditProgress>,
    pub history: Vec<HistoryEntry>,
}

impl Order {
    pub const INITIAL_VERSION: u64 = 1;

    pub fn open(
        id: OrderId,
        order_type: OrderType,
        amount: Amount,
        audit_progress: Option<AuditProgress>,
    ) -> Self {
        let audit_progress = match order_type {
            OrderType::Settlement => audit_progress,
            OrderType::Topup | OrderType::Refund => None,
        };
        Self {
            id,
            order_type,
            status: OrderStatus::initial(order_type),
            version: Self::INITIAL_VERSION,
            amount,
            audit_progress,
            history: Vec::new(),
        }
    }

    /// Applies a committed update and bumps the version.
    pub fn apply(&mut self, update: OrderUpdate) {
        self.status = update.status;
        self.audit_progress = update.audit_progress;
        self.history.push(update.history_entry);
        self.version += 1;
    }

    /// Highest approved audit level, for settlement orders with progress.
    pub fn approved_level(&self) -> Option<AuditLevel> {
        self.audit_progress
            .as_ref()
            .map(AuditProgress::highest_approved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::{SettlementStatus, TopupStatus};
    use rust_decimal_macros::dec;

    fn entry(from: OrderStatus, to: OrderStatus) -> HistoryEntry {
        HistoryEntry {
            from,
            to,
            actor_id: "op-1".to_string(),
            role: Role::Operator,
            action: HistoryAction::Transition,
            at: Utc::now(),
        }
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(LifecycleError::ValidationError(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(LifecycleError::ValidationError(_))
        ));
    }

    #[test]
    fn test_open_drops_progress_for_non_settlement() {
        let progress = AuditProgress::new(vec![AuditLevel::new(1)]);
        let topup = Order::open(
            OrderId(1),
            OrderType::Topup,
            Amount::new(dec!(10)).unwrap(),
            Some(progress.clone()),
        );
        assert_eq!(topup.audit_progress, None);
        assert_eq!(topup.status, OrderStatus::Topup(TopupStatus::Pending));
        assert_eq!(topup.version, Order::INITIAL_VERSION);

        let settlement = Order::open(
            OrderId(2),
            OrderType::Settlement,
            Amount::new(dec!(10)).unwrap(),
            Some(progress),
        );
        assert_eq!(settlement.approved_level(), Some(AuditLevel::NONE));
    }

    #[test]
    fn test_apply_bumps_version_and_appends_history() {
        let mut order = Order::open(
            OrderId(1),
            OrderType::Settlement,
            Amount::new(dec!(10)).unwrap(),
            None,
        );
        let to = OrderStatus::Settlement(SettlementStatus::Failed);
        order.apply(OrderUpdate {
            status: to,
            audit_progress: None,
            history_entry: entry(order.status, to),
        });

        assert_eq!(order.status, to);
        assert_eq!(order.version, 2);
        assert_eq!(order.history.len(), 1);
        assert_eq!(order.history[0].to, to);
    }

    #[test]
    fn test_amount_deserialization_rejects_non_positive() {
        assert!(serde_json::from_str::<Amount>("\"12.5\"").is_ok());
        assert!(serde_json::from_str::<Amount>("\"0\"").is_err());
    }
}
