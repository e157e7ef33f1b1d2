use super::machine::LifecycleState;
use crate::error::{LifecycleError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selects the topology and the audit rules an order follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Topup,
    Settlement,
    Refund,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Topup => "TOPUP",
            Self::Settlement => "SETTLEMENT",
            Self::Refund => "REFUND",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TopupStatus {
    Pending,
    Paying,
    Paid,
    Success,
    Failed,
    Closed,
    Refunded,
}

impl LifecycleState for TopupStatus {
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::Paying,
        Self::Paid,
        Self::Success,
        Self::Failed,
        Self::Closed,
        Self::Refunded,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paying => "PAYING",
            Self::Paid => "PAID",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Closed => "CLOSED",
            Self::Refunded => "REFUNDED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementStatus {
    Pending,
    PendingAudit,
    Auditing,
    Approved,
    Rejected,
    Settling,
    Success,
    Failed,
}

impl LifecycleState for SettlementStatus {
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::PendingAudit,
        Self::Auditing,
        Self::Approved,
        Self::Rejected,
        Self::Settling,
        Self::Success,
        Self::Failed,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::PendingAudit => "PENDING_AUDIT",
            Self::Auditing => "AUDITING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Settling => "SETTLING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    Pending,
    Processing,
    Success,
    Failed,
    Rejected,
}

impl LifecycleState for RefundStatus {
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::Processing,
        Self::Success,
        Self::Failed,
        Self::Rejected,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for TopupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The status of an order, tagged with the family it belongs to.
///
/// Wrapping each family in its own variant makes a status from the wrong
/// order type unrepresentable inside a transition table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Topup(TopupStatus),
    Settlement(SettlementStatus),
    Refund(RefundStatus),
}

impl OrderStatus {
    /// The status every order is opened with.
    pub fn initial(order_type: OrderType) -> Self {
        match order_type {
            OrderType::Topup => Self::Topup(TopupStatus::Pending),
            OrderType::Settlement => Self::Settlement(SettlementStatus::Pending),
            OrderType::Refund => Self::Refund(RefundStatus::Pending),
        }
    }

    pub fn order_type(&self) -> OrderType {
        match self {
            Self::Topup(_) => OrderType::Topup,
            Self::Settlement(_) => OrderType::Settlement,
            Self::Refund(_) => OrderType::Refund,
        }
    }

    /// Parses a status name within the family of `order_type`.
    pub fn parse(order_type: OrderType, input: &str) -> Result<Self> {
        let parsed = match order_type {
            OrderType::Topup => TopupStatus::parse(input).map(Self::Topup),
            OrderType::Settlement => SettlementStatus::parse(input).map(Self::Settlement),
            OrderType::Refund => RefundStatus::parse(input).map(Self::Refund),
        };
        parsed.ok_or_else(|| {
            LifecycleError::ValidationError(format!(
                "unknown {} status '{}'",
                order_type,
                input.trim()
            ))
        })
    }

    /// Every status of every family.
    pub fn all() -> impl Iterator<Item = Self> {
        TopupStatus::ALL
            .iter()
            .copied()
            .map(Self::Topup)
            .chain(SettlementStatus::ALL.iter().copied().map(Self::Settlement))
            .chain(RefundStatus::ALL.iter().copied().map(Self::Refund))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topup(s) => s.as_str(),
            Self::Settlement(s) => s.as_str(),
            Self::Refund(s) => s.as_str(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
