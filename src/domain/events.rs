use super::audit::AuditLevel;
use super::order::OrderId;
use super::status::OrderStatus;
use serde::Serialize;

/// Outcomes handed to the notification collaborator after a committed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    StatusChanged {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
        actor_id: String,
    },
    AuditLevelApproved {
        order_id: OrderId,
        level: AuditLevel,
        next: Option<AuditLevel>,
    },
    SettlementFullyApproved {
        order_id: OrderId,
    },
    OrderRejected {
        order_id: OrderId,
        level: AuditLevel,
    },
    ReturnedForRevision {
        order_id: OrderId,
        next: Option<AuditLevel>,
    },
    AuditLevelsRecomputed {
        order_id: OrderId,
        required: Vec<AuditLevel>,
    },
}

impl LifecycleEvent {
    pub fn order_id(&self) -> OrderId {
        match self {
            Self::StatusChanged { order_id, .. }
            | Self::AuditLevelApproved { order_id, .. }
            | Self::SettlementFullyApproved { order_id }
            | Self::OrderRejected { order_id, .. }
            | Self::ReturnedForRevision { order_id, .. }
            | Self::AuditLevelsRecomputed { order_id, .. } => *order_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::StatusChanged { .. } => "status_changed",
            Self::AuditLevelApproved { .. } => "audit_level_approved",
            Self::SettlementFullyApproved { .. } => "settlement_fully_approved",
            Self::OrderRejected { .. } => "order_rejected",
            Self::ReturnedForRevision { .. } => "returned_for_revision",
            Self::AuditLevelsRecomputed { .. } => "audit_levels_recomputed",
        }
    }
}
