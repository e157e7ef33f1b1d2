//! Role-gated transition authorization.
//!
//! Rules, first match wins:
//! 1. no actor: `Unauthenticated`
//! 2. globally privileged role: permitted
//! 3. settlement edge into or out of `AUDITING`: auditor whose level is the
//!    next expected one
//! 4. anything else: the static allow-list keyed by order type and target

use super::actor::{Actor, Role};
use super::audit::{AuditLevel, AuditProgress};
use super::status::{OrderStatus, OrderType, RefundStatus, SettlementStatus, TopupStatus};
use crate::error::{LifecycleError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    Unauthorized(String),
    WrongAuditLevel {
        expected: Option<AuditLevel>,
        got: Option<AuditLevel>,
    },
}

impl From<Denial> for LifecycleError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => Self::Unauthenticated,
            Denial::Unauthorized(reason) => Self::Unauthorized(reason),
            Denial::WrongAuditLevel { expected, got } => Self::WrongAuditLevel { expected, got },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization<'a> {
    Permit(&'a Actor),
    Deny(Denial),
}

impl<'a> Authorization<'a> {
    pub fn is_permit(&self) -> bool {
        matches!(self, Self::Permit(_))
    }

    pub fn into_result(self) -> Result<&'a Actor> {
        match self {
            Self::Permit(actor) => Ok(actor),
            Self::Deny(denial) => Err(denial.into()),
        }
    }
}

const OPERATIONS: &[Role] = &[Role::Operator, Role::Admin, Role::System];
const SETTLEMENT_DESK: &[Role] = &[Role::Operator, Role::Finance, Role::Admin];
const FINANCE: &[Role] = &[Role::Finance, Role::Admin];
const FINANCE_AND_SYSTEM: &[Role] = &[Role::Finance, Role::Admin, Role::System];
const REFUND_DESK: &[Role] = &[Role::Operator, Role::Finance, Role::Admin];
const NOBODY: &[Role] = &[];

/// Roles allowed to move an order into `target` over a non-audit edge.
///
/// `None` marks statuses no edge leads into, so the topology check decides.
fn allowed_roles(target: OrderStatus) -> Option<&'static [Role]> {
    match target {
        OrderStatus::Topup(status) => match status {
            TopupStatus::Pending => None,
            TopupStatus::Paying
            | TopupStatus::Paid
            | TopupStatus::Success
            | TopupStatus::Failed
            | TopupStatus::Closed => Some(OPERATIONS),
            TopupStatus::Refunded => Some(FINANCE),
        },
        OrderStatus::Settlement(status) => match status {
            SettlementStatus::Pending => None,
            SettlementStatus::PendingAudit => Some(SETTLEMENT_DESK),
            SettlementStatus::Settling => Some(FINANCE),
            SettlementStatus::Success | SettlementStatus::Failed => Some(FINANCE_AND_SYSTEM),
            // Reached only over audit edges.
            SettlementStatus::Auditing
            | SettlementStatus::Approved
            | SettlementStatus::Rejected => Some(NOBODY),
        },
        OrderStatus::Refund(status) => match status {
            RefundStatus::Pending => None,
            RefundStatus::Processing => Some(REFUND_DESK),
            RefundStatus::Rejected => Some(FINANCE),
            RefundStatus::Success | RefundStatus::Failed => Some(FINANCE_AND_SYSTEM),
        },
    }
}

/// Settlement edges that take part in audit escalation.
pub fn is_audit_edge(order_type: OrderType, from: OrderStatus, to: OrderStatus) -> bool {
    const AUDITING: OrderStatus = OrderStatus::Settlement(SettlementStatus::Auditing);
    order_type == OrderType::Settlement && (from == AUDITING || to == AUDITING)
}

pub fn authorize<'a>(
    actor: Option<&'a Actor>,
    order_type: OrderType,
    from: OrderStatus,
    to: OrderStatus,
    progress: Option<&AuditProgress>,
) -> Authorization<'a> {
    let Some(actor) = actor else {
        return Authorization::Deny(Denial::Unauthenticated);
    };

    if actor.role.is_globally_privileged() {
        return Authorization::Permit(actor);
    }

    if is_audit_edge(order_type, from, to) {
        if actor.role != Role::Auditor {
            return Authorization::Deny(Denial::Unauthorized(format!(
                "role {} may not take part in settlement audit",
                actor.role
            )));
        }
        let expected = progress.and_then(AuditProgress::next_expected_level);
        if expected.is_none() || actor.audit_level != expected {
            return Authorization::Deny(Denial::WrongAuditLevel {
                expected,
                got: actor.audit_level,
            });
        }
        return Authorization::Permit(actor);
    }

    match allowed_roles(to) {
        Some(roles) if roles.contains(&actor.role) => Authorization::Permit(actor),
        Some(_) => Authorization::Deny(Denial::Unauthorized(format!(
            "role {} may not move {} order {} -> {}",
            actor.role, order_type, from, to
        ))),
        None => Authorization::Permit(actor),
    }
}

/// Recomputing required audit levels is an administrative action.
pub fn authorize_recompute(actor: Option<&Actor>) -> Authorization<'_> {
    match actor {
        None => Authorization::Deny(Denial::Unauthenticated),
        Some(actor) if matches!(actor.role, Role::SuperAdmin | Role::Admin) => {
            Authorization::Permit(actor)
        }
        Some(actor) => Authorization::Deny(Denial::Unauthorized(format!(
            "role {} may not recompute audit levels",
            actor.role
        ))),
    }
}
