//! Per-order-type transition tables.
//!
//! ```text
//! TOPUP       PENDING ──▶ PAYING ──▶ PAID ──▶ SUCCESS ──▶ REFUNDED
//!               │           │          │
//!               ├─▶ CLOSED ◀┤          │
//!               └─▶ FAILED ◀┴──────────┘
//!
//! SETTLEMENT  PENDING ──▶ PENDING_AUDIT ◀──▶ AUDITING ──▶ APPROVED ──▶ SETTLING ──▶ SUCCESS
//!               │                              │                         │
//!               └─▶ FAILED                     └─▶ REJECTED             └─▶ FAILED
//!
//! REFUND      PENDING ──▶ PROCESSING ──▶ SUCCESS
//!               │              └──▶ FAILED
//!               └─▶ REJECTED
//! ```
//!
//! `PENDING_AUDIT ⇄ AUDITING` is the only cycle.

use super::machine::{self, LifecycleState, TransitionTable};
use super::status::{OrderStatus, OrderType, RefundStatus, SettlementStatus, TopupStatus};
use crate::error::{LifecycleError, Result};

pub static TOPUP_TRANSITIONS: TransitionTable<TopupStatus> = TransitionTable::new(&[
    (
        TopupStatus::Pending,
        &[TopupStatus::Paying, TopupStatus::Closed, TopupStatus::Failed],
    ),
    (
        TopupStatus::Paying,
        &[TopupStatus::Paid, TopupStatus::Failed, TopupStatus::Closed],
    ),
    (TopupStatus::Paid, &[TopupStatus::Success, TopupStatus::Failed]),
    (TopupStatus::Success, &[TopupStatus::Refunded]),
    (TopupStatus::Failed, &[]),
    (TopupStatus::Closed, &[]),
    (TopupStatus::Refunded, &[]),
]);

pub static SETTLEMENT_TRANSITIONS: TransitionTable<SettlementStatus> = TransitionTable::new(&[
    (
        SettlementStatus::Pending,
        &[SettlementStatus::PendingAudit, SettlementStatus::Failed],
    ),
    (SettlementStatus::PendingAudit, &[SettlementStatus::Auditing]),
    (
        SettlementStatus::Auditing,
        &[
            SettlementStatus::Approved,
            SettlementStatus::Rejected,
            SettlementStatus::PendingAudit,
        ],
    ),
    (SettlementStatus::Approved, &[SettlementStatus::Settling]),
    (
        SettlementStatus::Settling,
        &[SettlementStatus::Success, SettlementStatus::Failed],
    ),
    (SettlementStatus::Rejected, &[]),
    (SettlementStatus::Success, &[]),
    (SettlementStatus::Failed, &[]),
]);

pub static REFUND_TRANSITIONS: TransitionTable<RefundStatus> = TransitionTable::new(&[
    (
        RefundStatus::Pending,
        &[RefundStatus::Processing, RefundStatus::Rejected],
    ),
    (
        RefundStatus::Processing,
        &[RefundStatus::Success, RefundStatus::Failed],
    ),
    (RefundStatus::Success, &[]),
    (RefundStatus::Failed, &[]),
    (RefundStatus::Rejected, &[]),
]);

fn lift<S: LifecycleState>(next: &[S], wrap: fn(S) -> OrderStatus) -> Vec<OrderStatus> {
    next.iter().copied().map(wrap).collect()
}

/// States reachable from `status` in one step.
pub fn allowed_next(status: OrderStatus) -> Vec<OrderStatus> {
    match status {
        OrderStatus::Topup(s) => lift(
            &machine::valid_transitions(&TOPUP_TRANSITIONS, s),
            OrderStatus::Topup,
        ),
        OrderStatus::Settlement(s) => lift(
            &machine::valid_transitions(&SETTLEMENT_TRANSITIONS, s),
            OrderStatus::Settlement,
        ),
        OrderStatus::Refund(s) => lift(
            &machine::valid_transitions(&REFUND_TRANSITIONS, s),
            OrderStatus::Refund,
        ),
    }
}

/// Like [`allowed_next`], but empty when `status` is not a status of `order_type`.
pub fn valid_transitions_for(order_type: OrderType, status: OrderStatus) -> Vec<OrderStatus> {
    if status.order_type() != order_type {
        return Vec::new();
    }
    allowed_next(status)
}

pub fn is_terminal(status: OrderStatus) -> bool {
    allowed_next(status).is_empty()
}

pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    validate(from, to).is_ok()
}

/// Validates `from -> to` against the table of their family.
///
/// Statuses of different families are never connected.
pub fn validate(from: OrderStatus, to: OrderStatus) -> Result<()> {
    match (from, to) {
        (OrderStatus::Topup(f), OrderStatus::Topup(t)) => {
            machine::validate_transition(&TOPUP_TRANSITIONS, f, t)
        }
        (OrderStatus::Settlement(f), OrderStatus::Settlement(t)) => {
            machine::validate_transition(&SETTLEMENT_TRANSITIONS, f, t)
        }
        (OrderStatus::Refund(f), OrderStatus::Refund(t)) => {
            machine::validate_transition(&REFUND_TRANSITIONS, f, t)
        }
        _ => Err(LifecycleError::InvalidTransition {
            from: format!("{}:{}", from.order_type(), from),
            to: format!("{}:{}", to.order_type(), to),
        }),
    }
}
