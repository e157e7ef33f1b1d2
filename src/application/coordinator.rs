use crate::domain::actor::Actor;
use crate::domain::audit::{AuditDecision, AuditLevel, AuditProgress};
use crate::domain::authorization::{authorize, authorize_recompute};
use crate::domain::events::LifecycleEvent;
use crate::domain::order::{Amount, HistoryAction, HistoryEntry, Order, OrderId, OrderUpdate};
use crate::domain::ports::{EventSinkBox, OrderStoreBox, SaveOutcome, SettingsProviderBox};
use crate::domain::status::{OrderStatus, OrderType, SettlementStatus};
use crate::domain::transition;
use crate::error::{LifecycleError, Result};
use chrono::Utc;
use std::fmt;
use tracing::{debug, info, instrument, warn};

const PENDING_AUDIT: OrderStatus = OrderStatus::Settlement(SettlementStatus::PendingAudit);
const APPROVED: OrderStatus = OrderStatus::Settlement(SettlementStatus::Approved);
const REJECTED: OrderStatus = OrderStatus::Settlement(SettlementStatus::Rejected);

/// A request to move one order to `target`.
///
/// The order type travels with the target status, so a request can never
/// name one type and a status of another.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    pub order_id: OrderId,
    pub target: OrderStatus,
    pub actor: Option<Actor>,
    pub decision: Option<AuditDecision>,
    /// Version the caller last read, if it wants the request bound to it.
    pub expected_version: Option<u64>,
}

impl TransitionRequest {
    pub fn new(order_id: OrderId, target: OrderStatus, actor: Option<Actor>) -> Self {
        Self {
            order_id,
            target,
            actor,
            decision: None,
            expected_version: None,
        }
    }

    pub fn with_decision(mut self, decision: AuditDecision) -> Self {
        self.decision = Some(decision);
        self
    }

    pub fn with_expected_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }

    pub fn order_type(&self) -> OrderType {
        self.target.order_type()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub version: u64,
    pub events: Vec<LifecycleEvent>,
}

/// How far a transition request got before it committed or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Received,
    Authorized,
    Validated,
    Persisted,
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Received => "RECEIVED",
            Self::Authorized => "AUTHORIZED",
            Self::Validated => "VALIDATED",
            Self::Persisted => "PERSISTED",
        };
        f.write_str(s)
    }
}

/// The write a request resolves to, before it is persisted.
struct Plan {
    status: OrderStatus,
    progress: Option<AuditProgress>,
    action: HistoryAction,
    events: Vec<LifecycleEvent>,
}

/// Orchestrates order creation and transitions end to end.
///
/// Holds no per-order state of its own: every request reads the order,
/// decides, and commits with a single version-conditioned write. A lost race
/// surfaces as `ConcurrentModification` and is never retried here.
pub struct LifecycleCoordinator {
    store: OrderStoreBox,
    settings: SettingsProviderBox,
    events: EventSinkBox,
}

impl LifecycleCoordinator {
    pub fn new(store: OrderStoreBox, settings: SettingsProviderBox, events: EventSinkBox) -> Self {
        Self {
            store,
            settings,
            events,
        }
    }

    /// Opens a new order at `PENDING`.
    ///
    /// Settlement orders get their required audit levels fixed here, from the
    /// threshold table as it stands now. If no threshold matches, the order is
    /// still opened but cannot enter audit until the levels are recomputed.
    #[instrument(skip_all, fields(order_id = %id, order_type = %order_type))]
    pub async fn open_order(
        &self,
        id: OrderId,
        order_type: OrderType,
        amount: Amount,
    ) -> Result<Order> {
        let audit_progress = match order_type {
            OrderType::Settlement => {
                let thresholds = self.settings.audit_thresholds().await?;
                match AuditProgress::for_amount(amount.value(), &thresholds) {
                    Ok(progress) => Some(progress),
                    Err(LifecycleError::NoApplicableAuditLevel { amount }) => {
                        warn!(%amount, "no audit threshold matches settlement amount");
                        None
                    }
                    Err(e) => return Err(e),
                }
            }
            OrderType::Topup | OrderType::Refund => None,
        };

        let order = Order::open(id, order_type, amount, audit_progress);
        self.store.insert(order.clone()).await?;
        info!(%amount, "order opened");
        Ok(order)
    }

    /// Runs one transition request through authorization, topology
    /// validation, audit escalation and the conditional write.
    #[instrument(
        skip_all,
        fields(order_id = %request.order_id, target = %request.target)
    )]
    pub async fn request_transition(&self, request: TransitionRequest) -> Result<TransitionOutcome> {
        let mut stage = RequestStage::Received;
        let result = self.run_transition(&request, &mut stage).await;
        match &result {
            Ok(outcome) => info!(
                status = %outcome.status,
                version = outcome.version,
                "transition committed"
            ),
            Err(e) => debug!(reached = %stage, error = %e, "transition refused"),
        }
        result
    }

    async fn run_transition(
        &self,
        request: &TransitionRequest,
        stage: &mut RequestStage,
    ) -> Result<TransitionOutcome> {
        let order = self.load(request.order_id).await?;
        if request.order_type() != order.order_type {
            return Err(LifecycleError::OrderTypeMismatch {
                expected: order.order_type,
                got: request.order_type(),
            });
        }
        if let Some(expected) = request.expected_version
            && expected != order.version
        {
            return Err(LifecycleError::ConcurrentModification {
                order_id: order.id,
                expected_version: expected,
            });
        }

        let from = order.status;
        let actor = authorize(
            request.actor.as_ref(),
            order.order_type,
            from,
            request.target,
            order.audit_progress.as_ref(),
        )
        .into_result()?;
        *stage = RequestStage::Authorized;

        transition::validate(from, request.target)?;
        let plan = plan_transition(&order, actor, request)?;
        if plan.status != request.target {
            debug!(effective = %plan.status, "audit decision redirected target");
            transition::validate(from, plan.status)?;
        }
        *stage = RequestStage::Validated;

        let update = OrderUpdate {
            status: plan.status,
            audit_progress: plan.progress,
            history_entry: HistoryEntry {
                from,
                to: plan.status,
                actor_id: actor.id.clone(),
                role: actor.role,
                action: plan.action,
                at: Utc::now(),
            },
        };
        let version = self.commit(order.id, order.version, update).await?;
        *stage = RequestStage::Persisted;

        let mut events = vec![LifecycleEvent::StatusChanged {
            order_id: order.id,
            from,
            to: plan.status,
            actor_id: actor.id.clone(),
        }];
        events.extend(plan.events);
        self.dispatch(&events).await;

        Ok(TransitionOutcome {
            order_id: order.id,
            status: plan.status,
            version,
            events,
        })
    }

    /// Re-derives the required audit levels of a settlement order from the
    /// current threshold table.
    ///
    /// Only allowed before any level has approved, while the order sits at
    /// `PENDING` or `PENDING_AUDIT`.
    #[instrument(skip_all, fields(order_id = %id))]
    pub async fn recompute_audit_levels(
        &self,
        id: OrderId,
        actor: Option<&Actor>,
    ) -> Result<AuditProgress> {
        let actor = authorize_recompute(actor).into_result()?;
        let order = self.load(id).await?;

        if order.order_type != OrderType::Settlement {
            return Err(LifecycleError::OrderTypeMismatch {
                expected: order.order_type,
                got: OrderType::Settlement,
            });
        }
        let recomputable = matches!(
            order.status,
            OrderStatus::Settlement(SettlementStatus::Pending | SettlementStatus::PendingAudit)
        );
        if !recomputable || order.audit_progress.as_ref().is_some_and(AuditProgress::has_approvals)
        {
            return Err(LifecycleError::ValidationError(format!(
                "audit levels of order {} cannot be recomputed at {} once audit has progressed",
                id, order.status
            )));
        }

        let thresholds = self.settings.audit_thresholds().await?;
        let progress = AuditProgress::for_amount(order.amount.value(), &thresholds)?;
        let required = progress.required().to_vec();

        let update = OrderUpdate {
            status: order.status,
            audit_progress: Some(progress.clone()),
            history_entry: HistoryEntry {
                from: order.status,
                to: order.status,
                actor_id: actor.id.clone(),
                role: actor.role,
                action: HistoryAction::AuditLevelsRecomputed {
                    required: required.clone(),
                },
                at: Utc::now(),
            },
        };
        self.commit(order.id, order.version, update).await?;
        info!(levels = ?required, "audit levels recomputed");

        self.dispatch(&[LifecycleEvent::AuditLevelsRecomputed {
            order_id: order.id,
            required,
        }])
        .await;
        Ok(progress)
    }

    /// Statuses reachable from `current`, for enabling actions in a UI.
    pub fn valid_transitions(&self, order_type: OrderType, current: OrderStatus) -> Vec<OrderStatus> {
        transition::valid_transitions_for(order_type, current)
    }

    /// Audit progress of a settlement order; `None` for other order types.
    pub async fn audit_progress(&self, id: OrderId) -> Result<Option<AuditProgress>> {
        Ok(self.load(id).await?.audit_progress)
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        self.load(id).await
    }

    /// Consumes the coordinator and returns every stored order.
    pub async fn into_orders(self) -> Result<Vec<Order>> {
        self.store.all_orders().await
    }

    async fn load(&self, id: OrderId) -> Result<Order> {
        self.store
            .load(id)
            .await?
            .ok_or(LifecycleError::OrderNotFound(id))
    }

    async fn commit(&self, id: OrderId, expected_version: u64, update: OrderUpdate) -> Result<u64> {
        match self.store.save(id, expected_version, update).await? {
            SaveOutcome::Saved { version } => Ok(version),
            SaveOutcome::VersionConflict { current } => {
                debug!(expected_version, current, "conditional write lost");
                Err(LifecycleError::ConcurrentModification {
                    order_id: id,
                    expected_version,
                })
            }
        }
    }

    /// Fire-and-forget: sink failures are logged and otherwise ignored.
    async fn dispatch(&self, events: &[LifecycleEvent]) {
        for event in events {
            if let Err(e) = self.events.dispatch(event.clone()).await {
                warn!(event = event.name(), error = %e, "event dispatch failed");
            }
        }
    }
}

fn plan_transition(order: &Order, actor: &Actor, request: &TransitionRequest) -> Result<Plan> {
    let from = match order.status {
        OrderStatus::Settlement(SettlementStatus::Auditing) => {
            return plan_audit_decision(order, actor, request);
        }
        other => other,
    };

    if request.decision.is_some() {
        return Err(LifecycleError::ValidationError(format!(
            "audit decision supplied for {} -> {}, which is not an audit decision",
            from, request.target
        )));
    }
    if from == OrderStatus::Settlement(SettlementStatus::Pending)
        && request.target == PENDING_AUDIT
        && order.audit_progress.is_none()
    {
        return Err(LifecycleError::NoApplicableAuditLevel {
            amount: order.amount.value(),
        });
    }

    Ok(Plan {
        status: request.target,
        progress: order.audit_progress.clone(),
        action: HistoryAction::Transition,
        events: Vec::new(),
    })
}

/// Resolves a request leaving `AUDITING`.
///
/// The decision is explicit or implied by the target, and an explicit one
/// may not contradict an `APPROVED` or `REJECTED` target. Without a decision
/// the order is returned for revision with its approvals intact. An approval
/// that leaves levels outstanding hands the order back to `PENDING_AUDIT` for
/// the next level; a rejection always lands on `REJECTED`.
fn plan_audit_decision(order: &Order, actor: &Actor, request: &TransitionRequest) -> Result<Plan> {
    let progress = order
        .audit_progress
        .as_ref()
        .ok_or(LifecycleError::NoApplicableAuditLevel {
            amount: order.amount.value(),
        })?;

    let implied = match request.target {
        APPROVED => Some(AuditDecision::Approve),
        REJECTED => Some(AuditDecision::Reject),
        _ => None,
    };
    if let (Some(decision), Some(implied)) = (request.decision, implied)
        && decision != implied
    {
        return Err(LifecycleError::ValidationError(format!(
            "audit decision {} contradicts target {}",
            decision, request.target
        )));
    }
    let decision = request.decision.or(implied);
    let Some(decision) = decision else {
        return Ok(Plan {
            status: request.target,
            progress: Some(progress.clone()),
            action: HistoryAction::Transition,
            events: vec![LifecycleEvent::ReturnedForRevision {
                order_id: order.id,
                next: progress.next_expected_level(),
            }],
        });
    };

    // A privileged actor without a level of its own decides for the level due.
    let level = actor
        .audit_level
        .or(progress.next_expected_level())
        .ok_or(LifecycleError::OutOfOrderAudit {
            expected: None,
            got: AuditLevel::NONE,
        })?;
    let updated = progress.record_decision(level, decision)?;

    let (status, events) = match decision {
        AuditDecision::Reject => (
            REJECTED,
            vec![LifecycleEvent::OrderRejected {
                order_id: order.id,
                level,
            }],
        ),
        AuditDecision::Approve => {
            let next = updated.next_expected_level();
            let mut events = vec![LifecycleEvent::AuditLevelApproved {
                order_id: order.id,
                level,
                next,
            }];
            if next.is_none() {
                events.push(LifecycleEvent::SettlementFullyApproved { order_id: order.id });
                (APPROVED, events)
            } else {
                (PENDING_AUDIT, events)
            }
        }
    };

    Ok(Plan {
        status,
        progress: Some(updated),
        action: HistoryAction::AuditDecision { level, decision },
        events,
    })
}
