use super::coordinator::{LifecycleCoordinator, TransitionRequest};
use crate::domain::actor::Actor;
use crate::domain::order::{Amount, OrderId};
use crate::domain::status::OrderType;
use crate::error::Result;

/// One unit of work for the coordinator, as read from a batch input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Open {
        order_id: OrderId,
        order_type: OrderType,
        amount: Amount,
    },
    Transition(TransitionRequest),
    Recompute {
        order_id: OrderId,
        actor: Option<Actor>,
    },
}

impl LifecycleCoordinator {
    /// Executes a command, discarding its successful outcome.
    pub async fn execute(&self, command: Command) -> Result<()> {
        match command {
            Command::Open {
                order_id,
                order_type,
                amount,
            } => {
                self.open_order(order_id, order_type, amount).await?;
            }
            Command::Transition(request) => {
                self.request_transition(request).await?;
            }
            Command::Recompute { order_id, actor } => {
                self.recompute_audit_levels(order_id, actor.as_ref()).await?;
            }
        }
        Ok(())
    }
}
