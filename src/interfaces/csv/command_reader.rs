use crate::application::command::Command;
use crate::application::coordinator::TransitionRequest;
use crate::domain::actor::{Actor, Role};
use crate::domain::audit::{AuditDecision, AuditLevel};
use crate::domain::order::{Amount, OrderId};
use crate::domain::status::{OrderStatus, OrderType};
use crate::error::{LifecycleError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Open,
    Transition,
    Recompute,
}

/// One row of a command file.
///
/// Columns: `command, order, type, amount, target, actor, role, level, decision, version`.
/// Columns a command does not use are left empty.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CommandRecord {
    pub command: CommandKind,
    pub order: u64,
    pub r#type: OrderType,
    pub amount: Option<Decimal>,
    pub target: Option<String>,
    pub actor: Option<String>,
    pub role: Option<Role>,
    pub level: Option<u8>,
    pub decision: Option<AuditDecision>,
    pub version: Option<u64>,
}

impl CommandRecord {
    fn actor(&self) -> Result<Option<Actor>> {
        match (&self.actor, self.role) {
            (None, None) => Ok(None),
            (Some(id), Some(role)) => {
                let mut actor = Actor::new(id.clone(), role);
                if let Some(level) = self.level {
                    actor = actor.with_audit_level(AuditLevel::new(level));
                }
                Ok(Some(actor))
            }
            _ => Err(LifecycleError::ValidationError(format!(
                "order {}: actor and role must be given together",
                self.order
            ))),
        }
    }
}

impl TryFrom<CommandRecord> for Command {
    type Error = LifecycleError;

    fn try_from(record: CommandRecord) -> Result<Self> {
        let order_id = OrderId(record.order);
        match record.command {
            CommandKind::Open => {
                let amount = record.amount.ok_or_else(|| {
                    LifecycleError::ValidationError(format!(
                        "order {order_id}: open requires an amount"
                    ))
                })?;
                Ok(Command::Open {
                    order_id,
                    order_type: record.r#type,
                    amount: Amount::new(amount)?,
                })
            }
            CommandKind::Transition => {
                let target = record.target.as_deref().ok_or_else(|| {
                    LifecycleError::ValidationError(format!(
                        "order {order_id}: transition requires a target"
                    ))
                })?;
                let target = OrderStatus::parse(record.r#type, target)?;
                let mut request = TransitionRequest::new(order_id, target, record.actor()?);
                request.decision = record.decision;
                request.expected_version = record.version;
                Ok(Command::Transition(request))
            }
            CommandKind::Recompute => Ok(Command::Recompute {
                order_id,
                actor: record.actor()?,
            }),
        }
    }
}

/// Reads commands from a CSV source.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and converts commands, one `Result` per row.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize::<CommandRecord>()
            .map(|result| result.map_err(LifecycleError::from).and_then(Command::try_from))
    }
}
