use crate::domain::events::LifecycleEvent;
use crate::domain::ports::EventSink;
use crate::error::Result;
use async_trait::async_trait;

/// Emits each lifecycle event as a structured `tracing` record.
///
/// Stands in for the notification collaborator when no downstream
/// dispatcher is wired up, e.g. in the batch CLI.
#[derive(Default, Clone, Copy)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn dispatch(&self, event: LifecycleEvent) -> Result<()> {
        let payload = serde_json::to_string(&event)?;
        tracing::info!(
            target: "order_lifecycle::events",
            order_id = %event.order_id(),
            event = event.name(),
            %payload,
            "lifecycle event"
        );
        Ok(())
    }
}
