use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::mpsc;

use parley_client::SessionEvent;

use super::EVENT_TIMEOUT_MS;

/// Waits for the first event matching `predicate`, skipping the rest.
pub async fn wait_for<F>(rx: &mut mpsc::UnboundedReceiver<SessionEvent>, mut predicate: F) -> Result<SessionEvent>
where
    F: FnMut(&SessionEvent) -> bool,
{
    tokio::time::timeout(Duration::from_millis(EVENT_TIMEOUT_MS), async {
        loop {
            let event = rx.recv().await.context("Session event channel closed")?;
            if predicate(&event) {
                return Ok(event);
            }
            tracing::debug!("[test] skipping {:?}", event);
        }
    })
    .await
    .context("Timeout waiting for session event")?
}
