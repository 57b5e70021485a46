//! The built-in action catalogue.
//!
//! Behaves like a remote lookup: every `list` call waits a short random
//! latency before answering.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use crate::{ActionCatalogue, AutomationAction, CatalogueError};

/// Catalogue of the actions shipped with the editor.
#[derive(Debug, Clone)]
pub struct BuiltinCatalogue {
    min_latency: Duration,
    max_latency: Duration,
}

impl Default for BuiltinCatalogue {
    fn default() -> Self {
        Self::with_latency(Duration::from_millis(200), Duration::from_millis(500))
    }
}

impl BuiltinCatalogue {
    /// Latency drawn uniformly from `[min, max)` on each call.
    pub fn with_latency(min: Duration, max: Duration) -> Self {
        Self { min_latency: min, max_latency: max }
    }

    /// Answers immediately.
    pub fn instant() -> Self {
        Self::with_latency(Duration::ZERO, Duration::ZERO)
    }

    /// The catalogue contents, without any latency.
    pub fn actions() -> Vec<AutomationAction> {
        vec![
            AutomationAction::new(
                "send_email",
                "Send Email",
                "Send an email notification",
                &["to", "subject", "body"],
            ),
            AutomationAction::new(
                "generate_doc",
                "Generate Document",
                "Generate PDF or Word document",
                &["template", "recipient", "format"],
            ),
            AutomationAction::new(
                "create_ticket",
                "Create Support Ticket",
                "Create ticket in support system",
                &["system", "priority", "description"],
            ),
            AutomationAction::new(
                "update_database",
                "Update Database Record",
                "Update employee database",
                &["table", "field", "value"],
            ),
            AutomationAction::new(
                "send_slack_message",
                "Send Slack Message",
                "Post message to Slack channel",
                &["channel", "message"],
            ),
        ]
    }

    fn latency(&self) -> Duration {
        let min = self.min_latency.as_millis() as u64;
        let max = self.max_latency.as_millis() as u64;
        if max <= min {
            return self.min_latency;
        }
        Duration::from_millis(rand::rng().random_range(min..max))
    }
}

#[async_trait]
impl ActionCatalogue for BuiltinCatalogue {
    async fn list(&self) -> Result<Vec<AutomationAction>, CatalogueError> {
        let latency = self.latency();
        if !latency.is_zero() {
            debug!(?latency, "simulating catalogue latency");
            tokio::time::sleep(latency).await;
        }
        Ok(Self::actions())
    }
}
