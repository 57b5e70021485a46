//! The `ActionCatalogue` trait and the action record it serves.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CatalogueError;

/// An automated action the editor can attach to an Automated node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationAction {
    pub id: String,
    pub label: String,
    pub description: String,
    /// Parameter names, in the order the form should show them.
    pub params: Vec<String>,
}

impl AutomationAction {
    pub fn new(id: &str, label: &str, description: &str, params: &[&str]) -> Self {
        Self {
            id: id.to_owned(),
            label: label.to_owned(),
            description: description.to_owned(),
            params: params.iter().map(|p| (*p).to_owned()).collect(),
        }
    }
}

/// Read-only source of selectable actions.
#[async_trait]
pub trait ActionCatalogue: Send + Sync {
    /// Every available action, in display order.
    async fn list(&self) -> Result<Vec<AutomationAction>, CatalogueError>;

    /// Look up a single action by id.
    async fn find(&self, id: &str) -> Result<AutomationAction, CatalogueError> {
        self.list()
            .await?
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| CatalogueError::UnknownAction(id.to_owned()))
    }
}
