//! `MockCatalogue` — a test double for `ActionCatalogue`.
//!
//! Useful where the built-in catalogue's contents or latency are irrelevant,
//! or where a caller's handling of an unavailable catalogue needs testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{ActionCatalogue, AutomationAction, CatalogueError};

/// Behaviour injected into `MockCatalogue` at construction time.
pub enum MockBehaviour {
    /// Answer with these actions.
    Return(Vec<AutomationAction>),
    /// Fail with `CatalogueError::Unavailable`.
    Unavailable(String),
}

/// A catalogue that counts its calls and answers as programmed.
pub struct MockCatalogue {
    pub behaviour: MockBehaviour,
    calls: AtomicUsize,
}

impl MockCatalogue {
    pub fn returning(actions: Vec<AutomationAction>) -> Self {
        Self {
            behaviour: MockBehaviour::Return(actions),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self {
            behaviour: MockBehaviour::Unavailable(msg.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `list` has been called (including via `find`).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActionCatalogue for MockCatalogue {
    async fn list(&self) -> Result<Vec<AutomationAction>, CatalogueError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behaviour {
            MockBehaviour::Return(actions) => Ok(actions.clone()),
            MockBehaviour::Unavailable(msg) => Err(CatalogueError::Unavailable(msg.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_goes_through_list() {
        let mock = MockCatalogue::returning(vec![AutomationAction::new(
            "ping",
            "Ping",
            "Ping a host",
            &["host"],
        )]);

        let action = mock.find("ping").await.unwrap();
        assert_eq!(action.params, vec!["host"]);
        assert!(mock.find("pong").await.is_err());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn unavailable_propagates_through_find() {
        let mock = MockCatalogue::unavailable("connection refused");
        assert_eq!(
            mock.find("ping").await,
            Err(CatalogueError::Unavailable("connection refused".into()))
        );
        assert_eq!(mock.call_count(), 1);
    }
}
