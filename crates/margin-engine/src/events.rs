//! Engine output events
//!
//! Collaborators observe the engine through [`EngineObserver`], implemented
//! for closures and for unbounded channel senders.

use margin_issue::IssueId;
use tokio::sync::mpsc;

/// Event emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Document content changed; carries the full serialized content
    ContentChanged(String),
    /// Suggestion for this issue was committed
    SuggestionAccepted(IssueId),
}

impl EngineEvent {
    /// Content carried by a `ContentChanged` event
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::ContentChanged(content) => Some(content),
            Self::SuggestionAccepted(_) => None,
        }
    }

    /// Issue carried by a `SuggestionAccepted` event
    #[must_use]
    pub fn accepted(&self) -> Option<&IssueId> {
        match self {
            Self::SuggestionAccepted(id) => Some(id),
            Self::ContentChanged(_) => None,
        }
    }
}

/// Receiver of engine events
pub trait EngineObserver: Send {
    /// Handle one event
    fn on_event(&mut self, event: &EngineEvent);
}

impl<F> EngineObserver for F
where
    F: FnMut(&EngineEvent) + Send,
{
    fn on_event(&mut self, event: &EngineEvent) {
        self(event);
    }
}

impl EngineObserver for mpsc::UnboundedSender<EngineEvent> {
    fn on_event(&mut self, event: &EngineEvent) {
        // A dropped receiver just stops listening.
        let _ = self.send(event.clone());
    }
}
