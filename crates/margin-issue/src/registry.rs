//! Ordered issue registry
//!
//! [`IssueRegistry`] tracks the issues of the current analysis pass together
//! with their lifecycle state. Order is insertion order and only matters
//! for display.

use crate::error::RegistryError;
use crate::issue::{Issue, IssueId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a tracked issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    /// Waiting for the user
    #[default]
    Pending,
    /// Suggestion is being applied
    Animating,
    /// Suggestion committed; the issue leaves the registry
    Applied,
}

impl IssueState {
    /// Applied is terminal
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: IssueState) -> &'static [IssueState] {
    match from {
        IssueState::Pending => &[IssueState::Animating],
        IssueState::Animating => &[IssueState::Applied],
        IssueState::Applied => &[],
    }
}

/// Validate a lifecycle transition
///
/// # Errors
/// Returns [`RegistryError::IllegalTransition`] if `to` is not reachable
/// from `from`.
pub fn validate_transition(from: IssueState, to: IssueState) -> Result<(), RegistryError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(RegistryError::IllegalTransition { from, to })
    }
}

#[derive(Debug, Clone)]
struct Entry {
    issue: Issue,
    state: IssueState,
}

/// Issues tracked during one analysis session, keyed by id
#[derive(Debug, Clone, Default)]
pub struct IssueRegistry {
    entries: IndexMap<IssueId, Entry>,
}

impl IssueRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new issue in `Pending` state
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateId`] if the id is already tracked;
    /// the registry is left unchanged.
    pub fn insert(&mut self, issue: Issue) -> Result<(), RegistryError> {
        if self.entries.contains_key(&issue.id) {
            return Err(RegistryError::DuplicateId(issue.id));
        }
        self.entries.insert(
            issue.id.clone(),
            Entry {
                issue,
                state: IssueState::Pending,
            },
        );
        Ok(())
    }

    /// Track many issues, skipping duplicate ids
    ///
    /// Returns the number of skipped issues.
    pub fn extend(&mut self, issues: impl IntoIterator<Item = Issue>) -> usize {
        let mut skipped = 0;
        for issue in issues {
            if let Err(err) = self.insert(issue) {
                tracing::warn!(%err, "skipping issue");
                skipped += 1;
            }
        }
        skipped
    }

    /// Look up an issue
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Issue> {
        self.entries.get(id).map(|e| &e.issue)
    }

    /// Check whether an id is tracked
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Lifecycle state of an issue
    #[must_use]
    pub fn state(&self, id: &str) -> Option<IssueState> {
        self.entries.get(id).map(|e| e.state)
    }

    /// Number of tracked issues
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no issue is tracked
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Issues in registry order
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.entries.values().map(|e| &e.issue)
    }

    /// Issues with their states, in registry order
    pub fn iter_with_state(&self) -> impl Iterator<Item = (&Issue, IssueState)> {
        self.entries.values().map(|e| (&e.issue, e.state))
    }

    /// Issues still waiting for the user
    pub fn pending(&self) -> impl Iterator<Item = &Issue> {
        self.iter_with_state()
            .filter(|(_, state)| *state == IssueState::Pending)
            .map(|(issue, _)| issue)
    }

    /// Move a tracked issue to a non-terminal state
    ///
    /// Reaching [`IssueState::Applied`] goes through [`IssueRegistry::complete`].
    ///
    /// # Errors
    /// Returns error if the issue is unknown or the transition is illegal.
    pub fn transition(&mut self, id: &str, to: IssueState) -> Result<(), RegistryError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(IssueId::new(id)))?;
        validate_transition(entry.state, to)?;
        if to.is_terminal() {
            return Err(RegistryError::IllegalTransition {
                from: entry.state,
                to,
            });
        }
        entry.state = to;
        Ok(())
    }

    /// Mark an animating issue applied and remove it
    ///
    /// # Errors
    /// Returns error if the issue is unknown or not animating.
    pub fn complete(&mut self, id: &str) -> Result<Issue, RegistryError> {
        let state = self
            .state(id)
            .ok_or_else(|| RegistryError::NotFound(IssueId::new(id)))?;
        validate_transition(state, IssueState::Applied)?;
        self.remove(id)
            .ok_or_else(|| RegistryError::NotFound(IssueId::new(id)))
    }

    /// Remove an issue regardless of state, keeping the order of the rest
    pub fn remove(&mut self, id: &str) -> Option<Issue> {
        self.entries.shift_remove(id).map(|e| e.issue)
    }

    /// Remove every issue
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
