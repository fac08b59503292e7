//! Deferred commit tasks
//!
//! [`DeferredTasks`] is a small arena of one-shot tasks keyed by issue id.
//! It never sleeps on its own: the engine asks for due tasks with
//! [`DeferredTasks::take_due`] and uses [`DeferredTasks::next_deadline`] to
//! decide how long to wait.

use margin_issue::IssueId;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Task {
    id: IssueId,
    deadline: Instant,
    seq: u64,
}

/// Scheduled one-shot tasks, at most one per issue
#[derive(Debug, Clone, Default)]
pub struct DeferredTasks {
    tasks: Vec<Task>,
    next_seq: u64,
}

impl DeferredTasks {
    /// Create empty arena
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a task for `id`, replacing any earlier one
    ///
    /// Returns `true` if an earlier task was replaced.
    pub fn schedule(&mut self, id: IssueId, deadline: Instant) -> bool {
        let replaced = self.cancel(id.as_str());
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(Task { id, deadline, seq });
        replaced
    }

    /// Cancel the task for `id`
    pub fn cancel(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id.as_str() != id);
        self.tasks.len() != before
    }

    /// Cancel every task, returning how many were pending
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.tasks.len();
        self.tasks.clear();
        cancelled
    }

    /// Remove and return tasks due at `now`
    ///
    /// Ordered by deadline, then by scheduling order.
    pub fn take_due(&mut self, now: Instant) -> Vec<IssueId> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|t| t.deadline <= now);
        self.tasks = pending;
        due.sort_by_key(|t| (t.deadline, t.seq));
        due.into_iter().map(|t| t.id).collect()
    }

    /// Earliest pending deadline
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.iter().map(|t| t.deadline).min()
    }

    /// Check whether `id` has a pending task
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.tasks.iter().any(|t| t.id.as_str() == id)
    }

    /// Number of pending tasks
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check whether no task is pending
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
