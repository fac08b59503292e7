//! The engine: mode controller over an owned document
//!
//! [`Engine`] owns the document, the issue registry and the deferred commit
//! tasks. All methods take `&mut self`; time is passed in explicitly
//! ([`Engine::select_issue`], [`Engine::poll`]) or driven by
//! [`Engine::settle`].

use crate::analysis::AnalysisSource;
use crate::applicator::{self, CommitOutcome};
use crate::config::EngineConfig;
use crate::error::{AnalysisError, EngineError};
use crate::events::{EngineEvent, EngineObserver};
use crate::mode::{Mode, ModeEvent};
use crate::scheduler::DeferredTasks;
use margin_document::Document;
use margin_issue::{Issue, IssueId, IssueRegistry, IssueState};
use margin_overlay::{render, RenderedView};
use std::fmt;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Counters for one engine lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Times analysis mode was entered
    pub activations: usize,
    /// Suggestions committed
    pub accepted: usize,
    /// Commits that found nothing to mark applied
    pub abandoned: usize,
    /// Selections whose anchor could not be resolved
    pub anchor_misses: usize,
    /// Pending commits cancelled by cleanup
    pub cancelled_commits: usize,
}

/// Critique overlay engine
pub struct Engine {
    config: EngineConfig,
    document: Document,
    registry: IssueRegistry,
    tasks: DeferredTasks,
    mode: Mode,
    observers: Vec<Box<dyn EngineObserver>>,
    stats: SessionStats,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("mode", &self.mode)
            .field("issues", &self.registry.len())
            .field("pending_commits", &self.tasks.len())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create engine with an empty document
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            document: Document::new(),
            registry: IssueRegistry::new(),
            tasks: DeferredTasks::new(),
            mode: Mode::Inactive,
            observers: Vec::new(),
            stats: SessionStats::default(),
        }
    }

    /// Create engine holding `content`
    ///
    /// # Errors
    /// Returns [`EngineError::Document`] if the markup cannot be parsed.
    pub fn with_content(config: EngineConfig, content: &str) -> Result<Self, EngineError> {
        let mut engine = Self::new(config);
        engine.load(content)?;
        Ok(engine)
    }

    /// Register an observer
    pub fn add_observer(&mut self, observer: impl EngineObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Receive events through a channel
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<EngineEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.add_observer(tx);
        rx
    }

    /// Open a document, discarding any analysis session
    ///
    /// No event is emitted. On error the previous document is kept.
    ///
    /// # Errors
    /// Returns [`EngineError::Document`] if the markup cannot be parsed.
    pub fn load(&mut self, content: &str) -> Result<(), EngineError> {
        let document = Document::parse(content)?;
        let cancelled = self.tasks.cancel_all();
        self.stats.cancelled_commits += cancelled;
        self.registry.clear();
        self.mode = Mode::Inactive;
        self.document = document;
        tracing::debug!(cancelled, "document loaded");
        Ok(())
    }

    /// Replace the content through ordinary editing
    ///
    /// # Errors
    /// - [`EngineError::ReadOnly`] while analysis mode is active and edits
    ///   are locked
    /// - [`EngineError::Document`] if the markup cannot be parsed; the
    ///   previous content is kept
    pub fn edit(&mut self, content: &str) -> Result<(), EngineError> {
        if self.mode.is_active() && self.config.lock_edits_while_active {
            return Err(EngineError::ReadOnly);
        }
        self.document = Document::parse(content)?;
        self.emit_content();
        Ok(())
    }

    /// Enter analysis mode with `issues`
    ///
    /// Re-activating cleans up the previous session first. Duplicate ids are
    /// skipped; returns how many.
    pub fn activate(&mut self, issues: impl IntoIterator<Item = Issue>) -> usize {
        let transition = self.mode.transition(ModeEvent::Activate);
        if transition.needs_cleanup && self.cleanup() > 0 {
            self.emit_content();
        }
        self.mode = transition.to;

        let skipped = self.registry.extend(issues);
        self.stats.activations += 1;
        tracing::info!(issues = self.registry.len(), skipped, "analysis mode activated");
        skipped
    }

    /// Enter analysis mode with issues from `source`
    ///
    /// On failure or timeout the engine is left inactive, cleaning up if it
    /// was active.
    ///
    /// # Errors
    /// Returns [`EngineError::AnalysisUnavailable`].
    pub async fn activate_from(
        &mut self,
        source: &dyn AnalysisSource,
    ) -> Result<usize, EngineError> {
        let text = self.document.plain_text();
        let result = match tokio::time::timeout(self.config.analysis_timeout(), source.analyze(&text)).await {
            Ok(result) => result,
            Err(_) => Err(AnalysisError::Timeout {
                duration_secs: self.config.analysis_timeout_secs,
            }),
        };

        match result {
            Ok(issues) => Ok(self.activate(issues)),
            Err(err) => {
                tracing::warn!(%err, "analysis unavailable");
                if self.mode.is_active() {
                    self.deactivate();
                }
                Err(err.into())
            }
        }
    }

    /// Leave analysis mode
    ///
    /// Strips every overlay, cancels pending commits, clears the registry
    /// and emits the cleaned content. Safe to call repeatedly.
    pub fn deactivate(&mut self) -> usize {
        let transition = self.mode.transition(ModeEvent::Deactivate);
        let stripped = self.cleanup();
        self.mode = transition.to;
        tracing::info!(from = %transition.from, stripped, "analysis mode deactivated");
        self.emit_content();
        stripped
    }

    /// Decorated view of the pending issues
    ///
    /// # Errors
    /// Returns [`EngineError::NotActive`] outside analysis mode.
    pub fn decorated_view(&self) -> Result<RenderedView, EngineError> {
        if !self.mode.is_active() {
            return Err(EngineError::NotActive);
        }
        Ok(render(
            &self.document,
            self.registry.pending(),
            &self.config.render_options(),
        ))
    }

    /// Start applying the suggestion of issue `id`
    ///
    /// The commit is scheduled at `now` plus the configured delay.
    ///
    /// # Errors
    /// - [`EngineError::NotActive`] outside analysis mode
    /// - [`EngineError::UnknownIssue`] / [`EngineError::AlreadyAnimating`]
    /// - [`EngineError::MalformedIssue`] / [`EngineError::AnchorNotFound`]
    ///
    /// Content and registry are unchanged on error.
    pub fn select_issue(&mut self, id: &str, now: Instant) -> Result<(), EngineError> {
        if !self.mode.is_active() {
            return Err(EngineError::NotActive);
        }
        let issue = self
            .registry
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownIssue(IssueId::new(id)))?;
        if self.registry.state(id) != Some(IssueState::Pending) {
            return Err(EngineError::AlreadyAnimating(issue.id));
        }

        if let Err(err) = applicator::begin(&mut self.document, &issue) {
            if matches!(err, EngineError::AnchorNotFound { .. }) {
                self.stats.anchor_misses += 1;
            }
            tracing::debug!(issue = %issue.id, %err, "suggestion not applied");
            return Err(err);
        }

        self.registry.transition(id, IssueState::Animating)?;
        let deadline = now + self.config.commit_delay();
        self.tasks.schedule(issue.id.clone(), deadline);
        tracing::debug!(issue = %issue.id, "suggestion applying");
        self.emit_content();
        Ok(())
    }

    /// [`Engine::select_issue`] at the current time
    ///
    /// # Errors
    /// See [`Engine::select_issue`].
    pub fn select(&mut self, id: &str) -> Result<(), EngineError> {
        self.select_issue(id, Instant::now())
    }

    /// Run commits due at `now`; returns accepted issue ids
    pub fn poll(&mut self, now: Instant) -> Vec<IssueId> {
        let mut accepted = Vec::new();
        for id in self.tasks.take_due(now) {
            if self.commit_due(&id) {
                accepted.push(id);
            }
        }
        accepted
    }

    /// Wait for and run every pending commit; returns accepted issue ids
    pub async fn settle(&mut self) -> Vec<IssueId> {
        let mut accepted = Vec::new();
        while let Some(deadline) = self.tasks.next_deadline() {
            tokio::time::sleep_until(deadline).await;
            accepted.extend(self.poll(Instant::now()));
        }
        accepted
    }

    /// Current document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Serialized content with the configured overlay style
    #[must_use]
    pub fn content(&self) -> String {
        self.document.to_markup_with(&self.config.style)
    }

    /// Current mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Check whether analysis mode is on
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.mode.is_active()
    }

    /// Tracked issues
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &IssueRegistry {
        &self.registry
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Session counters
    #[inline]
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Number of scheduled commits
    #[inline]
    #[must_use]
    pub fn pending_commits(&self) -> usize {
        self.tasks.len()
    }

    /// Deadline of the next scheduled commit
    #[inline]
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.next_deadline()
    }

    fn commit_due(&mut self, id: &IssueId) -> bool {
        if self.registry.state(id.as_str()) != Some(IssueState::Animating) {
            tracing::debug!(issue = %id, "stale commit ignored");
            return false;
        }
        let Some(issue) = self.registry.get(id.as_str()).cloned() else {
            return false;
        };

        match applicator::commit(&mut self.document, &issue) {
            Ok(outcome) if outcome.is_accepted() => {
                if outcome != CommitOutcome::Committed {
                    tracing::debug!(issue = %id, ?outcome, "applying wrapper missing, recovered");
                }
                self.emit_content();
                if let Err(err) = self.registry.complete(id.as_str()) {
                    tracing::warn!(issue = %id, %err, "registry out of sync");
                    return false;
                }
                self.stats.accepted += 1;
                tracing::info!(issue = %id, "suggestion accepted");
                self.emit(&EngineEvent::SuggestionAccepted(id.clone()));
                true
            }
            Ok(_) => {
                tracing::debug!(issue = %id, "nothing to commit, suggestion dropped");
                self.registry.remove(id.as_str());
                self.stats.abandoned += 1;
                false
            }
            Err(err) => {
                tracing::warn!(issue = %id, %err, "commit failed, suggestion dropped");
                self.registry.remove(id.as_str());
                self.stats.abandoned += 1;
                false
            }
        }
    }

    /// Strip overlays, cancel commits and clear the registry
    fn cleanup(&mut self) -> usize {
        let stripped = self.document.strip_overlays();
        let cancelled = self.tasks.cancel_all();
        if cancelled > 0 {
            tracing::debug!(cancelled, "pending commits cancelled");
        }
        self.stats.cancelled_commits += cancelled;
        self.registry.clear();
        stripped
    }

    fn emit_content(&mut self) {
        let event = EngineEvent::ContentChanged(self.content());
        self.emit(&event);
    }

    fn emit(&mut self, event: &EngineEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }
}
