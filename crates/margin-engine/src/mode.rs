//! Analysis mode state machine

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Whether analysis mode is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Ordinary editing
    #[default]
    Inactive,
    /// Issues tracked, document read-only
    Active,
}

/// Input to the mode state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEvent {
    /// Analysis results arrived
    Activate,
    /// User turned analysis off
    Deactivate,
}

/// Result of applying a [`ModeEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Mode before the event
    pub from: Mode,
    /// Mode after the event
    pub to: Mode,
    /// Overlays must be stripped and pending commits cancelled first
    pub needs_cleanup: bool,
}

impl Mode {
    /// Apply an event
    ///
    /// Every event is accepted. Deactivation always cleans up, even when
    /// already inactive; re-activation cleans up the previous session.
    #[must_use]
    pub fn transition(self, event: ModeEvent) -> Transition {
        let (to, needs_cleanup) = match (self, event) {
            (Self::Inactive, ModeEvent::Activate) => (Self::Active, false),
            (Self::Active, ModeEvent::Activate) => (Self::Active, true),
            (_, ModeEvent::Deactivate) => (Self::Inactive, true),
        };
        Transition {
            from: self,
            to,
            needs_cleanup,
        }
    }

    /// Check whether analysis mode is on
    #[inline]
    #[must_use]
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inactive => "inactive",
            Self::Active => "active",
        })
    }
}
