#![forbid(unsafe_code)]

//! Refocus guard for popups anchored to an input.
//!
//! Selecting an item in a combobox, select, or date picker closes the popup
//! and returns focus to the input. That focus event must not reopen the
//! popup. [`ReopenGuard`] holds a single-use [`IgnoreFocusToken`] issued on
//! close-by-selection; exactly the next focus event is swallowed, and any
//! other interaction spends the token first.

use serde::{Deserialize, Serialize};

/// Why the popup closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The user picked an item; focus is about to return to the input.
    CommittedSelection,
    /// Escape, outside click, or any other dismissal.
    Dismissed,
}

/// What the host should do with a focus event on the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusDecision {
    Open,
    Suppressed,
}

/// Proof that the next focus event should be ignored. Not `Clone`: each
/// token is spent at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct IgnoreFocusToken {
    issued_at: u64,
}

impl IgnoreFocusToken {
    /// Close counter value when the token was issued.
    #[must_use]
    pub const fn issued_at(&self) -> u64 {
        self.issued_at
    }
}

/// Tracks whether the next focus event on an input should reopen its popup.
#[derive(Debug, Default)]
pub struct ReopenGuard {
    token: Option<IgnoreFocusToken>,
    closes: u64,
}

impl ReopenGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The popup closed. Only a committed selection arms the guard; a
    /// dismissal clears any token left over.
    pub fn close(&mut self, reason: CloseReason) {
        self.closes = self.closes.wrapping_add(1);
        self.token = match reason {
            CloseReason::CommittedSelection => Some(IgnoreFocusToken {
                issued_at: self.closes,
            }),
            CloseReason::Dismissed => None,
        };
        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: gripline_core::logging::TARGET_FOCUS,
            reason = ?reason,
            armed = self.token.is_some(),
            "popup closed"
        );
    }

    /// The input gained focus. Spends the token if one is held.
    pub fn on_focus(&mut self) -> FocusDecision {
        match self.token.take() {
            Some(_) => FocusDecision::Suppressed,
            None => FocusDecision::Open,
        }
    }

    /// A pointer press on the input is a deliberate interaction.
    pub fn on_pointer_down(&mut self) {
        self.token = None;
    }

    /// A key press on the input is a deliberate interaction.
    pub fn on_key_down(&mut self) {
        self.token = None;
    }

    /// Whether the next focus event will be suppressed.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.token.is_some()
    }

    /// The outstanding token, if any.
    #[must_use]
    pub const fn token(&self) -> Option<&IgnoreFocusToken> {
        self.token.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_suppresses_exactly_one_focus() {
        let mut guard = ReopenGuard::new();
        guard.close(CloseReason::CommittedSelection);
        assert!(guard.is_armed());
        assert_eq!(guard.on_focus(), FocusDecision::Suppressed);
        assert_eq!(guard.on_focus(), FocusDecision::Open);
    }

    #[test]
    fn dismissal_does_not_arm() {
        let mut guard = ReopenGuard::new();
        guard.close(CloseReason::CommittedSelection);
        guard.close(CloseReason::Dismissed);
        assert!(!guard.is_armed());
        assert_eq!(guard.on_focus(), FocusDecision::Open);
    }

    #[test]
    fn other_interaction_spends_the_token() {
        let mut guard = ReopenGuard::new();
        guard.close(CloseReason::CommittedSelection);
        guard.on_pointer_down();
        assert_eq!(guard.on_focus(), FocusDecision::Open);

        guard.close(CloseReason::CommittedSelection);
        guard.on_key_down();
        assert_eq!(guard.on_focus(), FocusDecision::Open);
    }

    #[test]
    fn tokens_record_their_close() {
        let mut guard = ReopenGuard::new();
        guard.close(CloseReason::Dismissed);
        guard.close(CloseReason::CommittedSelection);
        assert_eq!(guard.token().map(IgnoreFocusToken::issued_at), Some(2));
    }
}
