#![forbid(unsafe_code)]

//! Per-animation-frame coalescing for observation triggers.
//!
//! Resize observers and scroll listeners can fire many times between two
//! paints, and every naive recomputation forces a layout read. The
//! [`FrameThrottle`] folds any number of triggers into one pending set and
//! asks the host for a single animation frame; the recomputation runs when
//! that frame arrives.
//!
//! # Usage
//!
//! ```
//! use gripline_core::frame_throttle::{FrameRequest, FrameThrottle, Triggers};
//!
//! let mut throttle = FrameThrottle::new();
//! assert_eq!(throttle.push(Triggers::TRACK_RESIZED), FrameRequest::Schedule);
//! assert_eq!(throttle.push(Triggers::SCROLLED), FrameRequest::Coalesced);
//! assert_eq!(throttle.push(Triggers::SCROLLED), FrameRequest::Coalesced);
//!
//! let pending = throttle.on_frame().expect("a frame was requested");
//! assert!(pending.contains(Triggers::TRACK_RESIZED | Triggers::SCROLLED));
//! assert!(throttle.on_frame().is_none());
//! ```

use bitflags::bitflags;

bitflags! {
    /// Reasons a recomputation was requested.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Triggers: u8 {
        const TRACK_RESIZED     = 0b0001;
        const CONTAINER_RESIZED = 0b0010;
        const CONTENT_RESIZED   = 0b0100;
        const SCROLLED          = 0b1000;
    }
}

/// What the host must do after pushing a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// No frame is pending: call `requestAnimationFrame`.
    Schedule,
    /// A frame is already pending and will pick this trigger up.
    Coalesced,
}

/// Coalesces observation triggers into at most one recomputation per frame.
///
/// Not thread-safe; lives on the UI thread next to the control it serves.
#[derive(Debug, Clone, Default)]
pub struct FrameThrottle {
    pending: Triggers,
    frame_requested: bool,
    coalesced_total: u64,
}

impl FrameThrottle {
    /// Create an idle throttle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a trigger.
    pub fn push(&mut self, trigger: Triggers) -> FrameRequest {
        self.pending |= trigger;
        if self.frame_requested {
            self.coalesced_total = self.coalesced_total.saturating_add(1);
            FrameRequest::Coalesced
        } else {
            self.frame_requested = true;
            FrameRequest::Schedule
        }
    }

    /// The requested frame arrived: take the accumulated triggers.
    ///
    /// Returns `None` if no frame was requested (a stray or cancelled
    /// callback), which callers treat as "nothing to do".
    pub fn on_frame(&mut self) -> Option<Triggers> {
        if !self.frame_requested {
            return None;
        }
        self.frame_requested = false;
        Some(std::mem::take(&mut self.pending))
    }

    /// Drop pending work. Returns `true` if a frame request was outstanding
    /// and the host should cancel it.
    pub fn cancel(&mut self) -> bool {
        self.pending = Triggers::empty();
        std::mem::take(&mut self.frame_requested)
    }

    /// Whether a frame request is outstanding.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.frame_requested
    }

    /// Number of triggers folded into an already-pending frame so far.
    #[must_use]
    pub const fn coalesced_total(&self) -> u64 {
        self.coalesced_total
    }
}
