#![forbid(unsafe_code)]

//! Interactive controls for gripline.
//!
//! Each control composes the core pieces (geometry mapping, value clamping,
//! metrics observation) with a [`gripline_web::DragController`] and returns
//! every side effect as data: observer commands for the host's
//! `ResizeObserver`, host commands for pointer capture and window listeners.

pub mod color;
pub mod focus_guard;
pub mod resize_handle;
pub mod scroll_area;
pub mod scrollbar;
pub mod slider;

use gripline_core::metrics::ObserverCommand;
use gripline_web::DragDispatch;

/// Everything a host must undo when a control unmounts.
///
/// Unmounting mid-drag cancels the session, so `drag` carries the capture
/// release and listener detach commands alongside the observer teardown.
#[derive(Debug, Clone, PartialEq)]
pub struct Unmount<O> {
    pub observer: Vec<ObserverCommand>,
    pub drag: DragDispatch<O>,
}

impl<O> Unmount<O> {
    /// True when nothing was mounted and no session was live.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.observer.is_empty() && self.drag.commands.is_empty()
    }
}
