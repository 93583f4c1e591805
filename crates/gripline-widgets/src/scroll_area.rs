#![forbid(unsafe_code)]

//! Vertical and horizontal overlays sharing one scroll region.

use gripline_core::event::PointerInput;
use gripline_core::frame_throttle::Triggers;
use gripline_core::geometry::Axis;
use gripline_core::metrics::{LayoutSource, ObserverCommand};
use gripline_web::pointer_capture::DragDispatch;

use crate::Unmount;
use crate::scrollbar::{ScrollTarget, ScrollbarConfig, ScrollbarOverlay};

/// Two independent overlays over a single scroll target.
///
/// When both overlays are scrollable each track gives up its trailing end,
/// by the perpendicular track's thickness, so the thumbs never meet in the
/// corner.
#[derive(Debug, Clone)]
pub struct ScrollArea {
    vertical: ScrollbarOverlay,
    horizontal: ScrollbarOverlay,
    active: Option<Axis>,
}

impl Default for ScrollArea {
    fn default() -> Self {
        Self::new(ScrollbarConfig::vertical(), ScrollbarConfig::horizontal())
    }
}

impl ScrollArea {
    /// Create an area from per-axis configs. The configs' own `axis` fields
    /// are overridden so each overlay lands on the right axis.
    #[must_use]
    pub fn new(vertical: ScrollbarConfig, horizontal: ScrollbarConfig) -> Self {
        Self {
            vertical: ScrollbarOverlay::new(ScrollbarConfig {
                axis: Axis::Vertical,
                ..vertical
            }),
            horizontal: ScrollbarOverlay::new(ScrollbarConfig {
                axis: Axis::Horizontal,
                ..horizontal
            }),
            active: None,
        }
    }

    #[must_use]
    pub const fn overlay(&self, axis: Axis) -> &ScrollbarOverlay {
        match axis {
            Axis::Vertical => &self.vertical,
            Axis::Horizontal => &self.horizontal,
        }
    }

    fn overlay_mut(&mut self, axis: Axis) -> &mut ScrollbarOverlay {
        match axis {
            Axis::Vertical => &mut self.vertical,
            Axis::Horizontal => &mut self.horizontal,
        }
    }

    /// Axis of the overlay that owns the live gesture, if any.
    #[must_use]
    pub const fn active_axis(&self) -> Option<Axis> {
        self.active
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.vertical.is_dragging() || self.horizontal.is_dragging()
    }

    /// Subscribe both overlays. Commands are tagged with their overlay.
    pub fn mount(&mut self) -> Vec<(Axis, ObserverCommand)> {
        let mut commands: Vec<_> = self
            .vertical
            .mount()
            .into_iter()
            .map(|command| (Axis::Vertical, command))
            .collect();
        commands.extend(
            self.horizontal
                .mount()
                .into_iter()
                .map(|command| (Axis::Horizontal, command)),
        );
        commands
    }

    /// Unsubscribe both overlays and end any live drag.
    pub fn unmount(&mut self) -> [Unmount<f64>; 2] {
        self.active = None;
        [self.vertical.unmount(), self.horizontal.unmount()]
    }

    /// Forward a notification to both overlays.
    pub fn notify(&mut self, trigger: Triggers) -> Vec<(Axis, ObserverCommand)> {
        [Axis::Vertical, Axis::Horizontal]
            .into_iter()
            .filter_map(|axis| self.overlay_mut(axis).notify(trigger).map(|c| (axis, c)))
            .collect()
    }

    /// A requested frame fired. Returns `true` if either thumb changed.
    pub fn on_frame(&mut self, source: &dyn LayoutSource) -> bool {
        let vertical = self.vertical.on_frame(source).is_some();
        let horizontal = self.horizontal.on_frame(source).is_some();
        if vertical || horizontal {
            self.apply_corner();
        }
        vertical || horizontal
    }

    fn apply_corner(&mut self) {
        // Decide from unshortened tracks so shortening cannot flip visibility
        // back and forth between frames.
        let both = self.vertical.overflows_unshortened() && self.horizontal.overflows_unshortened();
        let (vertical_cut, horizontal_cut) = if both {
            (self.horizontal.thickness(), self.vertical.thickness())
        } else {
            (0.0, 0.0)
        };
        self.vertical.set_corner_shortening(vertical_cut);
        self.horizontal.set_corner_shortening(horizontal_cut);
    }

    /// Route a press to whichever track it landed on.
    pub fn pointer_down(
        &mut self,
        input: PointerInput,
        target: &mut dyn ScrollTarget,
    ) -> Option<DragDispatch<f64>> {
        for axis in [Axis::Vertical, Axis::Horizontal] {
            if !self.overlay(axis).hit_test(input.position) {
                continue;
            }
            // Tracks overlap in the corner; an inert one passes the press on.
            let Some(mut dispatch) = self.overlay_mut(axis).pointer_down(input, target) else {
                continue;
            };
            if dispatch.is_ignored() {
                return Some(dispatch);
            }
            // A press on the other track pre-empts the stale gesture there;
            // its cleanup runs before the new session's setup.
            if let Some(previous) = self.active
                && previous != axis
            {
                let stale = self.overlay_mut(previous).teardown();
                dispatch.commands.splice(0..0, stale.commands);
                dispatch.preempted = stale.transition;
            }
            self.active = Some(axis);
            return Some(dispatch);
        }
        None
    }

    pub fn pointer_move(
        &mut self,
        input: PointerInput,
        target: &mut dyn ScrollTarget,
    ) -> Option<DragDispatch<f64>> {
        let axis = self.active?;
        Some(self.overlay_mut(axis).pointer_move(input, target))
    }

    pub fn pointer_up(
        &mut self,
        input: PointerInput,
        target: &mut dyn ScrollTarget,
    ) -> Option<DragDispatch<f64>> {
        let axis = self.active?;
        let dispatch = self.overlay_mut(axis).pointer_up(input, target);
        if !dispatch.is_ignored() {
            self.active = None;
        }
        Some(dispatch)
    }

    pub fn capture_acquired(&mut self, pointer_id: u32) -> Option<DragDispatch<f64>> {
        let axis = self.active?;
        Some(self.overlay_mut(axis).capture_acquired(pointer_id))
    }

    pub fn pointer_cancel(&mut self, pointer_id: Option<u32>) -> Option<DragDispatch<f64>> {
        self.interrupt(|overlay| overlay.pointer_cancel(pointer_id))
    }

    pub fn pointer_leave(&mut self, pointer_id: u32) -> Option<DragDispatch<f64>> {
        self.interrupt(|overlay| overlay.pointer_leave(pointer_id))
    }

    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> Option<DragDispatch<f64>> {
        self.interrupt(|overlay| overlay.lost_pointer_capture(pointer_id))
    }

    pub fn window_blur(&mut self) -> Option<DragDispatch<f64>> {
        self.interrupt(ScrollbarOverlay::window_blur)
    }

    pub fn visibility_hidden(&mut self) -> Option<DragDispatch<f64>> {
        self.interrupt(ScrollbarOverlay::visibility_hidden)
    }

    /// End the live gesture without unsubscribing (the area got disabled).
    pub fn teardown(&mut self) -> Option<DragDispatch<f64>> {
        let axis = self.active.take()?;
        Some(self.overlay_mut(axis).teardown())
    }

    /// Forward an interruption to the active overlay. The area forgets the
    /// gesture only once the overlay actually ended it.
    fn interrupt(
        &mut self,
        signal: impl FnOnce(&mut ScrollbarOverlay) -> DragDispatch<f64>,
    ) -> Option<DragDispatch<f64>> {
        let axis = self.active?;
        let dispatch = signal(self.overlay_mut(axis));
        if !dispatch.is_ignored() {
            self.active = None;
        }
        Some(dispatch)
    }
}
