#![forbid(unsafe_code)]

//! Proportional scrollbar overlay for a natively scrolling region.
//!
//! The overlay draws its own thumb over content whose native scrollbars are
//! hidden. It owns a [`TrackMetricsObserver`] for the track and scroll
//! metrics and a [`DragController`] for thumb drags and track clicks, and it
//! writes scroll offsets straight into a [`ScrollTarget`].
//!
//! Thumb size is `max(track * viewport / extent, min_thumb_size)`. Because
//! of that floor, a thumb pixel maps to `max_scroll / (track - thumb)` scroll
//! pixels rather than `extent / track`, which is what makes an end-to-end
//! drag land exactly on both scroll extremes.

use serde::{Deserialize, Serialize};

use gripline_core::drag::DragEffect;
use gripline_core::event::PointerInput;
use gripline_core::frame_throttle::Triggers;
use gripline_core::geometry::{Axis, Point};
use gripline_core::metrics::{
    LayoutSource, ObserverCommand, ObserverConfig, ScrollMetrics, TrackMetrics,
    TrackMetricsObserver,
};
use gripline_web::pointer_capture::{DragController, DragDispatch, DragSession};

use crate::Unmount;

/// Smallest thumb, in px, that stays comfortably graspable.
pub const MIN_THUMB_SIZE: f64 = 24.0;

/// Scrollbar configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollbarConfig {
    pub axis: Axis,
    /// Floor for the proportional thumb size.
    pub min_thumb_size: f64,
    /// Padding removed from both ends of the track.
    pub track_inset: f64,
    /// Render the thumb but ignore pointer input.
    pub disabled: bool,
}

impl Default for ScrollbarConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Vertical,
            min_thumb_size: MIN_THUMB_SIZE,
            track_inset: 0.0,
            disabled: false,
        }
    }
}

impl ScrollbarConfig {
    /// Default vertical scrollbar.
    #[must_use]
    pub fn vertical() -> Self {
        Self::default()
    }

    /// Default horizontal scrollbar.
    #[must_use]
    pub fn horizontal() -> Self {
        Self {
            axis: Axis::Horizontal,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn min_thumb_size(mut self, size: f64) -> Self {
        self.min_thumb_size = size;
        self
    }

    #[must_use]
    pub const fn track_inset(mut self, inset: f64) -> Self {
        self.track_inset = inset;
        self
    }

    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Derived thumb geometry along the track.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThumbState {
    /// `false` when nothing overflows or the track cannot host the thumb.
    pub visible: bool,
    /// Thumb length in px.
    pub size: f64,
    /// Thumb leading edge relative to the track start, in px.
    pub offset: f64,
}

impl ThumbState {
    /// An invisible, zero-sized thumb.
    pub const HIDDEN: Self = Self {
        visible: false,
        size: 0.0,
        offset: 0.0,
    };
}

/// Compute the thumb for a track and the scroll state of its content.
#[must_use]
pub fn compute_thumb(
    track: &TrackMetrics,
    scroll: &ScrollMetrics,
    min_thumb_size: f64,
) -> ThumbState {
    let min_thumb_size = min_thumb_size.max(0.0);
    if track.is_degenerate()
        || scroll.is_degenerate()
        || !scroll.overflows()
        || track.length < min_thumb_size
    {
        return ThumbState::HIDDEN;
    }
    let proportional = track.length * (scroll.viewport_extent / scroll.scroll_extent);
    let size = proportional.max(min_thumb_size).min(track.length);
    ThumbState {
        visible: true,
        size,
        offset: offset_for_position(scroll.scroll_position, track.length, size, scroll),
    }
}

/// Scroll pixels per thumb pixel: `max_scroll / (track - thumb)`.
///
/// Zero when the thumb has no room to travel.
#[must_use]
pub fn scroll_per_pixel(track_length: f64, thumb_size: f64, scroll: &ScrollMetrics) -> f64 {
    let travel = track_length - thumb_size;
    if travel > 0.0 {
        scroll.max_scroll() / travel
    } else {
        0.0
    }
}

fn offset_for_position(
    position: f64,
    track_length: f64,
    thumb_size: f64,
    scroll: &ScrollMetrics,
) -> f64 {
    let travel = track_length - thumb_size;
    let max_scroll = scroll.max_scroll();
    if travel <= 0.0 || max_scroll <= 0.0 {
        return 0.0;
    }
    scroll.clamp_position(position) / max_scroll * travel
}

fn position_for_offset(
    offset: f64,
    track_length: f64,
    thumb_size: f64,
    scroll: &ScrollMetrics,
) -> f64 {
    let travel = track_length - thumb_size;
    if travel <= 0.0 {
        return 0.0;
    }
    // Dividing the clamped offset first keeps both extremes exact.
    scroll.clamp_position(offset.clamp(0.0, travel) / travel * scroll.max_scroll())
}

/// The scrolling element the overlay drives.
pub trait ScrollTarget {
    /// Write `element.scrollTop` (vertical) or `element.scrollLeft`.
    fn set_scroll_position(&mut self, axis: Axis, position: f64);
}

/// One scrollbar overlay along one axis.
#[derive(Debug, Clone)]
pub struct ScrollbarOverlay {
    config: ScrollbarConfig,
    observer: TrackMetricsObserver,
    controller: DragController<f64>,
    thumb: ThumbState,
    corner_shortening: f64,
}

impl ScrollbarOverlay {
    /// Create an unmounted overlay.
    #[must_use]
    pub fn new(config: ScrollbarConfig) -> Self {
        let observer = TrackMetricsObserver::new(
            ObserverConfig::scroll(config.axis).track_inset(config.track_inset),
        );
        Self {
            config,
            observer,
            controller: DragController::default(),
            thumb: ThumbState::HIDDEN,
            corner_shortening: 0.0,
        }
    }

    #[must_use]
    pub const fn config(&self) -> ScrollbarConfig {
        self.config
    }

    #[must_use]
    pub const fn axis(&self) -> Axis {
        self.config.axis
    }

    /// Current thumb geometry.
    #[must_use]
    pub const fn thumb(&self) -> ThumbState {
        self.thumb
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.thumb.visible
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.controller.is_dragging()
    }

    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.observer.is_mounted()
    }

    /// Track metrics after inset and corner shortening, while visible.
    #[must_use]
    pub fn track(&self) -> Option<TrackMetrics> {
        self.observer
            .track_metrics()
            .map(|track| track.shortened(self.corner_shortening))
    }

    /// Last observed scroll metrics.
    #[must_use]
    pub fn scroll(&self) -> Option<ScrollMetrics> {
        self.observer.snapshot().and_then(|snapshot| snapshot.scroll)
    }

    /// Thickness of the measured track, used to shorten a perpendicular
    /// overlay in the shared corner.
    #[must_use]
    pub fn thickness(&self) -> f64 {
        self.observer
            .snapshot()
            .map_or(0.0, |snapshot| snapshot.track.thickness.max(0.0))
    }

    /// Whether the thumb would be visible with no corner shortening.
    #[must_use]
    pub fn overflows_unshortened(&self) -> bool {
        match (self.observer.track_metrics(), self.scroll()) {
            (Some(track), Some(scroll)) => {
                compute_thumb(&track, &scroll, self.config.min_thumb_size).visible
            }
            _ => false,
        }
    }

    /// Subscribe to track, container, and content changes.
    pub fn mount(&mut self) -> Vec<ObserverCommand> {
        self.observer.mount()
    }

    /// Tear down subscriptions and any live drag.
    pub fn unmount(&mut self) -> Unmount<f64> {
        let drag = self.controller.teardown();
        let observer = self.observer.unmount();
        self.thumb = ThumbState::HIDDEN;
        Unmount { observer, drag }
    }

    /// Forward a resize or scroll notification.
    pub fn notify(&mut self, trigger: Triggers) -> Option<ObserverCommand> {
        self.observer.notify(trigger)
    }

    /// Animation frame fired. Returns the new thumb if a snapshot was
    /// published.
    pub fn on_frame(&mut self, source: &dyn LayoutSource) -> Option<ThumbState> {
        self.observer.on_frame(source).ok()?;
        Some(self.refresh_thumb())
    }

    /// Measure immediately, outside the frame throttle.
    pub fn measure(&mut self, source: &dyn LayoutSource) -> Option<ThumbState> {
        self.observer.measure(source).ok()?;
        Some(self.refresh_thumb())
    }

    /// Shorten the track's trailing end, for a perpendicular overlay sharing
    /// the corner.
    pub fn set_corner_shortening(&mut self, amount: f64) -> ThumbState {
        self.corner_shortening = amount.max(0.0);
        self.refresh_thumb()
    }

    /// Whether `point` lies on the track.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> bool {
        let Some(track) = self.track() else {
            return false;
        };
        let axis = self.config.axis;
        let main = point.along(axis) - track.main_axis_offset;
        let cross = point.along(axis.perpendicular()) - track.cross_axis_offset;
        (0.0..=track.length).contains(&main) && (0.0..=track.thickness).contains(&cross)
    }

    /// Press on the track or thumb.
    ///
    /// On the thumb this arms a drag. On the bare track it first scrolls so
    /// the thumb centre lands under the pointer, then starts a drag seeded
    /// with that position. Returns `None` when the overlay is inert or the
    /// press missed the track.
    pub fn pointer_down(
        &mut self,
        input: PointerInput,
        target: &mut dyn ScrollTarget,
    ) -> Option<DragDispatch<f64>> {
        if self.config.disabled || !self.thumb.visible || !self.hit_test(input.position) {
            return None;
        }
        let track = self.track()?;
        let scroll = self.scroll()?;
        let thumb = self.thumb;
        let local = input.position.along(self.config.axis) - track.main_axis_offset;
        let on_thumb = local >= thumb.offset && local <= thumb.offset + thumb.size;
        let acceptable = input.pointer_id != 0
            && input.button == self.controller.config().activation_button;
        if on_thumb || !acceptable {
            return Some(self.controller.pointer_down(input, scroll.scroll_position));
        }

        let position =
            position_for_offset(local - thumb.size / 2.0, track.length, thumb.size, &scroll);
        self.write_scroll(position, target);
        Some(self.controller.jump_down(input, position))
    }

    /// Pointer moved while a session may be active.
    pub fn pointer_move(
        &mut self,
        input: PointerInput,
        target: &mut dyn ScrollTarget,
    ) -> DragDispatch<f64> {
        let dispatch = self.controller.pointer_move(input);
        if matches!(
            dispatch.effect(),
            Some(DragEffect::DragStarted { .. } | DragEffect::DragUpdated { .. })
        ) && let Some(session) = dispatch.session
        {
            self.drag_to(&session, input.position, target);
        }
        dispatch
    }

    /// Pointer released; the scroll position at release is final.
    pub fn pointer_up(
        &mut self,
        input: PointerInput,
        target: &mut dyn ScrollTarget,
    ) -> DragDispatch<f64> {
        let dispatch = self.controller.pointer_up(input);
        if let Some(DragEffect::Committed { dragged: true, .. }) = dispatch.effect()
            && let Some(session) = dispatch.session
        {
            self.drag_to(&session, input.position, target);
        }
        dispatch
    }

    pub fn capture_acquired(&mut self, pointer_id: u32) -> DragDispatch<f64> {
        self.controller.capture_acquired(pointer_id)
    }

    pub fn pointer_cancel(&mut self, pointer_id: Option<u32>) -> DragDispatch<f64> {
        self.controller.pointer_cancel(pointer_id)
    }

    pub fn pointer_leave(&mut self, pointer_id: u32) -> DragDispatch<f64> {
        self.controller.pointer_leave(pointer_id)
    }

    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> DragDispatch<f64> {
        self.controller.lost_pointer_capture(pointer_id)
    }

    pub fn window_blur(&mut self) -> DragDispatch<f64> {
        self.controller.blur()
    }

    pub fn visibility_hidden(&mut self) -> DragDispatch<f64> {
        self.controller.visibility_hidden()
    }

    /// End any live drag without unsubscribing.
    pub fn teardown(&mut self) -> DragDispatch<f64> {
        self.controller.teardown()
    }

    fn drag_to(
        &mut self,
        session: &DragSession<f64>,
        position: Point,
        target: &mut dyn ScrollTarget,
    ) {
        if !self.thumb.visible {
            return;
        }
        let (Some(track), Some(scroll)) = (self.track(), self.scroll()) else {
            return;
        };
        let size = self.thumb.size;
        let origin_offset = offset_for_position(session.origin_value, track.length, size, &scroll);
        let delta = session.delta_to(position).along(self.config.axis);
        let next = position_for_offset(origin_offset + delta, track.length, size, &scroll);
        self.write_scroll(next, target);
    }

    fn write_scroll(&mut self, position: f64, target: &mut dyn ScrollTarget) {
        if self.scroll().is_some_and(|scroll| scroll.scroll_position == position) {
            return;
        }
        target.set_scroll_position(self.config.axis, position);
        self.observer.record_scroll_position(position);
        self.refresh_thumb();
        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: gripline_core::logging::TARGET_COMMIT,
            axis = ?self.config.axis,
            value = position,
            "scroll position written"
        );
    }

    fn refresh_thumb(&mut self) -> ThumbState {
        self.thumb = match (self.track(), self.scroll()) {
            (Some(track), Some(scroll)) => {
                compute_thumb(&track, &scroll, self.config.min_thumb_size)
            }
            _ => ThumbState::HIDDEN,
        };
        self.thumb
    }
}
