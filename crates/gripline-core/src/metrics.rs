#![forbid(unsafe_code)]

//! Track and scroll metrics, and the observer that keeps them current.
//!
//! [`TrackMetricsObserver`] is the bookkeeping half of a resize/scroll
//! subscription. It never touches the DOM itself: [`mount`] and [`unmount`]
//! return the [`ObserverCommand`]s the host must carry out (observe this
//! element, listen for scroll, request a frame), and measurements are read
//! through a [`LayoutSource`] only when a throttled frame fires.
//!
//! [`mount`]: TrackMetricsObserver::mount
//! [`unmount`]: TrackMetricsObserver::unmount

use serde::{Deserialize, Serialize};

use crate::frame_throttle::{FrameRequest, FrameThrottle, Triggers};
use crate::geometry::{Axis, Rect};

/// Measured geometry of one track along its axis of travel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackMetrics {
    /// Pixel extent along the axis of travel.
    pub length: f64,
    /// Pixel extent across the axis of travel.
    pub thickness: f64,
    /// Track start relative to the positioning container, along the axis.
    pub main_axis_offset: f64,
    /// Track start relative to the positioning container, across the axis.
    pub cross_axis_offset: f64,
}

impl TrackMetrics {
    /// Derive metrics from a track rect and its container rect.
    #[must_use]
    pub fn from_rects(track: Rect, container: Rect, axis: Axis) -> Self {
        let cross = axis.perpendicular();
        Self {
            length: track.extent(axis),
            thickness: track.extent(cross),
            main_axis_offset: track.start(axis) - container.start(axis),
            cross_axis_offset: track.start(cross) - container.start(cross),
        }
    }

    /// Shrink the track by `inset` at both ends of its axis.
    #[must_use]
    pub fn inset(self, inset: f64) -> Self {
        if inset == 0.0 {
            return self;
        }
        Self {
            length: self.length - 2.0 * inset,
            main_axis_offset: self.main_axis_offset + inset,
            ..self
        }
    }

    /// Shorten the track's trailing end by `amount`.
    #[must_use]
    pub fn shortened(self, amount: f64) -> Self {
        Self {
            length: self.length - amount.max(0.0),
            ..self
        }
    }

    /// Zero, negative, or non-finite length.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.length.is_finite() && self.length > 0.0)
    }
}

/// Scroll state of a content element along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    /// Total scrollable content size.
    pub scroll_extent: f64,
    /// Size of the visible window.
    pub viewport_extent: f64,
    /// Current scroll offset.
    pub scroll_position: f64,
}

impl ScrollMetrics {
    /// Create scroll metrics.
    #[must_use]
    pub const fn new(scroll_extent: f64, viewport_extent: f64, scroll_position: f64) -> Self {
        Self {
            scroll_extent,
            viewport_extent,
            scroll_position,
        }
    }

    /// Largest valid scroll offset.
    #[must_use]
    pub fn max_scroll(&self) -> f64 {
        (self.scroll_extent - self.viewport_extent).max(0.0)
    }

    /// Whether the content is larger than the viewport.
    #[must_use]
    pub fn overflows(&self) -> bool {
        self.scroll_extent > self.viewport_extent
    }

    /// Scroll offset clamped into `[0, max_scroll]`.
    #[must_use]
    pub fn clamp_position(&self, position: f64) -> f64 {
        if position.is_nan() {
            return 0.0;
        }
        position.clamp(0.0, self.max_scroll())
    }

    /// Zero, negative, or non-finite extents.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.scroll_extent.is_finite()
            && self.viewport_extent.is_finite()
            && self.scroll_position.is_finite())
            || self.scroll_extent <= 0.0
            || self.viewport_extent <= 0.0
    }
}

/// Read-only access to the host's live layout.
///
/// Every method may return `None` when the element is not laid out; the
/// observer then keeps its last-known metrics.
pub trait LayoutSource {
    /// Bounding rect of the track for `axis`.
    fn track_rect(&self, axis: Axis) -> Option<Rect>;

    /// Bounding rect of the track's positioning container.
    fn container_rect(&self) -> Option<Rect>;

    /// Scroll state of the observed content element along `axis`.
    fn scroll_metrics(&self, _axis: Axis) -> Option<ScrollMetrics> {
        None
    }
}

/// Elements an observer subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservedElement {
    Track,
    Container,
    Content,
}

/// Subscription bookkeeping the host must carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverCommand {
    /// `resizeObserver.observe(element)`.
    Observe(ObservedElement),
    /// `resizeObserver.unobserve(element)`.
    Unobserve(ObservedElement),
    /// Attach a passive scroll listener to the content element.
    ListenScroll,
    /// Remove the scroll listener.
    UnlistenScroll,
    /// `requestAnimationFrame`, then call [`TrackMetricsObserver::on_frame`].
    RequestFrame,
    /// `cancelAnimationFrame` for the outstanding request.
    CancelFrame,
}

/// Observer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Axis of travel of the observed track.
    pub axis: Axis,
    /// Also observe the content element's scroll metrics.
    pub observe_scroll: bool,
    /// Extra space removed from both ends of the track.
    pub track_inset: f64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Horizontal,
            observe_scroll: false,
            track_inset: 0.0,
        }
    }
}

impl ObserverConfig {
    /// Track-only observation along `axis`.
    #[must_use]
    pub const fn track(axis: Axis) -> Self {
        Self {
            axis,
            observe_scroll: false,
            track_inset: 0.0,
        }
    }

    /// Track plus scroll observation along `axis`.
    #[must_use]
    pub const fn scroll(axis: Axis) -> Self {
        Self {
            axis,
            observe_scroll: true,
            track_inset: 0.0,
        }
    }

    /// Set the track inset.
    #[must_use]
    pub const fn track_inset(mut self, inset: f64) -> Self {
        self.track_inset = inset;
        self
    }
}

/// One published observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSnapshot {
    /// Last usable track metrics.
    pub track: TrackMetrics,
    /// Scroll metrics, when scroll observation is on and measurable.
    pub scroll: Option<ScrollMetrics>,
    /// `false` when the track collapsed or the scroll extent is degenerate;
    /// consumers must not derive ratios from a hidden snapshot.
    pub visible: bool,
    /// Increments with every published change.
    pub generation: u64,
}

/// Why a frame produced no snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotMounted,
    NoPendingFrame,
    TrackUnmeasured,
    ContainerUnmeasured,
    ScrollUnmeasured,
    Unchanged,
}

/// Live track/scroll metrics for one control instance.
#[derive(Debug, Clone, Default)]
pub struct TrackMetricsObserver {
    config: ObserverConfig,
    mounted: bool,
    throttle: FrameThrottle,
    last: Option<MetricsSnapshot>,
    generation: u64,
}

impl TrackMetricsObserver {
    /// Create an unmounted observer.
    #[must_use]
    pub fn new(config: ObserverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Observer configuration.
    #[must_use]
    pub const fn config(&self) -> ObserverConfig {
        self.config
    }

    /// Whether subscriptions are live.
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Last published snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&MetricsSnapshot> {
        self.last.as_ref()
    }

    /// Track metrics of the last snapshot, only if it is visible.
    #[must_use]
    pub fn track_metrics(&self) -> Option<TrackMetrics> {
        self.last.filter(|s| s.visible).map(|s| s.track)
    }

    /// Subscribe. Idempotent: a second mount returns no commands.
    pub fn mount(&mut self) -> Vec<ObserverCommand> {
        if self.mounted {
            return Vec::new();
        }
        self.mounted = true;
        let mut commands = vec![
            ObserverCommand::Observe(ObservedElement::Track),
            ObserverCommand::Observe(ObservedElement::Container),
        ];
        if self.config.observe_scroll {
            commands.push(ObserverCommand::Observe(ObservedElement::Content));
            commands.push(ObserverCommand::ListenScroll);
        }
        if self.throttle.push(Triggers::TRACK_RESIZED) == FrameRequest::Schedule {
            commands.push(ObserverCommand::RequestFrame);
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: crate::logging::TARGET_METRICS,
            axis = ?self.config.axis,
            observe_scroll = self.config.observe_scroll,
            "observer mounted"
        );
        commands
    }

    /// Swap the configuration.
    ///
    /// The last snapshot is dropped, since it was measured along the old
    /// axis or inset. While mounted, scroll subscriptions follow the new
    /// `observe_scroll` and a fresh frame is requested.
    pub fn reconfigure(&mut self, config: ObserverConfig) -> Vec<ObserverCommand> {
        if config == self.config {
            return Vec::new();
        }
        let was_observing_scroll = self.config.observe_scroll;
        self.config = config;
        self.last = None;
        if !self.mounted {
            return Vec::new();
        }
        let mut commands = Vec::new();
        match (was_observing_scroll, config.observe_scroll) {
            (false, true) => {
                commands.push(ObserverCommand::Observe(ObservedElement::Content));
                commands.push(ObserverCommand::ListenScroll);
            }
            (true, false) => {
                commands.push(ObserverCommand::Unobserve(ObservedElement::Content));
                commands.push(ObserverCommand::UnlistenScroll);
            }
            _ => {}
        }
        commands.extend(self.notify(Triggers::TRACK_RESIZED));
        commands
    }

    /// Record a resize or scroll notification.
    ///
    /// Returns [`ObserverCommand::RequestFrame`] only for the first trigger
    /// of a frame; later ones coalesce. Notifications after unmount are
    /// dropped.
    pub fn notify(&mut self, trigger: Triggers) -> Option<ObserverCommand> {
        if !self.mounted {
            return None;
        }
        match self.throttle.push(trigger) {
            FrameRequest::Schedule => Some(ObserverCommand::RequestFrame),
            FrameRequest::Coalesced => None,
        }
    }

    /// The requested animation frame fired: re-measure once.
    pub fn on_frame(&mut self, source: &dyn LayoutSource) -> Result<MetricsSnapshot, SkipReason> {
        if !self.mounted {
            return Err(SkipReason::NotMounted);
        }
        if self.throttle.on_frame().is_none() {
            return Err(SkipReason::NoPendingFrame);
        }
        self.measure(source)
    }

    /// Re-measure immediately, bypassing the throttle.
    pub fn measure(&mut self, source: &dyn LayoutSource) -> Result<MetricsSnapshot, SkipReason> {
        let axis = self.config.axis;
        let Some(track_rect) = source.track_rect(axis) else {
            return Err(self.skip(SkipReason::TrackUnmeasured));
        };
        let Some(container_rect) = source.container_rect() else {
            return Err(self.skip(SkipReason::ContainerUnmeasured));
        };
        let measured = TrackMetrics::from_rects(track_rect, container_rect, axis)
            .inset(self.config.track_inset);

        let scroll = if self.config.observe_scroll {
            match source.scroll_metrics(axis) {
                Some(scroll) => Some(scroll),
                None => return Err(self.skip(SkipReason::ScrollUnmeasured)),
            }
        } else {
            None
        };

        let track_ok = !measured.is_degenerate();
        let scroll_ok = scroll.is_none_or(|s| !s.is_degenerate());
        // A collapsed track publishes `visible: false` but keeps the last
        // usable metrics so nothing downstream divides by zero.
        let track = match (track_ok, self.last) {
            (true, _) | (false, None) => measured,
            (false, Some(last)) => last.track,
        };
        let next = MetricsSnapshot {
            track,
            scroll,
            visible: track_ok && scroll_ok,
            generation: self.generation,
        };

        if let Some(last) = self.last
            && last.track == next.track
            && last.scroll == next.scroll
            && last.visible == next.visible
        {
            return Err(SkipReason::Unchanged);
        }

        self.generation = self.generation.saturating_add(1);
        let published = MetricsSnapshot {
            generation: self.generation,
            ..next
        };
        self.last = Some(published);
        Ok(published)
    }

    /// Overwrite the cached scroll position after the engine itself scrolled
    /// the content, so the thumb follows without waiting for the scroll event.
    pub fn record_scroll_position(&mut self, position: f64) {
        if let Some(snapshot) = self.last.as_mut()
            && let Some(scroll) = snapshot.scroll.as_mut()
        {
            scroll.scroll_position = position;
        }
    }

    /// Unsubscribe everything. Idempotent.
    pub fn unmount(&mut self) -> Vec<ObserverCommand> {
        if !self.mounted {
            return Vec::new();
        }
        self.mounted = false;
        let mut commands = vec![
            ObserverCommand::Unobserve(ObservedElement::Track),
            ObserverCommand::Unobserve(ObservedElement::Container),
        ];
        if self.config.observe_scroll {
            commands.push(ObserverCommand::Unobserve(ObservedElement::Content));
            commands.push(ObserverCommand::UnlistenScroll);
        }
        if self.throttle.cancel() {
            commands.push(ObserverCommand::CancelFrame);
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: crate::logging::TARGET_METRICS,
            axis = ?self.config.axis,
            "observer unmounted"
        );
        commands
    }

    fn skip(&self, reason: SkipReason) -> SkipReason {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: crate::logging::TARGET_METRICS,
            axis = ?self.config.axis,
            reason = ?reason,
            "measurement skipped; keeping last-known metrics"
        );
        reason
    }
}
