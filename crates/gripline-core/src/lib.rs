#![forbid(unsafe_code)]

//! Core: track geometry, value clamping, metrics observation, and the drag
//! lifecycle machine.
//!
//! # Role in gripline
//! `gripline-core` holds everything that is pure or host-agnostic. It never
//! touches a DOM: measurements arrive through the [`metrics::LayoutSource`]
//! trait and every output is a plain value the caller applies.
//!
//! # Primary responsibilities
//! - **GeometryMapper** ([`geometry`]): pointer coordinate <-> track ratio.
//! - **ValueClamper** ([`value`]): min/max bounds and step quantization.
//! - **Input** ([`event`]): canonical pointer and key types.
//! - **FrameThrottle** ([`frame_throttle`]): one recomputation per animation frame.
//! - **TrackMetricsObserver** ([`metrics`]): live track and scroll metrics.
//! - **DragMachine** ([`drag`]): Idle -> Armed -> Dragging -> Idle lifecycle.
//!
//! # How it fits in the system
//! `gripline-web` wraps [`drag::DragMachine`] with pointer-capture and
//! listener bookkeeping, and `gripline-widgets` composes all of the above into
//! sliders, scrollbars, color fields, and resize handles.

pub mod drag;
pub mod event;
pub mod frame_throttle;
pub mod geometry;
pub mod logging;
pub mod metrics;
pub mod value;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, info, trace, trace_span, warn};
