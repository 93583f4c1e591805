#![forbid(unsafe_code)]

//! Logging facade.
//!
//! With the `tracing` feature enabled this module re-exports the `tracing`
//! macros so downstream crates can log through `gripline_core::debug!` and
//! friends without declaring their own dependency. Without the feature the
//! module only exposes the target names, and every instrumentation site in
//! the workspace compiles away behind `#[cfg(feature = "tracing")]`.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, info, trace, trace_span, warn};

/// Log target for drag lifecycle events.
pub const TARGET_DRAG: &str = "gripline.drag";

/// Log target for metrics observation.
pub const TARGET_METRICS: &str = "gripline.metrics";

/// Log target for value and size commits.
pub const TARGET_COMMIT: &str = "gripline.commit";

/// Log target for popup refocus decisions.
pub const TARGET_FOCUS: &str = "gripline.focus";
