#![forbid(unsafe_code)]

//! `gripline-web` adapts the core drag machine to browser pointer events.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (JS) forwards DOM events
//!   and carries out the returned [`pointer_capture::HostCommand`]s.
//! - **One disciplined listener lifecycle**: window listeners are attached
//!   and detached only through [`pointer_capture::DragController`], so
//!   unmount-during-drag is handled the same way at every call site.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! This crate does not bind to `wasm-bindgen`; a thin JS shim maps DOM events
//! onto controller calls and commands onto DOM calls.

pub mod pointer_capture;

pub use pointer_capture::{
    CaptureState, DragController, DragControllerConfig, DragDispatch, DragHost, DragLogEntry,
    DragSession, HostCommand, IgnoredReason, LifecyclePhase, LogOutcome,
};
