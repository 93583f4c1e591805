#![forbid(unsafe_code)]

//! Deterministic drag lifecycle machine.
//!
//! ```text
//! Idle -> Armed -> Dragging -> Idle
//!    \       \------> Idle (commit/cancel from Armed)
//!     \-----------> Dragging (jump: click-on-track starts dragging at once)
//! ```
//!
//! The machine only tracks pointer identity and positions. It knows nothing
//! about values, capture, or listeners; `gripline-web` layers those on top
//! and widgets turn the emitted [`DragEffect`]s into committed values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Default distance a pointer must travel from an Armed press before the
/// gesture counts as a drag.
pub const DRAG_DEFAULT_THRESHOLD: f64 = 0.0;

/// Default minimum movement between two emitted drag updates.
pub const DRAG_DEFAULT_HYSTERESIS: f64 = 0.0;

/// Why a session ended without a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// Browser `pointercancel`.
    PointerCancel,
    /// Pointer left the element before capture was acknowledged.
    PointerLeave,
    /// Browser `lostpointercapture`.
    LostCapture,
    /// Window lost focus (for example a context menu opened).
    Blur,
    /// Document became hidden.
    VisibilityHidden,
    /// A new pointer-down replaced the stale session.
    Preempted,
    /// The owning control was unmounted or disabled.
    Teardown,
}

/// Event kinds the machine consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DragEventKind {
    /// Press that arms a drag (typically on a thumb).
    PointerDown { pointer_id: u32, position: Point },
    /// Press that jumps and immediately drags (typically on a bare track).
    JumpDown { pointer_id: u32, position: Point },
    PointerMove { pointer_id: u32, position: Point },
    PointerUp { pointer_id: u32, position: Point },
    Cancel { reason: CancelReason },
}

/// One sequenced input event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragEvent {
    pub sequence: u64,
    #[serde(flatten)]
    pub kind: DragEventKind,
}

impl DragEvent {
    /// Create an event.
    #[must_use]
    pub const fn new(sequence: u64, kind: DragEventKind) -> Self {
        Self { sequence, kind }
    }

    /// Validate event invariants.
    pub fn validate(&self) -> Result<(), DragEventError> {
        if self.sequence == 0 {
            return Err(DragEventError::ZeroSequence);
        }
        match self.kind {
            DragEventKind::PointerDown {
                pointer_id,
                position,
            }
            | DragEventKind::JumpDown {
                pointer_id,
                position,
            }
            | DragEventKind::PointerMove {
                pointer_id,
                position,
            }
            | DragEventKind::PointerUp {
                pointer_id,
                position,
            } => {
                if pointer_id == 0 {
                    return Err(DragEventError::ZeroPointerId);
                }
                if !position.is_finite() {
                    return Err(DragEventError::NonFinitePosition);
                }
            }
            DragEventKind::Cancel { .. } => {}
        }
        Ok(())
    }
}

/// Validation failures for drag events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEventError {
    ZeroSequence,
    ZeroPointerId,
    NonFinitePosition,
}

impl fmt::Display for DragEventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSequence => write!(f, "event sequence must be > 0"),
            Self::ZeroPointerId => write!(f, "pointer id 0 is reserved"),
            Self::NonFinitePosition => write!(f, "pointer position must be finite"),
        }
    }
}

impl std::error::Error for DragEventError {}

/// Drag lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragState {
    Idle,
    Armed {
        pointer_id: u32,
        origin: Point,
        current: Point,
        started_sequence: u64,
    },
    Dragging {
        pointer_id: u32,
        origin: Point,
        current: Point,
        started_sequence: u64,
        drag_started_sequence: u64,
    },
}

impl DragState {
    /// Pointer owning the active gesture, if any.
    #[must_use]
    pub const fn pointer_id(&self) -> Option<u32> {
        match self {
            Self::Idle => None,
            Self::Armed { pointer_id, .. } | Self::Dragging { pointer_id, .. } => Some(*pointer_id),
        }
    }
}

/// Explicit no-op diagnostics for events that are safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragNoopReason {
    IdleWithoutActiveDrag,
    ActiveDragAlreadyInProgress,
    PointerMismatch,
    ThresholdNotReached,
    BelowHysteresis,
}

/// Effect emitted by one lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum DragEffect {
    Armed {
        pointer_id: u32,
        origin: Point,
    },
    DragStarted {
        pointer_id: u32,
        origin: Point,
        current: Point,
        total_delta: Point,
    },
    DragUpdated {
        pointer_id: u32,
        previous: Point,
        current: Point,
        delta: Point,
        total_delta: Point,
    },
    Committed {
        pointer_id: u32,
        origin: Point,
        end: Point,
        total_delta: Point,
        /// `false` when the press was released before it became a drag.
        dragged: bool,
    },
    Canceled {
        pointer_id: Option<u32>,
        reason: CancelReason,
    },
    Noop {
        reason: DragNoopReason,
    },
}

impl DragEffect {
    /// Pointer position the effect leaves the gesture at, if it carries one.
    #[must_use]
    pub const fn position(&self) -> Option<Point> {
        match self {
            Self::Armed { origin, .. } => Some(*origin),
            Self::DragStarted { current, .. } | Self::DragUpdated { current, .. } => Some(*current),
            Self::Committed { end, .. } => Some(*end),
            Self::Canceled { .. } | Self::Noop { .. } => None,
        }
    }

    /// Whether this effect ends the gesture.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed { .. } | Self::Canceled { .. })
    }
}

/// One state-machine transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragTransition {
    pub transition_id: u64,
    pub sequence: u64,
    pub from: DragState,
    pub to: DragState,
    pub effect: DragEffect,
}

/// Lifecycle machine configuration errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragMachineError {
    InvalidDragThreshold { threshold: f64 },
    InvalidUpdateHysteresis { hysteresis: f64 },
    InvalidEvent(DragEventError),
}

impl fmt::Display for DragMachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDragThreshold { threshold } => {
                write!(f, "drag threshold must be finite and >= 0 (got {threshold})")
            }
            Self::InvalidUpdateHysteresis { hysteresis } => {
                write!(
                    f,
                    "update hysteresis must be finite and >= 0 (got {hysteresis})"
                )
            }
            Self::InvalidEvent(error) => write!(f, "invalid drag event: {error}"),
        }
    }
}

impl std::error::Error for DragMachineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::InvalidEvent(error) = self {
            return Some(error);
        }
        None
    }
}

/// Runtime lifecycle machine for one control's drag gestures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragMachine {
    state: DragState,
    drag_threshold: f64,
    update_hysteresis: f64,
    transition_counter: u64,
}

impl Default for DragMachine {
    fn default() -> Self {
        Self {
            state: DragState::Idle,
            drag_threshold: DRAG_DEFAULT_THRESHOLD,
            update_hysteresis: DRAG_DEFAULT_HYSTERESIS,
            transition_counter: 0,
        }
    }
}

impl DragMachine {
    /// Construct a machine with explicit threshold and update hysteresis.
    pub fn new(drag_threshold: f64, update_hysteresis: f64) -> Result<Self, DragMachineError> {
        if !(drag_threshold.is_finite() && drag_threshold >= 0.0) {
            return Err(DragMachineError::InvalidDragThreshold {
                threshold: drag_threshold,
            });
        }
        if !(update_hysteresis.is_finite() && update_hysteresis >= 0.0) {
            return Err(DragMachineError::InvalidUpdateHysteresis {
                hysteresis: update_hysteresis,
            });
        }
        Ok(Self {
            drag_threshold,
            update_hysteresis,
            ..Self::default()
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> DragState {
        self.state
    }

    /// Whether the machine is Armed or Dragging.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// Whether the machine is Dragging.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Unconditionally return to Idle.
    ///
    /// Used on teardown paths where no sequenced event exists. Returns `None`
    /// if already Idle.
    pub fn force_cancel(&mut self, reason: CancelReason) -> Option<DragTransition> {
        let from = self.state;
        let pointer_id = from.pointer_id()?;
        self.state = DragState::Idle;
        self.transition_counter = self.transition_counter.saturating_add(1);
        Some(DragTransition {
            transition_id: self.transition_counter,
            sequence: 0,
            from,
            to: DragState::Idle,
            effect: DragEffect::Canceled {
                pointer_id: Some(pointer_id),
                reason,
            },
        })
    }

    /// Apply one event and report the resulting transition.
    pub fn apply_event(&mut self, event: &DragEvent) -> Result<DragTransition, DragMachineError> {
        event.validate().map_err(DragMachineError::InvalidEvent)?;

        let from = self.state;
        let effect = match (self.state, event.kind) {
            (
                DragState::Idle,
                DragEventKind::PointerDown {
                    pointer_id,
                    position,
                },
            ) => {
                self.state = DragState::Armed {
                    pointer_id,
                    origin: position,
                    current: position,
                    started_sequence: event.sequence,
                };
                DragEffect::Armed {
                    pointer_id,
                    origin: position,
                }
            }
            (
                DragState::Idle,
                DragEventKind::JumpDown {
                    pointer_id,
                    position,
                },
            ) => {
                self.state = DragState::Dragging {
                    pointer_id,
                    origin: position,
                    current: position,
                    started_sequence: event.sequence,
                    drag_started_sequence: event.sequence,
                };
                DragEffect::DragStarted {
                    pointer_id,
                    origin: position,
                    current: position,
                    total_delta: Point::ZERO,
                }
            }
            (DragState::Idle, _) => DragEffect::Noop {
                reason: DragNoopReason::IdleWithoutActiveDrag,
            },
            (
                DragState::Armed { .. } | DragState::Dragging { .. },
                DragEventKind::PointerDown { .. } | DragEventKind::JumpDown { .. },
            ) => DragEffect::Noop {
                reason: DragNoopReason::ActiveDragAlreadyInProgress,
            },
            (
                DragState::Armed {
                    pointer_id,
                    origin,
                    started_sequence,
                    ..
                },
                DragEventKind::PointerMove {
                    pointer_id: incoming,
                    position,
                },
            ) => {
                if incoming != pointer_id {
                    DragEffect::Noop {
                        reason: DragNoopReason::PointerMismatch,
                    }
                } else if crossed(origin, position, self.drag_threshold) {
                    self.state = DragState::Dragging {
                        pointer_id,
                        origin,
                        current: position,
                        started_sequence,
                        drag_started_sequence: event.sequence,
                    };
                    DragEffect::DragStarted {
                        pointer_id,
                        origin,
                        current: position,
                        total_delta: position.delta_from(origin),
                    }
                } else {
                    self.state = DragState::Armed {
                        pointer_id,
                        origin,
                        current: position,
                        started_sequence,
                    };
                    DragEffect::Noop {
                        reason: DragNoopReason::ThresholdNotReached,
                    }
                }
            }
            (
                DragState::Dragging {
                    pointer_id,
                    origin,
                    current,
                    started_sequence,
                    drag_started_sequence,
                },
                DragEventKind::PointerMove {
                    pointer_id: incoming,
                    position,
                },
            ) => {
                if incoming != pointer_id {
                    DragEffect::Noop {
                        reason: DragNoopReason::PointerMismatch,
                    }
                } else if !crossed(current, position, self.update_hysteresis) {
                    DragEffect::Noop {
                        reason: DragNoopReason::BelowHysteresis,
                    }
                } else {
                    self.state = DragState::Dragging {
                        pointer_id,
                        origin,
                        current: position,
                        started_sequence,
                        drag_started_sequence,
                    };
                    DragEffect::DragUpdated {
                        pointer_id,
                        previous: current,
                        current: position,
                        delta: position.delta_from(current),
                        total_delta: position.delta_from(origin),
                    }
                }
            }
            (
                DragState::Armed {
                    pointer_id, origin, ..
                }
                | DragState::Dragging {
                    pointer_id, origin, ..
                },
                DragEventKind::PointerUp {
                    pointer_id: incoming,
                    position,
                },
            ) => {
                if incoming != pointer_id {
                    DragEffect::Noop {
                        reason: DragNoopReason::PointerMismatch,
                    }
                } else {
                    let dragged = matches!(from, DragState::Dragging { .. });
                    self.state = DragState::Idle;
                    DragEffect::Committed {
                        pointer_id,
                        origin,
                        end: position,
                        total_delta: position.delta_from(origin),
                        dragged,
                    }
                }
            }
            (
                DragState::Armed { pointer_id, .. } | DragState::Dragging { pointer_id, .. },
                DragEventKind::Cancel { reason },
            ) => {
                self.state = DragState::Idle;
                DragEffect::Canceled {
                    pointer_id: Some(pointer_id),
                    reason,
                }
            }
        };

        self.transition_counter = self.transition_counter.saturating_add(1);
        Ok(DragTransition {
            transition_id: self.transition_counter,
            sequence: event.sequence,
            from,
            to: self.state,
            effect,
        })
    }
}

fn crossed(from: Point, to: Point, threshold: f64) -> bool {
    let d = to.delta_from(from);
    d.x * d.x + d.y * d.y >= threshold * threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(sequence: u64, pointer_id: u32, x: f64) -> DragEvent {
        DragEvent::new(
            sequence,
            DragEventKind::PointerDown {
                pointer_id,
                position: Point::new(x, 0.0),
            },
        )
    }

    fn moved(sequence: u64, pointer_id: u32, x: f64) -> DragEvent {
        DragEvent::new(
            sequence,
            DragEventKind::PointerMove {
                pointer_id,
                position: Point::new(x, 0.0),
            },
        )
    }

    fn up(sequence: u64, pointer_id: u32, x: f64) -> DragEvent {
        DragEvent::new(
            sequence,
            DragEventKind::PointerUp {
                pointer_id,
                position: Point::new(x, 0.0),
            },
        )
    }

    #[test]
    fn full_lifecycle_idle_armed_dragging_idle() {
        let mut machine = DragMachine::new(3.0, 0.0).expect("valid config");
        let armed = machine.apply_event(&down(1, 4, 10.0)).expect("valid");
        assert!(matches!(armed.effect, DragEffect::Armed { pointer_id: 4, .. }));

        let below = machine.apply_event(&moved(2, 4, 11.0)).expect("valid");
        assert_eq!(
            below.effect,
            DragEffect::Noop {
                reason: DragNoopReason::ThresholdNotReached
            }
        );

        let started = machine.apply_event(&moved(3, 4, 14.0)).expect("valid");
        assert!(matches!(
            started.effect,
            DragEffect::DragStarted { total_delta, .. } if total_delta.x == 4.0
        ));
        assert!(machine.is_dragging());

        let updated = machine.apply_event(&moved(4, 4, 20.0)).expect("valid");
        assert!(matches!(
            updated.effect,
            DragEffect::DragUpdated { delta, total_delta, .. }
                if delta.x == 6.0 && total_delta.x == 10.0
        ));

        let committed = machine.apply_event(&up(5, 4, 21.0)).expect("valid");
        assert!(matches!(
            committed.effect,
            DragEffect::Committed { dragged: true, total_delta, .. } if total_delta.x == 11.0
        ));
        assert_eq!(machine.state(), DragState::Idle);
        assert_eq!(committed.transition_id, 5);
    }

    #[test]
    fn jump_down_enters_dragging_directly() {
        let mut machine = DragMachine::default();
        let jump = machine
            .apply_event(&DragEvent::new(
                1,
                DragEventKind::JumpDown {
                    pointer_id: 2,
                    position: Point::new(50.0, 5.0),
                },
            ))
            .expect("valid");
        assert_eq!(jump.from, DragState::Idle);
        assert!(matches!(jump.to, DragState::Dragging { .. }));
    }

    #[test]
    fn release_before_threshold_commits_without_drag() {
        let mut machine = DragMachine::new(5.0, 0.0).expect("valid config");
        machine.apply_event(&down(1, 1, 0.0)).expect("valid");
        let committed = machine.apply_event(&up(2, 1, 1.0)).expect("valid");
        assert!(matches!(
            committed.effect,
            DragEffect::Committed { dragged: false, .. }
        ));
    }

    #[test]
    fn foreign_pointer_is_noop() {
        let mut machine = DragMachine::default();
        machine.apply_event(&down(1, 1, 0.0)).expect("valid");
        let other = machine.apply_event(&moved(2, 9, 30.0)).expect("valid");
        assert_eq!(
            other.effect,
            DragEffect::Noop {
                reason: DragNoopReason::PointerMismatch
            }
        );
        let second_down = machine.apply_event(&down(3, 9, 30.0)).expect("valid");
        assert_eq!(
            second_down.effect,
            DragEffect::Noop {
                reason: DragNoopReason::ActiveDragAlreadyInProgress
            }
        );
    }

    #[test]
    fn hysteresis_filters_jitter() {
        let mut machine = DragMachine::new(0.0, 2.0).expect("valid config");
        machine.apply_event(&down(1, 1, 0.0)).expect("valid");
        machine.apply_event(&moved(2, 1, 5.0)).expect("valid");
        let jitter = machine.apply_event(&moved(3, 1, 6.0)).expect("valid");
        assert_eq!(
            jitter.effect,
            DragEffect::Noop {
                reason: DragNoopReason::BelowHysteresis
            }
        );
    }

    #[test]
    fn cancel_and_force_cancel_return_to_idle() {
        let mut machine = DragMachine::default();
        machine.apply_event(&down(1, 1, 0.0)).expect("valid");
        let canceled = machine
            .apply_event(&DragEvent::new(
                2,
                DragEventKind::Cancel {
                    reason: CancelReason::Blur,
                },
            ))
            .expect("valid");
        assert_eq!(
            canceled.effect,
            DragEffect::Canceled {
                pointer_id: Some(1),
                reason: CancelReason::Blur
            }
        );
        assert!(machine.force_cancel(CancelReason::Teardown).is_none());

        machine.apply_event(&down(3, 1, 0.0)).expect("valid");
        let forced = machine
            .force_cancel(CancelReason::Teardown)
            .expect("was active");
        assert_eq!(forced.to, DragState::Idle);
    }

    #[test]
    fn invalid_events_and_config_are_rejected() {
        assert!(matches!(
            DragMachine::new(-1.0, 0.0),
            Err(DragMachineError::InvalidDragThreshold { .. })
        ));
        assert!(matches!(
            DragMachine::new(0.0, f64::NAN),
            Err(DragMachineError::InvalidUpdateHysteresis { .. })
        ));
        let mut machine = DragMachine::default();
        assert_eq!(
            machine.apply_event(&down(0, 1, 0.0)),
            Err(DragMachineError::InvalidEvent(DragEventError::ZeroSequence))
        );
        assert_eq!(
            machine.apply_event(&down(1, 0, 0.0)),
            Err(DragMachineError::InvalidEvent(DragEventError::ZeroPointerId))
        );
        assert_eq!(
            machine.apply_event(&down(1, 1, f64::INFINITY)),
            Err(DragMachineError::InvalidEvent(
                DragEventError::NonFinitePosition
            ))
        );
    }

    #[test]
    fn events_serialize_with_tags() {
        let json = serde_json::to_value(down(7, 3, 1.5)).expect("serializable");
        assert_eq!(json["event"], "pointer_down");
        assert_eq!(json["sequence"], 7);
        assert_eq!(json["pointer_id"], 3);
    }
}
