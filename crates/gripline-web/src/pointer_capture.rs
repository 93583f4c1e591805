#![forbid(unsafe_code)]

//! Deterministic pointer-capture drag controller.
//!
//! [`DragController`] bridges browser pointer lifecycle signals into
//! [`DragEvent`]s for a [`DragMachine`] while enforcing:
//! - one active session per control (a new press pre-empts a stale one),
//! - explicit capture and window-listener commands for the JS host, and
//! - cancellation on interruption paths (blur, visibility, lost capture).
//!
//! The controller never touches the DOM. Each call returns a
//! [`DragDispatch`] whose [`HostCommand`]s the host carries out, either by
//! hand or through [`DragDispatch::apply_to`] with a [`DragHost`].

use serde::{Deserialize, Serialize};

use gripline_core::drag::{
    CancelReason, DRAG_DEFAULT_HYSTERESIS, DRAG_DEFAULT_THRESHOLD, DragEffect, DragEvent,
    DragEventKind, DragMachine, DragMachineError, DragState, DragTransition,
};
use gripline_core::event::{PointerButton, PointerInput};
use gripline_core::geometry::Point;

/// Controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragControllerConfig {
    /// Distance in px a pressed pointer must travel before dragging starts.
    pub drag_threshold: f64,
    /// Minimum movement in px between two emitted drag updates.
    pub update_hysteresis: f64,
    /// Button required to begin a session.
    pub activation_button: PointerButton,
    /// If true, pointer leave cancels the session while capture was requested
    /// but never acknowledged.
    pub cancel_on_leave_without_capture: bool,
}

impl Default for DragControllerConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DRAG_DEFAULT_THRESHOLD,
            update_hysteresis: DRAG_DEFAULT_HYSTERESIS,
            activation_button: PointerButton::Primary,
            cancel_on_leave_without_capture: true,
        }
    }
}

impl DragControllerConfig {
    /// Set the drag start threshold.
    #[must_use]
    pub const fn drag_threshold(mut self, threshold: f64) -> Self {
        self.drag_threshold = threshold;
        self
    }

    /// Set the update hysteresis.
    #[must_use]
    pub const fn update_hysteresis(mut self, hysteresis: f64) -> Self {
        self.update_hysteresis = hysteresis;
        self
    }

    /// Set the activation button.
    #[must_use]
    pub const fn activation_button(mut self, button: PointerButton) -> Self {
        self.activation_button = button;
        self
    }
}

/// Browser pointer-capture state for the active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    /// `setPointerCapture` was requested; no `gotpointercapture` yet.
    Requested,
    /// The host confirmed capture.
    Acquired,
}

impl CaptureState {
    const fn is_acquired(self) -> bool {
        matches!(self, Self::Acquired)
    }
}

/// One gesture from press to release.
///
/// `O` is whatever the control needs to remember about its state at press
/// time: a value, a scroll offset, or a box size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession<O> {
    pub pointer_id: u32,
    pub button: PointerButton,
    /// Pointer position at press.
    pub origin_pointer_position: Point,
    /// Control state at press.
    pub origin_value: O,
    /// Last position the machine accepted.
    pub last_position: Point,
    pub capture_state: CaptureState,
}

impl<O> DragSession<O> {
    /// Pointer displacement from the press position to `position`.
    #[must_use]
    pub fn delta_to(&self, position: Point) -> Point {
        position.delta_from(self.origin_pointer_position)
    }
}

/// Host work requested by a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum HostCommand {
    /// `element.setPointerCapture(pointer_id)`.
    AcquireCapture { pointer_id: u32 },
    /// `element.releasePointerCapture(pointer_id)`.
    ReleaseCapture { pointer_id: u32 },
    /// Attach `pointermove`/`pointerup`/`pointercancel` on the window, plus
    /// `blur` and `visibilitychange` as a safety net.
    AttachWindowListeners,
    /// Remove everything [`HostCommand::AttachWindowListeners`] added.
    DetachWindowListeners,
}

/// Lifecycle phase recorded for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    PointerDown,
    JumpDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    PointerLeave,
    Blur,
    VisibilityHidden,
    LostPointerCapture,
    CaptureAcquired,
    Teardown,
}

/// Why an incoming lifecycle signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredReason {
    InvalidPointerId,
    ButtonNotAllowed,
    ButtonMismatch,
    NoActiveSession,
    PointerMismatch,
    LeaveWhileCaptured,
    MachineRejectedEvent,
}

/// Outcome category for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum LogOutcome {
    Forwarded,
    CaptureStateUpdated,
    Ignored(IgnoredReason),
}

/// Structured record of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragLogEntry {
    pub phase: LifecyclePhase,
    /// Sequence number of the forwarded event, if one was forwarded.
    pub sequence: Option<u64>,
    pub pointer_id: Option<u32>,
    pub position: Option<Point>,
    pub outcome: LogOutcome,
}

/// Result of one lifecycle call.
#[derive(Debug, Clone, PartialEq)]
pub struct DragDispatch<O> {
    /// Machine transition for the forwarded event.
    pub transition: Option<DragTransition>,
    /// Cancellation of a stale session that this press pre-empted.
    pub preempted: Option<DragTransition>,
    /// Host commands, in the order they must run.
    pub commands: Vec<HostCommand>,
    /// Whether the host should call `preventDefault()` on the DOM event.
    pub prevent_default: bool,
    /// The session this event was applied to, as it stood after the event.
    pub session: Option<DragSession<O>>,
    pub log: DragLogEntry,
}

impl<O> DragDispatch<O> {
    fn ignored(
        phase: LifecyclePhase,
        reason: IgnoredReason,
        pointer_id: Option<u32>,
        position: Option<Point>,
    ) -> Self {
        Self {
            transition: None,
            preempted: None,
            commands: Vec::new(),
            prevent_default: false,
            session: None,
            log: DragLogEntry {
                phase,
                sequence: None,
                pointer_id,
                position,
                outcome: LogOutcome::Ignored(reason),
            },
        }
    }

    /// Effect of the forwarded transition.
    #[must_use]
    pub fn effect(&self) -> Option<DragEffect> {
        self.transition.map(|t| t.effect)
    }

    /// Whether the signal was dropped without reaching the machine.
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self.log.outcome, LogOutcome::Ignored(_))
    }

    /// Run every command against `host`, in order.
    pub fn apply_to<H: DragHost + ?Sized>(&self, host: &mut H) {
        for command in &self.commands {
            match *command {
                HostCommand::AcquireCapture { pointer_id } => host.acquire_capture(pointer_id),
                HostCommand::ReleaseCapture { pointer_id } => host.release_capture(pointer_id),
                HostCommand::AttachWindowListeners => host.attach_window_listeners(),
                HostCommand::DetachWindowListeners => host.detach_window_listeners(),
            }
        }
    }
}

/// DOM side of a drag: capture and window-level listeners.
pub trait DragHost {
    fn acquire_capture(&mut self, pointer_id: u32);
    fn release_capture(&mut self, pointer_id: u32);
    fn attach_window_listeners(&mut self);
    fn detach_window_listeners(&mut self);
}

#[derive(Debug, Clone, Copy)]
struct DispatchContext {
    phase: LifecyclePhase,
    pointer_id: Option<u32>,
    position: Option<Point>,
}

/// Per-control drag controller.
#[derive(Debug, Clone)]
pub struct DragController<O> {
    machine: DragMachine,
    config: DragControllerConfig,
    session: Option<DragSession<O>>,
    next_sequence: u64,
}

impl<O: Copy> Default for DragController<O> {
    fn default() -> Self {
        Self {
            machine: DragMachine::default(),
            config: DragControllerConfig::default(),
            session: None,
            next_sequence: 1,
        }
    }
}

impl<O: Copy> DragController<O> {
    /// Construct a controller with validated thresholds.
    pub fn new(config: DragControllerConfig) -> Result<Self, DragMachineError> {
        let machine = DragMachine::new(config.drag_threshold, config.update_hysteresis)?;
        Ok(Self {
            machine,
            config,
            session: None,
            next_sequence: 1,
        })
    }

    /// Controller configuration.
    #[must_use]
    pub const fn config(&self) -> DragControllerConfig {
        self.config
    }

    /// Active session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&DragSession<O>> {
        self.session.as_ref()
    }

    /// Whether a session exists (Armed or Dragging).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the active session passed the drag threshold.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.machine.is_dragging()
    }

    /// Current machine state.
    #[must_use]
    pub const fn machine_state(&self) -> DragState {
        self.machine.state()
    }

    /// Handle a press that arms a drag (typically on the thumb).
    pub fn pointer_down(&mut self, input: PointerInput, origin_value: O) -> DragDispatch<O> {
        self.begin(LifecyclePhase::PointerDown, input, origin_value)
    }

    /// Handle a press that jumps and drags at once (typically on the bare
    /// track). The caller applies the jumped-to state before calling this, so
    /// `origin_value` is the post-jump state.
    pub fn jump_down(&mut self, input: PointerInput, origin_value: O) -> DragDispatch<O> {
        self.begin(LifecyclePhase::JumpDown, input, origin_value)
    }

    /// Mark browser pointer capture as acquired.
    pub fn capture_acquired(&mut self, pointer_id: u32) -> DragDispatch<O> {
        let Some(session) = self.session.as_mut() else {
            return DragDispatch::ignored(
                LifecyclePhase::CaptureAcquired,
                IgnoredReason::NoActiveSession,
                Some(pointer_id),
                None,
            );
        };
        if session.pointer_id != pointer_id {
            return DragDispatch::ignored(
                LifecyclePhase::CaptureAcquired,
                IgnoredReason::PointerMismatch,
                Some(pointer_id),
                None,
            );
        }
        session.capture_state = CaptureState::Acquired;
        DragDispatch {
            transition: None,
            preempted: None,
            commands: Vec::new(),
            prevent_default: false,
            session: Some(*session),
            log: DragLogEntry {
                phase: LifecyclePhase::CaptureAcquired,
                sequence: None,
                pointer_id: Some(pointer_id),
                position: None,
                outcome: LogOutcome::CaptureStateUpdated,
            },
        }
    }

    /// Handle pointer-move from the window listener.
    pub fn pointer_move(&mut self, input: PointerInput) -> DragDispatch<O> {
        let phase = LifecyclePhase::PointerMove;
        let session = match self.active_for(phase, input.pointer_id, Some(input.position)) {
            Ok(session) => session,
            Err(ignored) => return ignored,
        };
        let kind = DragEventKind::PointerMove {
            pointer_id: input.pointer_id,
            position: input.position,
        };
        let mut dispatch = self.forward(
            DispatchContext {
                phase,
                pointer_id: Some(input.pointer_id),
                position: Some(input.position),
            },
            kind,
            Vec::new(),
        );
        if let Some(effect) = dispatch.effect()
            && matches!(
                effect,
                DragEffect::DragStarted { .. } | DragEffect::DragUpdated { .. }
            )
        {
            let updated = DragSession {
                last_position: input.position,
                ..session
            };
            self.session = Some(updated);
        }
        dispatch.prevent_default = !dispatch.is_ignored();
        dispatch.session = self.session;
        dispatch
    }

    /// Handle pointer-up; ends the session with a commit.
    pub fn pointer_up(&mut self, input: PointerInput) -> DragDispatch<O> {
        let phase = LifecyclePhase::PointerUp;
        let session = match self.active_for(phase, input.pointer_id, Some(input.position)) {
            Ok(session) => session,
            Err(ignored) => return ignored,
        };
        if session.button != input.button {
            return DragDispatch::ignored(
                phase,
                IgnoredReason::ButtonMismatch,
                Some(input.pointer_id),
                Some(input.position),
            );
        }
        let kind = DragEventKind::PointerUp {
            pointer_id: input.pointer_id,
            position: input.position,
        };
        let commands = release_commands(&session, session.capture_state.is_acquired());
        let mut dispatch = self.forward(
            DispatchContext {
                phase,
                pointer_id: Some(input.pointer_id),
                position: Some(input.position),
            },
            kind,
            commands,
        );
        if !dispatch.is_ignored() {
            self.session = None;
            dispatch.prevent_default = true;
            dispatch.session = Some(DragSession {
                last_position: input.position,
                ..session
            });
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: gripline_core::logging::TARGET_DRAG,
                pointer_id = input.pointer_id,
                phase = ?phase,
                "drag session committed"
            );
        }
        dispatch
    }

    /// Handle browser `pointercancel`.
    pub fn pointer_cancel(&mut self, pointer_id: Option<u32>) -> DragDispatch<O> {
        self.cancel_active(
            LifecyclePhase::PointerCancel,
            pointer_id,
            CancelReason::PointerCancel,
            ReleasePolicy::IfAcquired,
        )
    }

    /// Handle `pointerleave` on the originating element.
    ///
    /// Once capture is acknowledged the window listeners keep the gesture
    /// alive, so leaving is ignored. Before that, leaving cancels (when
    /// configured) because further moves may never arrive.
    pub fn pointer_leave(&mut self, pointer_id: u32) -> DragDispatch<O> {
        let phase = LifecyclePhase::PointerLeave;
        let session = match self.active_for(phase, pointer_id, None) {
            Ok(session) => session,
            Err(ignored) => return ignored,
        };
        if !session.capture_state.is_acquired() && self.config.cancel_on_leave_without_capture {
            self.cancel_active(
                phase,
                Some(pointer_id),
                CancelReason::PointerLeave,
                ReleasePolicy::IfAcquired,
            )
        } else {
            DragDispatch::ignored(
                phase,
                IgnoredReason::LeaveWhileCaptured,
                Some(pointer_id),
                None,
            )
        }
    }

    /// Handle window blur (context menu, alt-tab).
    pub fn blur(&mut self) -> DragDispatch<O> {
        self.cancel_active(
            LifecyclePhase::Blur,
            None,
            CancelReason::Blur,
            ReleasePolicy::IfAcquired,
        )
    }

    /// Handle `visibilitychange` to hidden.
    pub fn visibility_hidden(&mut self) -> DragDispatch<O> {
        self.cancel_active(
            LifecyclePhase::VisibilityHidden,
            None,
            CancelReason::VisibilityHidden,
            ReleasePolicy::IfAcquired,
        )
    }

    /// Handle `lostpointercapture`; the browser already dropped capture, so
    /// no release is issued.
    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> DragDispatch<O> {
        self.cancel_active(
            LifecyclePhase::LostPointerCapture,
            Some(pointer_id),
            CancelReason::LostCapture,
            ReleasePolicy::Never,
        )
    }

    /// Cancel from outside the pointer stream (unmount, disable).
    ///
    /// Releases capture even when it was never acknowledged. Events that
    /// arrive afterwards are ignored with [`IgnoredReason::NoActiveSession`].
    pub fn teardown(&mut self) -> DragDispatch<O> {
        self.cancel_active(
            LifecyclePhase::Teardown,
            None,
            CancelReason::Teardown,
            ReleasePolicy::Always,
        )
    }

    fn begin(
        &mut self,
        phase: LifecyclePhase,
        input: PointerInput,
        origin_value: O,
    ) -> DragDispatch<O> {
        let PointerInput {
            pointer_id,
            button,
            position,
        } = input;
        if pointer_id == 0 {
            return DragDispatch::ignored(
                phase,
                IgnoredReason::InvalidPointerId,
                Some(pointer_id),
                Some(position),
            );
        }
        if button != self.config.activation_button {
            return DragDispatch::ignored(
                phase,
                IgnoredReason::ButtonNotAllowed,
                Some(pointer_id),
                Some(position),
            );
        }
        let kind = if phase == LifecyclePhase::JumpDown {
            DragEventKind::JumpDown {
                pointer_id,
                position,
            }
        } else {
            DragEventKind::PointerDown {
                pointer_id,
                position,
            }
        };
        // Reject malformed input before tearing down a live session for it.
        if DragEvent::new(self.next_sequence, kind).validate().is_err() {
            return DragDispatch::ignored(
                phase,
                IgnoredReason::MachineRejectedEvent,
                Some(pointer_id),
                Some(position),
            );
        }

        let mut commands = Vec::new();
        let mut preempted = None;
        if let Some(stale) = self.session.take() {
            commands.extend(release_commands(&stale, true));
            preempted = self.machine.force_cancel(CancelReason::Preempted);
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: gripline_core::logging::TARGET_DRAG,
                stale_pointer_id = stale.pointer_id,
                pointer_id,
                "stale drag session pre-empted"
            );
        }

        commands.push(HostCommand::AcquireCapture { pointer_id });
        commands.push(HostCommand::AttachWindowListeners);
        let mut dispatch = self.forward(
            DispatchContext {
                phase,
                pointer_id: Some(pointer_id),
                position: Some(position),
            },
            kind,
            commands,
        );
        dispatch.preempted = preempted;
        if !dispatch.is_ignored() {
            let session = DragSession {
                pointer_id,
                button,
                origin_pointer_position: position,
                origin_value,
                last_position: position,
                capture_state: CaptureState::Requested,
            };
            self.session = Some(session);
            dispatch.session = Some(session);
            dispatch.prevent_default = true;
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: gripline_core::logging::TARGET_DRAG,
                pointer_id,
                phase = ?phase,
                "drag session started"
            );
        }
        dispatch
    }

    fn active_for(
        &self,
        phase: LifecyclePhase,
        pointer_id: u32,
        position: Option<Point>,
    ) -> Result<DragSession<O>, DragDispatch<O>> {
        let Some(session) = self.session else {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                target: gripline_core::logging::TARGET_DRAG,
                pointer_id,
                phase = ?phase,
                "late pointer event ignored"
            );
            return Err(DragDispatch::ignored(
                phase,
                IgnoredReason::NoActiveSession,
                Some(pointer_id),
                position,
            ));
        };
        if session.pointer_id != pointer_id {
            return Err(DragDispatch::ignored(
                phase,
                IgnoredReason::PointerMismatch,
                Some(pointer_id),
                position,
            ));
        }
        Ok(session)
    }

    fn cancel_active(
        &mut self,
        phase: LifecyclePhase,
        pointer_id: Option<u32>,
        reason: CancelReason,
        release: ReleasePolicy,
    ) -> DragDispatch<O> {
        let Some(session) = self.session else {
            return DragDispatch::ignored(phase, IgnoredReason::NoActiveSession, pointer_id, None);
        };
        if let Some(id) = pointer_id
            && id != session.pointer_id
        {
            return DragDispatch::ignored(phase, IgnoredReason::PointerMismatch, Some(id), None);
        }

        let release_capture = match release {
            ReleasePolicy::Always => true,
            ReleasePolicy::IfAcquired => session.capture_state.is_acquired(),
            ReleasePolicy::Never => false,
        };
        let mut dispatch = self.forward(
            DispatchContext {
                phase,
                pointer_id: Some(session.pointer_id),
                position: None,
            },
            DragEventKind::Cancel { reason },
            release_commands(&session, release_capture),
        );
        if !dispatch.is_ignored() {
            self.session = None;
            dispatch.session = Some(session);
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: gripline_core::logging::TARGET_DRAG,
                pointer_id = session.pointer_id,
                phase = ?phase,
                reason = ?reason,
                "drag session canceled"
            );
        }
        dispatch
    }

    fn forward(
        &mut self,
        context: DispatchContext,
        kind: DragEventKind,
        commands: Vec<HostCommand>,
    ) -> DragDispatch<O> {
        let event = DragEvent::new(self.next_sequence(), kind);
        match self.machine.apply_event(&event) {
            Ok(transition) => DragDispatch {
                transition: Some(transition),
                preempted: None,
                commands,
                prevent_default: false,
                session: None,
                log: DragLogEntry {
                    phase: context.phase,
                    sequence: Some(event.sequence),
                    pointer_id: context.pointer_id,
                    position: context.position,
                    outcome: LogOutcome::Forwarded,
                },
            },
            Err(_error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    target: gripline_core::logging::TARGET_DRAG,
                    phase = ?context.phase,
                    error = %_error,
                    "drag machine rejected event"
                );
                DragDispatch::ignored(
                    context.phase,
                    IgnoredReason::MachineRejectedEvent,
                    context.pointer_id,
                    context.position,
                )
            }
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        sequence
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReleasePolicy {
    Always,
    IfAcquired,
    Never,
}

fn release_commands<O>(session: &DragSession<O>, release_capture: bool) -> Vec<HostCommand> {
    let mut commands = Vec::with_capacity(2);
    if release_capture {
        commands.push(HostCommand::ReleaseCapture {
            pointer_id: session.pointer_id,
        });
    }
    commands.push(HostCommand::DetachWindowListeners);
    commands
}
