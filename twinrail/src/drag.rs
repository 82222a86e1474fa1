//! Per-handle drag gestures.
//!
//! Each handle runs its own small state machine: idle until a drag starts,
//! dragging until it ends. Both may be active at once (multi-touch). A
//! session only ever writes its own handle's position and reads the other
//! handle's latest position through the resolver.

use tracing::debug;

use crate::{
    constraint::resolve,
    convert::{HandlePosition, RangeValue, position_to_value},
    geometry::{Handle, RailGeometry},
    px::Px,
};

/// Phase reported by the drag source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// Pointer pressed on the handle.
    Start,
    /// Pointer moved while pressed.
    Move,
    /// Pointer released.
    End,
}

/// One event from the drag source.
///
/// `source` names the dragged element; the controller maps it to a
/// [`Handle`] and ignores ids it does not own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEvent {
    /// Id of the dragged element.
    pub source: String,
    /// Gesture phase.
    pub phase: DragPhase,
    /// Pointer coordinate along the track axis.
    pub coordinate: Px,
}

impl DragEvent {
    /// Creates an event for `source`.
    pub fn new(source: impl Into<String>, phase: DragPhase, coordinate: Px) -> Self {
        Self {
            source: source.into(),
            phase,
            coordinate,
        }
    }

    /// A [`DragPhase::Start`] event.
    pub fn start(source: impl Into<String>, coordinate: Px) -> Self {
        Self::new(source, DragPhase::Start, coordinate)
    }

    /// A [`DragPhase::Move`] event.
    pub fn moved(source: impl Into<String>, coordinate: Px) -> Self {
        Self::new(source, DragPhase::Move, coordinate)
    }

    /// A [`DragPhase::End`] event.
    pub fn end(source: impl Into<String>, coordinate: Px) -> Self {
        Self::new(source, DragPhase::End, coordinate)
    }
}

/// State captured when a gesture begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    start_pointer: Px,
    start_position: Px,
    snapshot: RangeValue,
}

impl DragSession {
    /// Value at drag start, compared against the final value to decide on a
    /// commit.
    pub fn snapshot(&self) -> RangeValue {
        self.snapshot
    }

    /// Unconstrained handle position for a pointer coordinate.
    pub fn raw_position(&self, pointer: Px) -> Px {
        self.start_position
            .saturating_add(pointer.saturating_sub(self.start_pointer))
    }
}

/// Result of applying one pointer coordinate to an active session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStep {
    /// Where the handle was before this step.
    pub previous: Px,
    /// Where the resolver allowed it to go.
    pub resolved: Px,
    /// Value derived from the updated positions.
    pub value: RangeValue,
}

impl DragStep {
    /// Whether the handle actually moved.
    pub fn moved(&self) -> bool {
        self.previous != self.resolved
    }
}

/// The two per-handle state machines.
#[derive(Debug, Default, Clone)]
pub struct DragSessions {
    slots: [Option<DragSession>; 2],
}

impl DragSessions {
    /// Both handles idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle -> Dragging for `handle`.
    ///
    /// A start while the handle is already dragging abandons the old session
    /// without a commit; the abandoned session is returned.
    pub fn start(
        &mut self,
        handle: Handle,
        pointer: Px,
        positions: HandlePosition,
        value: RangeValue,
    ) -> Option<DragSession> {
        let session = DragSession {
            start_pointer: pointer,
            start_position: positions.get(handle),
            snapshot: value,
        };
        let abandoned = self.slots[handle.index()].replace(session);
        if abandoned.is_some() {
            debug!(?handle, "drag restarted before end, previous gesture dropped");
        }
        abandoned
    }

    /// Applies a pointer coordinate to the session of `handle`, updating
    /// that handle's entry in `positions`.
    ///
    /// Returns `None` when the handle is idle.
    pub fn step(
        &self,
        handle: Handle,
        pointer: Px,
        geometry: &RailGeometry,
        positions: &mut HandlePosition,
    ) -> Option<DragStep> {
        let session = self.slots[handle.index()].as_ref()?;
        let previous = positions.get(handle);
        let resolved = resolve(geometry, handle, session.raw_position(pointer), *positions);
        positions.set(handle, resolved);
        Some(DragStep {
            previous,
            resolved,
            value: position_to_value(geometry, *positions),
        })
    }

    /// Dragging -> Idle for `handle`, returning the finished session.
    pub fn finish(&mut self, handle: Handle) -> Option<DragSession> {
        self.slots[handle.index()].take()
    }

    /// The active session for `handle`, if any.
    pub fn session(&self, handle: Handle) -> Option<&DragSession> {
        self.slots[handle.index()].as_ref()
    }

    /// Whether `handle` is in the dragging state.
    pub fn is_dragging(&self, handle: Handle) -> bool {
        self.slots[handle.index()].is_some()
    }

    /// Drops every session without committing.
    pub fn clear(&mut self) {
        self.slots = [None, None];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> RailGeometry {
        RailGeometry::new(Px(100), Px(10), Px(10))
    }

    #[test]
    fn step_without_session_is_ignored() {
        let sessions = DragSessions::new();
        let mut positions = HandlePosition::new(Px(0), Px(110));
        assert!(
            sessions
                .step(Handle::Low, Px(50), &geometry(), &mut positions)
                .is_none()
        );
        assert_eq!(positions, HandlePosition::new(Px(0), Px(110)));
    }

    #[test]
    fn step_applies_pointer_delta_from_start() {
        let mut sessions = DragSessions::new();
        let mut positions = HandlePosition::new(Px(20), Px(110));
        sessions.start(Handle::Low, Px(300), positions, RangeValue::new(0.2, 1.0));

        let step = sessions
            .step(Handle::Low, Px(330), &geometry(), &mut positions)
            .unwrap();

        assert_eq!(step.resolved, Px(50));
        assert!(step.moved());
        assert_eq!(positions.low, Px(50));
        assert_eq!(step.value, RangeValue::new(0.5, 1.0));
    }

    #[test]
    fn low_handle_stops_at_high_handle() {
        let mut sessions = DragSessions::new();
        let mut positions = HandlePosition::new(Px(0), Px(110));
        sessions.start(Handle::Low, Px(0), positions, RangeValue::FULL);

        let step = sessions
            .step(Handle::Low, Px(200), &geometry(), &mut positions)
            .unwrap();
        assert_eq!(step.resolved, Px(100));
        assert_eq!(step.value, RangeValue::new(1.0, 1.0));

        // Pushing further in the blocked direction does not move the handle.
        let step = sessions
            .step(Handle::Low, Px(260), &geometry(), &mut positions)
            .unwrap();
        assert!(!step.moved());
    }

    #[test]
    fn sessions_are_independent_per_handle() {
        let mut sessions = DragSessions::new();
        let mut positions = HandlePosition::new(Px(40), Px(70));
        sessions.start(Handle::Low, Px(0), positions, RangeValue::new(0.4, 0.6));
        sessions.start(Handle::High, Px(500), positions, RangeValue::new(0.4, 0.6));

        // High moves left first, then low pushes right into it.
        sessions.step(Handle::High, Px(480), &geometry(), &mut positions);
        assert_eq!(positions.high, Px(50));
        let step = sessions
            .step(Handle::Low, Px(30), &geometry(), &mut positions)
            .unwrap();
        assert_eq!(step.resolved, Px(40));
        assert!(positions.is_non_crossing(&geometry()));

        assert!(sessions.finish(Handle::High).is_some());
        assert!(sessions.is_dragging(Handle::Low));
        assert!(!sessions.is_dragging(Handle::High));
    }

    #[test]
    fn restart_abandons_previous_session() {
        let mut sessions = DragSessions::new();
        let positions = HandlePosition::new(Px(10), Px(80));
        assert!(
            sessions
                .start(Handle::High, Px(5), positions, RangeValue::ZERO)
                .is_none()
        );
        let abandoned = sessions
            .start(Handle::High, Px(9), positions, RangeValue::FULL)
            .unwrap();
        assert_eq!(abandoned.snapshot(), RangeValue::ZERO);
        assert_eq!(
            sessions.session(Handle::High).map(DragSession::snapshot),
            Some(RangeValue::FULL)
        );
    }

    #[test]
    fn raw_position_saturates() {
        let mut sessions = DragSessions::new();
        sessions.start(
            Handle::High,
            Px(i32::MIN),
            HandlePosition::new(Px(0), Px(10)),
            RangeValue::ZERO,
        );
        let session = sessions.session(Handle::High).unwrap();
        assert_eq!(session.raw_position(Px(i32::MAX)), Px::MAX);
    }
}
