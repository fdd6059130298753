//! Signals emitted by the transform controls.
//!
//! Subscribers get their own unbounded `flume` receiver. A dropped receiver
//! is pruned on the next emit.

use parking_lot::Mutex;

use crate::gizmo::types::{GizmoTarget, TransformMode, TransformSpace};
use crate::scene::{ObjectId, TransformSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    Default,
    Pointer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GizmoEvent {
    /// Mode, space or size changed.
    Changed {
        mode: TransformMode,
        space: TransformSpace,
        size: f32,
    },
    /// The host camera controller should stop or resume orbiting.
    OrbitCamera { enabled: bool },
    Cursor(CursorStyle),
    DragStarted {
        object: ObjectId,
        target: GizmoTarget,
        before: TransformSnapshot,
    },
    /// Carries both ends of the drag so an undo stack can record it.
    DragFinished {
        object: ObjectId,
        target: GizmoTarget,
        before: TransformSnapshot,
        after: TransformSnapshot,
    },
}

#[derive(Default)]
pub struct GizmoEventBus {
    subscribers: Mutex<Vec<flume::Sender<GizmoEvent>>>,
}

impl GizmoEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> flume::Receiver<GizmoEvent> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn emit(&self, event: GizmoEvent) {
        tracing::trace!("[CONTROLS] emit {:?}", event);
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subscriber_receives() {
        let bus = GizmoEventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        bus.emit(GizmoEvent::OrbitCamera { enabled: false });

        assert_eq!(a.try_recv().unwrap(), GizmoEvent::OrbitCamera { enabled: false });
        assert_eq!(b.try_recv().unwrap(), GizmoEvent::OrbitCamera { enabled: false });
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let bus = GizmoEventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());

        bus.emit(GizmoEvent::Cursor(CursorStyle::Pointer));
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.try_recv().unwrap(), GizmoEvent::Cursor(CursorStyle::Pointer));
    }
}
