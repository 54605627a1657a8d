use std::sync::Arc;

use crate::capture::StreamHandle;
use crate::geometry::{Corner, ScreenBounds};

/// Events emitted by the core to native UI listeners.
///
/// Per-frame offsets are not evented: the shell reads the offset after
/// each tick.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    PhaseChanged(DragPhase),
    CornerChanged(Corner),
    BoundsChanged(ScreenBounds),
    LocalStreamReady(StreamHandle),
    LocalStreamUnavailable,
}

/// Interaction state of the overlay tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// Resting on a corner.
    Idle,
    /// A touch gesture owns the offset.
    Dragging,
    /// Springing toward a corner.
    Settling,
}

/// Trait for receiving events from the core.
/// Implementations must be Send + Sync (capture results arrive from a
/// blocking worker thread).
pub trait OverlayEventListener: Send + Sync {
    fn on_event(&self, event: OverlayEvent);
}

/// Internal event emitter that dispatches to registered listeners.
#[derive(Clone, Default)]
pub struct EventEmitter {
    listeners: Arc<std::sync::RwLock<Vec<Arc<dyn OverlayEventListener>>>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: Arc<dyn OverlayEventListener>) {
        match self.listeners.write() {
            Ok(mut listeners) => listeners.push(listener),
            Err(poisoned) => poisoned.into_inner().push(listener),
        }
    }

    pub fn emit(&self, event: OverlayEvent) {
        let listeners = match self.listeners.read() {
            Ok(listeners) => listeners,
            Err(poisoned) => poisoned.into_inner(),
        };
        for listener in listeners.iter() {
            listener.on_event(event.clone());
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingListener {
        count: Arc<AtomicUsize>,
    }

    impl OverlayEventListener for CountingListener {
        fn on_event(&self, _event: OverlayEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Records every event, for assertions in other modules' tests.
    #[derive(Default)]
    pub(crate) struct EventCapture {
        pub(crate) events: std::sync::Mutex<Vec<OverlayEvent>>,
    }

    impl EventCapture {
        pub(crate) fn take(&self) -> Vec<OverlayEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl OverlayEventListener for EventCapture {
        fn on_event(&self, event: OverlayEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn emitter_dispatches_to_listener() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let listener = Arc::new(CountingListener { count: count.clone() });

        emitter.add_listener(listener);
        emitter.emit(OverlayEvent::PhaseChanged(DragPhase::Dragging));

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn emitter_dispatches_to_multiple_listeners() {
        let emitter = EventEmitter::new();
        let count1 = Arc::new(AtomicUsize::new(0));
        let count2 = Arc::new(AtomicUsize::new(0));

        emitter.add_listener(Arc::new(CountingListener { count: count1.clone() }));
        emitter.add_listener(Arc::new(CountingListener { count: count2.clone() }));

        emitter.emit(OverlayEvent::CornerChanged(Corner::TopRight));

        assert_eq!(count1.load(Ordering::SeqCst), 1);
        assert_eq!(count2.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn emitter_delivers_correct_events() {
        let emitter = EventEmitter::new();
        let capture = Arc::new(EventCapture::default());

        emitter.add_listener(capture.clone());
        emitter.emit(OverlayEvent::CornerChanged(Corner::BottomLeft));

        let captured = capture.take();
        assert_eq!(captured, vec![OverlayEvent::CornerChanged(Corner::BottomLeft)]);
    }
}
