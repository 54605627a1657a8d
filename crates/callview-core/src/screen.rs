use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::capture::{LocalPreview, MediaCapture};
use crate::config::OverlayConfig;
use crate::errors::CallviewError;
use crate::events::{DragPhase, EventEmitter, OverlayEvent, OverlayEventListener};
use crate::geometry::{Corner, PanOffset, ScreenBounds};
use crate::overlay::DraggableOverlay;
use crate::render::{
    BackgroundSource, FitMode, OverlayStyle, Rect, RemoteBackground, SurfaceBinding,
};

/// Snapshot of everything the shell draws for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLayout {
    pub background_frame: Rect,
    pub background_fit: FitMode,
    pub overlay_frame: Rect,
    pub overlay_style: OverlayStyle,
    pub corner: Corner,
    pub phase: DragPhase,
    pub local_stream: SurfaceBinding,
}

/// The call screen: remote background plus the draggable local preview.
///
/// Owns the viewport bounds and hands them to the overlay; it does no
/// positioning of its own.
///
/// Overlay events are queued until `dispatch_events` (or `take_events` plus
/// `emitter` for callers that must release a lock first). Capture events are
/// emitted from the capture worker as they happen.
pub struct CallScreen {
    bounds: ScreenBounds,
    overlay: DraggableOverlay,
    preview: LocalPreview,
    background: RemoteBackground,
    emitter: EventEmitter,
    orientation: Option<watch::Receiver<ScreenBounds>>,
    orientation_subscribed: bool,
}

impl CallScreen {
    pub fn new(config: OverlayConfig, bounds: ScreenBounds, background: BackgroundSource) -> Self {
        let emitter = EventEmitter::new();
        let background = RemoteBackground::with_fit(background, config.background_fit);
        Self {
            bounds,
            overlay: DraggableOverlay::new(config, bounds),
            preview: LocalPreview::new(emitter.clone()),
            background,
            emitter,
            orientation: None,
            orientation_subscribed: false,
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn OverlayEventListener>) {
        self.emitter.add_listener(listener);
    }

    /// Handle on the listeners, for dispatching events taken with
    /// `take_events`.
    pub fn emitter(&self) -> EventEmitter {
        self.emitter.clone()
    }

    /// Overlay events queued since the last take, oldest first.
    pub fn take_events(&mut self) -> Vec<OverlayEvent> {
        self.overlay.take_events()
    }

    /// Send queued overlay events to the listeners.
    pub fn dispatch_events(&mut self) {
        for event in self.take_events() {
            self.emitter.emit(event);
        }
    }

    pub fn bounds(&self) -> ScreenBounds {
        self.bounds
    }

    pub fn overlay(&self) -> &DraggableOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut DraggableOverlay {
        &mut self.overlay
    }

    pub fn preview(&self) -> &LocalPreview {
        &self.preview
    }

    /// New viewport size from the platform.
    pub fn set_bounds(&mut self, width: f64, height: f64) -> Result<(), CallviewError> {
        let bounds = ScreenBounds::new(width, height)?;
        self.apply_bounds(bounds);
        Ok(())
    }

    /// Follow an orientation feed for the rest of this screen's life.
    ///
    /// Only the first subscription is kept. The feed's current value is
    /// applied straight away; later values are picked up on `tick`.
    pub fn subscribe_orientation(&mut self, mut feed: watch::Receiver<ScreenBounds>) {
        if self.orientation_subscribed {
            tracing::debug!("orientation feed already subscribed, ignoring");
            return;
        }
        self.orientation_subscribed = true;

        let current = *feed.borrow_and_update();
        self.apply_bounds(current);
        self.orientation = Some(feed);
    }

    /// Request the camera for the preview tile (once).
    pub fn start_local_preview(
        &self,
        capture: Arc<dyn MediaCapture>,
        rt: &Handle,
    ) -> Option<JoinHandle<()>> {
        self.preview.acquire(capture, rt)
    }

    /// Per-frame update: pick up orientation changes, then advance the
    /// overlay animation. Returns the offset to draw the tile at.
    pub fn tick(&mut self, dt: Duration) -> PanOffset {
        self.poll_orientation();
        self.overlay.tick(dt)
    }

    pub fn layout(&self) -> ScreenLayout {
        let config = self.overlay.config();
        ScreenLayout {
            background_frame: self.background.frame(self.bounds),
            background_fit: self.background.fit,
            overlay_frame: Rect::at(self.overlay.offset(), config.width, config.height),
            overlay_style: OverlayStyle::from(config),
            corner: self.overlay.corner(),
            phase: self.overlay.phase(),
            local_stream: self.preview.binding(),
        }
    }

    fn poll_orientation(&mut self) {
        let Some(feed) = self.orientation.as_mut() else {
            return;
        };
        match feed.has_changed() {
            Ok(true) => {
                let bounds = *feed.borrow_and_update();
                self.apply_bounds(bounds);
            }
            Ok(false) => {}
            Err(_) => {
                tracing::debug!("orientation feed closed");
                self.orientation = None;
            }
        }
    }

    fn apply_bounds(&mut self, bounds: ScreenBounds) {
        self.bounds = bounds;
        self.overlay.screen_bounds_changed(bounds);
    }
}
