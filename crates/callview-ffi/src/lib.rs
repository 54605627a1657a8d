//! UniFFI bindings for callview-core.
//!
//! Provides a CallScreenClient object that wraps the call screen (overlay
//! controller, local preview, remote background) into a single FFI-safe
//! interface.

use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;

use callview_core::{
    self, BackgroundSource, CallScreen, Corner as CoreCorner, DragPhase as CoreDragPhase,
    EventEmitter, FitMode as CoreFitMode, OverlayConfig, OverlayEvent as CoreOverlayEvent, PanOffset, Rect,
    ScreenBounds, ScreenLayout as CoreScreenLayout, StreamHandle as CoreStreamHandle,
};

uniffi::include_scaffolding!("callview");

// ── Namespace functions ──────────────────────────────────────────────

/// Initialize tracing/logging. Call once from the host before using CallScreenClient.
/// On Android, stderr goes to logcat for debuggable builds.
fn init_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("callview_core=debug,callview_ffi=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .try_init();
    });
}

// ── FFI-safe type conversions ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl From<CoreCorner> for Corner {
    fn from(c: CoreCorner) -> Self {
        match c {
            CoreCorner::TopLeft => Self::TopLeft,
            CoreCorner::TopRight => Self::TopRight,
            CoreCorner::BottomLeft => Self::BottomLeft,
            CoreCorner::BottomRight => Self::BottomRight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
    Settling,
}

impl From<CoreDragPhase> for DragPhase {
    fn from(p: CoreDragPhase) -> Self {
        match p {
            CoreDragPhase::Idle => Self::Idle,
            CoreDragPhase::Dragging => Self::Dragging,
            CoreDragPhase::Settling => Self::Settling,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    Cover,
    Contain,
}

impl From<CoreFitMode> for FitMode {
    fn from(f: CoreFitMode) -> Self {
        match f {
            CoreFitMode::Cover => Self::Cover,
            CoreFitMode::Contain => Self::Contain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl From<PanOffset> for Offset {
    fn from(o: PanOffset) -> Self {
        Self { x: o.x, y: o.y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<Rect> for Frame {
    fn from(r: Rect) -> Self {
        Self {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHandle {
    pub id: String,
    pub label: String,
}

impl From<CoreStreamHandle> for StreamHandle {
    fn from(h: CoreStreamHandle) -> Self {
        Self {
            id: h.id,
            label: h.label,
        }
    }
}

impl From<StreamHandle> for CoreStreamHandle {
    fn from(h: StreamHandle) -> Self {
        Self {
            id: h.id,
            label: h.label,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLayout {
    pub background_frame: Frame,
    pub background_fit: FitMode,
    pub overlay_frame: Frame,
    pub corner_radius: f64,
    pub border_width: f64,
    pub clip: bool,
    pub corner: Corner,
    pub phase: DragPhase,
    pub local_stream: Option<StreamHandle>,
    pub local_fit: FitMode,
}

impl From<CoreScreenLayout> for ScreenLayout {
    fn from(l: CoreScreenLayout) -> Self {
        Self {
            background_frame: l.background_frame.into(),
            background_fit: l.background_fit.into(),
            overlay_frame: l.overlay_frame.into(),
            corner_radius: l.overlay_style.corner_radius,
            border_width: l.overlay_style.border_width,
            clip: l.overlay_style.clip,
            corner: l.corner.into(),
            phase: l.phase.into(),
            local_stream: l.local_stream.stream.map(StreamHandle::from),
            local_fit: l.local_stream.fit.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    PhaseChanged { phase: DragPhase },
    CornerChanged { corner: Corner },
    BoundsChanged { width: f64, height: f64 },
    LocalStreamReady { handle: StreamHandle },
    LocalStreamUnavailable,
}

impl From<CoreOverlayEvent> for OverlayEvent {
    fn from(e: CoreOverlayEvent) -> Self {
        match e {
            CoreOverlayEvent::PhaseChanged(p) => Self::PhaseChanged { phase: p.into() },
            CoreOverlayEvent::CornerChanged(c) => Self::CornerChanged { corner: c.into() },
            CoreOverlayEvent::BoundsChanged(b) => Self::BoundsChanged {
                width: b.width,
                height: b.height,
            },
            CoreOverlayEvent::LocalStreamReady(h) => Self::LocalStreamReady { handle: h.into() },
            CoreOverlayEvent::LocalStreamUnavailable => Self::LocalStreamUnavailable,
        }
    }
}

// ── Error conversion ──────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum CallviewError {
    #[error("Capture error: {msg}")]
    Capture { msg: String },
    #[error("Invalid bounds: {msg}")]
    InvalidBounds { msg: String },
    #[error("Config error: {msg}")]
    Config { msg: String },
}

impl From<callview_core::CallviewError> for CallviewError {
    fn from(e: callview_core::CallviewError) -> Self {
        tracing::error!("CallviewError: {e}");
        match e {
            callview_core::CallviewError::Capture(msg) => Self::Capture { msg },
            callview_core::CallviewError::InvalidBounds(msg) => Self::InvalidBounds { msg },
            callview_core::CallviewError::Config(msg) => Self::Config { msg },
        }
    }
}

impl From<CallviewError> for callview_core::CallviewError {
    fn from(e: CallviewError) -> Self {
        match e {
            CallviewError::Capture { msg } => Self::Capture(msg),
            CallviewError::InvalidBounds { msg } => Self::InvalidBounds(msg),
            CallviewError::Config { msg } => Self::Config(msg),
        }
    }
}

/// A host callback that threw something other than `CallviewError`.
impl From<uniffi::UnexpectedUniFFICallbackError> for CallviewError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Capture { msg: e.reason }
    }
}

// ── Callback interfaces ───────────────────────────────────────────────

pub trait OverlayEventListener: Send + Sync {
    fn on_event(&self, event: OverlayEvent);
}

/// Camera access implemented by the native shell (Camera2, AVFoundation).
pub trait CameraCapture: Send + Sync {
    fn acquire_local_video(&self) -> Result<StreamHandle, CallviewError>;
}

// ── Bridges: FFI callbacks → core traits ──────────────────────────────

struct BridgeListener {
    ffi_listener: Arc<dyn OverlayEventListener>,
}

impl callview_core::OverlayEventListener for BridgeListener {
    fn on_event(&self, event: CoreOverlayEvent) {
        self.ffi_listener.on_event(event.into());
    }
}

struct BridgeCapture {
    ffi_capture: Box<dyn CameraCapture>,
}

impl callview_core::MediaCapture for BridgeCapture {
    fn acquire_local_video(
        &self,
        constraints: &callview_core::CaptureConstraints,
    ) -> Result<CoreStreamHandle, callview_core::CallviewError> {
        if !constraints.video {
            return Err(callview_core::CallviewError::Capture("video capture not requested".into()));
        }
        self.ffi_capture
            .acquire_local_video()
            .map(CoreStreamHandle::from)
            .map_err(callview_core::CallviewError::from)
    }
}

// ── CallScreenClient: main FFI object ─────────────────────────────────

pub struct CallScreenClient {
    screen: StdMutex<CallScreen>,
    /// Listeners of `screen`, reachable without its lock.
    emitter: EventEmitter,
    rt: tokio::runtime::Runtime,
    #[cfg(any(target_os = "android", target_os = "ios"))]
    camera: Arc<callview_core::LiveKitCamera>,
}

impl CallScreenClient {
    pub fn new(
        width: f64,
        height: f64,
        config_json: Option<String>,
        background_asset: String,
    ) -> Result<Self, CallviewError> {
        let config = match config_json.as_deref() {
            Some(json) => OverlayConfig::from_json(json)?,
            None => OverlayConfig::default(),
        };
        let bounds = ScreenBounds::new(width, height)?;
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("callview-capture")
            .enable_all()
            .build()
            .map_err(|e| CallviewError::Capture {
                msg: format!("failed to create capture runtime: {e}"),
            })?;

        let screen = CallScreen::new(config, bounds, BackgroundSource::Asset(background_asset));
        let emitter = screen.emitter();

        tracing::info!("CallScreenClient created for {width}x{height}");
        Ok(Self {
            screen: StdMutex::new(screen),
            emitter,
            rt,
            #[cfg(any(target_os = "android", target_os = "ios"))]
            camera: Arc::new(callview_core::LiveKitCamera::new()),
        })
    }

    fn screen(&self) -> MutexGuard<'_, CallScreen> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` on the screen, then hand its queued events to the listeners
    /// once the lock is released. Listeners may call back into the client.
    fn update<R>(&self, f: impl FnOnce(&mut CallScreen) -> R) -> R {
        let (result, events) = {
            let mut screen = self.screen();
            let result = f(&mut screen);
            (result, screen.take_events())
        };
        for event in events {
            self.emitter.emit(event);
        }
        result
    }

    pub fn gesture_start(&self) {
        self.update(|screen| screen.overlay_mut().gesture_start());
    }

    pub fn gesture_move(&self, dx: f64, dy: f64) {
        self.update(|screen| screen.overlay_mut().gesture_move(dx, dy));
    }

    pub fn gesture_end(&self) -> Option<Corner> {
        self.update(|screen| screen.overlay_mut().gesture_end())
            .map(|decision| decision.corner.into())
    }

    pub fn set_screen_bounds(&self, width: f64, height: f64) -> Result<(), CallviewError> {
        self.update(|screen| screen.set_bounds(width, height))
            .map_err(CallviewError::from)
    }

    /// Advance animations by `dt_ms` milliseconds. Negative or non-finite
    /// deltas count as zero.
    pub fn tick(&self, dt_ms: f64) -> Offset {
        let dt = Duration::try_from_secs_f64(dt_ms / 1000.0).unwrap_or(Duration::ZERO);
        self.update(|screen| screen.tick(dt)).into()
    }

    pub fn offset(&self) -> Offset {
        self.screen().overlay().offset().into()
    }

    pub fn corner(&self) -> Corner {
        self.screen().overlay().corner().into()
    }

    pub fn phase(&self) -> DragPhase {
        self.screen().overlay().phase().into()
    }

    pub fn layout(&self) -> ScreenLayout {
        self.screen().layout().into()
    }

    /// Request the camera through a host-provided capture callback.
    /// Returns false if the preview already asked for a stream.
    pub fn start_local_preview(&self, capture: Box<dyn CameraCapture>) -> bool {
        let bridge = Arc::new(BridgeCapture {
            ffi_capture: capture,
        });
        self.screen()
            .start_local_preview(bridge, self.rt.handle())
            .is_some()
    }

    /// Request the camera through the bundled LiveKit video source.
    /// Only available on mobile targets; returns false elsewhere.
    pub fn start_builtin_camera_preview(&self) -> bool {
        #[cfg(any(target_os = "android", target_os = "ios"))]
        {
            self.screen()
                .start_local_preview(self.camera.clone(), self.rt.handle())
                .is_some()
        }
        #[cfg(not(any(target_os = "android", target_os = "ios")))]
        {
            tracing::warn!("no built-in camera on this platform");
            false
        }
    }

    pub fn add_listener(&self, listener: Box<dyn OverlayEventListener>) {
        let bridge = Arc::new(BridgeListener {
            ffi_listener: Arc::from(listener),
        });
        self.emitter.add_listener(bridge);
    }
}
