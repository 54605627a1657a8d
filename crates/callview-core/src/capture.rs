use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::errors::CallviewError;
use crate::events::{EventEmitter, OverlayEvent};
use crate::render::{FitMode, SurfaceBinding, VideoSurface};

#[cfg(feature = "livekit")]
mod livekit_camera;

#[cfg(feature = "livekit")]
pub use livekit_camera::LiveKitCamera;

/// Opaque handle to a capture stream owned by the media library.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamHandle {
    pub id: String,
    pub label: String,
}

impl StreamHandle {
    /// New handle with a fresh unique id.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            label: label.into(),
        }
    }
}

/// What a capture request asks the device for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub video: bool,
    pub audio: bool,
}

impl CaptureConstraints {
    /// Camera only; the preview never captures the microphone.
    pub const VIDEO_ONLY: Self = Self {
        video: true,
        audio: false,
    };
}

/// Platform camera access.
///
/// Implementations may block (permission prompts, device open); callers run
/// them off the UI thread.
pub trait MediaCapture: Send + Sync {
    fn acquire_local_video(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<StreamHandle, CallviewError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct PreviewState {
    stream: Option<StreamHandle>,
    surface: Option<Arc<dyn VideoSurface>>,
}

impl PreviewState {
    fn binding(&self) -> SurfaceBinding {
        SurfaceBinding::new(self.stream.clone(), FitMode::Cover)
    }
}

/// The local camera stream shown in the overlay tile.
///
/// Capture is requested at most once per preview. A failed request leaves
/// the preview without a stream for the rest of its life: the tile stays
/// blank and nothing is retried.
///
/// Stream and surface share one lock, so a surface attached while capture
/// completes always ends up bound to the stream.
pub struct LocalPreview {
    state: Arc<Mutex<PreviewState>>,
    requested: AtomicBool,
    emitter: EventEmitter,
}

impl LocalPreview {
    pub fn new(emitter: EventEmitter) -> Self {
        Self {
            state: Arc::new(Mutex::new(PreviewState::default())),
            requested: AtomicBool::new(false),
            emitter,
        }
    }

    pub fn stream(&self) -> Option<StreamHandle> {
        lock(&self.state).stream.clone()
    }

    pub fn binding(&self) -> SurfaceBinding {
        lock(&self.state).binding()
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Route the preview to `surface`, binding whatever stream is current.
    pub fn attach_surface(&self, surface: Arc<dyn VideoSurface>) {
        let mut state = lock(&self.state);
        surface.attach(&state.binding());
        state.surface = Some(surface);
    }

    /// Ask `capture` for the camera on `rt`'s blocking pool.
    ///
    /// Returns `None` if a request was already made. The returned task needs
    /// no supervision; dropping it does not cancel the request.
    pub fn acquire(&self, capture: Arc<dyn MediaCapture>, rt: &Handle) -> Option<JoinHandle<()>> {
        if self.requested.swap(true, Ordering::SeqCst) {
            tracing::debug!("local video already requested, skipping");
            return None;
        }

        tracing::info!("requesting local video");
        let state = self.state.clone();
        let emitter = self.emitter.clone();

        Some(rt.spawn_blocking(move || {
            match capture.acquire_local_video(&CaptureConstraints::VIDEO_ONLY) {
                Ok(handle) => {
                    tracing::info!("local video ready: {} ({})", handle.label, handle.id);
                    {
                        let mut state = lock(&state);
                        state.stream = Some(handle.clone());
                        if let Some(surface) = state.surface.as_ref() {
                            surface.attach(&state.binding());
                        }
                    }
                    emitter.emit(OverlayEvent::LocalStreamReady(handle));
                }
                Err(e) => {
                    tracing::warn!("local video unavailable: {e}");
                    emitter.emit(OverlayEvent::LocalStreamUnavailable);
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::tests::EventCapture;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct FakeCamera {
        calls: AtomicUsize,
        fail: bool,
        seen: Mutex<Vec<CaptureConstraints>>,
    }

    impl FakeCamera {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl MediaCapture for FakeCamera {
        fn acquire_local_video(
            &self,
            constraints: &CaptureConstraints,
        ) -> Result<StreamHandle, CallviewError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(*constraints);
            if self.fail {
                Err(CallviewError::Capture("permission denied".into()))
            } else {
                Ok(StreamHandle::new("front-camera"))
            }
        }
    }

    #[derive(Default)]
    struct RecordingSurface {
        bindings: Mutex<Vec<SurfaceBinding>>,
    }

    impl VideoSurface for RecordingSurface {
        fn attach(&self, binding: &SurfaceBinding) {
            self.bindings.lock().unwrap().push(binding.clone());
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn acquires_video_only_stream_once() {
        let camera = FakeCamera::new(false);
        let preview = LocalPreview::new(EventEmitter::new());
        let rt = Handle::current();

        preview.acquire(camera.clone(), &rt).unwrap().await.unwrap();
        assert!(preview.acquire(camera.clone(), &rt).is_none());

        assert_eq!(camera.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*camera.seen.lock().unwrap(), vec![CaptureConstraints::VIDEO_ONLY]);
        assert_eq!(preview.stream().unwrap().label, "front-camera");
        assert!(preview.binding().is_renderable());
        assert_eq!(preview.binding().fit, FitMode::Cover);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_capture_leaves_blank_preview() {
        let emitter = EventEmitter::new();
        let capture = Arc::new(EventCapture::default());
        emitter.add_listener(capture.clone());
        let preview = LocalPreview::new(emitter);
        let camera = FakeCamera::new(true);

        preview.acquire(camera.clone(), &Handle::current()).unwrap().await.unwrap();

        assert!(preview.stream().is_none());
        assert!(!preview.binding().is_renderable());
        assert!(preview.is_requested());
        assert_eq!(capture.take(), vec![OverlayEvent::LocalStreamUnavailable]);
        // No retry.
        assert!(preview.acquire(camera.clone(), &Handle::current()).is_none());
        assert_eq!(camera.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn surface_receives_blank_then_stream() {
        let surface = Arc::new(RecordingSurface::default());
        let preview = LocalPreview::new(EventEmitter::new());
        preview.attach_surface(surface.clone());

        preview
            .acquire(FakeCamera::new(false), &Handle::current())
            .unwrap()
            .await
            .unwrap();

        let bindings = surface.bindings.lock().unwrap();
        assert_eq!(bindings.len(), 2);
        assert!(!bindings[0].is_renderable());
        assert_eq!(bindings[1].stream, preview.stream());
    }

    /// Surface whose attach takes a while, as a platform view would on its
    /// own thread.
    #[derive(Default)]
    struct SlowSurface {
        inner: RecordingSurface,
    }

    impl VideoSurface for SlowSurface {
        fn attach(&self, binding: &SurfaceBinding) {
            std::thread::sleep(Duration::from_millis(200));
            self.inner.attach(binding);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn surface_attached_during_capture_ends_on_stream() {
        let preview = Arc::new(LocalPreview::new(EventEmitter::new()));
        let surface = Arc::new(SlowSurface::default());

        let attacher = {
            let preview = preview.clone();
            let surface = surface.clone();
            std::thread::spawn(move || preview.attach_surface(surface))
        };
        std::thread::sleep(Duration::from_millis(50));

        preview
            .acquire(FakeCamera::new(false), &Handle::current())
            .unwrap()
            .await
            .unwrap();
        attacher.join().unwrap();

        let bindings = surface.inner.bindings.lock().unwrap();
        let last = bindings.last().unwrap();
        assert!(last.is_renderable());
        assert_eq!(last.stream, preview.stream());
    }

    #[test]
    fn handles_get_unique_ids() {
        let a = StreamHandle::new("camera");
        let b = StreamHandle::new("camera");
        assert_ne!(a.id, b.id);
    }
}
