//! Callview core logic.
//!
//! Pure Rust crate with no platform dependencies.
//! Consumed by native UI shells via UniFFI bindings.

pub mod capture;
pub mod config;
pub mod errors;
pub mod events;
pub mod geometry;
pub mod overlay;
pub mod render;
pub mod screen;
pub mod spring;

pub use capture::{CaptureConstraints, LocalPreview, MediaCapture, StreamHandle};
#[cfg(feature = "livekit")]
pub use capture::LiveKitCamera;
pub use config::{OverlayConfig, SpringConfig};
pub use errors::CallviewError;
pub use events::{DragPhase, EventEmitter, OverlayEvent, OverlayEventListener};
pub use geometry::{Corner, PanOffset, ScreenBounds, SnapDecision};
pub use overlay::DraggableOverlay;
pub use render::{
    BackgroundSource, FitMode, OverlayStyle, Rect, RemoteBackground, SurfaceBinding, VideoSurface,
};
pub use screen::{CallScreen, ScreenLayout};
pub use spring::SpringAnimation;
