//! Descriptions of what the shell should draw.
//!
//! Nothing here touches pixels. Native surfaces receive a `SurfaceBinding`
//! and draw the stream it names, or nothing when it names none.

use serde::{Deserialize, Serialize};

use crate::capture::StreamHandle;
use crate::config::OverlayConfig;
use crate::geometry::{PanOffset, ScreenBounds};

/// How a video is scaled into its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Fill the frame, cropping overflow.
    #[default]
    Cover,
    /// Fit inside the frame, letterboxing.
    Contain,
}

/// Stream plus fit mode handed to a rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceBinding {
    pub stream: Option<StreamHandle>,
    pub fit: FitMode,
}

impl SurfaceBinding {
    pub fn new(stream: Option<StreamHandle>, fit: FitMode) -> Self {
        Self { stream, fit }
    }

    /// A surface bound to no stream draws nothing.
    pub fn is_renderable(&self) -> bool {
        self.stream.is_some()
    }
}

/// A platform view able to show a video stream.
pub trait VideoSurface: Send + Sync {
    fn attach(&self, binding: &SurfaceBinding);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn at(origin: PanOffset, width: f64, height: f64) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width,
            height,
        }
    }

    pub fn full(bounds: ScreenBounds) -> Self {
        Self::at(PanOffset::default(), bounds.width, bounds.height)
    }
}

/// Decoration of the overlay tile: rounded, bordered, content clipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub corner_radius: f64,
    pub border_width: f64,
    pub clip: bool,
}

impl From<&OverlayConfig> for OverlayStyle {
    fn from(config: &OverlayConfig) -> Self {
        Self {
            corner_radius: config.corner_radius,
            border_width: config.border_width,
            clip: true,
        }
    }
}

/// What fills the remote background.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundSource {
    /// Bundled placeholder image.
    Asset(String),
    Stream(StreamHandle),
}

/// Full-bleed remote participant layer. Static.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteBackground {
    pub source: BackgroundSource,
    pub fit: FitMode,
}

impl RemoteBackground {
    pub fn new(source: BackgroundSource) -> Self {
        Self::with_fit(source, FitMode::Cover)
    }

    pub fn with_fit(source: BackgroundSource, fit: FitMode) -> Self {
        Self { source, fit }
    }

    pub fn frame(&self, bounds: ScreenBounds) -> Rect {
        Rect::full(bounds)
    }

    /// Binding for a video surface; image assets are not streams.
    pub fn binding(&self) -> SurfaceBinding {
        let stream = match &self.source {
            BackgroundSource::Stream(handle) => Some(handle.clone()),
            BackgroundSource::Asset(_) => None,
        };
        SurfaceBinding::new(stream, self.fit)
    }
}
