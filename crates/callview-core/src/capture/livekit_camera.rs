use std::sync::Mutex;

use livekit::prelude::*;
use livekit::webrtc::prelude::*;
use livekit::webrtc::video_source::native::NativeVideoSource;

use super::{CaptureConstraints, MediaCapture, StreamHandle};
use crate::errors::CallviewError;

/// Default capture resolution.
const VIDEO_WIDTH: u32 = 1280;
const VIDEO_HEIGHT: u32 = 720;

/// Camera track backed by a LiveKit native video source.
///
/// Native capture code (Camera2, AVCaptureSession) pushes frames into the
/// source returned by `video_source`; the track is what renderers attach to.
#[derive(Default)]
pub struct LiveKitCamera {
    local: Mutex<Option<(LocalVideoTrack, NativeVideoSource)>>,
}

impl LiveKitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// The source to feed captured frames into, once acquired.
    pub fn video_source(&self) -> Option<NativeVideoSource> {
        self.local
            .lock()
            .ok()
            .and_then(|local| local.as_ref().map(|(_, source)| source.clone()))
    }

    pub fn track(&self) -> Option<LocalVideoTrack> {
        self.local
            .lock()
            .ok()
            .and_then(|local| local.as_ref().map(|(track, _)| track.clone()))
    }
}

impl MediaCapture for LiveKitCamera {
    fn acquire_local_video(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<StreamHandle, CallviewError> {
        if !constraints.video {
            return Err(CallviewError::Capture("video capture not requested".into()));
        }

        let source = NativeVideoSource::new(
            VideoResolution {
                width: VIDEO_WIDTH,
                height: VIDEO_HEIGHT,
            },
            false, // not a screencast
        );
        let track =
            LocalVideoTrack::create_video_track("camera", RtcVideoSource::Native(source.clone()));

        let mut local = self
            .local
            .lock()
            .map_err(|e| CallviewError::Capture(format!("camera state poisoned: {e}")))?;
        *local = Some((track, source));

        tracing::info!("camera track created at {VIDEO_WIDTH}x{VIDEO_HEIGHT}");
        Ok(StreamHandle::new("camera"))
    }
}
