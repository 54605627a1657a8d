use std::time::Duration;

use crate::config::OverlayConfig;
use crate::events::{DragPhase, OverlayEvent};
use crate::geometry::{Corner, PanOffset, ScreenBounds, SnapDecision, snap};
use crate::spring::SpringAnimation;

/// Drag-and-snap controller for the local preview tile.
///
/// Owns the single authoritative offset. Gestures move it directly, the
/// spring moves it on every `tick`, and the UI reads it back with `offset()`.
/// All methods are meant to be called from the UI thread.
///
/// State changes are queued rather than dispatched; callers drain them with
/// `take_events` once they no longer hold the overlay, so listeners are free
/// to read it back.
pub struct DraggableOverlay {
    config: OverlayConfig,
    events: Vec<OverlayEvent>,
    bounds: ScreenBounds,
    corner: Corner,
    offset: PanOffset,
    /// Offset when the current gesture began.
    baseline: PanOffset,
    /// Gesture translation relative to `baseline`.
    delta: (f64, f64),
    phase: DragPhase,
    animation: Option<SpringAnimation>,
    /// Bounds that arrived while a gesture was active.
    deferred_bounds: Option<ScreenBounds>,
}

impl DraggableOverlay {
    /// Place the tile at the configured initial corner, already at rest.
    pub fn new(config: OverlayConfig, bounds: ScreenBounds) -> Self {
        let corner = config.initial_corner;
        let offset = corner.target(bounds, &config);
        Self {
            config,
            events: Vec::new(),
            bounds,
            corner,
            offset,
            baseline: offset,
            delta: (0.0, 0.0),
            phase: DragPhase::Idle,
            animation: None,
            deferred_bounds: None,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn offset(&self) -> PanOffset {
        self.offset
    }

    pub fn corner(&self) -> Corner {
        self.corner
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Bounds the current layout is computed against.
    pub fn bounds(&self) -> ScreenBounds {
        self.bounds
    }

    /// Events queued since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<OverlayEvent> {
        std::mem::take(&mut self.events)
    }

    /// Where the in-flight spring is heading, if any.
    pub fn target(&self) -> Option<PanOffset> {
        self.animation.as_ref().map(SpringAnimation::target)
    }

    /// A touch went down on the tile.
    ///
    /// The live offset becomes the baseline for the gesture's deltas. An
    /// in-flight settle is dropped where it stands.
    pub fn gesture_start(&mut self) {
        if self.animation.take().is_some() {
            tracing::debug!("gesture interrupted settle at ({}, {})", self.offset.x, self.offset.y);
        }
        self.baseline = self.offset;
        self.delta = (0.0, 0.0);
        self.set_phase(DragPhase::Dragging);
    }

    /// The touch moved by `(dx, dy)` since `gesture_start`.
    ///
    /// The offset follows the finger without clamping; the tile may leave
    /// the margin or the screen until it is released.
    pub fn gesture_move(&mut self, dx: f64, dy: f64) {
        if self.phase != DragPhase::Dragging {
            tracing::trace!("ignoring gesture move while {:?}", self.phase);
            return;
        }
        self.delta = (dx, dy);
        self.offset = self.baseline.translated(dx, dy);
    }

    /// The touch was released: pick a corner and spring toward it.
    ///
    /// Returns `None` when no gesture was active.
    pub fn gesture_end(&mut self) -> Option<SnapDecision> {
        if self.phase != DragPhase::Dragging {
            tracing::trace!("ignoring gesture end while {:?}", self.phase);
            return None;
        }

        let current = self.baseline.translated(self.delta.0, self.delta.1);
        self.baseline = current;
        self.delta = (0.0, 0.0);
        self.offset = current;

        if let Some(bounds) = self.deferred_bounds.take() {
            self.apply_bounds(bounds);
        }

        let decision = snap(current, self.bounds, &self.config);
        tracing::info!(
            "overlay released at ({}, {}), snapping to {:?} ({}, {})",
            current.x,
            current.y,
            decision.corner,
            decision.target.x,
            decision.target.y
        );
        self.set_corner(decision.corner);
        self.animate_to(decision.target);
        Some(decision)
    }

    /// The viewport was resized or rotated.
    ///
    /// At rest or while settling, the tile springs to its current corner
    /// under the new bounds. During a gesture the bounds are held back and
    /// applied on release, so the finger keeps control of the tile.
    pub fn screen_bounds_changed(&mut self, bounds: ScreenBounds) {
        if self.phase == DragPhase::Dragging {
            tracing::debug!(
                "deferring bounds {}x{} until gesture ends",
                bounds.width,
                bounds.height
            );
            self.deferred_bounds = Some(bounds);
            return;
        }

        self.apply_bounds(bounds);
        let target = self.corner.target(bounds, &self.config);
        self.animate_to(target);
    }

    /// Advance the settle animation by `dt` and return the offset to draw.
    pub fn tick(&mut self, dt: Duration) -> PanOffset {
        let Some(animation) = self.animation.as_mut() else {
            return self.offset;
        };

        self.offset = animation.advance(dt);
        if animation.is_done() {
            self.animation = None;
            self.baseline = self.offset;
            self.set_phase(DragPhase::Idle);
        }
        self.offset
    }

    fn apply_bounds(&mut self, bounds: ScreenBounds) {
        if bounds != self.bounds {
            tracing::info!("screen bounds changed to {}x{}", bounds.width, bounds.height);
            self.bounds = bounds;
            self.events.push(OverlayEvent::BoundsChanged(bounds));
        }
    }

    /// Spring from the live offset to `target`, keeping the velocity of any
    /// spring being replaced.
    fn animate_to(&mut self, target: PanOffset) {
        let velocity = self
            .animation
            .take()
            .map(|a| a.velocity())
            .unwrap_or((0.0, 0.0));

        let animation = SpringAnimation::new(&self.config.spring, self.offset, target, velocity);
        if animation.is_done() {
            self.offset = target;
            self.baseline = target;
            self.set_phase(DragPhase::Idle);
        } else {
            self.animation = Some(animation);
            self.set_phase(DragPhase::Settling);
        }
    }

    fn set_corner(&mut self, corner: Corner) {
        if self.corner != corner {
            self.corner = corner;
            self.events.push(OverlayEvent::CornerChanged(corner));
        }
    }

    fn set_phase(&mut self, phase: DragPhase) {
        if self.phase != phase {
            tracing::trace!("overlay phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            self.events.push(OverlayEvent::PhaseChanged(phase));
        }
    }
}
