use serde::{Deserialize, Serialize};

use crate::config::OverlayConfig;
use crate::errors::CallviewError;

/// Top-left position of the overlay tile, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanOffset {
    pub x: f64,
    pub y: f64,
}

impl PanOffset {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Viewport size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBounds {
    pub width: f64,
    pub height: f64,
}

impl ScreenBounds {
    /// Build bounds from raw platform values, rejecting anything a layout
    /// could not be computed from.
    pub fn new(width: f64, height: f64) -> Result<Self, CallviewError> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(CallviewError::InvalidBounds(format!("{width}x{height}")));
        }
        Ok(Self { width, height })
    }
}

/// Screen corner the overlay is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub fn is_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    pub fn is_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    fn from_sides(is_left: bool, is_top: bool) -> Self {
        match (is_left, is_top) {
            (true, true) => Corner::TopLeft,
            (true, false) => Corner::BottomLeft,
            (false, true) => Corner::TopRight,
            (false, false) => Corner::BottomRight,
        }
    }

    /// Canonical overlay offset for this corner under `bounds`.
    pub fn target(self, bounds: ScreenBounds, config: &OverlayConfig) -> PanOffset {
        let left = config.margin;
        let right = bounds.width - config.width - config.margin;
        let top = config.margin;
        let bottom = bounds.height - config.height - config.margin;

        match self {
            Corner::TopLeft => PanOffset::new(left, top),
            Corner::TopRight => PanOffset::new(right, top),
            Corner::BottomLeft => PanOffset::new(left, bottom),
            Corner::BottomRight => PanOffset::new(right, bottom),
        }
    }
}

/// Outcome of releasing the overlay at some offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapDecision {
    pub corner: Corner,
    pub target: PanOffset,
}

/// Pick the resting place for an overlay released at `current`.
///
/// Each axis is decided on its own: the overlay goes to whichever edge of
/// that axis is closer, measured from the overlay's near side and net of the
/// margin. This is two 1-D nearest-edge choices, not a Euclidean
/// nearest-corner search. Equal distances resolve to the right/bottom edge.
///
/// The corner is labelled by the edge chosen on each axis, so the label and
/// the target always agree, even when the tile covers more than half of a
/// short screen side.
pub fn snap(current: PanOffset, bounds: ScreenBounds, config: &OverlayConfig) -> SnapDecision {
    let to_left = current.x - config.margin;
    let to_right = bounds.width - (current.x + config.width) - config.margin;
    let to_top = current.y - config.margin;
    let to_bottom = bounds.height - (current.y + config.height) - config.margin;

    let corner = Corner::from_sides(to_left < to_right, to_top < to_bottom);
    SnapDecision {
        corner,
        target: corner.target(bounds, config),
    }
}
