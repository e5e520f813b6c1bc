#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use crate::error::EngineError;
use crate::geom::Point;

/// View transform applied to output transforms only.
///
/// Simulation runs entirely in scene coordinates; the view maps results to
/// device pixels: `device = (scene · scale + pan) · pixel_ratio`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct View {
    pub scale: f32,
    pub pan_x: f32,
    pub pan_y: f32,
    pub pixel_ratio: f32,
}

impl Default for View {
    fn default() -> Self {
        Self { scale: 1.0, pan_x: 0.0, pan_y: 0.0, pixel_ratio: 1.0 }
    }
}

impl View {
    /// Build a validated view.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] unless `scale` and
    /// `pixel_ratio` are finite and positive and both pans are finite.
    pub fn new(scale: f32, pan_x: f32, pan_y: f32, pixel_ratio: f32) -> Result<Self, EngineError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(EngineError::invalid(format!("view scale must be finite and > 0, got {scale}")));
        }
        if !(pixel_ratio.is_finite() && pixel_ratio > 0.0) {
            return Err(EngineError::invalid(format!("pixel ratio must be finite and > 0, got {pixel_ratio}")));
        }
        if !pan_x.is_finite() || !pan_y.is_finite() {
            return Err(EngineError::invalid("view pan must be finite"));
        }
        Ok(Self { scale, pan_x, pan_y, pixel_ratio })
    }

    /// Convert a scene-space point to device pixels.
    #[must_use]
    pub fn scene_to_device(&self, scene: Point) -> Point {
        Point {
            x: (scene.x * self.scale + self.pan_x) * self.pixel_ratio,
            y: (scene.y * self.scale + self.pan_y) * self.pixel_ratio,
        }
    }

    /// Multiplier from scene lengths to device lengths.
    #[must_use]
    pub fn device_scale(&self) -> f32 {
        self.scale * self.pixel_ratio
    }
}
