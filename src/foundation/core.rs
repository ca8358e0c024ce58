use crate::foundation::error::{MemeError, MemeResult};

/// Default maximum logical box the rendered image must fit within.
pub const DEFAULT_CONTAINER: ContainerBounds = ContainerBounds {
    width: 500.0,
    height: 500.0,
};

/// Fixed maximum logical box (in logical units) for the rendered composition.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContainerBounds {
    /// Maximum logical width.
    pub width: f64,
    /// Maximum logical height.
    pub height: f64,
}

impl Default for ContainerBounds {
    fn default() -> Self {
        DEFAULT_CONTAINER
    }
}

impl ContainerBounds {
    /// Create validated bounds (both sides finite and > 0).
    pub fn new(width: f64, height: f64) -> MemeResult<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(MemeError::validation(
                "container bounds must be finite and > 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Per-axis minimum of these bounds and the viewport's available space.
    pub fn clamp_to(self, viewport: Viewport) -> Self {
        Self {
            width: self.width.min(viewport.width),
            height: self.height.min(viewport.height),
        }
    }
}

/// Logical render box derived from an image's intrinsic size.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct LogicalLayout {
    /// Logical width.
    pub width: f64,
    /// Logical height.
    pub height: f64,
}

impl LogicalLayout {
    /// `width / height`.
    pub fn aspect(self) -> f64 {
        self.width / self.height
    }

    /// Physical raster size for a device scale factor.
    ///
    /// Fractional physical sizes truncate, and each side is at least one pixel.
    pub fn physical_size(self, scale: f64) -> (u32, u32) {
        let w = (self.width * scale).max(1.0) as u32;
        let h = (self.height * scale).max(1.0) as u32;
        (w, h)
    }
}

/// Presentation area reported by the host on resize.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Logical width available to the presentation area.
    pub width: f64,
    /// Logical height available to the presentation area.
    pub height: f64,
    /// Physical-to-logical pixel ratio.
    pub scale: f64,
}

impl Viewport {
    /// Viewport covering `bounds` at `scale`.
    pub fn new(bounds: ContainerBounds, scale: f64) -> Self {
        Self {
            width: bounds.width,
            height: bounds.height,
            scale: sanitize_scale(scale),
        }
    }

    /// Copy with non-finite or non-positive fields replaced by usable values.
    ///
    /// Invalid dimensions become unbounded (the container still caps the layout) and invalid
    /// scales fall back to `1.0`.
    pub fn sanitized(self) -> Self {
        let dim = |v: f64| {
            if v.is_finite() && v > 0.0 {
                v
            } else {
                f64::INFINITY
            }
        };
        Self {
            width: dim(self.width),
            height: dim(self.height),
            scale: sanitize_scale(self.scale),
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINER, 1.0)
    }
}

/// Device pixel ratio, at least `1.0`. Non-finite ratios become `1.0`.
pub fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() {
        scale.max(1.0)
    } else {
        1.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
