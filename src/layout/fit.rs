use crate::foundation::core::{ContainerBounds, LogicalLayout};

/// Fit an image of intrinsic size `(intrinsic_w, intrinsic_h)` into `(max_w, max_h)`,
/// preserving aspect ratio.
///
/// Landscape and square images are constrained by width first, portrait images by height
/// first; the other axis is re-checked afterwards so both bounds hold simultaneously. Images
/// smaller than the box are never upscaled past their intrinsic size on the first axis.
///
/// All inputs must be finite and > 0.
pub fn fit(intrinsic_w: f64, intrinsic_h: f64, max_w: f64, max_h: f64) -> LogicalLayout {
    let aspect = intrinsic_w / intrinsic_h;
    let (width, height) = if intrinsic_w >= intrinsic_h {
        let width = max_w.min(intrinsic_w);
        let height = width / aspect;
        if height > max_h {
            (max_h * aspect, max_h)
        } else {
            (width, height)
        }
    } else {
        let height = max_h.min(intrinsic_h);
        let width = height * aspect;
        if width > max_w {
            (max_w, max_w / aspect)
        } else {
            (width, height)
        }
    };
    LogicalLayout { width, height }
}

/// [`fit`] against a [`ContainerBounds`].
pub fn fit_into(intrinsic_w: u32, intrinsic_h: u32, bounds: ContainerBounds) -> LogicalLayout {
    fit(
        f64::from(intrinsic_w),
        f64::from(intrinsic_h),
        bounds.width,
        bounds.height,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
