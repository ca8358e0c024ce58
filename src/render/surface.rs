use std::sync::Arc;

use vello_cpu::kurbo::{Affine, Rect};

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{LogicalLayout, sanitize_scale};
use crate::foundation::error::{MemeError, MemeResult};
use crate::render::frame::FrameRGBA;

/// Source image converted into a `vello_cpu` paint once per decode.
#[derive(Clone)]
pub(crate) struct ImagePaint {
    paint: vello_cpu::Image,
    width: u32,
    height: u32,
}

impl ImagePaint {
    pub(crate) fn from_decoded(img: &DecodedImage) -> MemeResult<Self> {
        let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
        Ok(Self {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            width: img.width,
            height: img.height,
        })
    }
}

/// Backing raster for one composition.
///
/// The raster is `(width * scale, height * scale)` physical pixels, while drawers work in the
/// logical `(width, height)` space through [`RenderSurface::logical_transform`].
pub struct RenderSurface {
    layout: LogicalLayout,
    scale: f64,
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    ctx: vello_cpu::RenderContext,
}

impl RenderSurface {
    /// Allocate a cleared surface for `layout` at device `scale`.
    pub fn acquire(layout: LogicalLayout, scale: f64) -> MemeResult<Self> {
        let scale = sanitize_scale(scale);
        let (width, height) = physical_dims(layout, scale)?;
        Ok(Self {
            layout,
            scale,
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
            ctx: vello_cpu::RenderContext::new(width, height),
        })
    }

    /// Resize for a new composition and clear. Storage is reused when the physical size is
    /// unchanged.
    pub fn reconfigure(&mut self, layout: LogicalLayout, scale: f64) -> MemeResult<()> {
        let scale = sanitize_scale(scale);
        let (width, height) = physical_dims(layout, scale)?;
        self.layout = layout;
        self.scale = scale;
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.pixmap = vello_cpu::Pixmap::new(width, height);
        }
        self.clear();
        Ok(())
    }

    /// Drop all prior content.
    pub fn clear(&mut self) {
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.ctx = vello_cpu::RenderContext::new(self.width, self.height);
    }

    /// Logical size drawers see.
    pub fn layout(&self) -> LogicalLayout {
        self.layout
    }

    /// Physical-to-logical ratio.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Backing raster size in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    /// Maps logical units to physical pixels.
    pub fn logical_transform(&self) -> Affine {
        Affine::scale(self.scale)
    }

    pub(crate) fn ctx(&mut self) -> &mut vello_cpu::RenderContext {
        &mut self.ctx
    }

    /// Draw `image` stretched over the whole logical area.
    pub(crate) fn draw_image(&mut self, image: &ImagePaint) {
        let sx = self.layout.width / f64::from(image.width);
        let sy = self.layout.height / f64::from(image.height);
        let transform = self.logical_transform() * Affine::scale_non_uniform(sx, sy);

        self.ctx.set_transform(transform);
        self.ctx.set_paint_transform(Affine::IDENTITY);
        self.ctx.set_paint(image.paint.clone());
        self.ctx.fill_rect(&Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
    }

    /// Rasterize everything drawn since the last clear and read the pixels back.
    pub fn commit(&mut self) -> FrameRGBA {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    /// Give the raster back. Consuming `self` ends the surface's lifetime.
    pub fn release(self) {}
}

/// Largest backing raster, in physical pixels (256 MiB of RGBA8).
pub const MAX_SURFACE_PIXELS: u64 = 1 << 26;

fn physical_dims(layout: LogicalLayout, scale: f64) -> MemeResult<(u16, u16)> {
    if !(layout.width.is_finite() && layout.height.is_finite())
        || layout.width <= 0.0
        || layout.height <= 0.0
    {
        return Err(MemeError::draw("logical layout must be finite and > 0"));
    }
    let (w, h) = layout.physical_size(scale);
    if u64::from(w) * u64::from(h) > MAX_SURFACE_PIXELS {
        return Err(MemeError::draw(format!(
            "surface {w}x{h} exceeds {MAX_SURFACE_PIXELS} pixels"
        )));
    }
    let w: u16 = w
        .try_into()
        .map_err(|_| MemeError::draw(format!("surface width {w} exceeds u16")))?;
    let h: u16 = h
        .try_into()
        .map_err(|_| MemeError::draw(format!("surface height {h} exceeds u16")))?;
    Ok((w, h))
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> MemeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| MemeError::draw("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| MemeError::draw("image height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(MemeError::draw("image byte len mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity((width as usize) * (height as usize));
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
