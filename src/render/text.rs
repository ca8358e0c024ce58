use std::borrow::Cow;
use std::path::Path;

use anyhow::Context as _;
use vello_cpu::kurbo::{Affine, Stroke};

use crate::caption::{Anchor, Caption};
use crate::foundation::error::{MemeError, MemeResult};
use crate::render::surface::RenderSurface;

/// Smallest caption font size in logical pixels.
pub const MIN_FONT_SIZE_PX: f32 = 20.0;

/// Distance between a caption and the edge it is anchored to, in logical units.
pub const CAPTION_INSET: f64 = 10.0;

/// Caption font size for a logical layout width: `max(20, floor(width / 15))`.
///
/// Shared by both captions so top and bottom text render at the same size.
pub fn font_size_px(logical_width: f64) -> f32 {
    ((logical_width / 15.0).floor() as f32).max(MIN_FONT_SIZE_PX)
}

/// Outline width for a font size.
pub fn stroke_width(font_size_px: f32) -> f64 {
    f64::from(font_size_px) / 5.0
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

const FILL: TextBrushRgba8 = TextBrushRgba8 {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

const OUTLINE: TextBrushRgba8 = TextBrushRgba8 {
    r: 0,
    g: 0,
    b: 0,
    a: 255,
};

#[derive(Clone, Copy)]
enum Pass {
    Stroke,
    Fill,
}

/// Draws stroke-outlined captions with a single registered font.
pub struct TextStroker {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl TextStroker {
    /// Register `font_bytes` (TrueType/OpenType) as the caption font.
    pub fn from_font_bytes(font_bytes: Vec<u8>) -> MemeResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            MemeError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MemeError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0),
        })
    }

    /// Read and register a font file.
    pub fn from_path(path: impl AsRef<Path>) -> MemeResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_font_bytes(bytes)
    }

    /// Family name of the registered font.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Draw `caption` onto `surface`: black outline first, white fill on top.
    ///
    /// Horizontally centered on `logical_width / 2`; the top caption's box starts
    /// [`CAPTION_INSET`] below the top edge and the bottom caption's box ends [`CAPTION_INSET`]
    /// above the bottom edge. Empty captions are skipped without touching the surface.
    pub fn draw(
        &mut self,
        surface: &mut RenderSurface,
        caption: &Caption,
        logical_width: f64,
        logical_height: f64,
        font_size_px: f32,
    ) -> MemeResult<()> {
        if caption.is_empty() {
            return Ok(());
        }
        let layout = self.layout(&caption.text, font_size_px)?;

        let x = logical_width / 2.0 - f64::from(layout.width()) / 2.0;
        let y = match caption.anchor {
            Anchor::Top => CAPTION_INSET,
            Anchor::Bottom => logical_height - CAPTION_INSET - f64::from(layout.height()),
        };
        let transform = surface.logical_transform() * Affine::translate((x, y));

        let ctx = surface.ctx();
        ctx.set_transform(transform);
        ctx.set_paint_transform(Affine::IDENTITY);

        ctx.set_stroke(Stroke::new(stroke_width(font_size_px)));
        emit_glyphs(ctx, &self.font, &layout, Pass::Stroke);
        emit_glyphs(ctx, &self.font, &layout, Pass::Fill);
        Ok(())
    }

    fn layout(&mut self, text: &str, size_px: f32) -> MemeResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(MemeError::draw("font size must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(FILL));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

fn emit_glyphs(
    ctx: &mut vello_cpu::RenderContext,
    font: &vello_cpu::peniko::FontData,
    layout: &parley::Layout<TextBrushRgba8>,
    pass: Pass,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = match pass {
                Pass::Stroke => OUTLINE,
                Pass::Fill => run.style().brush,
            };
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));

            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            let builder = ctx.glyph_run(font).font_size(run.run().font_size());
            match pass {
                Pass::Stroke => builder.stroke_glyphs(glyphs),
                Pass::Fill => builder.fill_glyphs(glyphs),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
