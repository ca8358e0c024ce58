use std::sync::Arc;

use crate::assets::decode::DecodedImage;
use crate::assets::reference::SourceAsset;
use crate::caption::Captions;
use crate::foundation::core::LogicalLayout;

/// Raster pixels as RGBA8.
///
/// Frames produced by the engine are **premultiplied alpha**; the `premultiplied` flag makes this
/// explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in physical pixels.
    pub width: u32,
    /// Height in physical pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// One committed composition: everything that produced the pixels, plus the pixels.
///
/// Frames are replaced, never patched, whenever an input changes.
#[derive(Clone, Debug)]
pub struct RenderFrame {
    /// Logical size the image was fitted to.
    pub layout: LogicalLayout,
    /// Physical-to-logical pixel ratio used for the backing raster.
    pub scale: f64,
    /// Asset the frame was built from.
    pub asset: SourceAsset,
    /// Decoded source image.
    pub image: Arc<DecodedImage>,
    /// Captions drawn into the frame.
    pub captions: Captions,
    /// Physical pixels.
    pub pixels: FrameRGBA,
}

impl RenderFrame {
    /// Physical raster size.
    pub fn physical_size(&self) -> (u32, u32) {
        (self.pixels.width, self.pixels.height)
    }
}
