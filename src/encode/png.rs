use std::io::Cursor;
use std::path::Path;

use anyhow::Context as _;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::foundation::error::{MemeError, MemeResult};
use crate::render::frame::{FrameRGBA, RenderFrame};

/// File name the download action uses when the caller does not pick one.
pub const DEFAULT_EXPORT_NAME: &str = "my-meme.png";

/// Serializes committed frames to encoded images.
///
/// Stateless: every call encodes the frame it is given, so exports always reflect the most
/// recently committed frame.
pub struct Exporter;

impl Exporter {
    /// Encode `frame` as PNG bytes (straight alpha).
    pub fn encode_png(frame: &RenderFrame) -> MemeResult<Vec<u8>> {
        encode_rgba_png(&frame.pixels)
    }

    /// `data:image/png;base64,...` for `frame`.
    pub fn to_data_url(frame: &RenderFrame) -> MemeResult<String> {
        let png = Self::encode_png(frame)?;
        Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
    }

    /// Write `frame` as a PNG file, creating parent directories.
    pub fn write_png(frame: &RenderFrame, path: impl AsRef<Path>) -> MemeResult<()> {
        let path = path.as_ref();
        let png = Self::encode_png(frame)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(path, png).with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

pub(crate) fn encode_rgba_png(frame: &FrameRGBA) -> MemeResult<Vec<u8>> {
    let mut data = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| MemeError::draw("frame byte length does not match its dimensions"))?;

    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(out)
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
