#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use memeforge::{
    AssetLoader, AssetReference, DecodedImage, HttpAssetLoader, MemeError, MemeResult,
    SourceAsset,
};

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Impact.ttf",
    "/Library/Fonts/Arial.ttf",
];

/// First usable caption font: `MEMEFORGE_TEST_FONT`, then common system locations.
pub fn test_font_path() -> Option<PathBuf> {
    let found = std::env::var_os("MEMEFORGE_TEST_FONT")
        .map(PathBuf::from)
        .into_iter()
        .chain(FONT_CANDIDATES.iter().map(PathBuf::from))
        .find(|p| p.is_file());
    if found.is_none() {
        eprintln!("skipping: no TrueType font found (set MEMEFORGE_TEST_FONT)");
    }
    found
}

pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Uploaded solid-colour asset.
pub fn upload(name: &str, width: u32, height: u32, rgba: [u8; 4]) -> SourceAsset {
    SourceAsset::upload(name, png_bytes(width, height, rgba)).unwrap()
}

/// Loader that decodes embedded references after a per-asset delay, and fails everything else.
#[derive(Default)]
pub struct DelayedLoader {
    inner: HttpAssetLoader,
    delays: HashMap<String, Duration>,
}

impl DelayedLoader {
    pub fn delay(mut self, asset: &SourceAsset, delay: Duration) -> Self {
        self.delays.insert(asset.reference.to_reference_string(), delay);
        self
    }
}

#[async_trait]
impl AssetLoader for DelayedLoader {
    async fn load(&self, reference: &AssetReference) -> MemeResult<DecodedImage> {
        if let Some(delay) = self.delays.get(&reference.to_reference_string()) {
            tokio::time::sleep(*delay).await;
        }
        match reference {
            AssetReference::Embedded { .. } => self.inner.load(reference).await,
            AssetReference::Remote(url) => Err(MemeError::asset_load(url.as_str(), "offline")),
        }
    }
}
