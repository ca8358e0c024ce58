use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::assets::decode::{DecodedImage, decode_image};
use crate::assets::reference::AssetReference;
use crate::foundation::error::{MemeError, MemeResult};

/// Remote fetch deadline used by the command-line front end.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves a source reference into a decoded, dimensioned image.
///
/// Implementations only decode; they never touch a render surface. Failures are reported as
/// [`MemeError::AssetLoadFailed`] carrying the attempted reference.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Fetch (if remote) and decode `reference`.
    async fn load(&self, reference: &AssetReference) -> MemeResult<DecodedImage>;
}

/// Loader for remote `http(s)` images and embedded bytes.
#[derive(Clone, Debug)]
pub struct HttpAssetLoader {
    client: Client,
}

impl Default for HttpAssetLoader {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl HttpAssetLoader {
    /// Wrap an existing HTTP client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Loader whose remote fetches give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> MemeResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MemeError::validation(format!("build http client: {e}")))?;
        Ok(Self::new(client))
    }

    async fn fetch(&self, url: &url::Url) -> Result<Vec<u8>, String> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }
        let bytes = resp.bytes().await.map_err(|e| e.to_string())?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl AssetLoader for HttpAssetLoader {
    #[tracing::instrument(skip(self), fields(reference = %reference.describe()))]
    async fn load(&self, reference: &AssetReference) -> MemeResult<DecodedImage> {
        let fail = |reason: String| MemeError::asset_load(reference.describe(), reason);
        let image = match reference {
            AssetReference::Remote(url) => {
                let bytes = self.fetch(url).await.map_err(fail)?;
                decode_image(&bytes).map_err(|e| fail(e.to_string()))?
            }
            AssetReference::Embedded { bytes, .. } => {
                decode_image(bytes).map_err(|e| fail(e.to_string()))?
            }
        };
        debug!(width = image.width, height = image.height, "decoded source image");
        Ok(image)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
