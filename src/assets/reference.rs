use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use url::Url;

use crate::foundation::error::{MemeError, MemeResult};

/// Display name used for uploads that arrive without a file name.
pub const DEFAULT_UPLOAD_NAME: &str = "Custom Image";

/// Identity of a source asset: a preset template or the user's upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetId {
    /// Preset template by catalog id.
    Template(u32),
    /// User-supplied image.
    Custom,
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(id) => write!(f, "{id}"),
            Self::Custom => f.write_str("custom"),
        }
    }
}

/// Where the bytes of a source image come from.
#[derive(Clone, PartialEq, Eq)]
pub enum AssetReference {
    /// Remote `http`/`https` resource, fetched cross-origin.
    Remote(Url),
    /// Already-local bytes (uploads and `data:` URLs).
    Embedded {
        /// Declared or sniffed media type.
        mime: String,
        /// Encoded image bytes.
        bytes: Arc<[u8]>,
    },
}

impl AssetReference {
    /// Parse an `http(s)://` URL or an RFC 2397 `data:` URL.
    pub fn parse(s: &str) -> MemeResult<Self> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix("data:") {
            return parse_data_url(rest);
        }
        let url = Url::parse(s)
            .map_err(|e| MemeError::validation(format!("invalid asset reference '{s}': {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(Self::Remote(url)),
            other => Err(MemeError::validation(format!(
                "unsupported asset reference scheme '{other}'"
            ))),
        }
    }

    /// Wrap uploaded bytes, sniffing the media type from the image signature.
    pub fn from_upload(bytes: Vec<u8>) -> MemeResult<Self> {
        let format = image::guess_format(&bytes)
            .map_err(|e| MemeError::validation(format!("upload is not a known image: {e}")))?;
        Ok(Self::Embedded {
            mime: format.to_mime_type().to_string(),
            bytes: Arc::from(bytes),
        })
    }

    /// Canonical string form: the URL, or a base64 `data:` URL for embedded bytes.
    pub fn to_reference_string(&self) -> String {
        match self {
            Self::Remote(url) => url.to_string(),
            Self::Embedded { mime, bytes } => {
                format!("data:{mime};base64,{}", BASE64.encode(bytes))
            }
        }
    }

    /// Short form for logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Remote(url) => url.to_string(),
            Self::Embedded { mime, bytes } => format!("data:{mime} ({} bytes)", bytes.len()),
        }
    }
}

impl fmt::Debug for AssetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

fn parse_data_url(rest: &str) -> MemeResult<AssetReference> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| MemeError::validation("data URL is missing ','"))?;

    let mut params = meta.split(';');
    let mime = params
        .next()
        .filter(|m| !m.is_empty())
        .unwrap_or("application/octet-stream")
        .to_string();
    let is_base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        BASE64
            .decode(payload.trim())
            .map_err(|e| MemeError::validation(format!("data URL base64 payload: {e}")))?
    } else if payload.contains('%') {
        return Err(MemeError::validation(
            "percent-encoded data URLs are not supported",
        ));
    } else {
        payload.as_bytes().to_vec()
    };

    Ok(AssetReference::Embedded {
        mime,
        bytes: Arc::from(bytes),
    })
}

/// A selectable source image. Replaced wholesale on a new selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceAsset {
    /// Template id or `custom`.
    pub id: AssetId,
    /// Name shown to the user and used as the saved template name.
    pub display_name: String,
    /// Where the image bytes come from.
    pub reference: AssetReference,
}

impl SourceAsset {
    /// Preset template asset.
    pub fn template(id: u32, display_name: impl Into<String>, url: &str) -> MemeResult<Self> {
        Ok(Self {
            id: AssetId::Template(id),
            display_name: display_name.into(),
            reference: AssetReference::parse(url)?,
        })
    }

    /// Uploaded asset. A blank file name becomes [`DEFAULT_UPLOAD_NAME`].
    pub fn upload(file_name: &str, bytes: Vec<u8>) -> MemeResult<Self> {
        let display_name = if file_name.trim().is_empty() {
            DEFAULT_UPLOAD_NAME.to_string()
        } else {
            file_name.to_string()
        };
        Ok(Self {
            id: AssetId::Custom,
            display_name,
            reference: AssetReference::from_upload(bytes)?,
        })
    }

    /// Asset from an arbitrary reference string the user supplied.
    pub fn custom(display_name: impl Into<String>, reference: AssetReference) -> Self {
        Self {
            id: AssetId::Custom,
            display_name: display_name.into(),
            reference,
        }
    }

    /// `true` for user-supplied images.
    pub fn is_custom(&self) -> bool {
        self.id == AssetId::Custom
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/reference.rs"]
mod tests;
