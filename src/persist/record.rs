use serde::{Deserialize, Serialize};

use crate::assets::reference::SourceAsset;
use crate::caption::Captions;
use crate::render::frame::RenderFrame;

/// Template name saved when the asset has no display name.
pub const DEFAULT_TEMPLATE_NAME: &str = "Custom Meme";

/// Where the saved image came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadOption {
    /// User upload.
    Upload,
    /// Preset template.
    Template,
}

/// Body of a create request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComposition {
    /// Top caption.
    pub top_text: String,
    /// Bottom caption.
    pub bottom_text: String,
    /// Source reference: a remote URL or a `data:` URL for uploads.
    pub image_url: String,
    /// Asset display name, or [`DEFAULT_TEMPLATE_NAME`].
    pub template_name: String,
    /// Upload or template.
    pub upload_option: UploadOption,
}

impl NewComposition {
    /// Payload for `asset` with `captions`.
    pub fn new(asset: &SourceAsset, captions: &Captions) -> Self {
        let template_name = if asset.display_name.trim().is_empty() {
            DEFAULT_TEMPLATE_NAME.to_string()
        } else {
            asset.display_name.clone()
        };
        Self {
            top_text: captions.top.clone(),
            bottom_text: captions.bottom.clone(),
            image_url: asset.reference.to_reference_string(),
            template_name,
            upload_option: if asset.is_custom() {
                UploadOption::Upload
            } else {
                UploadOption::Template
            },
        }
    }

    /// Payload describing exactly what `frame` shows.
    pub fn from_frame(frame: &RenderFrame) -> Self {
        Self::new(&frame.asset, &frame.captions)
    }
}

/// A composition stored by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionRecord {
    /// Backend id.
    #[serde(alias = "_id")]
    pub id: String,
    /// Top caption.
    #[serde(default)]
    pub top_text: String,
    /// Bottom caption.
    #[serde(default)]
    pub bottom_text: String,
    /// Source reference as saved.
    pub image_url: String,
    /// Template name, if the backend stored one.
    #[serde(default)]
    pub template_name: Option<String>,
    /// Creation timestamp as sent by the backend.
    #[serde(default)]
    pub created_at: Option<String>,
}

#[cfg(test)]
#[path = "../../tests/unit/persist/record.rs"]
mod tests;
