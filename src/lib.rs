//! Memeforge composes captioned images ("memes").
//!
//! A session selects a source image, fits it into a fixed logical box, draws white captions
//! with a black outline at the top and bottom edges, and exports the committed frame as PNG.
//!
//! - [`Compositor`] is the synchronous state machine (Idle, Loading, Ready, Failed).
//! - [`MemeEngine`] runs a compositor on a Tokio task with async loads and debounced resizes.
//! - [`PersistenceClient`] saves compositions to the backend store.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod caption;
mod encode;
mod foundation;
mod layout;
mod persist;
mod render;
mod session;

pub use crate::assets::decode::{DecodedImage, decode_image};
pub use crate::assets::loader::{AssetLoader, DEFAULT_LOAD_TIMEOUT, HttpAssetLoader};
pub use crate::assets::reference::{AssetId, AssetReference, DEFAULT_UPLOAD_NAME, SourceAsset};
pub use crate::assets::templates::{
    Template, asset as template_asset, find as find_template, presets as template_presets,
};
pub use crate::caption::{Anchor, Caption, Captions};
pub use crate::encode::png::{DEFAULT_EXPORT_NAME, Exporter};
pub use crate::foundation::config::{DEFAULT_API_BASE_URL, DEFAULT_RESIZE_QUIET_MS, EngineOpts};
pub use crate::foundation::core::{
    ContainerBounds, DEFAULT_CONTAINER, LogicalLayout, Viewport, sanitize_scale,
};
pub use crate::foundation::error::{Fault, FaultKind, MemeError, MemeResult};
pub use crate::layout::fit::{fit, fit_into};
pub use crate::persist::client::PersistenceClient;
pub use crate::persist::credentials::{
    CredentialProvider, EnvCredentials, StaticCredentials, TOKEN_ENV_VAR,
};
pub use crate::persist::record::{
    CompositionRecord, DEFAULT_TEMPLATE_NAME, NewComposition, UploadOption,
};
pub use crate::render::frame::{FrameRGBA, RenderFrame};
pub use crate::render::surface::{MAX_SURFACE_PIXELS, RenderSurface};
pub use crate::render::text::{CAPTION_INSET, MIN_FONT_SIZE_PX, TextStroker, font_size_px, stroke_width};
pub use crate::session::compositor::{
    Compositor, EngineState, LoadOutcome, LoadTicket, RequestToken,
};
pub use crate::session::engine::{MemeEngine, Snapshot};
pub use crate::session::scheduler::ResizeScheduler;
