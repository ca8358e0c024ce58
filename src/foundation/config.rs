use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::core::{ContainerBounds, Viewport, sanitize_scale};
use crate::foundation::error::{MemeError, MemeResult};

/// Default base URL of the persistence API.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Default quiet window for resize debouncing.
pub const DEFAULT_RESIZE_QUIET_MS: u64 = 100;

/// Engine configuration.
///
/// Layered as defaults, then an optional JSON file ([`EngineOpts::from_path`]), then
/// `MEMEFORGE_*` environment variables ([`EngineOpts::with_env_overrides`]).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOpts {
    /// Maximum logical box for the composition.
    pub bounds: ContainerBounds,
    /// Initial device pixel ratio.
    pub device_scale: f64,
    /// Resize debounce quiet window in milliseconds.
    pub resize_quiet_ms: u64,
    /// TrueType/OpenType font used for captions.
    pub font_path: Option<PathBuf>,
    /// Base URL of the persistence API.
    pub api_base_url: String,
}

impl Default for EngineOpts {
    fn default() -> Self {
        Self {
            bounds: ContainerBounds::default(),
            device_scale: 1.0,
            resize_quiet_ms: DEFAULT_RESIZE_QUIET_MS,
            font_path: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl EngineOpts {
    /// Load options from a JSON file. Missing fields keep their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> MemeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read engine options '{}'", path.display()))?;
        let opts: Self = serde_json::from_str(&text).map_err(|e| {
            MemeError::validation(format!("engine options '{}': {e}", path.display()))
        })?;
        opts.validated()
    }

    /// Apply `MEMEFORGE_SCALE`, `MEMEFORGE_RESIZE_QUIET_MS`, `MEMEFORGE_FONT` and
    /// `MEMEFORGE_API_URL` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|k| std::env::var(k).ok())
    }

    pub(crate) fn with_overrides_from(mut self, get: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = get("MEMEFORGE_SCALE").and_then(|v| v.parse::<f64>().ok()) {
            self.device_scale = sanitize_scale(v);
        }
        if let Some(v) = get("MEMEFORGE_RESIZE_QUIET_MS").and_then(|v| v.parse::<u64>().ok()) {
            self.resize_quiet_ms = v;
        }
        if let Some(v) = get("MEMEFORGE_FONT").filter(|v| !v.trim().is_empty()) {
            self.font_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("MEMEFORGE_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api_base_url = v;
        }
        self
    }

    /// Set the caption font.
    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    /// Set the initial device pixel ratio. Invalid values fall back to `1.0`.
    pub fn with_device_scale(mut self, scale: f64) -> Self {
        self.device_scale = sanitize_scale(scale);
        self
    }

    /// Set the resize debounce quiet window.
    pub fn with_resize_quiet(mut self, quiet: Duration) -> Self {
        self.resize_quiet_ms = quiet.as_millis() as u64;
        self
    }

    /// Set the persistence API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Resize debounce quiet window.
    pub fn resize_quiet(&self) -> Duration {
        Duration::from_millis(self.resize_quiet_ms)
    }

    /// Viewport the engine starts with: the full container at the configured scale.
    pub fn initial_viewport(&self) -> Viewport {
        Viewport::new(self.bounds, self.device_scale)
    }

    fn validated(mut self) -> MemeResult<Self> {
        self.bounds = ContainerBounds::new(self.bounds.width, self.bounds.height)?;
        self.device_scale = sanitize_scale(self.device_scale);
        Ok(self)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
