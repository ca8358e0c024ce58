use crate::session::compositor::EngineState;

/// Convenience result type used across the engine.
pub type MemeResult<T> = Result<T, MemeError>;

/// Error type for every fallible engine operation.
#[derive(thiserror::Error, Debug)]
pub enum MemeError {
    /// Network or decode failure for a source asset. Recoverable by re-selecting.
    #[error("asset load failed for '{reference}': {reason}")]
    AssetLoadFailed {
        /// The reference that was attempted (URLs verbatim, embedded data abbreviated).
        reference: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// Drawing surface unavailable or a failure while composing a frame.
    #[error("draw failed: {0}")]
    DrawFailed(String),

    /// Persistence call rejected or unreachable.
    #[error("save failed: {0}")]
    SaveFailed(String),

    /// Save attempted without a credential.
    #[error("not authenticated: log in to save compositions")]
    NotAuthenticated,

    /// Operation requires a committed frame but the engine is elsewhere.
    #[error("operation requires a ready composition (engine is {0})")]
    NotReady(EngineState),

    /// Invalid input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// The engine session was torn down.
    #[error("engine session closed")]
    SessionClosed,

    /// Anything else, with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MemeError {
    /// Build an [`MemeError::AssetLoadFailed`].
    pub fn asset_load(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AssetLoadFailed {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`MemeError::DrawFailed`].
    pub fn draw(msg: impl Into<String>) -> Self {
        Self::DrawFailed(msg.into())
    }

    /// Build a [`MemeError::SaveFailed`].
    pub fn save(msg: impl Into<String>) -> Self {
        Self::SaveFailed(msg.into())
    }

    /// Build a [`MemeError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Host-facing fault for the recoverable error taxonomy, `None` for everything else.
    pub fn fault(&self) -> Option<Fault> {
        let kind = match self {
            Self::AssetLoadFailed { .. } => FaultKind::AssetLoadFailed,
            Self::DrawFailed(_) => FaultKind::DrawFailed,
            Self::SaveFailed(_) => FaultKind::SaveFailed,
            Self::NotAuthenticated => FaultKind::NotAuthenticated,
            _ => return None,
        };
        Some(Fault {
            kind,
            message: self.to_string(),
        })
    }
}

/// Category of a user-visible fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum FaultKind {
    /// Source asset could not be fetched or decoded.
    AssetLoadFailed,
    /// Composition could not be drawn.
    DrawFailed,
    /// Persistence rejected or unreachable.
    SaveFailed,
    /// No credential available at save time.
    NotAuthenticated,
}

/// A typed fault plus a message the host can display as-is.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Fault {
    /// Fault category.
    pub kind: FaultKind,
    /// Human-readable description.
    pub message: String,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
