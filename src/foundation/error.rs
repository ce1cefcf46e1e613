/// Convenience result type used across talkreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Per-item failures (`MissingAsset`, `Malformed`, per-turn `Service`) are meant to be logged and
/// isolated by the caller; `Composition` and dialogue-generation `Service` errors abort a run.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid user-provided settings or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced audio, image or video file is absent or unreadable.
    #[error("missing asset: {0}")]
    MissingAsset(String),

    /// A scene or character entry is missing required keys.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// A speech, dialogue or media tool call failed.
    #[error("service error: {0}")]
    Service(String),

    /// Required inputs for the final render are absent, or the render itself failed.
    #[error("composition error: {0}")]
    Composition(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::MissingAsset`] value.
    pub fn missing_asset(msg: impl Into<String>) -> Self {
        Self::MissingAsset(msg.into())
    }

    /// Build a [`ReelError::Malformed`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Build a [`ReelError::Service`] value.
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Build a [`ReelError::Composition`] value.
    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for failures that must abort the whole run rather than a single item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Composition(_) | Self::Validation(_))
    }
}

impl From<serde_json::Error> for ReelError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
