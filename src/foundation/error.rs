pub type FxResult<T> = Result<T, FxError>;

#[derive(thiserror::Error, Debug)]
pub enum FxError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("effect error: {0}")]
    Effect(String),

    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("sink error: {0}")]
    Sink(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error("expression error: {0}")]
    Expr(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FxError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn effect(msg: impl Into<String>) -> Self {
        Self::Effect(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::ResourceUnavailable(msg.into())
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn expr(msg: impl Into<String>) -> Self {
        Self::Expr(msg.into())
    }

    /// `true` for failures of an external collaborator (camera, microphone, model file).
    pub fn is_resource_unavailable(&self) -> bool {
        matches!(self, Self::ResourceUnavailable(_))
    }
}

impl From<serde_json::Error> for FxError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
