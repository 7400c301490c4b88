use callquest_graph::GraphError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CurriculumError>;

/// Failures that abort a whole generation run
///
/// Per-challenge shortfalls are not errors; see [`crate::GenerationGap`].
#[derive(Error, Debug)]
pub enum CurriculumError {
    #[error("Invalid call graph: {0}")]
    Input(#[from] GraphError),

    #[error("Call graph has no entry points")]
    NoEntryPoints,

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CurriculumError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
