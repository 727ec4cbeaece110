//! Error types for scene widgets.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid typeface: {0}")]
    Typeface(String),

    #[error("Glyph not found in typeface: {0:?}")]
    MissingGlyph(char),

    #[error("Container has zero size ({width}x{height})")]
    ZeroSize { width: f32, height: f32 },

    #[error("Render surface error: {0}")]
    Surface(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Unknown widget kind: {0}")]
    UnknownWidget(String),
}

pub type Result<T> = std::result::Result<T, SceneError>;
