use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for template loading and matching.
pub type VisionResult<T> = Result<T, VisionError>;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Failed to load template image {path:?}: {source}")]
    TemplateLoadFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to read template directory {path:?}: {source}")]
    TemplateDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Asking for a template that was never loaded is a usage error; it is
    /// reported distinctly from "searched and found nothing".
    #[error("No template named '{name}' is loaded")]
    UnknownTemplate { name: String },

    #[error("Match threshold {threshold} is outside [0, 1]")]
    ThresholdOutOfRange { threshold: f32 },
}
