//! Error types for template loading and rendering

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The template resource could not be located
    MissingResource,
    /// The template was found but could not be filled
    Render,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template syntax error: {0}")]
    Syntax(String),

    #[error("Template references undefined key '{0}'")]
    UndefinedKey(String),

    #[error("Invalid document package: {0}")]
    Package(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::TemplateNotFound(_) => ErrorKind::MissingResource,
            _ => ErrorKind::Render,
        }
    }
}

impl From<zip::result::ZipError> for RenderError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => RenderError::IoError(io),
            other => RenderError::Package(other.to_string()),
        }
    }
}
