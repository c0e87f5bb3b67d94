//! Module system error types.

use thiserror::Error;

/// Result type for module operations.
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Errors that can occur while discovering, registering, or scaffolding modules.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// A scaffold target already exists.
    #[error("module '{0}' already exists")]
    AlreadyExists(String),

    /// A requested template could not be found.
    #[error("template not found: {0}")]
    TemplateMissing(String),

    /// Invalid module manifest.
    #[error("invalid module manifest: {0}")]
    InvalidManifest(String),

    /// No module registered under the requested name.
    #[error("unknown module: {0}")]
    UnknownModule(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
