//! Errors raised while loading the route catalog.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building a route catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("routes directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse route file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("route already exists: {0}")]
    DuplicateRoute(String),
}
