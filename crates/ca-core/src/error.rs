//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CaError` as one variant
//! via `#[from]`, so configuration problems surface unchanged at the top.

use thiserror::Error;

/// The top-level error type for `ca-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CaError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `ca-*` crates.
pub type CaResult<T> = Result<T, CaError>;
