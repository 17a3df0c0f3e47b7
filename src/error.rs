//! # Error Types
//!
//! This module defines error types used throughout the thaibill library.
//!
//! Each layer has its own error enum ([`CodecError`] for parsing and
//! encoding, [`RenderError`] for image generation). [`ThaiBillError`] wraps
//! both for the end-to-end pipeline, the CLI and the HTTP server.

use thiserror::Error;

pub use crate::codec::CodecError;
pub use crate::render::RenderError;

/// Main error type for thaibill operations
#[derive(Debug, Error)]
pub enum ThaiBillError {
    /// Barcode text could not be parsed or encoded
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// QR code or barcode image generation failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Invalid options or option file
    #[error("Configuration error: {0}")]
    Config(String),

    /// A blocking render task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),

    /// HTTP server failure (bind, serve)
    #[error("Server error: {0}")]
    Server(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
