//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`Error`] covers every failure mode the engine reports:
//! - Configuration parsing and validation failures
//! - Asset loading and decoding errors (see [`AssetError`])
//! - File I/O errors
//!
//! Nothing inside the frame loop returns these errors to the host: asset
//! failures are logged and delivered to the pending result that asked for
//! the asset, and the loop keeps ticking.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for the engine.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A configuration value is out of range or inconsistent.
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig {
        /// The offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// JSON parsing error (configuration or typeface files).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// An asset failed to load.
    #[error(transparent)]
    Asset(#[from] AssetError),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A color string could not be parsed.
    #[error("Invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),
}

/// Failures that can happen while loading a single asset.
///
/// `AssetError` is `Clone` so the same failure can be both logged by the
/// loading tracker and handed to the pending result that requested it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// The file does not exist or cannot be opened.
    #[error("Asset not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading the file failed part way through.
    #[error("Failed to read {path}: {reason}")]
    Read {
        /// Path being read
        path: String,
        /// Underlying I/O failure
        reason: String,
    },

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// The six faces of a cube texture disagree.
    #[error("Cube map error: {0}")]
    CubeMap(String),

    /// Malformed asset data (typeface JSON, glTF document, ...).
    #[error("Format error: {0}")]
    Format(String),

    /// The worker runtime dropped the load before it finished.
    #[error("Asset load cancelled: {0}")]
    Cancelled(String),
}

impl From<image::ImageError> for AssetError {
    fn from(err: image::ImageError) -> Self {
        AssetError::ImageDecode(err.to_string())
    }
}

impl From<gltf::Error> for AssetError {
    fn from(err: gltf::Error) -> Self {
        AssetError::Format(format!("glTF: {err}"))
    }
}

impl From<tokio::task::JoinError> for AssetError {
    fn from(err: tokio::task::JoinError) -> Self {
        AssetError::Cancelled(err.to_string())
    }
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
