//! Error types for the fetch, share and config paths.
//!
//! Every error that can reach the screen is `Clone` so it can ride inside
//! an iced `Message`. Payloads are plain strings for the same reason.

use std::path::PathBuf;
use thiserror::Error;

/// Toast shown when the API call or the image download/decode fails.
pub const IMAGE_LOAD_FAILED: &str =
    "Erro ao carregar o Coachorro, verifique se sua conexão está funcionando e tente novamente.";

/// Toast shown when the composed PNG can't be written.
pub const SAVE_FAILED: &str = "Error while saving the file";

/// The two user-facing failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network, API or image decode failure
    FetchOrDecode,
    /// Composing or writing the shared file failed
    Persist,
}

impl ErrorKind {
    /// Fixed text shown to the user for this kind of failure
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::FetchOrDecode => IMAGE_LOAD_FAILED,
            ErrorKind::Persist => SAVE_FAILED,
        }
    }
}

/// Failure while fetching a dog or loading its image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("invalid image url: {0:?}")]
    InvalidUrl(String),

    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("background worker failed: {0}")]
    Worker(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::FetchOrDecode
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None if err.is_decode() => FetchError::Parse(err.to_string()),
            None => FetchError::Request(err.to_string()),
        }
    }
}

/// Failure while writing the shared PNG
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error("could not create {path}: {message}")]
    CreateDir { path: PathBuf, message: String },

    #[error("could not write {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("png encoding failed: {0}")]
    Encode(String),

    #[error("background worker failed: {0}")]
    Worker(String),
}

impl PersistError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Persist
    }
}

/// Failure while rasterizing the share image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("image surface has zero size ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },
}

impl ComposeError {
    /// Composing is part of the save flow, so it reports as a save failure
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Persist
    }
}

/// Failure while loading `config.toml`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
