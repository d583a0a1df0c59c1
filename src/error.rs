use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Input directory {path} is not readable: {reason}")]
    InputRoot { path: PathBuf, reason: String },

    #[error("Failed to read DICOM file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: dicom::object::ReadError,
    },

    #[error("Failed to decode pixel data of {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: dicom::pixeldata::Error,
    },

    #[error("Unsupported pixel format in {path}: {reason}")]
    UnsupportedPixelFormat { path: PathBuf, reason: String },

    #[error("Cannot export a {rank}-dimensional pixel array to {path}")]
    UnsupportedRank { path: PathBuf, rank: usize },

    #[error("Volume for {path} has no slices")]
    EmptyVolume { path: PathBuf },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode PNG {path}: {source}")]
    EncodePng {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode GIF {path}: {source}")]
    EncodeGif {
        path: PathBuf,
        #[source]
        source: gif::EncodingError,
    },

    #[error("{path} is not located under {root}")]
    OutsideInputRoot { path: PathBuf, root: PathBuf },

    #[error("Invalid configuration value for {name}: {reason}")]
    InvalidConfig { name: &'static str, reason: String },

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// Errors that abort a run even when `continue_on_error` is set.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::InputRoot { .. }
                | Error::CreateDir { .. }
                | Error::InvalidConfig { .. }
                | Error::ThreadPool(_)
        )
    }

    /// The file this error is attributed to, when there is one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Error::InputRoot { path, .. }
            | Error::Open { path, .. }
            | Error::Decode { path, .. }
            | Error::UnsupportedPixelFormat { path, .. }
            | Error::UnsupportedRank { path, .. }
            | Error::EmptyVolume { path }
            | Error::CreateDir { path, .. }
            | Error::Write { path, .. }
            | Error::EncodePng { path, .. }
            | Error::EncodeGif { path, .. }
            | Error::OutsideInputRoot { path, .. } => Some(path),
            Error::InvalidConfig { .. } | Error::ThreadPool(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
