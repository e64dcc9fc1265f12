use std::path::PathBuf;

use thiserror::Error;

/// Construction-time failures. Everything after a session is built is either
/// an expected gameplay branch or an out-of-bounds query answered with
/// `None`, so nothing else in the crate returns errors.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("failed to read layout {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode layout {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("layout is empty ({width}x{height} pixels)")]
    EmptyLayout { width: u32, height: u32 },

    #[error("layout pixel buffer holds {actual} bytes, expected {expected}")]
    TruncatedLayout { actual: usize, expected: usize },

    #[error("{role} position ({x}, {y}) is outside the board")]
    MissingTile { role: &'static str, x: i32, y: i32 },
}
