use std::path::PathBuf;

use thiserror::Error;

use crate::geometric::quadkey::QuadKey;

/// Failures callers may want to match on.
///
/// Everything else (I/O, transport, JSON) travels as `anyhow::Error` with
/// context attached; these variants can be recovered from it with
/// `err.downcast_ref::<FootprintError>()`.
#[derive(Debug, Error)]
pub enum FootprintError {
    #[error("QuadKey not found in dataset: {0}")]
    QuadKeyNotFound(QuadKey),

    #[error("AOI file {} contains no features", .0.display())]
    EmptyAoi(PathBuf),

    #[error("AOI geometry must be a Polygon or MultiPolygon, got {0}")]
    UnsupportedAoiGeometry(String),

    #[error("feature {index} in {} has no geometry", file.display())]
    MissingGeometry { file: PathBuf, index: usize },

    #[error("{} holds a {kind} geometry, only Polygon is written", file.display())]
    UnsupportedGeometry { file: PathBuf, kind: String },

    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },
}
