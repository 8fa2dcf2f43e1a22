use facet_geom::GeomError;
use thiserror::Error;

/// Errors raised while assembling a scene or building its acceleration structure.
#[derive(Error, Debug)]
pub enum TracerError {
    /// A bound does not contain one of its descendants. Always a builder bug.
    #[error("acceleration structure invariant violated: {0}")]
    ConstructionInvariantViolated(String),

    #[error("invalid geometry: {0}")]
    Geom(#[from] GeomError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type TracerResult<T> = Result<T, TracerError>;
