use thiserror::Error;

/// Violated internal invariants of mesh construction.
///
/// Each variant is a programming defect in the caller or the tessellator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    #[error("tessellation requested before a surface was attached")]
    UnsetSurface,

    #[error("malformed mesh: {0}")]
    MalformedMesh(String),

    #[error("grid index mismatch: expected vertex {expected}, produced {actual}")]
    GridIndexMismatch { expected: u32, actual: u32 },

    #[error("invalid resolution {u_texels}x{v_texels}: texel counts must be positive")]
    InvalidResolution { u_texels: u32, v_texels: u32 },
}

pub type GeomResult<T> = Result<T, GeomError>;
