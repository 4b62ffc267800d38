use thiserror::Error;

/// Errors raised inside the render pipeline. None of them are fatal to the
/// render loop: degenerate vertices and out-of-bounds pixels are skipped, only
/// malformed input is handed back to the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RasterError {
    #[error("perspective division by degenerate clip-space w = {w}")]
    DegenerateTransform { w: f32 },

    #[error("pixel ({x}, {y}) is outside the {width}x{height} frame buffer")]
    OutOfBoundsCoverage { x: i64, y: i64, width: u32, height: u32 },

    #[error("primitive assembly needs a multiple of three vertices, got {count}")]
    MalformedPrimitiveGroup { count: usize },

    #[error("interleaved vertex stream has an unpaired entry (length {len})")]
    UnpairedAttribute { len: usize },
}
