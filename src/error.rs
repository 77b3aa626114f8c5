use thiserror::Error;

/// Errors raised by the mask and mesh pipeline.
///
/// An empty mesh is not an error: `build_mesh` reports it as `None`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DemError {
    #[error("Unsupported shape type: {0}")]
    UnsupportedShapeType(String),

    #[error("Invalid coordinate: lat={lat}, lng={lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("Degenerate raster bounds: {width} x {height} degrees")]
    DegenerateBounds { width: f64, height: f64 },

    #[error("Degenerate shape: {0}")]
    DegenerateShape(String),

    #[error("Raster of {width} x {height} samples does not fit in memory")]
    GridTooLarge { width: usize, height: usize },

    #[error("Raster has {actual} samples, expected {expected}")]
    SampleCount { expected: usize, actual: usize },

    #[error("No raster selected. Load or select an elevation raster first.")]
    NoRasterSelected,

    #[error("No shape selected. Draw, import or select a shape first.")]
    NoShapeSelected,
}

impl DemError {
    pub fn degenerate_shape(message: impl Into<String>) -> Self {
        Self::DegenerateShape(message.into())
    }
}
