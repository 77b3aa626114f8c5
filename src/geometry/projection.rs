use crate::domain::{GeoBounds, RasterGrid};
use crate::error::DemError;

/// Integer pixel position, row 0 at the northern raster edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelCoord {
    pub x: usize,
    pub y: usize,
}

/// Affine mapping from WGS84 to a raster's pixel grid
///
/// - x = floor((lng - west) / (east - west) * width)
/// - y = floor((north - lat) / (north - south) * height)
///
/// Each axis is clamped to the grid, so points outside the raster land on
/// the nearest edge pixel.
#[derive(Debug, Clone)]
pub struct PixelTransform {
    bounds: GeoBounds,
    width: usize,
    height: usize,
}

impl PixelTransform {
    /// Create a transform for the given raster
    ///
    /// Fails with `DegenerateBounds` when the raster has zero extent on
    /// either axis, or no pixels at all.
    pub fn new(grid: &RasterGrid) -> Result<Self, DemError> {
        Self::from_bounds(*grid.bounds(), grid.width(), grid.height())
    }

    pub fn from_bounds(bounds: GeoBounds, width: usize, height: usize) -> Result<Self, DemError> {
        if bounds.is_degenerate() || width == 0 || height == 0 {
            return Err(DemError::DegenerateBounds {
                width: bounds.width(),
                height: bounds.height(),
            });
        }
        Ok(Self {
            bounds,
            width,
            height,
        })
    }

    /// Map a lat/lng point to its (clamped) pixel
    ///
    /// Non-finite input is rejected instead of being clamped into the grid.
    pub fn to_pixel(&self, lat: f64, lng: f64) -> Result<PixelCoord, DemError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(DemError::InvalidCoordinate { lat, lng });
        }

        let b = &self.bounds;
        let x = ((lng - b.west) / b.width() * self.width as f64).floor();
        let y = ((b.north - lat) / b.height() * self.height as f64).floor();

        Ok(PixelCoord {
            x: clamp_axis(x, self.width),
            y: clamp_axis(y, self.height),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

fn clamp_axis(value: f64, dim: usize) -> usize {
    value.clamp(0.0, (dim - 1) as f64) as usize
}
