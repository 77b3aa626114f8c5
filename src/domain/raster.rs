use crate::error::DemError;

/// Geographic extent in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub west: f64,
    pub east: f64,
    pub north: f64,
    pub south: f64,
}

impl GeoBounds {
    pub fn new(west: f64, east: f64, north: f64, south: f64) -> Self {
        Self {
            west,
            east,
            north,
            south,
        }
    }

    /// Longitude span
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitude span
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// True when either span is zero or not a finite number
    pub fn is_degenerate(&self) -> bool {
        let (w, h) = (self.width(), self.height());
        !w.is_finite() || !h.is_finite() || w == 0.0 || h == 0.0
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.south && lat <= self.north && lng >= self.west && lng <= self.east
    }
}

/// A single-band elevation raster
///
/// Samples are stored row-major with row 0 at the northern edge, in meters.
/// NODATA samples are stored as NaN.
#[derive(Debug, Clone)]
pub struct RasterGrid {
    width: usize,
    height: usize,
    bounds: GeoBounds,
    samples: Vec<f32>,
}

impl RasterGrid {
    pub fn new(
        width: usize,
        height: usize,
        bounds: GeoBounds,
        samples: Vec<f32>,
    ) -> Result<Self, DemError> {
        let expected = width
            .checked_mul(height)
            .ok_or(DemError::GridTooLarge { width, height })?;
        if samples.len() != expected {
            return Err(DemError::SampleCount {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bounds,
            samples,
        })
    }

    /// A raster with the same elevation everywhere
    #[cfg(test)]
    pub(crate) fn filled(width: usize, height: usize, bounds: GeoBounds, value: f32) -> Self {
        Self {
            width,
            height,
            bounds,
            samples: vec![value; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bounds(&self) -> &GeoBounds {
        &self.bounds
    }

    /// Elevation at pixel (x, y), row 0 north
    pub fn sample(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples.get(y * self.width + x).copied()
    }

    /// Row-major elevations multiplied by `scale`, ready for meshing
    pub fn scaled_elevations(&self, scale: f64) -> Vec<f64> {
        self.samples.iter().map(|&v| v as f64 * scale).collect()
    }

    /// (min, max) over the finite samples
    pub fn elevation_range(&self) -> Option<(f32, f32)> {
        self.samples
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
