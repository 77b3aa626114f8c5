//! Shape rasterization
//!
//! Turns a geographic shape into a binary inclusion mask aligned with a
//! raster's pixel grid.

pub mod preview;

use tracing::debug;

use crate::domain::{RasterGrid, Shape};
use crate::error::DemError;
use crate::geometry::{PixelRing, PixelTransform};

/// Per-pixel inclusion flags (0 or 1)
///
/// Stored row-major with row 0 at the northern raster edge, the same layout
/// as the raster's elevation samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    bits: Vec<u8>,
}

impl BinaryMask {
    /// An all-zero mask
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bits
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.bits.get(y * self.width + x).copied()
    }

    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b == 1).count()
    }

    fn toggle(&mut self, x: usize, y: usize) {
        self.bits[y * self.width + x] ^= 1;
    }
}

/// Rasterize `shape` onto the pixel grid of `grid`
///
/// # Algorithm
/// 1. Convert every ring of the shape to pixel space (clamped to the grid)
/// 2. Limit the scan to the shape's bounding box in pixel space
/// 3. For each ring, toggle every pixel the ring contains
///
/// Toggling makes overlapping rings cancel out, so holes and nested rings
/// follow the even-odd rule. Ring edges are half-open, which keeps rings
/// that share an edge from both claiming it. Clamping puts the far column
/// and row on the edge of any ring that reaches past the raster, so those
/// pixels are sampled half a pixel inwards.
pub fn compute_mask(grid: &RasterGrid, shape: &Shape) -> Result<BinaryMask, DemError> {
    let transform = PixelTransform::new(grid)?;

    let rings: Vec<PixelRing> = shape
        .rings()?
        .iter()
        .map(|ring| PixelRing::from_geographic(ring, &transform))
        .collect();

    let bounds = shape
        .bounds()
        .ok_or_else(|| DemError::degenerate_shape("shape has no valid coordinates"))?;
    let top_left = transform.to_pixel(bounds.north, bounds.west)?;
    let bottom_right = transform.to_pixel(bounds.south, bounds.east)?;
    let (x_min, x_max) = (top_left.x.min(bottom_right.x), top_left.x.max(bottom_right.x));
    let (y_min, y_max) = (top_left.y.min(bottom_right.y), top_left.y.max(bottom_right.y));

    let mut mask = BinaryMask::new(grid.width(), grid.height());

    for ring in rings.iter().filter(|r| !r.is_degenerate()) {
        let Some((rx_min, ry_min, rx_max, ry_max)) = ring.extent() else {
            continue;
        };
        let x_range = x_min.max(rx_min as usize)..=x_max.min(rx_max as usize);
        let y_range = y_min.max(ry_min as usize)..=y_max.min(ry_max as usize);

        for y in y_range {
            for x in x_range.clone() {
                let (px, py) = sample_point(x, y, grid.width(), grid.height());
                if ring.contains(px, py) {
                    mask.toggle(x, y);
                }
            }
        }
    }

    debug!(
        kind = shape.kind().label(),
        rings = rings.len(),
        inside = mask.count_ones(),
        total = mask.len(),
        "computed shape mask"
    );

    Ok(mask)
}

/// Pixel-space point tested for pixel `(x, y)`
fn sample_point(x: usize, y: usize, width: usize, height: usize) -> (f64, f64) {
    let inset = |i: usize, len: usize| {
        if i + 1 == len && i > 0 {
            i as f64 - 0.5
        } else {
            i as f64
        }
    };
    (inset(x, width), inset(y, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoBounds;
    use geo::{LineString, MultiPolygon, Polygon, Rect, coord};

    /// 10 x 10 raster, one degree per pixel, lat/lng 0..10
    fn grid() -> RasterGrid {
        RasterGrid::filled(10, 10, GeoBounds::new(0.0, 10.0, 10.0, 0.0), 50.0)
    }

    fn square(lo: f64, hi: f64) -> LineString<f64> {
        vec![(lo, lo), (hi, lo), (hi, hi), (lo, hi)].into()
    }

    fn tile(west: f64, south: f64, east: f64, north: f64) -> Polygon<f64> {
        Rect::new(coord! { x: west, y: south }, coord! { x: east, y: north }).to_polygon()
    }

    #[test]
    fn test_full_raster_rectangle_is_all_ones() {
        let grid = RasterGrid::filled(4, 4, GeoBounds::new(0.0, 4.0, 4.0, 0.0), 1.0);
        let mask = compute_mask(&grid, &Shape::rectangle(0.0, 0.0, 4.0, 4.0)).unwrap();

        assert_eq!(mask.len(), 16);
        assert!(mask.as_slice().iter().all(|&b| b == 1));
    }

    #[test]
    fn test_zero_radius_circle_is_all_zeros() {
        let mask = compute_mask(&grid(), &Shape::circle(5.0, 5.0, 0.0)).unwrap();
        assert_eq!(mask.count_ones(), 0);
        assert_eq!(mask.len(), 100);
    }

    #[test]
    fn test_convex_polygon_inside_and_outside() {
        // Diamond spanning pixels x 1..=9, y 1..=9
        let shape = Shape::polygon(&[(5.0, 1.0), (9.0, 5.0), (5.0, 9.0), (1.0, 5.0)]);
        let mask = compute_mask(&grid(), &shape).unwrap();

        assert_eq!(mask.get(5, 5), Some(1));
        assert_eq!(mask.get(5, 4), Some(1));
        assert_eq!(mask.get(3, 5), Some(1));
        // Outside the bounding box
        for i in 0..10 {
            assert_eq!(mask.get(0, i), Some(0));
            assert_eq!(mask.get(i, 0), Some(0));
        }
        // Inside the box but outside the diamond
        assert_eq!(mask.get(1, 1), Some(0));
        assert_eq!(mask.get(9, 9), Some(0));
    }

    #[test]
    fn test_mask_is_row_major_north_first() {
        // Northern half only: lat 5..10 maps to rows 0..=4
        let mask = compute_mask(&grid(), &Shape::rectangle(0.0, 5.0, 10.0, 10.0)).unwrap();
        assert_eq!(mask.as_slice()[0], 1);
        assert_eq!(mask.as_slice()[99], 0);
        assert_eq!(mask.get(3, 2), Some(1));
        assert_eq!(mask.get(3, 8), Some(0));
    }

    #[test]
    fn test_hole_cancels_interior() {
        let shape = Shape::Polygon(Polygon::new(square(0.0, 10.0), vec![square(3.0, 7.0)]));
        let mask = compute_mask(&grid(), &shape).unwrap();

        assert_eq!(mask.get(1, 1), Some(1));
        assert_eq!(mask.get(8, 5), Some(1));
        assert_eq!(mask.get(5, 5), Some(0));
        assert_eq!(mask.get(4, 6), Some(0));
    }

    #[test]
    fn test_hole_keeps_its_size() {
        // Hole ring spans pixels 3..7, so it removes x 3..=6, y 3..=6
        let shape = Shape::Polygon(Polygon::new(square(0.0, 10.0), vec![square(3.0, 7.0)]));
        let mask = compute_mask(&grid(), &shape).unwrap();

        assert_eq!(mask.count_ones(), 100 - 16);
        assert_eq!(mask.get(2, 2), Some(1));
        assert_eq!(mask.get(3, 3), Some(0));
        assert_eq!(mask.get(6, 6), Some(0));
        assert_eq!(mask.get(7, 7), Some(1));
        assert_eq!(mask.get(7, 3), Some(1));
        assert_eq!(mask.get(3, 7), Some(1));
    }

    #[test]
    fn test_adjacent_tiles_leave_no_seam() {
        let tiles = Shape::MultiPolygon(MultiPolygon::new(vec![
            tile(0.0, 2.0, 5.0, 8.0),
            tile(5.0, 2.0, 10.0, 8.0),
        ]));
        let whole = Shape::rectangle(0.0, 2.0, 10.0, 8.0);

        let tiled = compute_mask(&grid(), &tiles).unwrap();
        let single = compute_mask(&grid(), &whole).unwrap();

        assert_eq!(tiled, single);
        assert_eq!(tiled.count_ones(), 60);
        assert_eq!(&tiled.as_slice()[40..50], &[1u8; 10]);
        for y in 2..=7 {
            assert_eq!(tiled.get(5, y), Some(1));
        }
        assert_eq!(tiled.get(5, 1), Some(0));
        assert_eq!(tiled.get(5, 8), Some(0));
    }

    #[test]
    fn test_one_degree_rectangle_covers_one_pixel() {
        let mask = compute_mask(&grid(), &Shape::rectangle(2.0, 2.0, 3.0, 3.0)).unwrap();

        assert_eq!(mask.count_ones(), 1);
        assert_eq!(mask.get(2, 7), Some(1));
    }

    #[test]
    fn test_sample_point_insets_far_edge() {
        assert_eq!(sample_point(0, 0, 10, 10), (0.0, 0.0));
        assert_eq!(sample_point(9, 4, 10, 10), (8.5, 4.0));
        assert_eq!(sample_point(4, 9, 10, 10), (4.0, 8.5));
        assert_eq!(sample_point(0, 0, 1, 1), (0.0, 0.0));
    }

    #[test]
    fn test_disjoint_multipolygon() {
        let a = Polygon::new(square(0.0, 3.0), vec![]);
        let b = Polygon::new(square(6.0, 9.0), vec![]);
        let shape = Shape::MultiPolygon(MultiPolygon::new(vec![a, b]));
        let mask = compute_mask(&grid(), &shape).unwrap();

        // a covers x 0..=2, rows 7..=9; b covers x 6..=8, rows 1..=3
        assert_eq!(mask.get(1, 8), Some(1));
        assert_eq!(mask.get(7, 2), Some(1));
        assert_eq!(mask.get(5, 5), Some(0));
    }

    #[test]
    fn test_overlapping_rings_toggle_off() {
        let a = Polygon::new(square(0.0, 10.0), vec![]);
        let b = Polygon::new(square(0.0, 10.0), vec![]);
        let shape = Shape::MultiPolygon(MultiPolygon::new(vec![a, b]));
        let mask = compute_mask(&grid(), &shape).unwrap();
        assert_eq!(mask.count_ones(), 0);
    }

    #[test]
    fn test_deterministic() {
        let shape = Shape::circle(5.0, 5.0, 300_000.0);
        let first = compute_mask(&grid(), &shape).unwrap();
        let second = compute_mask(&grid(), &shape).unwrap();
        assert_eq!(first, second);
        assert!(first.count_ones() > 0);
    }

    #[test]
    fn test_nan_vertex_is_excluded_not_fatal() {
        let shape = Shape::polygon(&[(1.0, 1.0), (f64::NAN, 5.0), (1.0, 9.0), (9.0, 9.0), (9.0, 1.0)]);
        let mask = compute_mask(&grid(), &shape).unwrap();
        assert_eq!(mask.get(5, 5), Some(1));
    }

    #[test]
    fn test_degenerate_raster_bounds() {
        let flat = RasterGrid::filled(4, 4, GeoBounds::new(2.0, 2.0, 4.0, 0.0), 1.0);
        let err = compute_mask(&flat, &Shape::rectangle(0.0, 0.0, 4.0, 4.0)).unwrap_err();
        assert!(matches!(err, DemError::DegenerateBounds { .. }));
    }

    #[test]
    fn test_empty_shape_is_error() {
        let shape = Shape::Polygon(Polygon::new(LineString::new(vec![]), vec![]));
        let err = compute_mask(&grid(), &shape).unwrap_err();
        assert!(matches!(err, DemError::DegenerateShape(_)));
    }
}
