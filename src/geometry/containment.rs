use geo::{Coord, coord};
use tracing::warn;

use crate::domain::GeoRing;
use crate::geometry::PixelTransform;

/// A polygon ring in pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct PixelRing {
    vertices: Vec<Coord<f64>>,
    degenerate: bool,
}

impl PixelRing {
    pub fn new(vertices: Vec<Coord<f64>>) -> Self {
        let degenerate = encloses_no_area(&vertices);
        Self {
            vertices,
            degenerate,
        }
    }

    /// Convert a geographic ring to pixel space
    ///
    /// Vertices with non-finite coordinates are dropped from the ring.
    pub fn from_geographic(ring: &GeoRing, transform: &PixelTransform) -> Self {
        let mut dropped = 0usize;
        let vertices: Vec<Coord<f64>> = ring
            .iter()
            .filter_map(|c| match transform.to_pixel(c.y, c.x) {
                Ok(p) => Some(coord! { x: p.x as f64, y: p.y as f64 }),
                Err(_) => {
                    dropped += 1;
                    None
                }
            })
            .collect();

        if dropped > 0 {
            warn!(dropped, "excluded invalid coordinates from ring");
        }

        Self::new(vertices)
    }

    pub fn vertices(&self) -> &[Coord<f64>] {
        &self.vertices
    }

    /// True when the ring encloses no area: fewer than three distinct
    /// vertices, or all of them on one line
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Pixel-space bounding box as (min_x, min_y, max_x, max_y)
    pub fn extent(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.vertices.first()?;
        Some(self.vertices.iter().fold(
            (first.x, first.y, first.x, first.y),
            |(min_x, min_y, max_x, max_y), v| {
                (min_x.min(v.x), min_y.min(v.y), max_x.max(v.x), max_y.max(v.y))
            },
        ))
    }

    /// Point-in-ring test
    ///
    /// Crossing number: a ray cast from the point towards +x crosses an odd
    /// number of edges when the point is inside. Edges are half-open, so a
    /// point on a west or north (smaller y) edge is inside and one on an east
    /// or south edge is not; an edge shared by two rings belongs to exactly
    /// one of them. Degenerate rings contain nothing, and a non-finite point
    /// is never inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if !x.is_finite() || !y.is_finite() || self.degenerate {
            return false;
        }

        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;

        for i in 0..n {
            let (vi, vj) = (self.vertices[i], self.vertices[j]);
            if (vi.y > y) != (vj.y > y) {
                let x_cross = (vj.x - vi.x) * (y - vi.y) / (vj.y - vi.y) + vi.x;
                if x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }

        inside
    }
}

fn encloses_no_area(vertices: &[Coord<f64>]) -> bool {
    let Some(&first) = vertices.first() else {
        return true;
    };
    let Some(&second) = vertices.iter().find(|&&v| v != first) else {
        return true;
    };
    vertices.iter().all(|&v| cross(first, second, v) == 0.0)
}

/// z component of (b - a) x (p - a)
fn cross(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoBounds;

    fn ring(points: &[(f64, f64)]) -> PixelRing {
        PixelRing::new(points.iter().map(|&(x, y)| coord! { x: x, y: y }).collect())
    }

    #[test]
    fn test_square_interior_and_exterior() {
        let square = ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        assert!(square.contains(2.0, 2.0));
        assert!(square.contains(1.0, 3.0));
        assert!(!square.contains(5.0, 2.0));
        assert!(!square.contains(2.0, -1.0));
    }

    #[test]
    fn test_edges_are_half_open() {
        let square = ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        // west and north edges are inside
        assert!(square.contains(0.0, 2.0));
        assert!(square.contains(2.0, 0.0));
        assert!(square.contains(0.0, 0.0));
        // east and south edges are not
        assert!(!square.contains(4.0, 2.0));
        assert!(!square.contains(2.0, 4.0));
        assert!(!square.contains(4.0, 4.0));
    }

    #[test]
    fn test_shared_edge_belongs_to_one_ring() {
        let left = ring(&[(0.0, 0.0), (2.0, 0.0), (2.0, 4.0), (0.0, 4.0)]);
        let right = ring(&[(2.0, 0.0), (4.0, 0.0), (4.0, 4.0), (2.0, 4.0)]);
        for y in 0..4 {
            let y = y as f64;
            assert!(!left.contains(2.0, y));
            assert!(right.contains(2.0, y));
        }
    }

    #[test]
    fn test_concave_notch() {
        // U shape open at the top between x=2 and x=4
        let u = ring(&[
            (0.0, 0.0),
            (6.0, 0.0),
            (6.0, 6.0),
            (4.0, 6.0),
            (4.0, 2.0),
            (2.0, 2.0),
            (2.0, 6.0),
            (0.0, 6.0),
        ]);
        assert!(u.contains(1.0, 4.0));
        assert!(u.contains(5.0, 4.0));
        assert!(!u.contains(3.0, 4.0));
    }

    #[test]
    fn test_degenerate_rings_contain_nothing() {
        let point = ring(&[(3.0, 3.0); 64]);
        assert!(point.is_degenerate());
        assert!(!point.contains(3.0, 3.0));

        let line = ring(&[(0.0, 0.0), (2.0, 2.0), (4.0, 4.0)]);
        assert!(line.is_degenerate());
        assert!(!line.contains(2.0, 2.0));

        assert!(ring(&[]).is_degenerate());
    }

    #[test]
    fn test_nan_point_is_outside() {
        let square = ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        assert!(!square.contains(f64::NAN, 2.0));
        assert!(!square.contains(2.0, f64::NAN));
    }

    #[test]
    fn test_from_geographic_drops_invalid_vertices() {
        let transform =
            PixelTransform::from_bounds(GeoBounds::new(0.0, 10.0, 10.0, 0.0), 10, 10).unwrap();
        let geo_ring = vec![
            coord! { x: 1.0, y: 9.5 },
            coord! { x: f64::NAN, y: 5.0 },
            coord! { x: 8.5, y: 1.5 },
        ];

        let pixel_ring = PixelRing::from_geographic(&geo_ring, &transform);

        assert_eq!(
            pixel_ring.vertices(),
            &[coord! { x: 1.0, y: 0.0 }, coord! { x: 8.0, y: 8.0 }]
        );
    }

    #[test]
    fn test_extent() {
        let tri = ring(&[(1.0, 5.0), (7.0, 2.0), (3.0, 9.0)]);
        assert_eq!(tri.extent(), Some((1.0, 2.0, 7.0, 9.0)));
        assert_eq!(ring(&[]).extent(), None);
    }
}
