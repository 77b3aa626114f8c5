use geo::{Coord, LineString, MultiPolygon, Polygon, Rect, coord};

use crate::config::defaults::{CIRCLE_SEGMENTS, METERS_PER_DEGREE};
use crate::domain::GeoBounds;
use crate::error::DemError;

/// A ring of geographic vertices, `x` = longitude, `y` = latitude
pub type GeoRing = Vec<Coord<f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rectangle,
    Polygon,
    MultiPolygon,
    Circle,
}

impl ShapeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Polygon => "Polygon",
            ShapeKind::MultiPolygon => "MultiPolygon",
            ShapeKind::Circle => "Circle",
        }
    }
}

/// Region of interest drawn on the map or imported from a file
///
/// Coordinates use `x` for longitude and `y` for latitude.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rectangle(Rect<f64>),
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    Circle { center: Coord<f64>, radius_m: f64 },
}

impl Shape {
    pub fn rectangle(west: f64, south: f64, east: f64, north: f64) -> Self {
        Shape::Rectangle(Rect::new(
            coord! { x: west, y: south },
            coord! { x: east, y: north },
        ))
    }

    /// Polygon from (lat, lng) vertices without holes
    pub fn polygon(vertices: &[(f64, f64)]) -> Self {
        let exterior: LineString<f64> = vertices
            .iter()
            .map(|&(lat, lng)| coord! { x: lng, y: lat })
            .collect();
        Shape::Polygon(Polygon::new(exterior, Vec::new()))
    }

    pub fn circle(lat: f64, lng: f64, radius_m: f64) -> Self {
        Shape::Circle {
            center: coord! { x: lng, y: lat },
            radius_m,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Polygon(_) => ShapeKind::Polygon,
            Shape::MultiPolygon(_) => ShapeKind::MultiPolygon,
            Shape::Circle { .. } => ShapeKind::Circle,
        }
    }

    /// Every boundary ring of the shape in geographic coordinates
    ///
    /// Outer rings and holes are returned alike; the rasterizer combines
    /// them with even-odd toggling. Circles are approximated by a regular
    /// polygon first.
    pub fn rings(&self) -> Result<Vec<GeoRing>, DemError> {
        let rings: Vec<GeoRing> = match self {
            Shape::Rectangle(rect) => {
                let (min, max) = (rect.min(), rect.max());
                vec![vec![
                    coord! { x: min.x, y: min.y },
                    coord! { x: min.x, y: max.y },
                    coord! { x: max.x, y: max.y },
                    coord! { x: max.x, y: min.y },
                ]]
            }
            Shape::Polygon(polygon) => polygon_rings(polygon),
            Shape::MultiPolygon(multi) => multi.0.iter().flat_map(polygon_rings).collect(),
            Shape::Circle { center, radius_m } => {
                vec![approximate_circle(*center, *radius_m, CIRCLE_SEGMENTS)]
            }
        };

        let rings: Vec<GeoRing> = rings.into_iter().filter(|r| !r.is_empty()).collect();
        if rings.is_empty() {
            return Err(DemError::degenerate_shape(format!(
                "{} has no vertices",
                self.kind().label()
            )));
        }
        Ok(rings)
    }

    /// Geographic bounding box over the finite ring vertices
    pub fn bounds(&self) -> Option<GeoBounds> {
        let rings = self.rings().ok()?;
        let mut bounds: Option<GeoBounds> = None;

        for c in rings.iter().flatten() {
            if !c.x.is_finite() || !c.y.is_finite() {
                continue;
            }
            bounds = Some(match bounds {
                None => GeoBounds::new(c.x, c.x, c.y, c.y),
                Some(b) => GeoBounds::new(
                    b.west.min(c.x),
                    b.east.max(c.x),
                    b.north.max(c.y),
                    b.south.min(c.y),
                ),
            });
        }

        bounds
    }
}

fn polygon_rings(polygon: &Polygon<f64>) -> Vec<GeoRing> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.0.clone())
        .collect()
}

/// Approximate a circle by a regular polygon in geographic space
///
/// Equirectangular: one degree of latitude is `METERS_PER_DEGREE` meters and
/// a degree of longitude shrinks with `cos(lat)`. Breaks down near the poles.
pub fn approximate_circle(center: Coord<f64>, radius_m: f64, segments: usize) -> GeoRing {
    let lat_radius = radius_m / METERS_PER_DEGREE;
    let lng_radius = radius_m / (METERS_PER_DEGREE * center.y.to_radians().cos());

    (0..segments)
        .map(|i| {
            let angle = (i as f64 / segments as f64) * std::f64::consts::TAU;
            coord! {
                x: center.x + lng_radius * angle.sin(),
                y: center.y + lat_radius * angle.cos(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_ring_order() {
        let shape = Shape::rectangle(10.0, 45.0, 11.0, 46.0);
        let rings = shape.rings().unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0][0], coord! { x: 10.0, y: 45.0 });
        assert_eq!(rings[0][2], coord! { x: 11.0, y: 46.0 });
    }

    #[test]
    fn test_polygon_with_hole_yields_two_rings() {
        let outer: LineString<f64> =
            vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)].into();
        let hole: LineString<f64> = vec![(2.0, 2.0), (8.0, 2.0), (8.0, 8.0), (2.0, 8.0)].into();
        let shape = Shape::Polygon(Polygon::new(outer, vec![hole]));

        assert_eq!(shape.rings().unwrap().len(), 2);
    }

    #[test]
    fn test_multipolygon_flattens_all_rings() {
        let a = Polygon::new(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)].into(), vec![]);
        let b = Polygon::new(
            vec![(5.0, 5.0), (9.0, 5.0), (9.0, 9.0)].into(),
            vec![vec![(6.0, 6.0), (7.0, 6.0), (7.0, 7.0)].into()],
        );
        let shape = Shape::MultiPolygon(MultiPolygon::new(vec![a, b]));

        assert_eq!(shape.rings().unwrap().len(), 3);
        assert_eq!(shape.kind(), ShapeKind::MultiPolygon);
    }

    #[test]
    fn test_empty_polygon_is_degenerate() {
        let shape = Shape::Polygon(Polygon::new(LineString::new(vec![]), vec![]));
        assert!(matches!(shape.rings(), Err(DemError::DegenerateShape(_))));
        assert!(shape.bounds().is_none());
    }

    #[test]
    fn test_circle_approximation() {
        let center = coord! { x: 0.0, y: 0.0 };
        let ring = approximate_circle(center, METERS_PER_DEGREE, 64);

        assert_eq!(ring.len(), 64);
        // Vertex 0 is due north, vertex 16 due east
        assert!((ring[0].y - 1.0).abs() < 1e-9);
        assert!(ring[0].x.abs() < 1e-9);
        assert!((ring[16].x - 1.0).abs() < 1e-9);
        assert!(ring[16].y.abs() < 1e-9);
    }

    #[test]
    fn test_circle_longitude_stretches_with_latitude() {
        let shape = Shape::circle(60.0, 0.0, METERS_PER_DEGREE);
        let bounds = shape.bounds().unwrap();
        // cos(60°) = 0.5, so the longitude radius doubles
        assert!((bounds.width() - 4.0).abs() < 1e-6);
        assert!((bounds.height() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_radius_circle_bounds_collapse() {
        let bounds = Shape::circle(10.0, 10.0, 0.0).bounds().unwrap();
        assert_eq!(bounds.width(), 0.0);
        assert_eq!(bounds.height(), 0.0);
    }

    #[test]
    fn test_bounds_skip_non_finite_vertices() {
        let shape = Shape::polygon(&[(0.0, 0.0), (f64::NAN, 5.0), (2.0, 3.0), (1.0, -1.0)]);
        let bounds = shape.bounds().unwrap();
        assert_eq!(bounds.north, 2.0);
        assert_eq!(bounds.south, 0.0);
        assert_eq!(bounds.west, -1.0);
        assert_eq!(bounds.east, 3.0);
    }
}
