//! # Convex hull solids
//!
//! Closed convex solid from a small point set (the 6 or 8 corners of a
//! terrain block).
//!
//! ## Algorithm
//!
//! 1. Drop duplicate points and reject point sets without volume
//! 2. Every plane through three points that has all other points on one
//!    side is a supporting plane; its coplanar points form one hull facet
//! 3. Each facet is reduced to its 2D convex outline and fan-triangulated,
//!    wound so the normal points away from the solid
//!
//! Enumerating point triples is cubic, which is fine for the handful of
//! points per block and avoids the bookkeeping of incremental methods.

use glam::DVec3;
use thiserror::Error;

use super::Triangle;

/// Relative tolerance for coincidence and coplanarity tests
const EPSILON: f64 = 1e-9;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HullError {
    #[error("Convex hull requires at least 4 unique points, got {0}")]
    TooFewPoints(usize),

    #[error("All points are collinear")]
    Collinear,

    #[error("All points are coplanar")]
    Coplanar,
}

/// Build the closed convex solid enclosing `points`
///
/// Returns outward-wound triangles.
pub fn convex_hull(points: &[DVec3]) -> Result<Vec<Triangle>, HullError> {
    let tolerance = EPSILON * extent(points).max(1.0);
    let points = remove_duplicates(points, tolerance);
    if points.len() < 4 {
        return Err(HullError::TooFewPoints(points.len()));
    }
    ensure_volume(&points, tolerance)?;

    let mut facets: Vec<Vec<usize>> = Vec::new();
    let mut triangles = Vec::new();
    let n = points.len();

    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let Some(normal) = (points[j] - points[i])
                    .cross(points[k] - points[i])
                    .try_normalize()
                else {
                    continue;
                };
                let Some((normal, on_plane)) = supporting_plane(normal, points[i], &points, tolerance)
                else {
                    continue;
                };
                if facets.contains(&on_plane) {
                    continue;
                }

                triangles.extend(triangulate_facet(normal, &on_plane, &points));
                facets.push(on_plane);
            }
        }
    }

    Ok(triangles)
}

/// Largest coordinate span of the point set
fn extent(points: &[DVec3]) -> f64 {
    let Some(&first) = points.first() else {
        return 0.0;
    };
    let (min, max) = points
        .iter()
        .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
    (max - min).max_element()
}

/// Removes duplicate points within tolerance, keeping first occurrences
fn remove_duplicates(points: &[DVec3], tolerance: f64) -> Vec<DVec3> {
    let mut unique: Vec<DVec3> = Vec::with_capacity(points.len());
    for &p in points {
        if !unique.iter().any(|u| u.distance(p) <= tolerance) {
            unique.push(p);
        }
    }
    unique
}

fn ensure_volume(points: &[DVec3], tolerance: f64) -> Result<(), HullError> {
    let a = points[0];
    let b = points[1];
    let ab = b - a;

    let normal = points[2..]
        .iter()
        .map(|&c| ab.cross(c - a))
        .max_by(|x, y| x.length().total_cmp(&y.length()))
        .filter(|n| n.length() > tolerance * ab.length())
        .and_then(DVec3::try_normalize)
        .ok_or(HullError::Collinear)?;

    if points.iter().all(|&p| normal.dot(p - a).abs() <= tolerance) {
        return Err(HullError::Coplanar);
    }
    Ok(())
}

/// If the plane through `origin` with `normal` has every point on one side,
/// return its outward normal and the (sorted) indices of points on it
fn supporting_plane(
    normal: DVec3,
    origin: DVec3,
    points: &[DVec3],
    tolerance: f64,
) -> Option<(DVec3, Vec<usize>)> {
    let distances: Vec<f64> = points.iter().map(|&p| normal.dot(p - origin)).collect();

    let outward = if distances.iter().all(|&d| d <= tolerance) {
        normal
    } else if distances.iter().all(|&d| d >= -tolerance) {
        -normal
    } else {
        return None;
    };

    let on_plane = distances
        .iter()
        .enumerate()
        .filter(|(_, d)| d.abs() <= tolerance)
        .map(|(i, _)| i)
        .collect();

    Some((outward, on_plane))
}

/// Fan-triangulate one facet so its triangles face along `normal`
fn triangulate_facet(normal: DVec3, indices: &[usize], points: &[DVec3]) -> Vec<Triangle> {
    let origin = points[indices[0]];
    let Some(u) = indices
        .iter()
        .map(|&i| points[i] - origin)
        .find_map(DVec3::try_normalize)
    else {
        return Vec::new();
    };
    // u x v = normal, so counter-clockwise in (u, v) faces outward
    let v = normal.cross(u);

    let planar: Vec<(f64, f64, DVec3)> = indices
        .iter()
        .map(|&i| {
            let d = points[i] - origin;
            (d.dot(u), d.dot(v), points[i])
        })
        .collect();

    let outline = convex_outline(planar);
    if outline.len() < 3 {
        return Vec::new();
    }

    (1..outline.len() - 1)
        .map(|i| Triangle::new(to_f32(outline[0]), to_f32(outline[i]), to_f32(outline[i + 1])))
        .collect()
}

/// Counter-clockwise convex outline of planar points (monotone chain)
///
/// Collinear points are dropped.
fn convex_outline(mut planar: Vec<(f64, f64, DVec3)>) -> Vec<DVec3> {
    planar.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    fn turn(o: &(f64, f64, DVec3), a: &(f64, f64, DVec3), b: &(f64, f64, DVec3)) -> f64 {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    }

    let mut lower: Vec<(f64, f64, DVec3)> = Vec::new();
    for p in &planar {
        while lower.len() >= 2 && turn(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<(f64, f64, DVec3)> = Vec::new();
    for p in planar.iter().rev() {
        while upper.len() >= 2 && turn(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.into_iter().chain(upper).map(|(_, _, p)| p).collect()
}

fn to_f32(p: DVec3) -> [f32; 3] {
    [p.x as f32, p.y as f32, p.z as f32]
}
