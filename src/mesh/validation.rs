//! Pre-export mesh checks
//!
//! Block meshes are built from raster samples, so a bad sample can leak
//! NaN/Inf into a vertex, and the normalization step can squash very thin
//! faces to zero area. Both are dropped before writing STL.

use super::Triangle;
use super::builder::calculate_normal;

/// Minimum area for a triangle to be kept (model units, max dimension 3)
const MIN_TRIANGLE_AREA: f32 = 1e-12;

/// Counts gathered by [`sanitize`]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshReport {
    /// Triangles inspected
    pub total: usize,
    /// Dropped for NaN/Inf coordinates
    pub invalid_coords: usize,
    /// Dropped for zero area
    pub degenerate: usize,
    /// Kept, with a normal that had to be recalculated
    pub fixed_normals: usize,
}

impl MeshReport {
    pub fn kept(&self) -> usize {
        self.total - self.invalid_coords - self.degenerate
    }

    pub fn has_issues(&self) -> bool {
        self.invalid_coords > 0 || self.degenerate > 0 || self.fixed_normals > 0
    }

    pub fn summary(&self) -> String {
        if !self.has_issues() {
            format!("Mesh valid: {} triangles, no issues", self.total)
        } else {
            format!(
                "Mesh issues: {} total, {} invalid coords, {} degenerate, {} bad normals",
                self.total, self.invalid_coords, self.degenerate, self.fixed_normals
            )
        }
    }
}

/// Drop non-finite and zero-area triangles, repair normals of the rest
pub fn sanitize(triangles: Vec<Triangle>) -> (Vec<Triangle>, MeshReport) {
    let mut report = MeshReport {
        total: triangles.len(),
        ..Default::default()
    };

    let cleaned = triangles
        .into_iter()
        .filter_map(|mut tri| {
            if has_invalid_coords(&tri) {
                report.invalid_coords += 1;
                return None;
            }
            if triangle_area(&tri.vertices) < MIN_TRIANGLE_AREA {
                report.degenerate += 1;
                return None;
            }
            if !is_normal_valid(&tri.normal) {
                let [v0, v1, v2] = tri.vertices;
                tri.normal = calculate_normal(v0, v1, v2);
                report.fixed_normals += 1;
            }
            Some(tri)
        })
        .collect();

    (cleaned, report)
}

fn has_invalid_coords(tri: &Triangle) -> bool {
    tri.vertices.iter().flatten().any(|c| !c.is_finite())
}

fn triangle_area(vertices: &[[f32; 3]; 3]) -> f32 {
    let [v0, v1, v2] = *vertices;
    let a = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
    let b = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

    let cx = a[1] * b[2] - a[2] * b[1];
    let cy = a[2] * b[0] - a[0] * b[2];
    let cz = a[0] * b[1] - a[1] * b[0];

    0.5 * (cx * cx + cy * cy + cz * cz).sqrt()
}

/// Unit length and finite
fn is_normal_valid(normal: &[f32; 3]) -> bool {
    let len_sq = normal.iter().map(|n| n * n).sum::<f32>();
    len_sq.is_finite() && (0.99..=1.01).contains(&len_sq)
}
