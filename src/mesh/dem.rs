use glam::DVec3;
use tracing::{debug, warn};

use super::cells::{CellCase, CellGrid, classify};
use super::hull::convex_hull;
use super::normalize::{Aabb, normalize, rotate_elevation_up};
use super::{MeshBuilder, Triangle};
use crate::config::defaults::{GRID_SPAN, TARGET_SIZE};

/// A terrain block model, rotated, scaled and centered
#[derive(Debug, Clone, PartialEq)]
pub struct DemMesh {
    triangles: Vec<Triangle>,
    solids: usize,
    scale: f32,
    translation: [f32; 3],
    bounds: Aabb,
}

impl DemMesh {
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of cell blocks merged into the mesh
    pub fn solid_count(&self) -> usize {
        self.solids
    }

    /// Uniform scale applied during normalization
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Translation applied after scaling
    pub fn translation(&self) -> [f32; 3] {
        self.translation
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }
}

/// Height of the flat bottom of every block
pub fn base_plane(base_depth: f64) -> f64 {
    -base_depth.floor().abs()
}

/// Extrude masked elevation samples into one block mesh
///
/// # Arguments
/// * `base_depth` - Depth of the flat bottom below zero (floored)
/// * `grid_width` - Raster width in pixels
/// * `grid_height` - Raster height; replaced by `grid_width`, the grid is
///   always treated as square
/// * `elevation` - Row-major elevations (row 0 north), already scaled
/// * `mask` - Row-major inclusion flags in the same layout
///
/// # Returns
/// `None` when no cell produced a block
///
/// # Algorithm
/// 1. Walk every cell (x, y) of the `count` x `count` grid, `step = 10 / count`
/// 2. Classify its four corners; absent, masked-out or negative corners
///    do not count
/// 3. For the 3- and 4-corner cases, build the convex solid spanned by each
///    usable corner at the base plane and at its elevation
/// 4. Merge all blocks, rotate elevation to +y, scale the largest
///    dimension to 3 and center on the origin
pub fn build_mesh(
    base_depth: f64,
    grid_width: usize,
    grid_height: usize,
    elevation: &[f64],
    mask: &[u8],
) -> Option<DemMesh> {
    let count = grid_width;
    if grid_height != grid_width {
        warn!(
            width = grid_width,
            height = grid_height,
            "non-square raster is meshed as {count}x{count}; the model will be distorted"
        );
    }
    if count == 0 {
        return None;
    }

    let z_base = base_plane(base_depth);
    let step = GRID_SPAN / count as f64;
    let grid = CellGrid::new(count, mask, elevation);

    let mut builder = MeshBuilder::new();
    let mut skipped = 0usize;

    for x in 0..count {
        for y in 0..count {
            let corners = grid.corners(x, y);
            let Some(case) = classify(&corners) else {
                continue;
            };

            let points = block_points(x, y, step, z_base, case, &corners);
            match convex_hull(&points) {
                Ok(triangles) => builder.add_solid(triangles),
                Err(e) => {
                    debug!(x, y, ?case, error = %e, "skipped flat cell");
                    skipped += 1;
                }
            }
        }
    }

    if builder.is_empty() {
        debug!(skipped, "no cell produced a block");
        return None;
    }

    let solids = builder.solid_count();
    let mut triangles = builder.finish();
    rotate_elevation_up(&mut triangles);
    let normalization = normalize(&mut triangles, TARGET_SIZE)?;
    let bounds = Aabb::from_triangles(&triangles)?;

    debug!(
        solids,
        skipped,
        triangles = triangles.len(),
        scale = normalization.scale,
        "built block mesh"
    );

    Some(DemMesh {
        triangles,
        solids,
        scale: normalization.scale,
        translation: normalization.translation,
        bounds,
    })
}

/// Base and top point of every usable corner of a cell
fn block_points(
    x: usize,
    y: usize,
    step: f64,
    z_base: f64,
    case: CellCase,
    corners: &[Option<f64>; 4],
) -> Vec<DVec3> {
    let footprint = [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)];

    case.corners()
        .iter()
        .filter_map(|&c| corners[c].map(|top| (footprint[c], top)))
        .flat_map(|((cx, cy), top)| {
            let (px, py) = (cx as f64 * step, cy as f64 * step);
            [DVec3::new(px, py, z_base), DVec3::new(px, py, top)]
        })
        .collect()
}
