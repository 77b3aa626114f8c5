use super::Triangle;

/// Axis-aligned bounding box of a triangle mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    /// Bounds over every vertex, `None` for an empty mesh
    pub fn from_triangles(triangles: &[Triangle]) -> Option<Self> {
        let mut vertices = triangles.iter().flat_map(|t| t.vertices.iter());
        let first = *vertices.next()?;

        let mut bounds = Self {
            min: first,
            max: first,
        };
        for v in vertices {
            for axis in 0..3 {
                bounds.min[axis] = bounds.min[axis].min(v[axis]);
                bounds.max[axis] = bounds.max[axis].max(v[axis]);
            }
        }
        Some(bounds)
    }

    pub fn size(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn center(&self) -> [f32; 3] {
        let size = self.size();
        [
            self.min[0] + size[0] / 2.0,
            self.min[1] + size[1] / 2.0,
            self.min[2] + size[2] / 2.0,
        ]
    }

    pub fn max_dimension(&self) -> f32 {
        let [x, y, z] = self.size();
        x.max(y).max(z)
    }
}

/// Uniform scale and translation applied by [`normalize`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub scale: f32,
    pub translation: [f32; 3],
}

/// Rotate 270° about the x axis so the elevation axis (z) points up (+y)
pub fn rotate_elevation_up(triangles: &mut [Triangle]) {
    for tri in triangles.iter_mut() {
        *tri = tri.map_vertices(|[x, y, z]| [x, z, -y]);
    }
}

/// Scale the mesh uniformly so its largest dimension equals `target`, then
/// center its bounding box on the origin
///
/// Returns `None` (leaving the mesh untouched) when the mesh is empty or has
/// no extent.
pub fn normalize(triangles: &mut [Triangle], target: f32) -> Option<Normalization> {
    let max_dim = Aabb::from_triangles(triangles)?.max_dimension();
    if !max_dim.is_finite() || max_dim <= 0.0 {
        return None;
    }

    let scale = target / max_dim;
    for tri in triangles.iter_mut() {
        tri.vertices = tri.vertices.map(|v| v.map(|c| c * scale));
    }

    let center = Aabb::from_triangles(triangles)?.center();
    let translation = center.map(|c| -c);
    for tri in triangles.iter_mut() {
        tri.vertices = tri.vertices.map(|v| {
            [
                v[0] + translation[0],
                v[1] + translation[1],
                v[2] + translation[2],
            ]
        });
    }

    Some(Normalization { scale, translation })
}
