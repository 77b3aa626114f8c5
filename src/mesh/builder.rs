/// A triangle for STL output
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    /// Three vertices: [[x, y, z], [x, y, z], [x, y, z]]
    pub vertices: [[f32; 3]; 3],
    /// Normal vector [nx, ny, nz]
    pub normal: [f32; 3],
}

impl Triangle {
    /// Create a new triangle and calculate its normal from the winding
    pub fn new(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> Self {
        Self {
            vertices: [v0, v1, v2],
            normal: calculate_normal(v0, v1, v2),
        }
    }

    /// Apply `f` to every vertex and recalculate the normal
    pub fn map_vertices(&self, f: impl Fn([f32; 3]) -> [f32; 3]) -> Self {
        let [v0, v1, v2] = self.vertices;
        Self::new(f(v0), f(v1), f(v2))
    }
}

/// Unit normal by the right-hand rule; degenerate triangles point up
pub(crate) fn calculate_normal(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> [f32; 3] {
    let u = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
    let v = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

    let nx = u[1] * v[2] - u[2] * v[1];
    let ny = u[2] * v[0] - u[0] * v[2];
    let nz = u[0] * v[1] - u[1] * v[0];

    let len = (nx * nx + ny * ny + nz * nz).sqrt();
    if len > 1e-12 {
        [nx / len, ny / len, nz / len]
    } else {
        [0.0, 0.0, 1.0]
    }
}

/// Working collection of closed solids, merged into one triangle list
///
/// Solids are appended as-is: faces shared by neighbouring solids are kept
/// on both sides and nothing is welded.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    triangles: Vec<Triangle>,
    solids: usize,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one closed solid
    pub fn add_solid(&mut self, triangles: impl IntoIterator<Item = Triangle>) {
        self.triangles.extend(triangles);
        self.solids += 1;
    }

    /// Number of solids added so far
    pub fn solid_count(&self) -> usize {
        self.solids
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solids == 0
    }

    /// Consume the builder and return the merged triangles
    pub fn finish(self) -> Vec<Triangle> {
        self.triangles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_normal() {
        let tri = Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert!((tri.normal[2] - 1.0).abs() < 0.001);

        let flipped = Triangle::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]);
        assert!((flipped.normal[2] + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_map_vertices_recomputes_normal() {
        let tri = Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        // 270° about x: +z turns into +y
        let mapped = tri.map_vertices(|[x, y, z]| [x, z, -y]);
        assert_eq!(mapped.vertices[2], [0.0, 0.0, -1.0]);
        assert!((mapped.normal[1] - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_mesh_builder_counts_solids() {
        let mut builder = MeshBuilder::new();
        assert!(builder.is_empty());

        builder.add_solid(vec![
            Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            Triangle::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ]);
        builder.add_solid(vec![Triangle::new(
            [2.0, 0.0, 0.0],
            [3.0, 0.0, 0.0],
            [2.0, 1.0, 0.0],
        )]);

        assert_eq!(builder.solid_count(), 2);
        assert_eq!(builder.len(), 3);
        assert_eq!(builder.finish().len(), 3);
    }
}
