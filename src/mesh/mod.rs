pub mod builder;
pub mod cells;
pub mod dem;
pub mod hull;
pub mod normalize;
pub mod stl;
pub mod validation;

pub use builder::{MeshBuilder, Triangle};
pub use dem::{DemMesh, build_mesh};
pub use normalize::Aabb;
pub use stl::write_stl;
pub use validation::{MeshReport, sanitize};
