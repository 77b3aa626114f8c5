pub mod containment;
pub mod projection;

pub use containment::PixelRing;
pub use projection::{PixelCoord, PixelTransform};
