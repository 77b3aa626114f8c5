pub mod raster;
pub mod shape;

pub use raster::{GeoBounds, RasterGrid};
pub use shape::{GeoRing, Shape, ShapeKind, approximate_circle};
