//! File readers for elevation rasters and region shapes

pub mod ascii_grid;
pub mod geojson;

pub use ascii_grid::{parse_ascii_grid, read_ascii_grid};
pub use geojson::{parse_geojson, read_geojson};
