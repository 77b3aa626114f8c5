//! dem3d - Turn an elevation raster and a region of interest into a printable
//! terrain block model

pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod input;
pub mod mask;
pub mod mesh;
pub mod session;

pub use error::DemError;
