use serde::Deserialize;
use std::path::PathBuf;

/// Fixed constants of the block-model pipeline.
///
/// World units: the raster grid always spans `GRID_SPAN` units on each
/// horizontal axis before normalization, and the finished mesh is fitted so
/// its largest dimension is `TARGET_SIZE` units.
pub mod defaults {
    /// Horizontal world-unit span of the full grid before normalization
    pub const GRID_SPAN: f64 = 10.0;

    /// Largest bounding-box dimension of a normalized mesh
    pub const TARGET_SIZE: f32 = 3.0;

    /// Factor applied to elevation samples (meters) before meshing
    pub const ELEVATION_SCALE: f64 = 0.0005;

    /// Base depth below the zero plane; floored before use
    pub const BASE_DEPTH: f64 = 1.0;

    /// Vertex count of the regular polygon standing in for a circle
    pub const CIRCLE_SEGMENTS: usize = 64;

    /// Meters per degree of latitude (equirectangular approximation)
    pub const METERS_PER_DEGREE: f64 = 111320.0;

    pub const OUTPUT_FILE: &str = "dem.stl";
}

fn default_base_depth() -> f64 {
    defaults::BASE_DEPTH
}
fn default_elevation_scale() -> f64 {
    defaults::ELEVATION_SCALE
}
fn default_feature() -> usize {
    0
}

#[derive(Debug, Deserialize)]
pub struct FileConfig {
    /// ESRI ASCII grid with the elevation raster
    #[serde(default)]
    pub raster: Option<PathBuf>,
    /// GeoJSON file with the region of interest
    #[serde(default)]
    pub shape: Option<PathBuf>,
    /// Which shape of the GeoJSON file to use (0-based)
    #[serde(default = "default_feature")]
    pub feature: usize,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default = "default_base_depth")]
    pub base_depth: f64,
    #[serde(default = "default_elevation_scale")]
    pub elevation_scale: f64,
    #[serde(default)]
    pub mask_preview: Option<PathBuf>,
    #[serde(default)]
    pub verbose: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            raster: None,
            shape: None,
            feature: default_feature(),
            output: None,
            base_depth: default_base_depth(),
            elevation_scale: default_elevation_scale(),
            mask_preview: None,
            verbose: false,
        }
    }
}

impl FileConfig {
    /// Parse a config from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Load the first parseable config from the well-known locations
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match Self::from_toml(&contents) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "loaded config file");
                        return Some(config);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "failed to parse config file");
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("dem3d.toml"), PathBuf::from(".dem3d.toml")];

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("dem3d").join("config.toml"));
        paths.push(config_dir.join("dem3d.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".dem3d.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = FileConfig::from_toml("").unwrap();
        assert!(config.raster.is_none());
        assert_eq!(config.feature, 0);
        assert_eq!(config.base_depth, defaults::BASE_DEPTH);
        assert_eq!(config.elevation_scale, defaults::ELEVATION_SCALE);
        assert!(!config.verbose);
    }

    #[test]
    fn test_config_overrides() {
        let config = FileConfig::from_toml(
            r#"
            raster = "alps.asc"
            shape = "valley.geojson"
            feature = 2
            base_depth = 3.5
            verbose = true
            "#,
        )
        .unwrap();

        assert_eq!(config.raster, Some(PathBuf::from("alps.asc")));
        assert_eq!(config.shape, Some(PathBuf::from("valley.geojson")));
        assert_eq!(config.feature, 2);
        assert_eq!(config.base_depth, 3.5);
        assert!(config.verbose);
    }

    #[test]
    fn test_config_paths_start_local() {
        let paths = get_config_paths();
        assert_eq!(paths[0], PathBuf::from("dem3d.toml"));
    }
}
