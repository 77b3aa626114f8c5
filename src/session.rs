//! Application session: loaded rasters and shapes, the current selection and
//! the one generated mesh.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::defaults;
use crate::domain::{RasterGrid, Shape};
use crate::error::DemError;
use crate::mask::{BinaryMask, compute_mask};
use crate::mesh::{DemMesh, build_mesh};

/// A loaded elevation raster
#[derive(Debug, Clone)]
pub struct NamedRaster {
    pub name: String,
    pub grid: RasterGrid,
}

/// A drawn or imported region of interest
#[derive(Debug, Clone, PartialEq)]
pub struct NamedShape {
    pub name: String,
    pub shape: Shape,
}

/// Parameters of one mesh generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    pub base_depth: f64,
    /// Multiplier from raster meters to model units
    pub elevation_scale: f64,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            base_depth: defaults::BASE_DEPTH,
            elevation_scale: defaults::ELEVATION_SCALE,
        }
    }
}

/// The session's current mesh
///
/// `generation` increases with every call to [`Session::generate`], so two
/// results never share an identity even when their geometry is equal.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedMesh {
    generation: u64,
    raster: String,
    shape: String,
    mesh: DemMesh,
}

impl GeneratedMesh {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Name of the raster the mesh was built from
    pub fn raster(&self) -> &str {
        &self.raster
    }

    /// Name of the shape the mesh was cut with
    pub fn shape(&self) -> &str {
        &self.shape
    }

    pub fn mesh(&self) -> &DemMesh {
        &self.mesh
    }
}

#[derive(Debug, Default)]
pub struct Session {
    rasters: Vec<NamedRaster>,
    shapes: Vec<NamedShape>,
    selected_raster: Option<usize>,
    selected_shape: Option<usize>,
    name_counters: HashMap<String, usize>,
    current: Option<GeneratedMesh>,
    generations: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raster; the newest raster becomes the selected one
    pub fn add_raster(&mut self, name: impl Into<String>, grid: RasterGrid) {
        let name = name.into();
        debug!(%name, width = grid.width(), height = grid.height(), "added raster");
        self.rasters.push(NamedRaster { name, grid });
        self.selected_raster = Some(self.rasters.len() - 1);
    }

    /// Add a drawn shape named after its kind (`Rectangle1`, `Circle2`, ...)
    /// and select it
    pub fn add_shape(&mut self, shape: Shape) -> &str {
        let name = self.next_name(shape.kind().label());
        self.push_shape(name, shape)
    }

    /// Add shapes read from a file, named `<file>1`, `<file>2`, ...
    ///
    /// The first imported shape is selected. Returns the assigned names.
    pub fn import_shapes(&mut self, file_stem: &str, shapes: Vec<Shape>) -> Vec<String> {
        let first = self.shapes.len();
        let names: Vec<String> = shapes
            .into_iter()
            .map(|shape| {
                let name = self.next_name(file_stem);
                self.push_shape(name, shape).to_string()
            })
            .collect();
        if !names.is_empty() {
            self.selected_shape = Some(first);
        }
        names
    }

    fn next_name(&mut self, prefix: &str) -> String {
        let counter = self.name_counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{prefix}{counter}")
    }

    fn push_shape(&mut self, name: String, shape: Shape) -> &str {
        debug!(%name, kind = shape.kind().label(), "added shape");
        self.shapes.push(NamedShape { name, shape });
        let index = self.shapes.len() - 1;
        self.selected_shape = Some(index);
        &self.shapes[index].name
    }

    pub fn shapes(&self) -> &[NamedShape] {
        &self.shapes
    }

    pub fn select_raster(&mut self, name: &str) -> Result<(), DemError> {
        let index = self
            .rasters
            .iter()
            .position(|r| r.name == name)
            .ok_or(DemError::NoRasterSelected)?;
        self.selected_raster = Some(index);
        Ok(())
    }

    pub fn select_shape(&mut self, name: &str) -> Result<(), DemError> {
        let index = self
            .shapes
            .iter()
            .position(|s| s.name == name)
            .ok_or(DemError::NoShapeSelected)?;
        self.selected_shape = Some(index);
        Ok(())
    }

    /// The most recently loaded raster whose bounds contain the point
    pub fn raster_at(&self, lat: f64, lng: f64) -> Option<&NamedRaster> {
        self.rasters
            .iter()
            .rev()
            .find(|r| r.grid.bounds().contains(lat, lng))
    }

    /// Select the raster under a clicked location, if any
    pub fn select_raster_at(&mut self, lat: f64, lng: f64) -> Option<&str> {
        let index = self
            .rasters
            .iter()
            .rposition(|r| r.grid.bounds().contains(lat, lng))?;
        self.selected_raster = Some(index);
        Some(&self.rasters[index].name)
    }

    pub fn selected_raster(&self) -> Result<&NamedRaster, DemError> {
        self.selected_raster
            .and_then(|i| self.rasters.get(i))
            .ok_or(DemError::NoRasterSelected)
    }

    pub fn selected_shape(&self) -> Result<&NamedShape, DemError> {
        self.selected_shape
            .and_then(|i| self.shapes.get(i))
            .ok_or(DemError::NoShapeSelected)
    }

    /// Rasterize the selected shape onto the selected raster
    pub fn compute_selected_mask(&self) -> Result<BinaryMask, DemError> {
        let raster = self.selected_raster()?;
        let shape = self.selected_shape()?;
        compute_mask(&raster.grid, &shape.shape)
    }

    /// Build a mesh from the selected raster and `mask`, replacing the
    /// current mesh
    ///
    /// `mask` is normally the result of [`Session::compute_selected_mask`]
    /// and must match the raster's dimensions. Returns `Ok(None)` (and
    /// clears the current mesh) when no cell produced geometry. On error the
    /// current mesh is left untouched.
    pub fn generate(
        &mut self,
        mask: &BinaryMask,
        options: &GenerateOptions,
    ) -> Result<Option<&GeneratedMesh>, DemError> {
        let raster = self.selected_raster()?;
        let shape = self.selected_shape()?;

        let grid = &raster.grid;
        if (mask.width(), mask.height()) != (grid.width(), grid.height()) {
            return Err(DemError::SampleCount {
                expected: grid.width() * grid.height(),
                actual: mask.len(),
            });
        }
        let elevation = grid.scaled_elevations(options.elevation_scale);
        let mesh = build_mesh(
            options.base_depth,
            grid.width(),
            grid.height(),
            &elevation,
            mask.as_slice(),
        );
        let (raster, shape) = (raster.name.clone(), shape.name.clone());

        self.generations += 1;
        let generation = self.generations;
        self.current = mesh.map(|mesh| GeneratedMesh {
            generation,
            raster,
            shape,
            mesh,
        });

        match &self.current {
            Some(current) => info!(
                generation,
                solids = current.mesh.solid_count(),
                triangles = current.mesh.triangles().len(),
                "generated mesh"
            ),
            None => info!(generation, "selection produced no geometry"),
        }

        Ok(self.current.as_ref())
    }

    pub fn current(&self) -> Option<&GeneratedMesh> {
        self.current.as_ref()
    }

    /// Drop the current mesh, returning it
    pub fn discard_mesh(&mut self) -> Option<GeneratedMesh> {
        self.current.take()
    }
}
