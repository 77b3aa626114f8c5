use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt};

use dem3d::config::{FileConfig, defaults};
use dem3d::domain::Shape;
use dem3d::input::{read_ascii_grid, read_geojson};
use dem3d::mask::preview::write_png;
use dem3d::mesh::{sanitize, stl::estimate_stl_size, write_stl};
use dem3d::session::{GenerateOptions, Session};

/// Turn an elevation raster and a region of interest into a printable
/// terrain block model (binary STL)
///
/// Examples:
///   # Cut a rectangle out of an ASCII grid
///   dem3d -r alps.asc --rect 7.5,46.0,8.0,46.5 -o alps.stl
///
///   # Use a circle of 2 km around a summit
///   dem3d -r alps.asc --circle 46.55,7.98,2000
///
///   # Use the second polygon of a GeoJSON file, with a deeper base
///   dem3d -r alps.asc -s valleys.geojson --feature 1 --base-depth 3
///
///   # Use a config file
///   dem3d --config my-settings.toml
#[derive(Parser, Debug)]
#[command(name = "dem3d")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches dem3d.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Elevation raster (ESRI ASCII grid)
    #[arg(short = 'r', long)]
    raster: Option<PathBuf>,

    /// GeoJSON file with the region of interest
    #[arg(short = 's', long, conflicts_with_all = ["rect", "circle"])]
    shape: Option<PathBuf>,

    /// Which shape of the GeoJSON file to use (0-based)
    #[arg(long)]
    feature: Option<usize>,

    /// Rectangle region: WEST,SOUTH,EAST,NORTH in degrees
    #[arg(long, value_parser = parse_numbers::<4>, allow_hyphen_values = true, conflicts_with = "circle")]
    rect: Option<[f64; 4]>,

    /// Circle region: LAT,LON,RADIUS (radius in meters)
    #[arg(long, value_parser = parse_numbers::<3>, allow_hyphen_values = true)]
    circle: Option<[f64; 3]>,

    /// Output STL file path (defaults to dem.stl)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Depth of the flat base below zero elevation (floored to whole units)
    #[arg(long)]
    base_depth: Option<f64>,

    /// Multiplier from raster meters to model units
    #[arg(long)]
    elevation_scale: Option<f64>,

    /// Also write the inclusion mask as a PNG image
    #[arg(long)]
    mask_preview: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = match args.config {
        Some(ref config_path) => {
            if !config_path.exists() {
                bail!("Config file not found: {:?}", config_path);
            }
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            FileConfig::from_toml(&contents).context("Failed to parse config file")?
        }
        None => FileConfig::load().unwrap_or_default(),
    };

    let verbose = args.verbose || file_config.verbose;
    init_logging(verbose);

    let raster_path = args
        .raster
        .clone()
        .or_else(|| file_config.raster.clone())
        .context("Must provide an elevation raster with --raster/-r")?;
    let shape_path = args.shape.clone().or_else(|| file_config.shape.clone());
    let feature = args.feature.unwrap_or(file_config.feature);
    let output_path = args
        .output
        .clone()
        .or_else(|| file_config.output.clone())
        .unwrap_or_else(|| PathBuf::from(defaults::OUTPUT_FILE));
    let mask_preview = args
        .mask_preview
        .clone()
        .or_else(|| file_config.mask_preview.clone());
    let options = GenerateOptions {
        base_depth: args.base_depth.unwrap_or(file_config.base_depth),
        elevation_scale: args.elevation_scale.unwrap_or(file_config.elevation_scale),
    };

    if args.rect.is_none() && args.circle.is_none() && shape_path.is_none() {
        bail!("Must provide a region with --rect, --circle or --shape/-s");
    }
    if options.base_depth <= 0.0 {
        bail!("--base-depth must be positive, got {}", options.base_depth);
    }

    println!("dem3d - Terrain Block Model Generator");
    println!("=====================================");
    println!();

    if verbose {
        println!("Configuration:");
        println!("  Raster: {}", raster_path.display());
        if let Some([west, south, east, north]) = args.rect {
            println!("  Rectangle: W {west} S {south} E {east} N {north}");
        } else if let Some([lat, lon, radius]) = args.circle {
            println!("  Circle: ({:.4}, {:.4}) r={}m", lat, lon, radius);
        } else if let Some(ref path) = shape_path {
            println!("  Shape file: {} (feature {})", path.display(), feature);
        }
        println!("  Base depth: {}", options.base_depth);
        println!("  Elevation scale: {}", options.elevation_scale);
        println!("  Output: {}", output_path.display());
        println!();
    }

    let mut session = Session::new();

    let spinner = create_spinner("Loading elevation raster...");
    let start = Instant::now();
    let grid = read_ascii_grid(&raster_path)?;
    let range = grid
        .elevation_range()
        .map(|(lo, hi)| format!("{lo:.0}m..{hi:.0}m"))
        .unwrap_or_else(|| "no data".to_string());
    spinner.finish_with_message(format!(
        "Loaded {}x{} raster, elevation {} [{:.1}s]",
        grid.width(),
        grid.height(),
        range,
        start.elapsed().as_secs_f32()
    ));
    session.add_raster(file_stem(&raster_path), grid);

    if let Some([west, south, east, north]) = args.rect {
        session.add_shape(Shape::rectangle(west, south, east, north));
    } else if let Some([lat, lon, radius]) = args.circle {
        session.add_shape(Shape::circle(lat, lon, radius));
    } else if let Some(ref path) = shape_path {
        let shapes = read_geojson(path)?;
        let names = session.import_shapes(&file_stem(path), shapes);
        let Some(name) = names.get(feature) else {
            bail!(
                "--feature {} is out of range: {} has {} shape(s)",
                feature,
                path.display(),
                names.len()
            );
        };
        session.select_shape(name)?;
    }
    let shape = session.selected_shape()?;
    println!(
        "Region: {} ({})",
        shape.name,
        shape.shape.kind().label()
    );

    let spinner = create_spinner("Rasterizing region mask...");
    let start = Instant::now();
    let mask = session.compute_selected_mask()?;
    spinner.finish_with_message(format!(
        "Mask covers {} of {} pixels [{:.1}s]",
        mask.count_ones(),
        mask.len(),
        start.elapsed().as_secs_f32()
    ));

    if let Some(ref path) = mask_preview {
        write_png(path, &mask)?;
        println!("Mask preview: {}", path.display());
    }

    let spinner = create_spinner("Building block mesh...");
    let start = Instant::now();
    let Some(generated) = session.generate(&mask, &options)? else {
        spinner.finish_with_message("No cell produced geometry");
        bail!(
            "No mesh to export: the region covers no cell with three or more valid corners"
        );
    };
    let mesh = generated.mesh();
    spinner.finish_with_message(format!(
        "Built {} blocks, {} triangles [{:.1}s]",
        mesh.solid_count(),
        mesh.triangles().len(),
        start.elapsed().as_secs_f32()
    ));
    if verbose {
        let size = mesh.bounds().size();
        let [dx, dy, dz] = mesh.translation();
        println!(
            "  Model size: {:.3} x {:.3} x {:.3} (scale {:.4})",
            size[0],
            size[1],
            size[2],
            mesh.scale()
        );
        println!("  Centering offset: ({dx:.3}, {dy:.3}, {dz:.3})");
    }

    let spinner = create_spinner("Validating and writing STL file...");
    let start = Instant::now();

    let (validated, report) = sanitize(mesh.triangles().to_vec());
    if verbose {
        println!("  {}", report.summary());
    }
    let file_size = estimate_stl_size(validated.len());

    write_stl(&output_path, &validated).context("Failed to write STL file")?;

    spinner.finish_with_message(format!(
        "Wrote {} triangles ({:.1} KB) [{:.1}s]",
        validated.len(),
        file_size as f64 / 1024.0,
        start.elapsed().as_secs_f32()
    ));

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );
    println!();
    println!("Output: {}", output_path.display());

    Ok(())
}

/// `RUST_LOG` wins; otherwise debug output for this crate with `--verbose`
fn init_logging(verbose: bool) {
    let default = if verbose { "dem3d=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse `N` comma-separated numbers, e.g. `7.5,46.0,8.0,46.5`
fn parse_numbers<const N: usize>(s: &str) -> Result<[f64; N], String> {
    let values = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", part.trim()))
        })
        .collect::<Result<Vec<f64>, String>>()?;

    let count = values.len();
    values
        .try_into()
        .map_err(|_| format!("expected {N} comma-separated values, got {count}"))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "shape".to_string())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
