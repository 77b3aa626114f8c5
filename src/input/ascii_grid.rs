//! ESRI ASCII grid (`.asc`) reader
//!
//! ```text
//! ncols         4
//! nrows         3
//! xllcorner     7.0
//! yllcorner     46.0
//! cellsize      0.25
//! NODATA_value  -9999
//! 1200 1210 ...
//! ```
//!
//! Data rows start at the northern edge. `xllcenter`/`yllcenter` give the
//! center of the south-west cell instead of its outer corner.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::domain::{GeoBounds, RasterGrid};

#[derive(Debug, Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xll: Option<f64>,
    yll: Option<f64>,
    centered: bool,
    cellsize: Option<f64>,
    nodata: Option<f64>,
}

/// Load an elevation raster from an ASCII grid file
pub fn read_ascii_grid(path: &Path) -> Result<RasterGrid> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read raster file: {}", path.display()))?;
    parse_ascii_grid(&contents)
        .with_context(|| format!("Failed to parse ASCII grid: {}", path.display()))
}

/// Parse ASCII grid text; NODATA samples become NaN
pub fn parse_ascii_grid(contents: &str) -> Result<RasterGrid> {
    let mut header = Header::default();
    let mut lines = contents.lines().peekable();

    while let Some(&line) = lines.peek() {
        let mut parts = line.split_whitespace();
        let Some(key) = parts.next() else {
            lines.next();
            continue;
        };
        // First numeric token ends the header
        if key.parse::<f64>().is_ok() {
            break;
        }
        let value = parts
            .next()
            .with_context(|| format!("Header key '{key}' has no value"))?;

        match key.to_ascii_lowercase().as_str() {
            "ncols" => header.ncols = Some(parse_value(key, value)?),
            "nrows" => header.nrows = Some(parse_value(key, value)?),
            "xllcorner" => header.xll = Some(parse_value(key, value)?),
            "yllcorner" => header.yll = Some(parse_value(key, value)?),
            "xllcenter" => {
                header.xll = Some(parse_value(key, value)?);
                header.centered = true;
            }
            "yllcenter" => {
                header.yll = Some(parse_value(key, value)?);
                header.centered = true;
            }
            "cellsize" => header.cellsize = Some(parse_value(key, value)?),
            "nodata_value" => header.nodata = Some(parse_value(key, value)?),
            other => bail!("Unknown header key '{other}'"),
        }
        lines.next();
    }

    let ncols = header.ncols.context("Missing ncols")?;
    let nrows = header.nrows.context("Missing nrows")?;
    let xll = header.xll.context("Missing xllcorner/xllcenter")?;
    let yll = header.yll.context("Missing yllcorner/yllcenter")?;
    let cellsize = header.cellsize.context("Missing cellsize")?;
    if !cellsize.is_finite() || cellsize <= 0.0 {
        bail!("cellsize must be positive, got {cellsize}");
    }

    let samples = lines
        .flat_map(str::split_whitespace)
        .map(|token| {
            let value: f64 = parse_value("sample", token)?;
            Ok(match header.nodata {
                Some(nodata) if value == nodata => f32::NAN,
                _ => value as f32,
            })
        })
        .collect::<Result<Vec<f32>>>()?;

    let (west, south) = if header.centered {
        (xll - cellsize / 2.0, yll - cellsize / 2.0)
    } else {
        (xll, yll)
    };
    let bounds = GeoBounds::new(
        west,
        west + ncols as f64 * cellsize,
        south + nrows as f64 * cellsize,
        south,
    );

    debug!(ncols, nrows, cellsize, ?bounds, "parsed ASCII grid");

    Ok(RasterGrid::new(ncols, nrows, bounds, samples)?)
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid {key} value '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DemError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const GRID: &str = "ncols 3
nrows 2
xllcorner 7.0
yllcorner 46.0
cellsize 0.5
NODATA_value -9999
100 200 -9999
400 500 600
";

    #[test]
    fn test_parse_corner_grid() {
        let grid = parse_ascii_grid(GRID).unwrap();

        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(*grid.bounds(), GeoBounds::new(7.0, 8.5, 47.0, 46.0));
        // Row 0 is north
        assert_eq!(grid.sample(0, 0), Some(100.0));
        assert_eq!(grid.sample(2, 1), Some(600.0));
    }

    #[test]
    fn test_nodata_becomes_nan() {
        let grid = parse_ascii_grid(GRID).unwrap();
        assert!(grid.sample(2, 0).unwrap().is_nan());
        assert_eq!(grid.elevation_range(), Some((100.0, 600.0)));
    }

    #[test]
    fn test_center_registration() {
        let text = "NCOLS 2\nNROWS 2\nXLLCENTER 10.5\nYLLCENTER 20.5\nCELLSIZE 1\n1 2\n3 4\n";
        let grid = parse_ascii_grid(text).unwrap();
        assert_eq!(*grid.bounds(), GeoBounds::new(10.0, 12.0, 22.0, 20.0));
    }

    #[test]
    fn test_samples_may_wrap_lines() {
        let text = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n4\n";
        let grid = parse_ascii_grid(text).unwrap();
        assert_eq!(grid.sample(1, 0), Some(2.0));
        assert_eq!(grid.sample(0, 1), Some(3.0));
        assert_eq!(grid.sample(1, 1), Some(4.0));
    }

    #[test]
    fn test_sample_count_mismatch() {
        let text = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n";
        assert!(parse_ascii_grid(text).is_err());
    }

    #[test]
    fn test_oversized_header_is_rejected() {
        let text = "ncols 18446744073709551615\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2\n";
        let err = parse_ascii_grid(text).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DemError>(),
            Some(DemError::GridTooLarge { height: 2, .. })
        ));
    }

    #[test]
    fn test_missing_header_and_bad_values() {
        assert!(parse_ascii_grid("nrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\n5\n").is_err());
        assert!(parse_ascii_grid("ncols 1\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 0\n5\n").is_err());
        assert!(parse_ascii_grid("ncols 1\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\nabc\n").is_err());
        assert!(parse_ascii_grid("ncols 1\nnrows 1\nbogus 3\n").is_err());
    }

    #[test]
    fn test_read_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(GRID.as_bytes()).unwrap();

        let grid = read_ascii_grid(file.path()).unwrap();
        assert_eq!(grid.width(), 3);

        assert!(read_ascii_grid(Path::new("/nonexistent/dem.asc")).is_err());
    }
}
