//! GeoJSON shape reader
//!
//! Accepts a bare geometry, a `Feature` or a `FeatureCollection`.
//! `Polygon` and `MultiPolygon` map to their shape variants; a `Point`
//! feature with a numeric `radius` property (meters) becomes a circle.

use anyhow::{Context, Result, bail};
use geo::{Coord, LineString, MultiPolygon, Polygon, coord};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::domain::Shape;
use crate::error::DemError;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    type_: String,
    #[serde(default)]
    coordinates: Value,
}

/// `[lng, lat]`; missing or null members read as NaN
type Position = Vec<Option<f64>>;

/// Load every shape from a GeoJSON file
pub fn read_geojson(path: &Path) -> Result<Vec<Shape>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read GeoJSON file: {}", path.display()))?;
    parse_geojson(&contents)
        .with_context(|| format!("Failed to parse GeoJSON: {}", path.display()))
}

/// Parse GeoJSON text into shapes, in document order
pub fn parse_geojson(contents: &str) -> Result<Vec<Shape>> {
    let document: Value = serde_json::from_str(contents).context("Invalid JSON")?;
    let type_ = document
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .context("GeoJSON object has no type")?;

    let features = match type_.as_str() {
        "FeatureCollection" => serde_json::from_value::<FeatureCollection>(document)?.features,
        "Feature" => vec![serde_json::from_value::<Feature>(document)?],
        _ => vec![Feature {
            geometry: Some(serde_json::from_value(document)?),
            properties: None,
        }],
    };

    let mut shapes = Vec::with_capacity(features.len());
    for (i, feature) in features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            warn!(feature = i, "skipping feature without geometry");
            continue;
        };
        let radius = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("radius"))
            .and_then(Value::as_f64);
        shapes.push(to_shape(geometry, radius)?);
    }

    if shapes.is_empty() {
        bail!("GeoJSON contains no shapes");
    }
    debug!(count = shapes.len(), "parsed GeoJSON shapes");
    Ok(shapes)
}

fn to_shape(geometry: Geometry, radius: Option<f64>) -> Result<Shape> {
    match geometry.type_.as_str() {
        "Polygon" => {
            let rings: Vec<Vec<Position>> = serde_json::from_value(geometry.coordinates)
                .context("Invalid Polygon coordinates")?;
            Ok(Shape::Polygon(to_polygon(rings)))
        }
        "MultiPolygon" => {
            let polygons: Vec<Vec<Vec<Position>>> = serde_json::from_value(geometry.coordinates)
                .context("Invalid MultiPolygon coordinates")?;
            Ok(Shape::MultiPolygon(MultiPolygon::new(
                polygons.into_iter().map(to_polygon).collect(),
            )))
        }
        "Point" => {
            let Some(radius) = radius else {
                return Err(DemError::UnsupportedShapeType("Point without radius".into()).into());
            };
            let position: Position = serde_json::from_value(geometry.coordinates)
                .context("Invalid Point coordinates")?;
            let center = to_coord(&position);
            Ok(Shape::circle(center.y, center.x, radius))
        }
        other => Err(DemError::UnsupportedShapeType(other.to_string()).into()),
    }
}

fn to_polygon(rings: Vec<Vec<Position>>) -> Polygon<f64> {
    let mut rings = rings.into_iter().map(|ring| {
        ring.iter().map(to_coord).collect::<LineString<f64>>()
    });
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Polygon::new(exterior, rings.collect())
}

fn to_coord(position: &Position) -> Coord<f64> {
    let member = |i: usize| position.get(i).copied().flatten().unwrap_or(f64::NAN);
    coord! { x: member(0), y: member(1) }
}
