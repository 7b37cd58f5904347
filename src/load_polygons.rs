use geo::LineString;
use geo::Polygon;
use serde_json::Value;
use shapefile::{PolygonRing, Reader, Shape};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{GeoError, GeoResult};

/// Loads the polygons named by a `geojson` config value: either an inline
/// GeoJSON object or a path to a `.json`/`.geojson`/`.shp` file on disk.
pub fn load_polygons(source: &Value, data_dir: &Path) -> GeoResult<Vec<Polygon<f64>>> {
    match source {
        Value::Object(_) => polygons_from_geojson(source),
        Value::String(reference) => {
            let path = resolve_geojson_path(reference, data_dir).ok_or_else(|| {
                GeoError::spec(format!(
                    "geojson config must be valid GeoJSON or path to GeoJSON file on disk, \
                     unable to resolve {reference:?}"
                ))
            })?;
            load_polygons_from_path(&path)
        }
        other => Err(GeoError::spec(format!(
            "geojson config must be valid GeoJSON or path to GeoJSON file on disk, got {other}"
        ))),
    }
}

/// Tries the reference as given, then relative to `data_dir`.
pub fn resolve_geojson_path(reference: &str, data_dir: &Path) -> Option<PathBuf> {
    if reference.trim().is_empty() {
        return None;
    }

    let direct = PathBuf::from(reference);
    if direct.is_file() {
        return Some(direct);
    }

    let relative = data_dir.join(reference);
    relative.is_file().then_some(relative)
}

pub fn load_polygons_from_path(path: &Path) -> GeoResult<Vec<Polygon<f64>>> {
    let is_shapefile = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("shp"));
    if is_shapefile {
        return load_shapefile_polygons(path);
    }

    let text = fs::read_to_string(path).map_err(|err| {
        GeoError::spec(format!("unable to read geojson file {}: {err}", path.display()))
    })?;
    let geojson: Value = serde_json::from_str(&text).map_err(|err| {
        GeoError::spec(format!("malformed geojson in {}: {err}", path.display()))
    })?;
    polygons_from_geojson(&geojson)
}

/// Polygons of a `Feature` or `FeatureCollection`, in feature order.
/// MultiPolygon members are flattened into separate entries.
pub fn polygons_from_geojson(geojson: &Value) -> GeoResult<Vec<Polygon<f64>>> {
    let Some(object) = geojson.as_object() else {
        return Err(GeoError::spec("geojson must be a JSON object"));
    };
    let kind = object
        .get("type")
        .ok_or_else(|| GeoError::spec("geojson is missing required field 'type'"))?;

    let polygons = match kind.as_str() {
        Some("Feature") => feature_polygons(geojson)?,
        Some("FeatureCollection") => {
            let features = object
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    GeoError::spec("FeatureCollection is missing required field 'features'")
                })?;
            let mut polygons = Vec::new();
            for feature in features {
                polygons.extend(feature_polygons(feature)?);
            }
            polygons
        }
        _ => {
            return Err(GeoError::InvalidGeometry(format!(
                "expected type Feature or FeatureCollection, got {kind}"
            )));
        }
    };

    if polygons.is_empty() {
        return Err(GeoError::InvalidGeometry("geojson contains no polygons".into()));
    }
    Ok(polygons)
}

fn feature_polygons(feature: &Value) -> GeoResult<Vec<Polygon<f64>>> {
    let geometry = feature
        .get("geometry")
        .filter(|geometry| !geometry.is_null())
        .ok_or_else(|| GeoError::spec("geojson feature is missing required field 'geometry'"))?;
    let coordinates = geometry
        .get("coordinates")
        .ok_or_else(|| GeoError::spec("geometry is missing required field 'coordinates'"))?;

    match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => Ok(vec![polygon_from_rings(coordinates)?]),
        Some("MultiPolygon") => coordinates
            .as_array()
            .ok_or_else(|| GeoError::InvalidGeometry("MultiPolygon coordinates must be an array".into()))?
            .iter()
            .map(polygon_from_rings)
            .collect(),
        Some(other) => Err(GeoError::InvalidGeometry(format!(
            "unsupported geometry type {other}, expected Polygon or MultiPolygon"
        ))),
        None => Err(GeoError::spec("geometry is missing required field 'type'")),
    }
}

fn polygon_from_rings(rings: &Value) -> GeoResult<Polygon<f64>> {
    let rings = rings
        .as_array()
        .ok_or_else(|| GeoError::InvalidGeometry("polygon coordinates must be an array of rings".into()))?;
    let Some((exterior, interiors)) = rings.split_first() else {
        return Err(GeoError::InvalidGeometry("polygon has no coordinates".into()));
    };

    let exterior = ring_from_positions(exterior)?;
    if exterior.0.is_empty() {
        return Err(GeoError::InvalidGeometry("polygon has no coordinates".into()));
    }
    let interiors = interiors
        .iter()
        .map(ring_from_positions)
        .collect::<GeoResult<Vec<_>>>()?;

    Ok(Polygon::new(exterior, interiors))
}

// positions may carry an altitude, only (x, y) is kept
fn ring_from_positions(ring: &Value) -> GeoResult<LineString<f64>> {
    let positions = ring
        .as_array()
        .ok_or_else(|| GeoError::InvalidGeometry("ring must be an array of positions".into()))?;

    let mut coords = Vec::with_capacity(positions.len());
    for position in positions {
        let pair = position
            .as_array()
            .filter(|pair| pair.len() >= 2)
            .and_then(|pair| Some((pair[0].as_f64()?, pair[1].as_f64()?)))
            .ok_or_else(|| {
                GeoError::InvalidGeometry(format!("invalid position {position}"))
            })?;
        coords.push(wgs84_position(pair.0, pair.1)?);
    }
    Ok(LineString::from(coords))
}

/// Positions are WGS84 degrees, x is longitude and y is latitude.
fn wgs84_position(x: f64, y: f64) -> GeoResult<(f64, f64)> {
    if x.is_finite() && y.is_finite() && x.abs() <= 180.0 && y.abs() <= 90.0 {
        Ok((x, y))
    } else {
        Err(GeoError::InvalidGeometry(format!(
            "position ({x}, {y}) outside longitude [-180, 180] or latitude [-90, 90]"
        )))
    }
}

/// Each outer ring starts a new polygon; inner rings that follow become its holes.
pub fn load_shapefile_polygons(path: &Path) -> GeoResult<Vec<Polygon<f64>>> {
    let shapefile_error =
        |err: shapefile::Error| GeoError::spec(format!("unable to read shapefile {}: {err}", path.display()));

    let mut reader = Reader::from_path(path).map_err(shapefile_error)?;
    let mut polygons = Vec::new();

    for record in reader.iter_shapes_and_records() {
        let (shape, _) = record.map_err(shapefile_error)?;

        let Shape::Polygon(p) = shape else {
            // skip non-polygons
            continue;
        };

        let mut exterior: Option<LineString<f64>> = None;
        let mut interiors = Vec::new();
        for ring in p.rings() {
            let line = LineString::from(
                ring.points()
                    .iter()
                    .map(|pt| wgs84_position(pt.x, pt.y))
                    .collect::<GeoResult<Vec<_>>>()?,
            );
            match ring {
                PolygonRing::Outer(_) => {
                    if let Some(previous) = exterior.replace(line) {
                        polygons.push(Polygon::new(previous, std::mem::take(&mut interiors)));
                    }
                }
                PolygonRing::Inner(_) => interiors.push(line),
            }
        }
        if let Some(last) = exterior {
            polygons.push(Polygon::new(last, interiors));
        }
    }

    tracing::debug!(path = %path.display(), polygons = polygons.len(), "loaded shapefile");

    if polygons.is_empty() {
        return Err(GeoError::InvalidGeometry(format!(
            "shapefile {} contains no polygons",
            path.display()
        )));
    }
    Ok(polygons)
}
