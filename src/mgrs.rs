//! Military Grid Reference System strings, including the polar UPS grids.

use geoconvert::Mgrs;

use crate::{GeoError, GeoResult, utm};

/// 1 m resolution, five easting and five northing digits.
pub const PRECISION: i32 = 5;

/// Encodes a WGS84 position as e.g. `32ULB9520173135`. Beyond the UTM band
/// the reference has no zone digits and starts with a UPS band letter.
pub fn to_mgrs(latitude: f64, longitude: f64) -> GeoResult<String> {
    Ok(utm::lat_lon(latitude, longitude)?.to_mgrs(PRECISION).to_string())
}

/// Decodes an MGRS string to `(latitude, longitude)` at the centre of the
/// referenced cell. Whitespace between groups is ignored.
pub fn to_lat_lon(mgrs: &str) -> GeoResult<(f64, f64)> {
    let text: String = mgrs.chars().filter(|c| !c.is_whitespace()).collect();
    let invalid = || GeoError::OutOfRange(format!("invalid MGRS string {mgrs:?}"));

    // a grid zone alone, or a zone followed by both square letters
    let letters = text.trim_start_matches(|c: char| c.is_ascii_digit());
    if !text.is_ascii() || !(letters.len() == 1 || letters.len() >= 3) {
        return Err(invalid());
    }

    let position = Mgrs::parse_str(&text)
        .map_err(|err| GeoError::OutOfRange(format!("invalid MGRS string {mgrs:?}: {err}")))?
        .to_latlon();
    Ok((position.latitude(), position.longitude()))
}
