//! WGS84 UTM coordinates, projected with `geoconvert`.
//!
//! Only the UTM band is accepted here. Polar positions belong to UPS and are
//! reported as out of range.

use geoconvert::{LatLon, UtmUps};
use serde::Serialize;

use crate::{GeoError, GeoResult};

pub const MIN_LATITUDE: f64 = -80.0;
pub const MAX_LATITUDE: f64 = 84.0;

const ZONE_LETTERS: &[u8] = b"CDEFGHJKLMNPQRSTUVWXX";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UtmCoordinate {
    pub easting: f64,
    pub northing: f64,
    pub zone_number: u8,
    pub zone_letter: char,
}

impl UtmCoordinate {
    pub fn is_northern(&self) -> bool {
        self.zone_letter >= 'N'
    }
}

pub fn zone_letter(latitude: f64) -> Option<char> {
    if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
        return None;
    }
    let index = ((latitude - MIN_LATITUDE) as usize) >> 3;
    Some(ZONE_LETTERS[index] as char)
}

/// Validated `geoconvert` position. Longitude 180 wraps to -180.
pub(crate) fn lat_lon(latitude: f64, longitude: f64) -> GeoResult<LatLon> {
    let longitude = if longitude == 180.0 { -180.0 } else { longitude };
    LatLon::create(latitude, longitude).map_err(|err| GeoError::OutOfRange(err.to_string()))
}

/// Converts WGS84 degrees to UTM. Latitudes outside [-80, 84) are rejected.
pub fn from_lat_lon(latitude: f64, longitude: f64) -> GeoResult<UtmCoordinate> {
    if !(MIN_LATITUDE..MAX_LATITUDE).contains(&latitude) {
        return Err(GeoError::OutOfRange(format!(
            "latitude {latitude} out of range (must be between 80 deg S and 84 deg N)"
        )));
    }

    let projected = lat_lon(latitude, longitude)?.to_utmups();
    let zone_number = u8::try_from(projected.zone())
        .ok()
        .filter(|zone| (1..=60).contains(zone))
        .ok_or_else(|| GeoError::OutOfRange(format!("no UTM zone for latitude {latitude}")))?;
    let zone_letter = zone_letter(latitude)
        .ok_or_else(|| GeoError::OutOfRange(format!("no zone letter for latitude {latitude}")))?;

    Ok(UtmCoordinate {
        easting: projected.easting(),
        northing: projected.northing(),
        zone_number,
        zone_letter,
    })
}

/// Inverse projection, returns `(latitude, longitude)` in degrees.
pub fn to_lat_lon(
    easting: f64,
    northing: f64,
    zone_number: u8,
    zone_letter: char,
) -> GeoResult<(f64, f64)> {
    if !(1..=60).contains(&zone_number) {
        return Err(GeoError::OutOfRange(format!(
            "zone number {zone_number} out of range (must be between 1 and 60)"
        )));
    }
    let zone_letter = zone_letter.to_ascii_uppercase();
    if !zone_letter.is_ascii() || !ZONE_LETTERS.contains(&(zone_letter as u8)) {
        return Err(GeoError::OutOfRange(format!(
            "zone letter {zone_letter} out of range (must be between C and X)"
        )));
    }

    let position = UtmUps::create(i32::from(zone_number), zone_letter >= 'N', easting, northing)
        .map_err(|err| GeoError::OutOfRange(err.to_string()))?
        .to_latlon();
    Ok((position.latitude(), position.longitude()))
}
