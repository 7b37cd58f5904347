use geo::{Contains, Point, Polygon, Rect};
use rand::Rng;

use crate::{GeoError, GeoResult};

/// Axis-aligned sampling window. The endpoints on each axis are unordered, so
/// `start_long = 49.5, end_long = 40.5` samples the interval [40.5, 49.5].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub start_lat: f64,
    pub end_lat: f64,
    pub start_long: f64,
    pub end_long: f64,
}

impl BoundingBox {
    pub const WORLD: BoundingBox = BoundingBox {
        start_lat: -90.0,
        end_lat: 90.0,
        start_long: -180.0,
        end_long: 180.0,
    };

    pub fn new(start_lat: f64, end_lat: f64, start_long: f64, end_long: f64) -> GeoResult<Self> {
        for (name, value, limit) in [
            ("start_lat", start_lat, 90.0),
            ("end_lat", end_lat, 90.0),
            ("start_long", start_long, 180.0),
            ("end_long", end_long, 180.0),
        ] {
            if !value.is_finite() || value.abs() > limit {
                return Err(GeoError::spec(format!(
                    "{name} must be within [-{limit}, {limit}], got {value}"
                )));
            }
        }

        Ok(Self {
            start_lat,
            end_lat,
            start_long,
            end_long,
        })
    }

    /// Bounds of a polygon's envelope; x is longitude, y is latitude.
    pub fn from_rect(rect: Rect<f64>) -> Self {
        Self {
            start_lat: rect.min().y,
            end_lat: rect.max().y,
            start_long: rect.min().x,
            end_long: rect.max().x,
        }
    }

    pub fn lat_range(&self) -> (f64, f64) {
        ordered(self.start_lat, self.end_lat)
    }

    pub fn long_range(&self) -> (f64, f64) {
        ordered(self.start_long, self.end_long)
    }

    pub fn contains(&self, point: Point<f64>) -> bool {
        let (min_lat, max_lat) = self.lat_range();
        let (min_long, max_long) = self.long_range();
        point.y() >= min_lat && point.y() <= max_lat && point.x() >= min_long && point.x() <= max_long
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

pub fn random_between<R: Rng>(rng: &mut R, a: f64, b: f64) -> f64 {
    let (low, high) = ordered(a, b);
    if low == high {
        return low;
    }
    rng.random_range(low..=high)
}

/// Independent uniform draws on each axis of the box.
pub fn random_point<R: Rng>(rng: &mut R, bounds: &BoundingBox) -> Point<f64> {
    let lat = random_between(rng, bounds.start_lat, bounds.end_lat);
    let lon = random_between(rng, bounds.start_long, bounds.end_long);
    Point::new(lon, lat)
}

/// Draws from `bounds` until a point lands strictly inside `polygon`.
/// Returns `None` once `max_attempts` candidates have been rejected.
pub fn random_point_in_polygon<R: Rng>(
    rng: &mut R,
    polygon: &Polygon<f64>,
    bounds: &BoundingBox,
    max_attempts: u64,
) -> Option<Point<f64>> {
    for _ in 0..max_attempts {
        let candidate = random_point(rng, bounds);
        if polygon.contains(&candidate) {
            return Some(candidate);
        }
    }
    None
}
