use geo::Point;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Latitude,
    Longitude,
}

/// Ordered coordinate pair. Whether `first` is latitude or longitude is decided
/// by the `lat_first` flag of whoever consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPair {
    pub first: f64,
    pub second: f64,
}

impl GeoPair {
    pub fn new(first: f64, second: f64) -> Self {
        Self { first, second }
    }

    pub fn from_point(point: Point<f64>, lat_first: bool) -> Self {
        if lat_first {
            Self::new(point.y(), point.x())
        } else {
            Self::new(point.x(), point.y())
        }
    }

    /// Reads the pair back as `(lat, long)`.
    pub fn lat_long(&self, lat_first: bool) -> (f64, f64) {
        if lat_first {
            (self.first, self.second)
        } else {
            (self.second, self.first)
        }
    }

    pub fn axis(&self, axis: Axis, lat_first: bool) -> f64 {
        match (axis, lat_first) {
            (Axis::Latitude, true) | (Axis::Longitude, false) => self.first,
            (Axis::Latitude, false) | (Axis::Longitude, true) => self.second,
        }
    }

    pub fn to_point(&self, lat_first: bool) -> Point<f64> {
        let (lat, long) = self.lat_long(lat_first);
        Point::new(long, lat)
    }
}

/// How a pair is emitted as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairFormat {
    List,
    Joined(String),
}

impl PairFormat {
    /// A list unless a delimiter was configured and `as_list` was not forced.
    pub fn from_config(as_list: bool, join_with: Option<&str>) -> Self {
        match join_with {
            Some(delimiter) if !as_list => Self::Joined(delimiter.to_string()),
            _ => Self::List,
        }
    }

    pub fn render(&self, pair: &GeoPair) -> Value {
        match self {
            Self::List => Value::from(vec![pair.first, pair.second]),
            Self::Joined(delimiter) => {
                Value::String(format!("{}{delimiter}{}", pair.first, pair.second))
            }
        }
    }
}

pub fn round_to(value: f64, precision: Option<u32>) -> f64 {
    match precision {
        Some(places) => {
            let scale = 10f64.powi(places as i32);
            (value * scale).round() / scale
        }
        None => value,
    }
}
