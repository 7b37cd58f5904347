use geo::Point;
use serde_json::Value;

use crate::generate_point::{BoundingBox, random_point};
use crate::geo_pair::{Axis, PairFormat, round_to};
use crate::supplier::{PairSource, SharedRng, ValueSupplier};
use crate::{GeoPair, GeoResult};

/// Uniform pairs inside a bounding box, optionally rounded to `precision` places.
pub struct BoundedPairs {
    bounds: BoundingBox,
    rng: SharedRng,
    lat_first: bool,
    precision: Option<u32>,
}

impl BoundedPairs {
    pub fn new(bounds: BoundingBox, rng: SharedRng, lat_first: bool, precision: Option<u32>) -> Self {
        Self {
            bounds,
            rng,
            lat_first,
            precision,
        }
    }
}

impl PairSource for BoundedPairs {
    fn next_pair(&mut self, _iteration: u64) -> GeoResult<GeoPair> {
        let point = random_point(&mut *self.rng.borrow_mut(), &self.bounds);

        let (min_lat, max_lat) = self.bounds.lat_range();
        let (min_long, max_long) = self.bounds.long_range();
        let lat = round_to(point.y(), self.precision).clamp(min_lat, max_lat);
        let long = round_to(point.x(), self.precision).clamp(min_long, max_long);

        Ok(GeoPair::from_point(Point::new(long, lat), self.lat_first))
    }

    fn lat_first(&self) -> bool {
        self.lat_first
    }
}

/// Emits whole pairs as a list or a delimited string.
pub struct PairSupplier<S> {
    source: S,
    format: PairFormat,
}

impl<S: PairSource> PairSupplier<S> {
    pub fn new(source: S, format: PairFormat) -> Self {
        Self { source, format }
    }
}

impl<S: PairSource> ValueSupplier for PairSupplier<S> {
    fn next(&mut self, iteration: u64) -> GeoResult<Value> {
        let pair = self.source.next_pair(iteration)?;
        Ok(self.format.render(&pair))
    }
}

/// Emits one axis of each pair. Latitude and longitude suppliers over the same
/// shared source read the same point for a given iteration.
pub struct AxisSupplier<S> {
    source: S,
    axis: Axis,
}

impl<S: PairSource> AxisSupplier<S> {
    pub fn new(source: S, axis: Axis) -> Self {
        Self { source, axis }
    }
}

impl<S: PairSource> ValueSupplier for AxisSupplier<S> {
    fn next(&mut self, iteration: u64) -> GeoResult<Value> {
        let pair = self.source.next_pair(iteration)?;
        Ok(Value::from(pair.axis(self.axis, self.source.lat_first())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon_set::{ClippedPairs, PolygonSet};
    use crate::supplier::{BufferedPairs, shared_rng};
    use geo::{Contains, polygon};
    use serde_json::json;

    #[test]
    fn bounded_pairs_respect_box_and_precision() {
        let bounds = BoundingBox::new(-10.0, 10.0, 170.0, 180.0).unwrap();
        let mut pairs = BoundedPairs::new(bounds, shared_rng(Some(9)), true, Some(2));
        for iteration in 0..500 {
            let pair = pairs.next_pair(iteration).unwrap();
            assert!(bounds.contains(pair.to_point(true)), "{pair:?}");
            assert_eq!(round_to(pair.first, Some(2)), pair.first);
        }
    }

    #[test]
    fn rounding_is_clamped_back_into_the_box() {
        let bounds = BoundingBox::new(0.004, 0.006, 10.0041, 10.0049).unwrap();
        let mut pairs = BoundedPairs::new(bounds, shared_rng(Some(5)), false, Some(2));
        for iteration in 0..100 {
            let pair = pairs.next_pair(iteration).unwrap();
            assert!(bounds.contains(pair.to_point(false)), "{pair:?}");
        }
    }

    #[test]
    fn joined_pair_output() {
        let bounds = BoundingBox::new(1.0, 1.0, 2.0, 2.0).unwrap();
        let pairs = BoundedPairs::new(bounds, shared_rng(Some(1)), false, None);
        let mut supplier = PairSupplier::new(pairs, PairFormat::Joined(":".into()));
        assert_eq!(supplier.next(0).unwrap(), json!("2:1"));
    }

    #[test]
    fn shared_axis_suppliers_see_one_point() {
        let triangle = polygon![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 0.0, y: 4.0)];
        let set = PolygonSet::new(vec![triangle.clone()]).unwrap();
        let shared = BufferedPairs::shared(Box::new(ClippedPairs::new(
            set,
            shared_rng(Some(21)),
            false,
            10_000,
        )));
        let mut lat = AxisSupplier::new(shared.clone(), Axis::Latitude);
        let mut long = AxisSupplier::new(shared, Axis::Longitude);

        for iteration in 0..100 {
            let y = lat.next(iteration).unwrap().as_f64().unwrap();
            let x = long.next(iteration).unwrap().as_f64().unwrap();
            assert!(triangle.contains(&Point::new(x, y)));
        }
    }
}
