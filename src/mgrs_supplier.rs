use serde_json::Value;

use crate::supplier::{PairSource, ValueSupplier};
use crate::{GeoResult, mgrs};

pub struct MgrsSupplier<S> {
    source: S,
    lat_first: bool,
}

impl<S: PairSource> MgrsSupplier<S> {
    pub fn new(source: S, lat_first: bool) -> Self {
        Self { source, lat_first }
    }
}

impl<S: PairSource> ValueSupplier for MgrsSupplier<S> {
    fn next(&mut self, iteration: u64) -> GeoResult<Value> {
        let pair = self.source.next_pair(iteration)?;
        let (lat, long) = pair.lat_long(self.lat_first);
        Ok(Value::String(mgrs::to_mgrs(lat, long)?))
    }
}
