use lazy_static::lazy_static;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::generate_point::BoundingBox;
use crate::geo_pair::{Axis, PairFormat};
use crate::load_polygons::load_polygons;
use crate::mgrs_supplier::MgrsSupplier;
use crate::pair_supplier::{AxisSupplier, BoundedPairs, PairSupplier};
use crate::polygon_set::{ClippedPairs, PolygonSet};
use crate::settings::Settings;
use crate::spec::{DataSpec, FieldSpec, GeoConfig};
use crate::supplier::{BufferedPairs, PairSource, SharedPairs, SharedRng, ValueSupplier, shared_rng};
use crate::utm::{MAX_LATITUDE, MIN_LATITUDE};
use crate::utm_supplier::{UtmSupplier, UtmTemplate};
use crate::{GeoError, GeoResult};

pub const GEO_PAIR: &str = "geo.pair";
pub const GEO_LAT: &str = "geo.lat";
pub const GEO_LONG: &str = "geo.long";
pub const GEO_PAIR_CLIP: &str = "geo.pair.clip";
pub const GEO_LAT_CLIP: &str = "geo.lat.clip";
pub const GEO_LONG_CLIP: &str = "geo.long.clip";
pub const GEO_MGRS: &str = "geo.mgrs";
pub const GEO_UTM: &str = "geo.utm";

pub type Constructor = fn(&FieldSpec, &mut Loader) -> GeoResult<Box<dyn ValueSupplier>>;

lazy_static! {
    static ref REGISTRY: HashMap<&'static str, Constructor> = {
        let mut types: HashMap<&'static str, Constructor> = HashMap::new();
        types.insert(GEO_PAIR, configure_pair);
        types.insert(GEO_LAT, configure_lat);
        types.insert(GEO_LONG, configure_long);
        types.insert(GEO_PAIR_CLIP, configure_clipped_pair);
        types.insert(GEO_LAT_CLIP, configure_clipped_lat);
        types.insert(GEO_LONG_CLIP, configure_clipped_long);
        types.insert(GEO_MGRS, configure_mgrs);
        types.insert(GEO_UTM, configure_utm);
        types
    };
}

pub fn lookup(type_name: &str) -> Option<Constructor> {
    REGISTRY.get(type_name).copied()
}

pub fn registered_types() -> Vec<&'static str> {
    let mut names: Vec<_> = REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Construction context: process-wide settings, the data directory used to
/// resolve geometry paths, the shared random source and the pair buffers that
/// clipped lat/long fields share.
pub struct Loader {
    settings: Settings,
    data_dir: PathBuf,
    rng: SharedRng,
    shared_pairs: HashMap<String, SharedPairs>,
}

impl Loader {
    pub fn new(settings: Settings, seed: Option<u64>) -> Self {
        let data_dir = PathBuf::from(&settings.data_dir);
        Self {
            settings,
            data_dir,
            rng: shared_rng(seed),
            shared_pairs: HashMap::new(),
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn rng(&self) -> SharedRng {
        self.rng.clone()
    }

    pub fn get(&mut self, field: &FieldSpec) -> GeoResult<Box<dyn ValueSupplier>> {
        let constructor = lookup(&field.type_name).ok_or_else(|| {
            GeoError::spec(format!("unknown type {}: {}", field.type_name, field.to_json()))
        })?;
        let supplier = constructor(field, self)?;
        tracing::debug!(type_name = %field.type_name, "configured supplier");
        Ok(supplier)
    }

    /// Builds every supplier up front so configuration errors surface before any sampling.
    pub fn suppliers(
        &mut self,
        spec: &DataSpec,
    ) -> GeoResult<Vec<(String, Box<dyn ValueSupplier>)>> {
        let mut suppliers = Vec::with_capacity(spec.fields.len());
        for (name, field) in &spec.fields {
            suppliers.push((name.clone(), self.get(field)?));
        }
        Ok(suppliers)
    }

    pub fn entries(&mut self, spec: &DataSpec, count: u64) -> GeoResult<Vec<Map<String, Value>>> {
        let mut records = Vec::new();
        self.for_each_entry(spec, count, |record| {
            records.push(record);
            Ok::<(), GeoError>(())
        })?;
        Ok(records)
    }

    /// Hands each record to `sink` as soon as it is built.
    pub fn for_each_entry<F, E>(&mut self, spec: &DataSpec, count: u64, mut sink: F) -> Result<(), E>
    where
        F: FnMut(Map<String, Value>) -> Result<(), E>,
        E: From<GeoError>,
    {
        let mut suppliers = self.suppliers(spec)?;
        for iteration in 0..count {
            let mut record = Map::new();
            for (name, supplier) in suppliers.iter_mut() {
                record.insert(name.clone(), supplier.next(iteration)?);
            }
            sink(record)?;
        }
        Ok(())
    }

    fn lat_first(&self, config: &GeoConfig) -> bool {
        config.lat_first.unwrap_or(self.settings.geo_lat_first)
    }

    fn clipped_pairs(&self, field: &FieldSpec, config: &GeoConfig) -> GeoResult<ClippedPairs> {
        let geojson = config.geojson.as_ref().ok_or_else(|| {
            GeoError::spec(format!(
                "geojson is required config for {} type: {}",
                field.type_name,
                field.to_json()
            ))
        })?;
        let polygons = PolygonSet::new(load_polygons(geojson, &self.data_dir)?)?;
        tracing::debug!(polygons = polygons.len(), "loaded clipping polygons");

        Ok(ClippedPairs::new(
            polygons,
            self.rng(),
            self.lat_first(config),
            self.max_attempts(config)?,
        ))
    }

    /// One buffered clipped source per distinct geometry. The first field to
    /// name a geometry fixes its cap; each axis reads its own ordering back
    /// through `PairSource::lat_first`.
    fn shared_clipped_pairs(
        &mut self,
        field: &FieldSpec,
        config: &GeoConfig,
    ) -> GeoResult<SharedPairs> {
        let key = config.geojson.as_ref().map(Value::to_string).unwrap_or_default();
        if let Some(shared) = self.shared_pairs.get(&key) {
            return Ok(shared.clone());
        }

        let shared = BufferedPairs::shared(Box::new(self.clipped_pairs(field, config)?));
        self.shared_pairs.insert(key, shared.clone());
        Ok(shared)
    }

    fn max_attempts(&self, config: &GeoConfig) -> GeoResult<u64> {
        match config.max_attempts {
            Some(0) => Err(GeoError::spec("max_attempts must be greater than zero")),
            Some(attempts) => Ok(attempts),
            None => Ok(self.settings.max_rejection_attempts),
        }
    }

    fn bounded_pairs(&self, config: &GeoConfig, defaults: BoundingBox) -> GeoResult<BoundedPairs> {
        let bounds = BoundingBox::new(
            config.start_lat.unwrap_or(defaults.start_lat),
            config.end_lat.unwrap_or(defaults.end_lat),
            config.start_long.unwrap_or(defaults.start_long),
            config.end_long.unwrap_or(defaults.end_long),
        )?;
        Ok(BoundedPairs::new(
            bounds,
            self.rng(),
            self.lat_first(config),
            config.precision,
        ))
    }

    /// Clipped when `geojson` is configured, bounding box otherwise.
    fn pair_source(
        &self,
        field: &FieldSpec,
        config: &GeoConfig,
        defaults: BoundingBox,
    ) -> GeoResult<Box<dyn PairSource>> {
        if config.geojson.is_some() {
            Ok(Box::new(self.clipped_pairs(field, config)?))
        } else {
            Ok(Box::new(self.bounded_pairs(config, defaults)?))
        }
    }
}

fn pair_format(config: &GeoConfig) -> PairFormat {
    PairFormat::from_config(config.as_list.unwrap_or(false), config.join_with.as_deref())
}

fn configure_pair(field: &FieldSpec, loader: &mut Loader) -> GeoResult<Box<dyn ValueSupplier>> {
    let config = field.geo_config()?;
    let pairs = loader.bounded_pairs(&config, BoundingBox::WORLD)?;
    Ok(Box::new(PairSupplier::new(pairs, pair_format(&config))))
}

fn configure_axis(field: &FieldSpec, loader: &mut Loader, axis: Axis) -> GeoResult<Box<dyn ValueSupplier>> {
    let config = field.geo_config()?;
    let pairs = loader.bounded_pairs(&config, BoundingBox::WORLD)?;
    Ok(Box::new(AxisSupplier::new(pairs, axis)))
}

fn configure_lat(field: &FieldSpec, loader: &mut Loader) -> GeoResult<Box<dyn ValueSupplier>> {
    configure_axis(field, loader, Axis::Latitude)
}

fn configure_long(field: &FieldSpec, loader: &mut Loader) -> GeoResult<Box<dyn ValueSupplier>> {
    configure_axis(field, loader, Axis::Longitude)
}

fn configure_clipped_pair(field: &FieldSpec, loader: &mut Loader) -> GeoResult<Box<dyn ValueSupplier>> {
    let config = field.geo_config()?;
    let pairs = loader.clipped_pairs(field, &config)?;
    Ok(Box::new(PairSupplier::new(pairs, pair_format(&config))))
}

fn configure_clipped_axis(
    field: &FieldSpec,
    loader: &mut Loader,
    axis: Axis,
) -> GeoResult<Box<dyn ValueSupplier>> {
    let config = field.geo_config()?;
    let pairs = loader.shared_clipped_pairs(field, &config)?;
    Ok(Box::new(AxisSupplier::new(pairs, axis)))
}

fn configure_clipped_lat(field: &FieldSpec, loader: &mut Loader) -> GeoResult<Box<dyn ValueSupplier>> {
    configure_clipped_axis(field, loader, Axis::Latitude)
}

fn configure_clipped_long(field: &FieldSpec, loader: &mut Loader) -> GeoResult<Box<dyn ValueSupplier>> {
    configure_clipped_axis(field, loader, Axis::Longitude)
}

fn configure_mgrs(field: &FieldSpec, loader: &mut Loader) -> GeoResult<Box<dyn ValueSupplier>> {
    let config = field.geo_config()?;
    let pairs = loader.pair_source(field, &config, BoundingBox::WORLD)?;
    let lat_first = loader.lat_first(&config);
    Ok(Box::new(MgrsSupplier::new(pairs, lat_first)))
}

fn configure_utm(field: &FieldSpec, loader: &mut Loader) -> GeoResult<Box<dyn ValueSupplier>> {
    let mut config = field.geo_config()?;
    // UTM is undefined outside [-80, 84], pull the box edges in
    config.start_lat = Some(config.start_lat.map_or(MIN_LATITUDE, |lat| lat.max(MIN_LATITUDE)));
    config.end_lat = Some(config.end_lat.map_or(MAX_LATITUDE, |lat| lat.min(MAX_LATITUDE)));

    let pairs = loader.pair_source(field, &config, BoundingBox::WORLD)?;
    let template = config
        .template
        .as_deref()
        .unwrap_or(&loader.settings().geo_utm_template);
    let template = UtmTemplate::new(template)?;
    let lat_first = loader.lat_first(&config);
    Ok(Box::new(UtmSupplier::new(pairs, template, lat_first)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loader() -> Loader {
        Loader::new(Settings::default(), Some(99))
    }

    #[test]
    fn every_type_is_registered() {
        assert_eq!(
            registered_types(),
            [
                GEO_LAT,
                GEO_LAT_CLIP,
                GEO_LONG,
                GEO_LONG_CLIP,
                GEO_MGRS,
                GEO_PAIR,
                GEO_PAIR_CLIP,
                GEO_UTM
            ]
        );
    }

    #[test]
    fn unknown_type_is_spec_error() {
        let field = FieldSpec::new("geo.nope", Value::Null).unwrap();
        assert!(matches!(loader().get(&field), Err(GeoError::Spec(_))));
    }

    #[test]
    fn utm_clamps_latitude_band() {
        let field = FieldSpec::new(GEO_UTM, json!({"start_lat": -89.0, "end_lat": 89.0})).unwrap();
        let mut supplier = loader().get(&field).unwrap();
        for iteration in 0..200 {
            assert!(supplier.next(iteration).is_ok());
        }
    }

    #[test]
    fn mgrs_covers_the_poles() {
        let field = FieldSpec::new(GEO_MGRS, json!({"start_lat": 85.0, "end_lat": 89.0})).unwrap();
        let mut supplier = loader().get(&field).unwrap();
        for iteration in 0..100 {
            let value = supplier.next(iteration).unwrap();
            let (lat, _) = crate::mgrs::to_lat_lon(value.as_str().unwrap()).unwrap();
            assert!((84.99..=89.01).contains(&lat), "{value}");
        }
    }

    #[test]
    fn out_of_range_bounds_fail_at_construction() {
        let field = FieldSpec::new(GEO_PAIR, json!({"start_long": 200.0})).unwrap();
        assert!(matches!(loader().get(&field), Err(GeoError::Spec(_))));
    }

    #[test]
    fn zero_max_attempts_rejected() {
        let field = FieldSpec::new(
            GEO_PAIR_CLIP,
            json!({"max_attempts": 0, "geojson": {"type": "Feature", "geometry": {
                "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]]}}}),
        )
        .unwrap();
        assert!(matches!(loader().get(&field), Err(GeoError::Spec(_))));
    }

    #[test]
    fn clipped_axes_share_one_buffer() {
        let geojson = json!({"type": "Feature", "geometry": {"type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]]}});
        let mut loader = loader();
        loader
            .get(&FieldSpec::new(GEO_LAT_CLIP, json!({"geojson": geojson})).unwrap())
            .unwrap();
        loader
            .get(&FieldSpec::new(GEO_LONG_CLIP, json!({"geojson": geojson})).unwrap())
            .unwrap();
        loader
            .get(&FieldSpec::new(GEO_LONG_CLIP, json!({"geojson": geojson, "lat_first": true})).unwrap())
            .unwrap();
        assert_eq!(loader.shared_pairs.len(), 1);
    }

    #[test]
    fn mixed_orderings_read_one_point() {
        let geojson = json!({"type": "Feature", "geometry": {"type": "Polygon",
            "coordinates": [[[0.0, 0.0], [10.0, 0.0], [0.0, 10.0], [0.0, 0.0]]]}});
        let mut loader = loader();
        let mut lat = loader
            .get(&FieldSpec::new(GEO_LAT_CLIP, json!({"geojson": geojson, "lat_first": true})).unwrap())
            .unwrap();
        let mut long = loader
            .get(&FieldSpec::new(GEO_LONG_CLIP, json!({"geojson": geojson})).unwrap())
            .unwrap();

        for iteration in 0..200 {
            let y = lat.next(iteration).unwrap().as_f64().unwrap();
            let x = long.next(iteration).unwrap().as_f64().unwrap();
            assert!(x > 0.0 && y > 0.0 && x + y < 10.0, "{y}, {x}");
        }
    }
}
