//! Synthetic geographic values: bounded and polygon-clipped lat/long pairs,
//! MGRS grid references and UTM strings, exposed as a registry of value types.

mod error;
pub use error::GeoError;
pub use error::GeoResult;

pub mod generate_point;
pub use generate_point::BoundingBox;
pub use generate_point::random_point;
pub use generate_point::random_point_in_polygon;

mod geo_pair;
pub use geo_pair::Axis;
pub use geo_pair::GeoPair;
pub use geo_pair::PairFormat;

pub mod load_polygons;
pub use load_polygons::load_polygons;

mod polygon_set;
pub use polygon_set::ClippedPairs;
pub use polygon_set::PolygonSet;

pub mod mgrs;
pub mod utm;
pub use utm::UtmCoordinate;

mod supplier;
pub use supplier::BufferedPairs;
pub use supplier::PairSource;
pub use supplier::SharedPairs;
pub use supplier::SharedRng;
pub use supplier::ValueSupplier;
pub use supplier::shared_rng;

mod pair_supplier;
pub use pair_supplier::AxisSupplier;
pub use pair_supplier::BoundedPairs;
pub use pair_supplier::PairSupplier;

mod mgrs_supplier;
pub use mgrs_supplier::MgrsSupplier;

mod utm_supplier;
pub use utm_supplier::UtmSupplier;
pub use utm_supplier::UtmTemplate;

pub mod settings;
pub use settings::Settings;

mod spec;
pub use spec::DataSpec;
pub use spec::FieldSpec;
pub use spec::GeoConfig;

pub mod registry;
pub use registry::Loader;
