use serde_json::Value;
use tera::{Context, Tera};

use crate::supplier::{PairSource, ValueSupplier};
use crate::utm::{self, UtmCoordinate};
use crate::{GeoError, GeoResult};

const TEMPLATE_NAME: &str = "utm";

/// Compiled template for UTM output. Placeholders: `easting`, `northing`,
/// `zone_number`, `zone_letter` and the short forms `zn`, `zl`.
pub struct UtmTemplate {
    tera: Tera,
}

impl UtmTemplate {
    pub fn new(template: &str) -> GeoResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, template)
            .map_err(|err| GeoError::spec(format!("invalid utm template {template:?}: {err}")))?;
        Ok(Self { tera })
    }

    pub fn render(&self, utm: &UtmCoordinate) -> GeoResult<String> {
        Ok(self.tera.render(TEMPLATE_NAME, &build_context(utm))?)
    }
}

pub fn build_context(utm: &UtmCoordinate) -> Context {
    let mut context = Context::new();
    context.insert("easting", &utm.easting);
    context.insert("northing", &utm.northing);
    context.insert("zone_number", &utm.zone_number);
    context.insert("zone_letter", &utm.zone_letter);
    context.insert("zn", &utm.zone_number);
    context.insert("zl", &utm.zone_letter);
    context
}

pub struct UtmSupplier<S> {
    source: S,
    template: UtmTemplate,
    lat_first: bool,
}

impl<S: PairSource> UtmSupplier<S> {
    pub fn new(source: S, template: UtmTemplate, lat_first: bool) -> Self {
        Self {
            source,
            template,
            lat_first,
        }
    }
}

impl<S: PairSource> ValueSupplier for UtmSupplier<S> {
    fn next(&mut self, iteration: u64) -> GeoResult<Value> {
        let pair = self.source.next_pair(iteration)?;
        let (lat, long) = pair.lat_long(self.lat_first);
        let utm = utm::from_lat_lon(lat, long).inspect_err(|err| {
            tracing::warn!(
                pair = ?[pair.first, pair.second],
                error = %err,
                "Unable to convert pair to UTM"
            );
        })?;
        Ok(Value::String(self.template.render(&utm)?))
    }
}
