use geo::{BoundingRect, Polygon};
use rand::Rng;

use crate::generate_point::{BoundingBox, random_point_in_polygon};
use crate::supplier::{PairSource, SharedRng};
use crate::{GeoError, GeoPair, GeoResult};

/// Polygons paired with the bounding box their candidates are drawn from.
/// Index `i` of `bounds` always belongs to index `i` of `polygons`.
#[derive(Debug, Clone)]
pub struct PolygonSet {
    polygons: Vec<Polygon<f64>>,
    bounds: Vec<BoundingBox>,
}

impl PolygonSet {
    pub fn new(polygons: Vec<Polygon<f64>>) -> GeoResult<Self> {
        if polygons.is_empty() {
            return Err(GeoError::InvalidGeometry("no polygons to sample from".into()));
        }

        let bounds = polygons
            .iter()
            .enumerate()
            .map(|(index, polygon)| {
                polygon
                    .bounding_rect()
                    .map(BoundingBox::from_rect)
                    .ok_or_else(|| {
                        GeoError::InvalidGeometry(format!("polygon {index} has no coordinates"))
                    })
            })
            .collect::<GeoResult<Vec<_>>>()?;

        Ok(Self { polygons, bounds })
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.polygons
    }

    pub fn bounds(&self) -> &[BoundingBox] {
        &self.bounds
    }

    /// Picks a polygon uniformly (not weighted by area), then rejection samples
    /// inside it. Returns the polygon index with the accepted point.
    pub fn sample<R: Rng>(
        &self,
        rng: &mut R,
        max_attempts: u64,
    ) -> GeoResult<(usize, geo::Point<f64>)> {
        let index = rng.random_range(0..self.polygons.len());
        random_point_in_polygon(rng, &self.polygons[index], &self.bounds[index], max_attempts)
            .map(|point| (index, point))
            .ok_or(GeoError::ConstraintUnsatisfiable {
                polygon: index,
                attempts: max_attempts,
            })
    }
}

/// Pairs drawn strictly inside a `PolygonSet`.
pub struct ClippedPairs {
    polygons: PolygonSet,
    rng: SharedRng,
    lat_first: bool,
    max_attempts: u64,
}

impl ClippedPairs {
    pub fn new(polygons: PolygonSet, rng: SharedRng, lat_first: bool, max_attempts: u64) -> Self {
        Self {
            polygons,
            rng,
            lat_first,
            max_attempts,
        }
    }
}

impl PairSource for ClippedPairs {
    fn next_pair(&mut self, iteration: u64) -> GeoResult<GeoPair> {
        let mut rng = self.rng.borrow_mut();
        match self.polygons.sample(&mut *rng, self.max_attempts) {
            Ok((_, point)) => Ok(GeoPair::from_point(point, self.lat_first)),
            Err(err) => {
                tracing::warn!(iteration, error = %err, "rejection sampling gave up");
                Err(err)
            }
        }
    }

    fn lat_first(&self) -> bool {
        self.lat_first
    }
}
