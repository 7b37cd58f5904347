use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

use crate::{GeoPair, GeoResult};

/// Random source shared by every supplier built from one `Loader`.
pub type SharedRng = Rc<RefCell<StdRng>>;

pub fn shared_rng(seed: Option<u64>) -> SharedRng {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    Rc::new(RefCell::new(rng))
}

/// Produces one value per iteration of a generation run.
pub trait ValueSupplier {
    fn next(&mut self, iteration: u64) -> GeoResult<Value>;
}

/// Produces the coordinate pairs that the formatting suppliers consume.
pub trait PairSource {
    fn next_pair(&mut self, iteration: u64) -> GeoResult<GeoPair>;

    /// Ordering of the pairs this source emits.
    fn lat_first(&self) -> bool;
}

impl<T: PairSource + ?Sized> PairSource for Box<T> {
    fn next_pair(&mut self, iteration: u64) -> GeoResult<GeoPair> {
        (**self).next_pair(iteration)
    }

    fn lat_first(&self) -> bool {
        (**self).lat_first()
    }
}

/// Holds the most recent pair so every reader asking for the same iteration
/// sees the same point.
pub struct BufferedPairs {
    inner: Box<dyn PairSource>,
    slot: Option<(u64, GeoPair)>,
}

impl BufferedPairs {
    pub fn new(inner: Box<dyn PairSource>) -> Self {
        Self { inner, slot: None }
    }

    pub fn shared(inner: Box<dyn PairSource>) -> SharedPairs {
        SharedPairs(Rc::new(RefCell::new(Self::new(inner))))
    }
}

impl PairSource for BufferedPairs {
    fn next_pair(&mut self, iteration: u64) -> GeoResult<GeoPair> {
        if let Some((cached, pair)) = self.slot {
            if cached == iteration {
                return Ok(pair);
            }
        }
        let pair = self.inner.next_pair(iteration)?;
        self.slot = Some((iteration, pair));
        Ok(pair)
    }

    fn lat_first(&self) -> bool {
        self.inner.lat_first()
    }
}

/// Cloneable handle onto one `BufferedPairs`.
#[derive(Clone)]
pub struct SharedPairs(Rc<RefCell<BufferedPairs>>);

impl PairSource for SharedPairs {
    fn next_pair(&mut self, iteration: u64) -> GeoResult<GeoPair> {
        self.0.borrow_mut().next_pair(iteration)
    }

    fn lat_first(&self) -> bool {
        self.0.borrow().lat_first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        calls: u64,
    }

    impl PairSource for Counter {
        fn next_pair(&mut self, _iteration: u64) -> GeoResult<GeoPair> {
            self.calls += 1;
            Ok(GeoPair::new(self.calls as f64, 0.0))
        }

        fn lat_first(&self) -> bool {
            false
        }
    }

    #[test]
    fn same_iteration_reuses_slot() {
        let mut first = BufferedPairs::shared(Box::new(Counter { calls: 0 }));
        let mut second = first.clone();

        assert_eq!(first.next_pair(0).unwrap().first, 1.0);
        assert_eq!(second.next_pair(0).unwrap().first, 1.0);
        assert_eq!(second.next_pair(1).unwrap().first, 2.0);
        assert_eq!(first.next_pair(1).unwrap().first, 2.0);
        assert_eq!(first.next_pair(2).unwrap().first, 3.0);
    }

    #[test]
    fn seeded_rngs_agree() {
        use rand::Rng;

        let a = shared_rng(Some(42));
        let b = shared_rng(Some(42));
        let x: f64 = a.borrow_mut().random();
        let y: f64 = b.borrow_mut().random();
        assert_eq!(x, y);
    }
}
