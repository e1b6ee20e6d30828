//! LRU memoization of geocoding results

use log::debug;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use super::{Coordinates, GeocodeError, Geocoder};

/// Wraps a geocoder with a bounded cache keyed by the exact address text
///
/// Only successful lookups are remembered. The lock is not held while the
/// inner geocoder runs.
pub struct MemoizedGeocoder<G> {
    inner: G,
    cache: Mutex<LruCache<String, Coordinates>>,
}

impl<G: Geocoder> MemoizedGeocoder<G> {
    /// A capacity of 0 is treated as 1
    pub fn new(inner: G, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        MemoizedGeocoder {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of cached addresses
    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<G: Geocoder> Geocoder for MemoizedGeocoder<G> {
    fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(coords) = cache.get(address) {
                debug!("Geocode cache hit for {:?}", address);
                return Ok(*coords);
            }
        }

        let coords = self.inner.geocode(address)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(address.to_string(), coords);
        }
        Ok(coords)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
