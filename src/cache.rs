//! Memoized hexagon sets keyed by resolution and quantized viewport origin.
//!
//! The key only looks at the buffered south-west corner, rounded to a tenth of
//! a degree. Viewports with the same corner share an entry even when their
//! extents differ; a hit is returned as stored, without checking it against
//! the live bounds. Entries are never replaced or evicted, so memory grows with
//! every distinct key visited during a session.

use std::{fmt, sync::Arc};

use ahash::AHashMap;
use tracing::debug;

use crate::{geom::ViewBounds, hex::HexagonPolygon};

/// Quantization steps per degree (one decimal place).
const STEPS_PER_DEGREE: f64 = 10.0;

/// Round half up (ties go toward +inf), matching the key scheme used by map clients.
#[inline]
fn quantize(degrees: f64) -> i64 {
    (degrees * STEPS_PER_DEGREE + 0.5).floor() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub resolution: u8,
    pub lat: i64, // tenths of a degree
    pub lng: i64, // tenths of a degree
}

impl CacheKey {
    pub fn new(resolution: u8, bounds: &ViewBounds) -> Self {
        Self {
            resolution,
            lat: quantize(bounds.min_lat()),
            lng: quantize(bounds.min_lng()),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.resolution, self.lat, self.lng)
    }
}

/// Unbounded, append-only map from `CacheKey` to a shared hexagon set.
#[derive(Debug, Default)]
pub struct ViewportCache {
    entries: AHashMap<CacheKey, Arc<[HexagonPolygon]>>,
    hits: u64,
    misses: u64,
}

impl ViewportCache {
    pub fn new() -> Self { Self::default() }

    /// Stored set for `(resolution, bounds)`, computing and storing it on a miss.
    /// `compute` runs only on a miss; an existing entry is never recomputed.
    pub fn get_or_compute<F>(&mut self, resolution: u8, bounds: &ViewBounds, compute: F) -> Arc<[HexagonPolygon]>
    where
        F: FnOnce() -> Vec<HexagonPolygon>,
    {
        let key = CacheKey::new(resolution, bounds);
        if let Some(hexagons) = self.entries.get(&key) {
            self.hits += 1;
            debug!(%key, cells = hexagons.len(), "cache hit");
            return hexagons.clone();
        }

        self.misses += 1;
        let hexagons: Arc<[HexagonPolygon]> = compute().into();
        debug!(%key, cells = hexagons.len(), entries = self.entries.len() + 1, "cache miss");
        self.entries.insert(key, hexagons.clone());
        hexagons
    }

    #[inline] pub fn get(&self, key: &CacheKey) -> Option<&Arc<[HexagonPolygon]>> { self.entries.get(key) }

    #[inline] pub fn contains(&self, key: &CacheKey) -> bool { self.entries.contains_key(key) }

    #[inline] pub fn len(&self) -> usize { self.entries.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    #[inline] pub fn hits(&self) -> u64 { self.hits }

    #[inline] pub fn misses(&self) -> u64 { self.misses }
}
