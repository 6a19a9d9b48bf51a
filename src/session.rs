use std::{path::Path, sync::Arc};

use geo::Coord;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::{
    cache::ViewportCache,
    config::HexConfig,
    error::Result,
    geom::{FeatureCollection, Viewport},
    hex::{hexagonize, ColorRule, H3Indexer, HexIndexer, HexagonPolygon},
    io::{read_from_geojson_bytes, read_from_geojson_file},
    proj::{Crs, Reproject, Transformer},
    scheduler::{Debouncer, Tick},
};

/// Working CRS of loaded features and emitted hexagons.
pub const WORKING_CRS: Crs = Crs::Wgs84;

/// One map view: loaded features, the per-viewport cache and the debounce state.
///
/// Everything runs on the caller's thread. A session shared between threads
/// must sit behind a lock, since lookups write to the cache.
#[derive(Debug)]
pub struct HexSession<I = H3Indexer, T = Instant> {
    config: HexConfig,
    colors: ColorRule,
    indexer: I,
    features: FeatureCollection,
    cache: ViewportCache,
    debouncer: Debouncer<T>,
    viewport: Option<Viewport>,
}

impl HexSession {
    /// Session on the H3 grid, debounced against tokio's clock.
    pub fn new(config: HexConfig) -> Result<Self> {
        Self::with_indexer(config, H3Indexer)
    }
}

impl<I: HexIndexer, T: Tick> HexSession<I, T> {
    /// Fails with `HexError::Config` (or `UnsupportedProjection`) when `config`
    /// does not pass `HexConfig::validate`.
    pub fn with_indexer(config: HexConfig, indexer: I) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            colors: ColorRule::from_config(&config)?,
            debouncer: Debouncer::new(config.debounce_window()),
            config,
            indexer,
            features: FeatureCollection::default(),
            cache: ViewportCache::new(),
            viewport: None,
        })
    }

    #[inline] pub fn config(&self) -> &HexConfig { &self.config }

    #[inline] pub fn features(&self) -> &FeatureCollection { &self.features }

    #[inline] pub fn cache(&self) -> &ViewportCache { &self.cache }

    #[inline] pub fn has_data(&self) -> bool { !self.features.is_empty() }

    /// Latest viewport received through `notify`.
    #[inline] pub fn viewport(&self) -> Option<&Viewport> { self.viewport.as_ref() }

    /// Reproject `source` from the configured source CRS and make it the session's data.
    /// On failure the session is left without data and the error is returned.
    pub fn load(&mut self, source: FeatureCollection) -> Result<usize> {
        self.features = FeatureCollection::default();
        self.cache = ViewportCache::new();

        let projected = self.config.source_crs()
            .and_then(|from| Transformer::new(from, WORKING_CRS))
            .and_then(|transformer| source.reproject(&transformer));

        match projected {
            Ok(features) => {
                let skipped = features.features().iter().filter(|f| f.geometry.is_none()).count();
                if skipped > 0 {
                    debug!(skipped, "features without usable geometry will be ignored");
                }
                info!(features = features.len(), skipped, source_crs = %self.config.source_crs, "loaded geometry source");
                self.features = features;
                Ok(self.features.len())
            }
            Err(e) => {
                error!(error = %e, "failed to load geometry source");
                Err(e)
            }
        }
    }

    /// Parse GeoJSON bytes and `load` them.
    pub fn load_geojson_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        match read_from_geojson_bytes(bytes) {
            Ok(source) => self.load(source),
            Err(e) => self.fail_load(e),
        }
    }

    /// Read a GeoJSON file and `load` it.
    pub fn load_geojson_file(&mut self, path: &Path) -> Result<usize> {
        match read_from_geojson_file(path) {
            Ok(source) => self.load(source),
            Err(e) => self.fail_load(e),
        }
    }

    fn fail_load(&mut self, e: crate::HexError) -> Result<usize> {
        error!(error = %e, "failed to load geometry source");
        self.features = FeatureCollection::default();
        self.cache = ViewportCache::new();
        Err(e)
    }

    /// Initial map center: vertex average of the first feature's first outer ring.
    pub fn center(&self) -> Option<Coord<f64>> {
        self.features.features().first()?.ring_center()
    }

    /// Hexagons visible in `viewport`, from the cache when the key was seen before.
    /// Without data the result is empty and nothing is cached.
    pub fn hexagons(&mut self, viewport: &Viewport) -> Arc<[HexagonPolygon]> {
        if self.features.is_empty() { return Arc::from(Vec::new()) }

        let resolution = viewport.resolution();
        let bounds = viewport.buffered(self.config.buffer_degrees);
        let Self { cache, features, indexer, colors, .. } = self;
        cache.get_or_compute(resolution, &bounds, || hexagonize(&*features, &bounds, resolution, &*indexer, &*colors))
    }

    /// Record a viewport change at `now`. Returns false after `shutdown`.
    pub fn notify(&mut self, viewport: Viewport, now: T) -> bool {
        if !self.debouncer.notify(now) { return false }
        self.viewport = Some(viewport);
        true
    }

    /// Recompute for the latest viewport once the debounce window has passed.
    /// Yields the full replacement set for the renderer, or `None` if nothing is due.
    pub fn poll(&mut self, now: T) -> Option<Arc<[HexagonPolygon]>> {
        if !self.debouncer.poll(now) { return None }
        let viewport = self.viewport?;
        Some(self.hexagons(&viewport))
    }

    /// Next time `poll` can fire.
    #[inline] pub fn deadline(&self) -> Option<T> { self.debouncer.deadline() }

    /// Cancel any pending recompute; `notify` and `poll` do nothing afterwards.
    pub fn shutdown(&mut self) {
        self.debouncer.shutdown();
        debug!(entries = self.cache.len(), "session shut down");
    }
}
