use std::time::Duration;

use anyhow::{bail, Context, Result};
use hexmap::{CacheKey, H3Indexer, HexSession, Viewport};
use serde::Deserialize;
use tracing::{debug, info};

use super::load_config;

/// One line of the events file: a viewport change at `at_ms` after start.
#[derive(Debug, Clone, Copy, Deserialize)]
struct ViewportEvent {
    at_ms: u64,
    #[serde(flatten)]
    viewport: Viewport,
}

/// Parse JSON lines, skipping blanks. Timestamps must not go backwards.
fn parse_events(text: &str) -> Result<Vec<ViewportEvent>> {
    let mut events: Vec<ViewportEvent> = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() { continue }
        let event: ViewportEvent = serde_json::from_str(line)
            .with_context(|| format!("line {}", i + 1))?;
        if let Some(prev) = events.last() {
            if event.at_ms < prev.at_ms {
                bail!("line {}: at_ms {} is earlier than {}", i + 1, event.at_ms, prev.at_ms);
            }
        }
        events.push(event);
    }
    Ok(events)
}

type Session = HexSession<H3Indexer, Duration>;

/// Fire every recompute that falls due at or before `now`.
fn fire_due(session: &mut Session, now: Duration) {
    loop {
        let Some(deadline) = session.deadline() else { return };
        if deadline > now { return }

        let hits = session.cache().hits();
        let Some(hexagons) = session.poll(deadline) else { return };
        let Some(viewport) = session.viewport().copied() else { return };

        let resolution = viewport.resolution();
        let key = CacheKey::new(resolution, &viewport.buffered(session.config().buffer_degrees));
        let outcome = if session.cache().hits() > hits { "hit" } else { "miss" };
        println!("t={}ms res={resolution} key={key} cells={} {outcome}", deadline.as_millis(), hexagons.len());
    }
}

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::ReplayArgs) -> Result<()> {
    let config = load_config(cli)?;
    let text = std::fs::read_to_string(&args.events)
        .with_context(|| format!("reading {}", args.events.display()))?;
    let events = parse_events(&text)
        .with_context(|| format!("parsing {}", args.events.display()))?;

    let mut session = Session::with_indexer(config, H3Indexer)?;
    session.load_geojson_file(&args.source)
        .with_context(|| format!("loading {}", args.source.display()))?;

    for event in &events {
        let now = Duration::from_millis(event.at_ms);
        fire_due(&mut session, now);
        debug!(at_ms = event.at_ms, zoom = event.viewport.zoom, "viewport change");
        session.notify(event.viewport, now);
    }
    if let Some(deadline) = session.deadline() {
        fire_due(&mut session, deadline);
    }
    session.shutdown();

    let cache = session.cache();
    info!(events = events.len(), entries = cache.len(), hits = cache.hits(), misses = cache.misses(), "replay finished");
    Ok(())
}
