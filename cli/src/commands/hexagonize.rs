use std::io::Write;

use anyhow::{Context, Result};
use hexmap::{write_hexagons_to_geojson_bytes, HexSession};
use tracing::info;

use super::load_config;

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::HexagonizeArgs) -> Result<()> {
    let mut session = HexSession::new(load_config(cli)?)?;
    session.load_geojson_file(&args.source)
        .with_context(|| format!("loading {}", args.source.display()))?;

    let viewport = args.bbox.viewport(args.zoom);
    let hexagons = session.hexagons(&viewport);
    info!(resolution = viewport.resolution(), cells = hexagons.len(), "hexagonized viewport");

    let bytes = write_hexagons_to_geojson_bytes(&hexagons)?;
    match &args.output {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("writing {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
