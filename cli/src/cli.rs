use std::path::PathBuf;

use hexmap::Viewport;

/// Hexagon grid CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "hexmap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// TOML configuration file (source CRS, buffer, debounce, colors)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Compute the hexagons visible in one viewport and write them as GeoJSON
    Hexagonize(HexagonizeArgs),

    /// Drive a session with a timestamped stream of viewport events
    Replay(ReplayArgs),

    /// Print the grid resolution used at a zoom level
    Resolution(ResolutionArgs),
}

#[derive(clap::Args, Debug)]
pub struct HexagonizeArgs {
    /// Source GeoJSON FeatureCollection
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub source: PathBuf,

    /// Visible area as minLng,minLat,maxLng,maxLat (degrees)
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
    pub bbox: Bbox,

    /// Map zoom level
    #[arg(short, long, allow_negative_numbers = true)]
    pub zoom: f64,

    /// Output GeoJSON file, defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ReplayArgs {
    /// Source GeoJSON FeatureCollection
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub source: PathBuf,

    /// JSON lines: {"at_ms": 0, "min_lat": .., "max_lat": .., "min_lng": .., "max_lng": .., "zoom": ..}
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub events: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ResolutionArgs {
    /// Map zoom level
    #[arg(allow_negative_numbers = true)]
    pub zoom: f64,
}

/// Geographic rectangle given on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl Bbox {
    pub fn viewport(&self, zoom: f64) -> Viewport {
        Viewport::new(self.min_lat, self.max_lat, self.min_lng, self.max_lng, zoom)
    }
}

fn parse_bbox(s: &str) -> Result<Bbox, String> {
    let values = s.split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|e| format!("{part:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;

    let [min_lng, min_lat, max_lng, max_lat] = values[..] else {
        return Err(format!("expected 4 comma-separated numbers, got {}", values.len()));
    };
    Ok(Bbox { min_lng, min_lat, max_lng, max_lat })
}
