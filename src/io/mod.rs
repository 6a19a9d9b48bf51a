//! Reading geometry sources and writing hexagon sets.

mod geojson;

pub use geojson::{
    features_to_geojson,
    hexagons_to_geojson,
    read_from_geojson_bytes,
    read_from_geojson_file,
    write_hexagons_to_geojson_bytes,
};
