mod feature;
mod viewport;

pub use feature::{Feature, FeatureCollection, Geometry};
pub use viewport::{ViewBounds, Viewport};
