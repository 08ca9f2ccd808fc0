mod geometry;
mod projection;
mod renderer;

pub use projection::Viewport;
pub use renderer::{MapLayers, MapRenderer, MARKER_FILL, MARKER_RADIUS, MARKER_STROKE};
