use crate::braille::BrailleCanvas;
use crate::data::{LineString, TowerCollection};
use crate::map::geometry::{draw_disc, draw_line, draw_ring};
use crate::map::projection::Viewport;
use ratatui::style::Color;

/// Marker radius in braille pixels.
pub const MARKER_RADIUS: i32 = 2;
/// Marker fill color.
pub const MARKER_FILL: Color = Color::Rgb(59, 130, 246);
/// Marker stroke color (darker blue ring).
pub const MARKER_STROKE: Color = Color::Rgb(30, 64, 175);

/// Rendered braille layers, back to front. Each layer carries one color
/// when drawn to the terminal buffer.
pub struct MapLayers {
    pub basemap: BrailleCanvas,
    pub marker_fill: BrailleCanvas,
    pub marker_stroke: BrailleCanvas,
}

/// Renders the base map and tower markers into braille layers.
///
/// This is the mapping-widget side of the system: it receives coordinates
/// and style constants and produces pixels; nothing flows back into the
/// tower data model.
pub struct MapRenderer {
    basemap: Vec<LineString>,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            basemap: Vec::new(),
        }
    }

    /// Install boundary lines for the base-map layer.
    pub fn set_basemap(&mut self, lines: Vec<LineString>) {
        self.basemap = lines;
    }

    pub fn has_basemap(&self) -> bool {
        !self.basemap.is_empty()
    }

    /// Render all layers at the given character dimensions.
    pub fn render(&self, width: usize, height: usize, viewport: &Viewport, towers: &TowerCollection) -> MapLayers {
        let mut basemap = BrailleCanvas::new(width, height);
        let mut marker_fill = BrailleCanvas::new(width, height);
        let mut marker_stroke = BrailleCanvas::new(width, height);

        if self.basemap.is_empty() {
            self.draw_graticule(&mut basemap, viewport);
        } else {
            for line in &self.basemap {
                draw_polyline(&mut basemap, line, viewport);
            }
        }

        for tower in towers.iter() {
            let (px, py) = viewport.project(tower.longitude, tower.latitude);
            if viewport.is_visible(px, py) {
                draw_disc(&mut marker_fill, px, py, MARKER_RADIUS - 1);
                draw_ring(&mut marker_stroke, px, py, MARKER_RADIUS);
            }
        }

        MapLayers {
            basemap,
            marker_fill,
            marker_stroke,
        }
    }

    /// Fallback base map: a one-degree lat/lon grid over the visible area.
    fn draw_graticule(&self, canvas: &mut BrailleCanvas, viewport: &Viewport) {
        let (west, north) = viewport.unproject(0, 0);
        let (east, south) = viewport.unproject(viewport.width as i32, viewport.height as i32);

        let lon_start = west.floor() as i32;
        let lon_end = east.ceil() as i32;
        for lon in lon_start..=lon_end {
            let (px, _) = viewport.project(lon as f64, viewport.center_lat);
            if px >= 0 && px < viewport.width as i32 {
                for py in (0..viewport.height as i32).step_by(3) {
                    canvas.set_pixel_signed(px, py);
                }
            }
        }

        let lat_start = south.floor() as i32;
        let lat_end = north.ceil() as i32;
        for lat in lat_start..=lat_end {
            let (_, py) = viewport.project(viewport.center_lon, lat as f64);
            if py >= 0 && py < viewport.height as i32 {
                for px in (0..viewport.width as i32).step_by(3) {
                    canvas.set_pixel_signed(px, py);
                }
            }
        }
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw a (lon, lat) polyline with viewport culling.
fn draw_polyline(canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;
    for &(lon, lat) in line {
        let (px, py) = viewport.project(lon, lat);
        if let Some((prev_x, prev_y)) = prev {
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.segment_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }
        prev = Some((px, py));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_towers;

    fn viewport_for(width: usize, height: usize, towers: &TowerCollection) -> Viewport {
        let (lat, lon) = towers.center();
        Viewport::new(lon, lat, 40.0, width * 2, height * 4)
    }

    #[test]
    fn test_visible_tower_produces_marker_pixels() {
        let towers = parse_towers("Latitude,Longitude\n36.0,-84.5\n");
        let viewport = viewport_for(40, 20, &towers);
        let layers = MapRenderer::new().render(40, 20, &viewport, &towers);
        assert!(!layers.marker_fill.is_blank());
        assert!(!layers.marker_stroke.is_blank());
    }

    #[test]
    fn test_offscreen_tower_draws_nothing() {
        let towers = parse_towers("Latitude,Longitude\n-33.9,151.2\n");
        // Viewport fixed over Tennessee; the tower is in Sydney.
        let viewport = Viewport::new(-84.5, 36.0, 40.0, 80, 80);
        let layers = MapRenderer::new().render(40, 20, &viewport, &towers);
        assert!(layers.marker_fill.is_blank());
        assert!(layers.marker_stroke.is_blank());
    }

    #[test]
    fn test_graticule_fallback_when_no_basemap() {
        let towers = TowerCollection::default();
        let viewport = viewport_for(40, 20, &towers);
        let renderer = MapRenderer::new();
        assert!(!renderer.has_basemap());
        let layers = renderer.render(40, 20, &viewport, &towers);
        assert!(!layers.basemap.is_blank());
    }

    #[test]
    fn test_basemap_lines_drawn() {
        let towers = TowerCollection::default();
        let viewport = viewport_for(40, 20, &towers);
        let mut renderer = MapRenderer::new();
        renderer.set_basemap(vec![vec![(-85.0, 35.5), (-84.0, 36.5)]]);
        let layers = renderer.render(40, 20, &viewport, &towers);
        assert!(!layers.basemap.is_blank());
    }
}
