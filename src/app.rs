use crate::data::{TowerCollection, TowerRecord};
use crate::map::{MapRenderer, Viewport, MARKER_RADIUS};
use anyhow::Result;
use std::time::Instant;

/// Zoom factor for the initial regional view.
const INITIAL_ZOOM: f64 = 60.0;

/// Presenter state: a single unconditional transition from `Loading` to
/// `Ready` once the load settles, whether it succeeded or failed.
pub enum LoadState {
    Loading { started: Instant },
    Ready { error: Option<String> },
}

/// Application state: the load state machine, the tower collection, and
/// the viewport the user steers.
pub struct App {
    pub state: LoadState,
    pub towers: TowerCollection,
    pub viewport: Viewport,
    pub map_renderer: MapRenderer,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for hover tooltips
    pub mouse_pos: Option<(u16, u16)>,
}

impl App {
    pub fn new(width: usize, height: usize) -> Self {
        let (lat, lon) = TowerCollection::default().center();
        // Braille gives 2x4 resolution per character; leave room for the
        // border and the status bar.
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3);

        Self {
            state: LoadState::Loading {
                started: Instant::now(),
            },
            towers: TowerCollection::default(),
            viewport: Viewport::new(lon, lat, INITIAL_ZOOM, inner_width * 2, inner_height * 4),
            map_renderer: MapRenderer::new(),
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
        }
    }

    /// The one state transition: install the load outcome and enter
    /// `Ready`. A failed load leaves the collection empty and records the
    /// error for the banner; there is no retry path.
    pub fn finish_load(&mut self, outcome: Result<TowerCollection>) {
        match outcome {
            Ok(towers) => {
                self.towers = towers;
                let (lat, lon) = self.towers.center();
                self.viewport.center_lat = lat;
                self.viewport.center_lon = lon;
                self.state = LoadState::Ready { error: None };
            }
            Err(e) => {
                self.state = LoadState::Ready {
                    error: Some(format!("{e:#}")),
                };
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading { .. })
    }

    /// Banner text for a failed load, if any.
    pub fn load_error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Ready { error } => error.as_deref(),
            LoadState::Loading { .. } => None,
        }
    }

    /// Update viewport size when the terminal resizes.
    pub fn resize(&mut self, width: usize, height: usize) {
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3);
        self.viewport.width = inner_width * 2;
        self.viewport.height = inner_height * 4;
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Zoom in towards a terminal cell position.
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
    }

    /// Zoom out from a terminal cell position.
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
    }

    /// Recenter the view on the tower centroid at the initial zoom.
    pub fn reset_view(&mut self) {
        let (lat, lon) = self.towers.center();
        self.viewport.center_lat = lat;
        self.viewport.center_lon = lon;
        self.viewport.zoom = INITIAL_ZOOM;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Handle mouse drag panning.
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            // Drag distance is in terminal cells; scale to braille pixels
            self.pan(dx * 2, dy * 4);
        }
        self.last_mouse = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// The tower under the mouse cursor, if any: the nearest marker whose
    /// projected position lies within the marker radius (plus a small
    /// hover slop) of the cursor.
    pub fn hovered_tower(&self) -> Option<&TowerRecord> {
        let (col, row) = self.mouse_pos?;
        let (mx, my) = cell_to_pixel(col, row);
        let max_dist2 = (MARKER_RADIUS + 2).pow(2);

        self.towers
            .iter()
            .filter_map(|tower| {
                let (px, py) = self.viewport.project(tower.longitude, tower.latitude);
                let d2 = (px - mx).pow(2) + (py - my).pow(2);
                (d2 <= max_dist2).then_some((d2, tower))
            })
            .min_by_key(|(d2, _)| *d2)
            .map(|(_, tower)| tower)
    }

    /// Status-bar form of the current view center.
    pub fn center_coords(&self) -> String {
        format!(
            "{:.2}°{}, {:.2}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }
}

/// Convert a terminal cell position to braille pixel coordinates,
/// accounting for the one-cell map border.
fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
    let px = (col.saturating_sub(1)) as i32 * 2;
    let py = (row.saturating_sub(1)) as i32 * 4;
    (px, py)
}
