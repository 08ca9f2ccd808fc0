use crate::app::{App, LoadState};
use crate::data::TowerRecord;
use crate::map::{MapLayers, MARKER_FILL, MARKER_STROKE};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

/// Render the UI for the current presenter state.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    match app.state {
        LoadState::Loading { .. } => render_loading(frame, chunks[0]),
        LoadState::Ready { .. } => render_map(frame, app, chunks[0]),
    }
    render_status_bar(frame, app, chunks[1]);
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let block = map_block();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let message = Paragraph::new(Line::from(Span::styled(
        "Loading tower data...",
        Style::default().fg(Color::Yellow),
    )))
    .centered();

    // Vertically center the one-line message
    let y = inner.y + inner.height / 2;
    frame.render_widget(message, Rect::new(inner.x, y, inner.width, 1));
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = map_block();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layers = app
        .map_renderer
        .render(inner.width as usize, inner.height as usize, &viewport, &app.towers);

    frame.render_widget(TowerMapWidget { layers }, inner);

    if let Some(error) = app.load_error() {
        render_error_banner(frame, inner, error);
    }

    if let Some(tower) = app.hovered_tower() {
        render_tooltip(frame, app, inner, tower);
    }
}

fn map_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Cell Towers ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
}

/// Braille map layers painted back to front with per-layer colors.
struct TowerMapWidget {
    layers: MapLayers,
}

impl TowerMapWidget {
    fn paint_layer(canvas: &crate::braille::BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille cells (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for TowerMapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Self::paint_layer(&self.layers.basemap, Color::DarkGray, area, buf);
        Self::paint_layer(&self.layers.marker_fill, MARKER_FILL, area, buf);
        Self::paint_layer(&self.layers.marker_stroke, MARKER_STROKE, area, buf);
    }
}

/// One-line load failure banner across the top of the map area.
fn render_error_banner(frame: &mut Frame, inner: Rect, error: &str) {
    if inner.height == 0 {
        return;
    }
    let banner = Paragraph::new(Line::from(vec![
        Span::styled(
            " load failed: ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{error} "),
            Style::default().fg(Color::White).bg(Color::Red),
        ),
    ]));
    let area = Rect::new(inner.x, inner.y, inner.width, 1);
    frame.render_widget(Clear, area);
    frame.render_widget(banner, area);
}

/// Tooltip lines for a tower record: owner name (or "Unknown"), then
/// status, height, and location verbatim.
pub fn tooltip_lines(tower: &TowerRecord) -> [String; 4] {
    let owner = tower.field("Owner Name");
    [
        if owner.is_empty() {
            "Unknown".to_string()
        } else {
            owner.to_string()
        },
        format!("Status: {}", tower.field("Status")),
        format!("Height: {} ft", tower.field("Overall Height Above Ground (AGL)")),
        format!("Location: {}", tower.field("Structure City/State")),
    ]
}

/// Small popup next to the cursor with the hovered tower's details.
fn render_tooltip(frame: &mut Frame, app: &App, inner: Rect, tower: &TowerRecord) {
    let Some((col, row)) = app.mouse_pos else {
        return;
    };

    let lines = tooltip_lines(tower);
    let width = (lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 2).min(inner.width);
    let height = (lines.len() as u16 + 2).min(inner.height);
    if width < 3 || height < 3 {
        return;
    }

    // Place beside the cursor, flipping left/up near the edges
    let mut x = col.saturating_add(2);
    if x + width > inner.x + inner.width {
        x = col.saturating_sub(width + 1).max(inner.x);
    }
    let mut y = row;
    if y + height > inner.y + inner.height {
        y = (inner.y + inner.height).saturating_sub(height);
    }

    let mut text: Vec<Line> = Vec::with_capacity(lines.len());
    let mut iter = lines.iter();
    if let Some(owner) = iter.next() {
        text.push(Line::from(Span::styled(
            owner.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    for line in iter {
        text.push(Line::from(line.clone()));
    }

    let popup = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );

    let area = Rect::new(x, y, width, height);
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = Line::from(vec![
        Span::styled(" Towers: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.towers.len().to_string(),
            Style::default().fg(Color::Green),
        ),
        Span::styled(" | Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(
            " | hjkl:pan +/-:zoom r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_towers;

    #[test]
    fn test_tooltip_owner_fallback() {
        let towers = parse_towers(
            "Latitude,Longitude,Owner Name,Status\n36.1,-84.2,,Constructed\n",
        );
        let lines = tooltip_lines(towers.iter().next().unwrap());
        assert_eq!(lines[0], "Unknown");
        assert_eq!(lines[1], "Status: Constructed");
    }

    #[test]
    fn test_tooltip_owner_verbatim() {
        let towers = parse_towers("Latitude,Longitude,Owner Name\n36.1,-84.2,Acme\n");
        let lines = tooltip_lines(towers.iter().next().unwrap());
        assert_eq!(lines[0], "Acme");
    }

    #[test]
    fn test_tooltip_other_fields_have_no_fallback() {
        let towers = parse_towers("Latitude,Longitude\n36.1,-84.2\n");
        let lines = tooltip_lines(towers.iter().next().unwrap());
        // Absent fields render blank, not a placeholder
        assert_eq!(lines[1], "Status: ");
        assert_eq!(lines[2], "Height:  ft");
        assert_eq!(lines[3], "Location: ");
    }
}
