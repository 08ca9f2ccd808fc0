use anyhow::{anyhow, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;
use tower_map::app::{App, LoadState};
use tower_map::{data, ui};

/// Default tower CSV when no path argument is given.
const DEFAULT_TOWER_CSV: &str = "data/cell_towers.csv";
/// Optional base-map boundary overlay.
const BASEMAP_FILE: &str = "data/basemap.json";
/// Give up on a load that has not settled by this deadline.
const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> Result<()> {
    let csv_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TOWER_CSV));

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, &csv_path);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Kick off the tower load on a background thread. The result comes back
/// over the channel; if the app is torn down first the send fails and the
/// completion is a no-op.
fn spawn_loader(csv_path: &Path) -> Receiver<Result<data::TowerCollection>> {
    let (tx, rx) = mpsc::channel();
    let path = csv_path.to_path_buf();
    thread::spawn(move || {
        let _ = tx.send(data::load_towers(&path));
    });
    rx
}

/// Poll the loader channel and drive the Loading -> Ready transition,
/// including the timeout path. The transition is unconditional: the app
/// always reaches Ready.
fn poll_loader(app: &mut App, loader: &Receiver<Result<data::TowerCollection>>) {
    let LoadState::Loading { started } = &app.state else {
        return;
    };
    let started = *started;

    match loader.try_recv() {
        Ok(outcome) => app.finish_load(outcome),
        Err(TryRecvError::Empty) => {
            if started.elapsed() > LOAD_TIMEOUT {
                app.finish_load(Err(anyhow!(
                    "tower data load timed out after {}s",
                    LOAD_TIMEOUT.as_secs()
                )));
            }
        }
        Err(TryRecvError::Disconnected) => {
            app.finish_load(Err(anyhow!("tower data loader exited unexpectedly")));
        }
    }
}

/// Handle mouse events for panning, zooming, and hover tracking
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track position for the hover tooltip
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel zooms towards the cursor
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll pans (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Click and drag to pan
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
        }
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, csv_path: &Path) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize);

    // Base map is optional; warn and fall back to the graticule
    match data::load_basemap(Path::new(BASEMAP_FILE)) {
        Ok(lines) => app.map_renderer.set_basemap(lines),
        Err(e) => eprintln!("Warning: no base map loaded from {BASEMAP_FILE}: {e}"),
    }

    let loader = spawn_loader(csv_path);

    // Main loop
    loop {
        poll_loader(&mut app, &loader);

        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Pan with hjkl or arrow keys
                            KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                            KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                            KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                            KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                            // Reset view to the tower centroid
                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width as usize, height as usize);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_loader_result_installs_towers() {
        let mut app = App::new(80, 24);
        let (tx, rx) = mpsc::channel();
        tx.send(Ok(data::parse_towers("Latitude,Longitude\n36.1,-84.2\n")))
            .unwrap();
        poll_loader(&mut app, &rx);
        assert!(!app.is_loading());
        assert_eq!(app.towers.len(), 1);
    }

    #[test]
    fn test_loader_disconnect_reaches_ready() {
        let mut app = App::new(80, 24);
        let (tx, rx) = mpsc::channel::<Result<data::TowerCollection>>();
        drop(tx);
        poll_loader(&mut app, &rx);
        assert!(!app.is_loading());
        assert!(app.load_error().is_some());
    }

    #[test]
    fn test_loader_timeout_reaches_ready() {
        let mut app = App::new(80, 24);
        app.state = LoadState::Loading {
            started: Instant::now() - (LOAD_TIMEOUT + Duration::from_secs(1)),
        };
        let (_tx, rx) = mpsc::channel::<Result<data::TowerCollection>>();
        poll_loader(&mut app, &rx);
        assert!(!app.is_loading());
        assert!(app.load_error().unwrap().contains("timed out"));
    }

    #[test]
    fn test_pending_load_stays_loading() {
        let mut app = App::new(80, 24);
        let (_tx, rx) = mpsc::channel::<Result<data::TowerCollection>>();
        poll_loader(&mut app, &rx);
        assert!(app.is_loading());
    }
}
