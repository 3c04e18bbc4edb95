//! sitetree: a terminal admin console for a school-site section tree.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::layout::Position;
use ratatui::{backend::CrosstermBackend, Terminal};
use sitetree::{app_state, config, ui};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sitetree")]
#[command(about = "Terminal sitemap and step-wizard console", long_about = None)]
struct Args {
    /// Backend base URL (overrides sitetree.toml)
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Log file path (overrides sitetree.toml)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Open the step wizard instead of the sitemap
    #[arg(long)]
    wizard: bool,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let mut cfg = config::Config::load();

    // Override config with command line args
    if let Some(server) = args.server {
        cfg.server_url = server;
    }
    let log_path = args
        .log_file
        .unwrap_or_else(|| PathBuf::from(&cfg.log_file));
    init_logging(&log_path)?;

    let mut state = match app_state::App::new(cfg) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Could not reach the backend: {e}");
            return Ok(());
        }
    };
    if args.wizard {
        state.open_wizard();
    }

    run_tui(state)
}

/// Logs go to a file: stdout belongs to the terminal UI.
fn init_logging(path: &std::path::Path) -> io::Result<()> {
    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .init();
    Ok(())
}

fn run_tui(mut app: app_state::App) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

#[allow(clippy::too_many_lines)]
fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut app_state::App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;
        if app.should_quit {
            return Ok(());
        }

        match event::read()? {
            Event::Mouse(mouse) if app.view == app_state::View::Sitemap => {
                let at = Position::new(mouse.column, mouse.row);
                let hit = app
                    .sitemap_hits
                    .iter()
                    .find(|h| h.area.contains(at))
                    .copied();
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        if let Some(hit) = hit {
                            if let Some(pos) =
                                app.sitemap.rows.iter().position(|r| r.id == hit.id)
                            {
                                app.sitemap.cursor = pos;
                            }
                            app.sitemap.drag.begin(hit.id);
                        }
                    }
                    MouseEventKind::Drag(MouseButton::Left) => {
                        if let Some(hit) = hit {
                            app.sitemap.hover_drag(hit.id, mouse.row, hit.area);
                        } else if let Some(dragged) = app.sitemap.drag.dragged() {
                            // Off every row: keep dragging, drop the affordance
                            app.sitemap.drag.begin(dragged);
                        }
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        if let Some(commit) = app.sitemap.drag.drop() {
                            app.sitemap.commit_drop(commit);
                        }
                    }
                    _ => {}
                }
            }
            Event::Key(key) => match app.view {
                app_state::View::Sitemap => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Up => {
                        if key.modifiers.contains(KeyModifiers::CONTROL) {
                            if let Some(row) = app.sitemap.cursor_row() {
                                let id = row.id;
                                app.sitemap.move_among_siblings(id, -1);
                            }
                        } else if app.sitemap.cursor > 0 {
                            app.sitemap.cursor -= 1;
                        }
                    }
                    KeyCode::Down => {
                        if key.modifiers.contains(KeyModifiers::CONTROL) {
                            if let Some(row) = app.sitemap.cursor_row() {
                                let id = row.id;
                                app.sitemap.move_among_siblings(id, 1);
                            }
                        } else if app.sitemap.cursor + 1 < app.sitemap.rows.len() {
                            app.sitemap.cursor += 1;
                        }
                    }
                    KeyCode::Char('p') => app.open_parent_select(),
                    KeyCode::Tab => {
                        if app.wizard_loaded {
                            app.view = app_state::View::Wizard;
                        } else {
                            app.open_wizard();
                        }
                    }
                    KeyCode::Esc => app.sitemap.drag.cancel(),
                    KeyCode::Char(':') => {
                        app.command_return = app_state::View::Sitemap;
                        app.view = app_state::View::Command;
                        app.command_buffer.clear();
                        app.message = None;
                    }
                    _ => {}
                },
                app_state::View::Wizard => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Up => {
                        if key.modifiers.contains(KeyModifiers::CONTROL) {
                            app.move_wizard_step(-1);
                        } else if app.wizard_cursor > 0 {
                            app.wizard_cursor -= 1;
                        }
                    }
                    KeyCode::Down => {
                        if key.modifiers.contains(KeyModifiers::CONTROL) {
                            app.move_wizard_step(1);
                        } else if app.wizard_cursor + 1 < app.wizard.accordion_rows().len() {
                            app.wizard_cursor += 1;
                        }
                    }
                    KeyCode::Enter => app.select_wizard_row(),
                    KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
                        let rows = app.wizard.accordion_rows();
                        if let Some(row) = rows.get(app.wizard_cursor) {
                            let endpoint = row.endpoint.clone();
                            app.wizard.toggle_expanded(&endpoint);
                        }
                    }
                    KeyCode::Tab => app.view = app_state::View::Sitemap,
                    KeyCode::Char(':') => {
                        app.command_return = app_state::View::Wizard;
                        app.view = app_state::View::Command;
                        app.command_buffer.clear();
                        app.message = None;
                    }
                    _ => {}
                },
                app_state::View::ParentSelect => match key.code {
                    KeyCode::Up => {
                        if let Some(select) = &mut app.parent_select {
                            select.cursor = select.cursor.saturating_sub(1);
                        }
                    }
                    KeyCode::Down => {
                        if let Some(select) = &mut app.parent_select {
                            if select.cursor + 1 < select.options.len() {
                                select.cursor += 1;
                            }
                        }
                    }
                    KeyCode::Enter => app.commit_parent_select(),
                    KeyCode::Esc => {
                        app.parent_select = None;
                        app.view = app_state::View::Sitemap;
                    }
                    _ => {}
                },
                app_state::View::Command => match key.code {
                    KeyCode::Char(c) => {
                        app.command_buffer.push(c);
                    }
                    KeyCode::Backspace => {
                        app.command_buffer.pop();
                    }
                    KeyCode::Enter => {
                        let cmd = app.command_buffer.clone();
                        app.run_command(&cmd);
                        app.command_buffer.clear();
                    }
                    KeyCode::Esc => {
                        app.view = app.command_return;
                        app.command_buffer.clear();
                    }
                    _ => {}
                },
            },
            _ => {}
        }
    }
}
