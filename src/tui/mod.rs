//! Interactive navigator.
//!
//! The event loop owns all page state. Network work runs on tokio tasks and
//! comes back through the loader queue, which is drained once per tick.

mod app;
mod draw;
mod form;
mod loader;
mod navigator;
mod notice;
mod page;
mod theme;

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::info;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

pub use app::{App, GitHubSession, GitLabSession};
pub use theme::Theme;

const TICK: Duration = Duration::from_millis(100);

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Runs `app` until the operator quits. The terminal is restored even when
/// the loop fails.
pub fn run(mut app: App) -> io::Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app);
    restore_terminal(terminal)?;
    info!("Navigator closed");
    result
}

fn event_loop(terminal: &mut Term, app: &mut App) -> io::Result<()> {
    while !app.should_quit() {
        app.drain();
        terminal.draw(|f| draw::draw(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.on_key(key);
            }
        }
    }
    Ok(())
}

fn setup_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(mut terminal: Term) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
