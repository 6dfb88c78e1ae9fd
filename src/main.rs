mod app;
mod catalog;
mod error;
mod level;
mod share;
mod stats;
mod store;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing_subscriber::EnvFilter;

use app::App;
use catalog::Catalog;
use store::{JsonFileBackend, ProgressStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let catalog = Catalog::load();
    let store = ProgressStore::open(Box::new(JsonFileBackend::in_data_dir()?));
    let mut app = App::new(catalog, store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }
    Ok(())
}

/// Logs go to a file in the data directory; the terminal belongs to the UI.
/// If the directory or file cannot be created the app simply runs unlogged.
fn init_logging() {
    let Ok(dir) = store::data_dir() else { return };
    let Ok(file) = std::fs::File::create(dir.join("chinasteps.log")) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(app::TICK_MS))? {
            if let Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) = event::read()?
            {
                if app.handle_key(code) {
                    return Ok(());
                }
            }
        } else {
            app.tick();
        }
    }
}
