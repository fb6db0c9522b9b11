use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::backend::RodioBackend;
use crate::cli::Cli;
use crate::error::Error;
use crate::library::open_source;
use crate::logging;
use crate::player::PlaybackController;

mod event_loop;
mod settings;
mod startup;

pub fn run(cli: Cli) -> Result<(), Error> {
    let (settings, warning) = settings::load_settings();
    let log_path = logging::init(&settings.log);
    if let Some(warning) = warning {
        eprintln!("{warning}");
        warn!("{warning}");
    }
    if let Some(path) = &log_path {
        info!(log = %path.display(), "setlist starting");
    }

    let source = open_source(&cli.path, &settings.library)?;
    let mut app =
        startup::open_first_playlist(&*source, &cli.path, cli.playlist.as_deref(), &settings)?;

    let (tx, rx) = mpsc::channel();
    let device = RodioBackend::spawn(tx.clone(), &settings.audio)?;
    let mut controller = PlaybackController::new(Box::new(device.clone()), tx, rx, &settings.audio);
    controller.attach_playlist(app.tracks.clone());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut session = event_loop::Session {
        settings: &settings,
        app: &mut app,
        controller: &mut controller,
        source: &*source,
    };
    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(&mut terminal, &mut session, &mut state);

    device.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &run_result {
        warn!("event loop ended with an error: {e}");
    }
    run_result
}
