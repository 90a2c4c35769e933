use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use quickfox::{
    app::{App, Flow, Settings},
    config::{ConfigStore, FileConfigStore, TimerChoice},
    runtime::{ChannelEventSource, EventSource, Runner},
    session::StartTrigger,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::{Path, PathBuf},
};
use tracing::Level;

/// typing speed test with countdown and count-up timers
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a paragraph as fast and as accurately as you can. Live wpm and accuracy are tracked against a countdown or a count-up timer and reported when you finish."
)]
pub struct Cli {
    /// timer to use; defaults to the last selection, or 30 seconds
    #[clap(short = 't', long, value_enum)]
    timer: Option<TimerChoice>,

    /// require enter to start the test instead of starting on the first keystroke
    #[clap(long)]
    explicit_start: bool,

    /// custom paragraph to type
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// write debug logs to this file
    #[clap(long, value_name = "FILE")]
    log: Option<PathBuf>,
}

impl Cli {
    /// Command line values win over the stored config
    fn to_settings(&self, store: &dyn ConfigStore) -> Settings {
        let mut settings = Settings::from(&store.load());
        if let Some(timer) = self.timer {
            settings.timer = timer;
        }
        if self.explicit_start {
            settings.start_trigger = StartTrigger::Explicit;
        }
        settings.prompt = self.prompt.clone();
        settings
    }
}

fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| format!("log path {} has no file name", path.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    tracing_subscriber::fmt()
        .with_writer(appender)
        .with_ansi(false)
        .with_max_level(Level::DEBUG)
        .try_init()
        .map_err(|err| err as Box<dyn Error>)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = &cli.log {
        init_logging(path)?;
    }

    let store = FileConfigStore::new();
    let settings = cli.to_settings(&store);
    tracing::info!(?settings, "starting");
    let mut app = App::new(settings)?.with_store(Box::new(store));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(ChannelEventSource::terminal());
    let outcome = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        if app.on_event(runner.step())? == Flow::Quit {
            break;
        }
    }

    Ok(())
}
