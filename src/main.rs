use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, SystemTime},
};

use plink::config::{Config, ConfigStore, FileConfigStore};
use plink::quadrant::Quadrant;
use plink::results::ResultsStore;
use plink::runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner};
use plink::session::{Phase, Session};
use plink::ui::{self, GameScreen};

const TICK_RATE_MS: u64 = 100;

/// reflex-training tui: click targets, chase your averages
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A reflex-training TUI. Targets appear in enabled screen quadrants; click them fast and close to center to score. Every completed round is saved to a record file for later analysis."
)]
pub struct Cli {
    /// target radius in playfield units
    #[clap(short = 'r', long)]
    target_radius: Option<f64>,

    /// successful hits per round
    #[clap(short = 'c', long)]
    clicks_per_round: Option<u32>,

    /// rolling average window length
    #[clap(long)]
    history_window: Option<usize>,

    /// maximum simultaneous targets
    #[clap(long)]
    max_targets: Option<usize>,

    /// override the results directory (defaults to the per-user state dir)
    #[clap(long)]
    results_dir: Option<std::path::PathBuf>,
}

impl Cli {
    /// Persisted config overridden by any explicitly passed flags.
    fn to_config(&self, base: Config) -> Config {
        Config {
            target_radius: self.target_radius.unwrap_or(base.target_radius),
            clicks_per_round: self.clicks_per_round.unwrap_or(base.clicks_per_round),
            history_window: self.history_window.unwrap_or(base.history_window),
            max_targets: self.max_targets.unwrap_or(base.max_targets),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let config = cli.to_config(config_store.load());
    // Remember the effective settings for the next run
    if let Err(err) = config_store.save(&config) {
        log::warn!("could not persist config: {err}");
    }

    let store = match &cli.results_dir {
        Some(dir) => ResultsStore::with_dir(dir),
        None => ResultsStore::new(),
    };
    let mut session = Session::new(config, store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut session);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run<B: Backend>(terminal: &mut Terminal<B>, session: &mut Session) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| f.render_widget(GameScreen { session: &*session }, f.area()))?;

    loop {
        match runner.step() {
            GameEvent::Tick => continue,
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                use crossterm::event::{KeyCode, KeyModifiers};
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Char('r') => session.reset(),
                    KeyCode::Char('e') => session.end_round(),
                    KeyCode::Char(c) => {
                        if let Some(quadrant) = quadrant_for_key(c) {
                            session.toggle_quadrant(quadrant);
                        }
                    }
                    _ => {}
                }
            }
            GameEvent::Click(column, row) => {
                let size = terminal.size()?;
                let (_, field, _) = ui::layout(Rect::new(0, 0, size.width, size.height));
                if let Some((x, y)) = ui::cell_to_playfield(field, column, row) {
                    dispatch_click(session, x, y);
                }
            }
        }

        terminal.draw(|f| f.render_widget(GameScreen { session: &*session }, f.area()))?;
    }

    Ok(())
}

/// Routes a playfield click by phase: summary screens only test the start
/// affordance, active rounds go through scoring.
fn dispatch_click(session: &mut Session, x: f64, y: f64) {
    match session.phase() {
        Phase::RoundActive => {
            session.handle_click(x, y, SystemTime::now());
        }
        Phase::AwaitingStart | Phase::RoundSummary => {
            if ui::start_circle_contains(x, y) {
                if let Err(err) = session.start_next_round(SystemTime::now()) {
                    log::info!("round start refused: {err}");
                }
            }
        }
    }
}

fn quadrant_for_key(c: char) -> Option<Quadrant> {
    plink::quadrant::ALL_QUADRANTS
        .into_iter()
        .find(|q| q.toggle_key() == c)
}
