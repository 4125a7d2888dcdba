mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::mpsc::Sender,
};

use heliotype::config::{FileSettingsStore, SettingsStore};
use heliotype::engine::{SessionEngine, Status};
use heliotype::feedback::TerminalBell;
use heliotype::runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner};
use heliotype::settings::{Mode, TestSettings};
use heliotype::text::{FixedTextProvider, TextProvider, WordBankProvider};

/// terminal typing speed test with live stats and a results chart
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// test mode: end on the clock or on the full text
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// seconds on the clock in time mode (15, 30 or 60)
    #[clap(short = 's', long)]
    seconds: Option<u64>,

    /// target word count in words mode (10, 25 or 50)
    #[clap(short = 'w', long)]
    words: Option<usize>,

    /// include punctuation and capitalization in the target text
    #[clap(long)]
    punctuation: bool,

    /// include numbers in the target text
    #[clap(long)]
    numbers: bool,

    /// custom target text, skipping generation
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// start with feedback sounds muted
    #[clap(long)]
    mute: bool,
}

impl Cli {
    /// Persisted settings first, CLI flags on top
    fn apply_to(&self, mut settings: TestSettings) -> TestSettings {
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(seconds) = self.seconds {
            settings.duration = seconds;
            settings.mode = Mode::Time;
        }
        if let Some(words) = self.words {
            settings.word_count = words;
            settings.mode = Mode::Words;
        }
        if self.punctuation {
            settings.punctuation = true;
        }
        if self.numbers {
            settings.numbers = true;
        }
        settings.sanitize();
        settings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Typing,
    Results,
}

pub struct App {
    pub engine: SessionEngine,
    pub view: View,
    pub settings: TestSettings,
    /// Set for exactly one frame after a mistyped character
    pub error_flash: bool,
    store: FileSettingsStore,
    custom_prompt: Option<String>,
}

impl App {
    pub fn new(settings: TestSettings, store: FileSettingsStore, cli: &Cli) -> Self {
        let mut engine = SessionEngine::new(settings);
        engine.set_sink(Box::new(TerminalBell));
        engine.mute(cli.mute);
        Self {
            engine,
            view: View::Typing,
            settings,
            error_flash: false,
            store,
            custom_prompt: cli.prompt.clone(),
        }
    }

    /// Unconditional session teardown: bump the generation and request fresh
    /// target text for the current settings
    pub fn restart(&mut self, tx: &Sender<AppEvent>) {
        let generation = self.engine.restart(self.settings);
        self.view = View::Typing;
        spawn_text_load(
            generation,
            self.settings,
            self.custom_prompt.clone(),
            tx.clone(),
        );
    }

    /// Any settings change restarts; no partial session state survives
    fn change_settings(&mut self, tx: &Sender<AppEvent>, change: impl FnOnce(&mut TestSettings)) {
        change(&mut self.settings);
        let _ = self.store.save(&self.settings);
        self.restart(tx);
    }
}

/// Resolve target text off the event loop and deliver it tagged with the
/// generation it was requested for
fn spawn_text_load(
    generation: u64,
    settings: TestSettings,
    prompt: Option<String>,
    tx: Sender<AppEvent>,
) {
    std::thread::spawn(move || {
        let text = match prompt {
            Some(p) => FixedTextProvider::new(p).generate(&settings),
            None => WordBankProvider.generate(&settings),
        };
        let _ = tx.send(AppEvent::Loaded { generation, text });
    });
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileSettingsStore::new();
    let settings = cli.apply_to(store.load());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings, store, &cli);
    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let events = CrosstermEventSource::new();
    let runner = Runner::new(events, FixedTicker::default());
    let tx = runner.sender();

    spawn_text_load(
        app.engine.generation(),
        app.settings,
        app.custom_prompt.clone(),
        tx.clone(),
    );

    terminal.draw(|f| draw(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                app.engine.on_tick();
                if app.engine.status() == Status::Finished {
                    app.view = View::Results;
                }
            }
            AppEvent::Resize => {}
            AppEvent::Loaded { generation, text } => {
                app.engine.complete_load(generation, &text);
            }
            AppEvent::Key(key) => {
                if !handle_key(app, &tx, key) {
                    return Ok(());
                }
            }
        }
        terminal.draw(|f| draw(app, f))?;
    }
}

/// Returns false when the app should exit
fn handle_key(app: &mut App, tx: &Sender<AppEvent>, key: KeyEvent) -> bool {
    if key.code == KeyCode::Esc {
        return false;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }
    if key.code == KeyCode::Tab {
        app.restart(tx);
        return true;
    }

    match app.view {
        View::Typing => match key.code {
            KeyCode::Backspace => app.engine.backspace(),
            KeyCode::Char(c) => {
                app.engine.type_char(c);
                if app.engine.status() == Status::Finished {
                    app.view = View::Results;
                }
            }
            _ => {}
        },
        View::Results => match key.code {
            KeyCode::Char('r') => app.restart(tx),
            KeyCode::Char('t') => app.change_settings(tx, |s| s.mode = Mode::Time),
            KeyCode::Char('w') => app.change_settings(tx, |s| s.mode = Mode::Words),
            KeyCode::Char('d') => app.change_settings(tx, |s| s.cycle_duration()),
            KeyCode::Char('c') => app.change_settings(tx, |s| s.cycle_word_count()),
            KeyCode::Char('p') => app.change_settings(tx, |s| s.punctuation = !s.punctuation),
            KeyCode::Char('n') => app.change_settings(tx, |s| s.numbers = !s.numbers),
            KeyCode::Char('m') => {
                let muted = app.engine.is_muted();
                app.engine.mute(!muted);
            }
            _ => {}
        },
    }
    true
}

fn draw(app: &mut App, f: &mut Frame) {
    app.error_flash = app.engine.take_error();
    f.render_widget(&*app, f.area());
}
