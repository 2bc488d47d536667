pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

use wavequiz::{
    assistant::{self, Assistant},
    audio::{AudioNotifier, Silent, TerminalBell},
    bank::QuestionBank,
    config::{Config, ConfigStore, FileConfigStore},
    duo::{run_repl, DuoBot, DuoDeck},
    error::GameError,
    event::{Cue, GameEvent},
    logging::{self, LogTarget},
    gesture::GestureEvent,
    pointer::{dispatch, ClickTarget, HitMap},
    runtime::{ArenaEvent, CrosstermEventSource, FixedTicker, Runner},
    session::ItemKind,
    Answer, GameController,
};

use crate::ui::{ArenaView, Speaker};

const TICK_RATE_MS: u64 = 100;

/// wave-based trivia arena with a shop, power-ups and a chat assistant
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A wave-based trivia arena: answer against the clock, earn credits, buy hints and time freezes between waves, and steer the game from a chat assistant. Use --duo for the DuoTrivia chat bot."
)]
pub struct Cli {
    /// number of waves per game
    #[clap(short = 'w', long)]
    waves: Option<u32>,

    /// number of questions in each wave
    #[clap(short = 'q', long)]
    questions_per_wave: Option<u32>,

    /// JSON question bank to use instead of the built-in one
    #[clap(long, value_name = "PATH")]
    questions: Option<PathBuf>,

    /// seed for question order and option shuffles
    #[clap(long)]
    seed: Option<u64>,

    /// play DuoTrivia as a line-based chat on stdin/stdout
    #[clap(long)]
    duo: bool,

    /// never ring the terminal bell
    #[clap(long)]
    no_bell: bool,
}

impl Cli {
    /// Layer command line overrides on top of the stored configuration
    fn apply(&self, config: &mut Config) {
        if let Some(waves) = self.waves {
            config.total_waves = waves;
        }
        if let Some(per_wave) = self.questions_per_wave {
            config.questions_per_wave = per_wave;
        }
        if self.no_bell {
            config.bell = false;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Game,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
    PointerOn,
    PointerOff,
}

pub struct App {
    pub controller: GameController,
    pub assistant: Assistant,
    pub view: ArenaView,
    pub hits: HitMap,
    pub hovered: Option<ClickTarget>,
    pub focus: Focus,
    pub input: String,
    /// Mouse capture standing in for the camera hand tracker.
    pub pointer_mode: bool,
    audio: Box<dyn AudioNotifier>,
}

impl App {
    pub fn new(controller: GameController, audio: Box<dyn AudioNotifier>) -> Self {
        let mut view = ArenaView::default();
        view.say(Speaker::Assistant, assistant::greeting());
        Self {
            controller,
            assistant: Assistant::default(),
            view,
            hits: HitMap::new(),
            hovered: None,
            focus: Focus::Game,
            input: String::new(),
            pointer_mode: false,
            audio,
        }
    }

    /// Hand queued controller events to the view and the speaker.
    pub fn sync(&mut self) {
        for event in self.controller.drain_events() {
            if let GameEvent::Cue(cue) = event {
                self.audio.play(cue);
            }
            self.view.apply(&event);
        }
    }

    pub fn on_tick(&mut self, elapsed: Duration) {
        self.controller.on_tick(elapsed);
        self.sync();
    }

    fn settle<T>(&mut self, result: Result<T, GameError>) {
        if let Err(e) = result {
            debug!(error = %e, "key action rejected");
        }
        self.sync();
    }

    pub fn on_key(&mut self, key: KeyEvent) -> AppAction {
        if key.kind != KeyEventKind::Press {
            return AppAction::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppAction::Quit;
        }
        match self.focus {
            Focus::Chat => self.on_chat_key(key),
            Focus::Game => self.on_game_key(key),
        }
    }

    fn on_chat_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Game,
            KeyCode::Enter => self.submit_chat(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
        AppAction::Continue
    }

    fn on_game_key(&mut self, key: KeyEvent) -> AppAction {
        let c = &mut self.controller;
        match key.code {
            KeyCode::Esc => return AppAction::Quit,
            KeyCode::Tab => self.focus = Focus::Chat,
            KeyCode::Enter if c.is_revealing() => {
                let r = c.continue_after_reveal();
                self.settle(r);
            }
            KeyCode::Enter | KeyCode::Char('s') => {
                let r = c.start_wave();
                self.settle(r);
            }
            KeyCode::Char(d @ '1'..='9') => {
                let index = d as usize - '1' as usize;
                let r = c.answer(Answer::Option(index));
                self.settle(r);
            }
            KeyCode::Char('h') => {
                let r = c.activate_hint_scan();
                self.settle(r);
            }
            KeyCode::Char('y') => self.gesture(GestureEvent::Smile),
            KeyCode::Char('c') => {
                let r = c.cancel_hint_scan();
                self.settle(r);
            }
            KeyCode::Char('f') => {
                let r = c.use_freeze();
                self.settle(r);
            }
            KeyCode::Char('H') => {
                let r = c.buy_item(ItemKind::Hint);
                self.settle(r);
            }
            KeyCode::Char('F') => {
                let r = c.buy_item(ItemKind::Freeze);
                self.settle(r);
            }
            KeyCode::Char('r') => {
                let r = c.reset_game();
                self.settle(r);
            }
            KeyCode::Char('R') => {
                let r = c.full_reset();
                self.settle(r);
            }
            KeyCode::Char('v') => return self.toggle_pointer(),
            _ => {}
        }
        AppAction::Continue
    }

    fn toggle_pointer(&mut self) -> AppAction {
        self.pointer_mode = !self.pointer_mode;
        let action = if self.pointer_mode {
            self.controller.on_gesture_session_start();
            AppAction::PointerOn
        } else {
            self.controller.on_gesture_session_end();
            self.hovered = None;
            AppAction::PointerOff
        };
        info!(pointer = self.pointer_mode, "pointer mode toggled");
        self.sync();
        action
    }

    pub fn submit_chat(&mut self) {
        let text = std::mem::take(&mut self.input);
        if text.trim().is_empty() {
            return;
        }
        self.view.say(Speaker::Player, text.trim());
        let reply = self.assistant.handle(&text, &mut self.controller);
        self.view.say(Speaker::Assistant, reply);
        self.sync();
    }

    /// Mouse movement is the pointer, a left click is the pinch.
    /// Feed one gesture through the hit map to the controller.
    fn gesture(&mut self, event: GestureEvent) {
        match dispatch(event, &mut self.hits, &mut self.controller) {
            Some(Ok(())) if event == GestureEvent::PinchClick => self.audio.play(Cue::Click),
            Some(Ok(())) | None => {}
            Some(Err(e)) => debug!(error = %e, ?event, "gesture rejected"),
        }
        self.hovered = self.hits.click();
        self.sync();
    }

    /// Mouse movement is the pointer, a left click is the pinch.
    pub fn on_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let x = (mouse.column as f64 + 0.5) / area.width as f64;
        let y = (mouse.row as f64 + 0.5) / area.height as f64;
        self.gesture(GestureEvent::PointerMove { x, y });

        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            self.gesture(GestureEvent::PinchClick);
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.duo {
        logging::init(LogTarget::Stderr)?;
        return run_duo(&cli);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    logging::init(LogTarget::arena())?;

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply(&mut config);
    if let Err(e) = store.save(&config) {
        warn!(path = %store.path().display(), error = %e, "could not save config");
    }

    let bank = match &cli.questions {
        Some(path) => QuestionBank::from_path(path)?,
        None => QuestionBank::embedded()?,
    };
    info!(questions = bank.len(), "question bank loaded");

    let audio: Box<dyn AudioNotifier> = if config.bell {
        Box::new(TerminalBell::stdout())
    } else {
        Box::new(Silent)
    };
    let controller = match cli.seed {
        Some(seed) => GameController::seeded(config, bank, seed),
        None => GameController::new(config, bank),
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(controller, audio);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_duo(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let deck = DuoDeck::embedded()?;
    let mut bot = match cli.seed {
        Some(seed) => DuoBot::seeded(deck, seed),
        None => DuoBot::new(deck),
    };
    run_repl(&mut bot, stdin().lock(), io::stdout().lock())?;
    Ok(())
}

fn start_tui<B: Backend + io::Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut last_tick = Instant::now();

    loop {
        let mut area = Rect::default();
        terminal.draw(|f| {
            area = f.area();
            ui(app, f);
        })?;
        app.hits = ui::hit_map(app, area);

        match runner.step() {
            ArenaEvent::Tick | ArenaEvent::Resize => {}
            ArenaEvent::Mouse(mouse) => app.on_mouse(mouse, area),
            ArenaEvent::Key(key) => match app.on_key(key) {
                AppAction::Continue => {}
                AppAction::Quit => break,
                AppAction::PointerOn => execute!(terminal.backend_mut(), EnableMouseCapture)?,
                AppAction::PointerOff => execute!(terminal.backend_mut(), DisableMouseCapture)?,
            },
        }

        // Keys never starve the countdown: wall time is fed after every step.
        let now = Instant::now();
        app.on_tick(now - last_tick);
        last_tick = now;
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
