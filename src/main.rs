mod render;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use std::fs::File;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use ljus_morker::{GameConfig, GameSession, GameState, HighscoreBoard, InputSnapshot, JsonFileStore};
use render::Renderer;

const DEFAULT_TICK_MS: u64 = 16;
const DEFAULT_RENDER_FPS: u64 = 60;
// Terminals report presses, never releases: a key counts as held for this
// long after its last press or auto-repeat.
const INPUT_HOLD_MS: u64 = 160;
const MAX_NAME_LEN: usize = 20;
const DEBUG_POINTS: u32 = 1000;

#[derive(Parser, Debug)]
#[command(author, version, about = "Ljus & Mörker: a maze chase in the dark", long_about = None)]
struct Args {
    /// JSON file overriding any of the game tunables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for maze and placement randomness
    #[arg(short, long)]
    seed: Option<u64>,

    /// Level to start each new game at
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    level: Option<u32>,

    #[arg(long, default_value = "ljus-morker-highscores.json")]
    highscores: PathBuf,

    #[arg(long, default_value = "ljus-morker.log")]
    log_file: PathBuf,

    #[arg(long, default_value_t = false)]
    invincible: bool,

    /// Enable the n/m/i debug keys
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let config = match &args.config {
        Some(path) => GameConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    let board = HighscoreBoard::load(Box::new(JsonFileStore::new(&args.highscores)), config.max_highscores);
    let mut session = GameSession::from_seed(config, args.seed).with_highscores(board);
    if args.invincible {
        session.set_invincible(true);
    }
    session.show_title();
    tracing::info!(seed = ?args.seed, "starting");

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableFocusChange)?;
    stdout.execute(Hide)?;

    let mut app = App::new(session, args.level, args.debug);
    let result = app.run(&mut stdout);

    stdout.execute(Show)?;
    stdout.execute(DisableFocusChange)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    if let Err(e) = &result {
        tracing::error!("exited with error: {e:#}");
    }
    result
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn read_speed_settings() -> (u64, u64) {
    let tick_ms = std::env::var("LJUS_TICK_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_TICK_MS);
    let render_fps = std::env::var("LJUS_FPS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RENDER_FPS);
    (tick_ms, render_fps)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Dir {
    Up,
    Down,
    Left,
    Right,
}

/// Turns discrete key presses into the held-key snapshot the session wants.
#[derive(Default)]
struct Controls {
    last_seen: [Option<Instant>; 4],
    sprint_seen: Option<Instant>,
    toggle_light: bool,
    use_flashlight: bool,
}

impl Controls {
    fn press(&mut self, dir: Dir, sprint: bool) {
        let now = Instant::now();
        self.last_seen[dir as usize] = Some(now);
        if sprint {
            self.sprint_seen = Some(now);
        }
    }

    /// Current held state plus any one-shot actions since the last call.
    fn snapshot(&mut self) -> InputSnapshot {
        let held = |seen: Option<Instant>| seen.is_some_and(|t| t.elapsed() <= Duration::from_millis(INPUT_HOLD_MS));
        let input = InputSnapshot {
            up: held(self.last_seen[Dir::Up as usize]),
            down: held(self.last_seen[Dir::Down as usize]),
            left: held(self.last_seen[Dir::Left as usize]),
            right: held(self.last_seen[Dir::Right as usize]),
            sprint: held(self.sprint_seen),
            toggle_light: self.toggle_light,
            use_flashlight: self.use_flashlight,
        };
        self.toggle_light = false;
        self.use_flashlight = false;
        input
    }

    fn release_all(&mut self) {
        *self = Controls::default();
    }
}

#[derive(PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct App {
    session: GameSession,
    renderer: Renderer,
    controls: Controls,
    name: Option<String>,
    start_level: Option<u32>,
    debug: bool,
}

impl App {
    fn new(session: GameSession, start_level: Option<u32>, debug: bool) -> Self {
        let renderer = Renderer::new(session.config().arena_width, session.config().arena_height);
        Self {
            session,
            renderer,
            controls: Controls::default(),
            name: None,
            start_level,
            debug,
        }
    }

    fn run(&mut self, stdout: &mut Stdout) -> Result<()> {
        let (tick_ms, render_fps) = read_speed_settings();
        let tick = Duration::from_millis(tick_ms);
        let frame_time = Duration::from_micros(1_000_000 / render_fps.max(1));
        let mut last_tick = Instant::now();

        loop {
            let frame_start = Instant::now();
            while event::poll(Duration::from_millis(0))? {
                match event::read()? {
                    Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                        if self.handle_key(key) == Flow::Quit {
                            return Ok(());
                        }
                    }
                    Event::FocusLost => {
                        self.session.focus_lost();
                        self.controls.release_all();
                    }
                    Event::Resize(_, _) => self.renderer.invalidate(),
                    _ => {}
                }
            }

            if last_tick.elapsed() >= tick {
                last_tick = Instant::now();
                let input = self.controls.snapshot();
                self.session.tick(tick_ms as f32, &input);
                if self.name.is_none()
                    && self.session.highscore_prompt_due()
                    && self.session.qualifies_for_highscore()
                {
                    self.name = Some(String::new());
                }
            }

            let footer = self.footer();
            self.renderer.draw(stdout, &self.session, &footer)?;

            let elapsed = frame_start.elapsed();
            if elapsed < frame_time {
                thread::sleep(frame_time - elapsed);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Flow::Quit;
        }
        if let Some(name) = self.name.as_mut() {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => {
                    let name = self.name.take().unwrap_or_default();
                    if let Some(rank) = self.session.submit_highscore(&name) {
                        tracing::info!(rank, "highscore saved");
                    }
                }
                KeyCode::Backspace => {
                    name.pop();
                }
                KeyCode::Char(c) if name.chars().count() < MAX_NAME_LEN && !c.is_control() => name.push(c),
                _ => {}
            }
            return Flow::Continue;
        }
        if key.code == KeyCode::Char('q') {
            return Flow::Quit;
        }

        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match self.session.state() {
            GameState::Initializing => {}
            GameState::Title => {
                match key.code {
                    KeyCode::Enter => {
                        self.controls.release_all();
                        self.session.start_game(self.start_level);
                    }
                    KeyCode::Char('X') => self.session.clear_highscores(),
                    _ => {}
                }
            }
            GameState::Running => match key.code {
                KeyCode::Up | KeyCode::Char('w' | 'k') => self.controls.press(Dir::Up, shift),
                KeyCode::Down | KeyCode::Char('s' | 'j') => self.controls.press(Dir::Down, shift),
                KeyCode::Left | KeyCode::Char('a' | 'h') => self.controls.press(Dir::Left, shift),
                KeyCode::Right | KeyCode::Char('d' | 'l') => self.controls.press(Dir::Right, shift),
                KeyCode::Char('W' | 'K') => self.controls.press(Dir::Up, true),
                KeyCode::Char('S' | 'J') => self.controls.press(Dir::Down, true),
                KeyCode::Char('A' | 'H') => self.controls.press(Dir::Left, true),
                KeyCode::Char('D' | 'L') => self.controls.press(Dir::Right, true),
                KeyCode::Char(' ') => self.controls.toggle_light = true,
                KeyCode::Char('f' | 'F') => self.controls.use_flashlight = true,
                KeyCode::Char('p') | KeyCode::Esc => self.session.pause(),
                KeyCode::Char('n') if self.debug => self.session.skip_level(),
                KeyCode::Char('m') if self.debug => self.session.add_points(DEBUG_POINTS),
                KeyCode::Char('i') if self.debug => {
                    let on = !self.session.is_invincible();
                    self.session.set_invincible(on);
                }
                _ => {}
            },
            GameState::Paused => {
                if matches!(key.code, KeyCode::Char('p') | KeyCode::Esc | KeyCode::Enter) {
                    self.controls.release_all();
                    self.session.resume();
                }
            }
            GameState::LevelTransition => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    self.controls.release_all();
                    self.session.continue_level();
                }
            }
            GameState::GameOver | GameState::GameWon => match key.code {
                KeyCode::Enter => {
                    self.controls.release_all();
                    self.session.restart();
                }
                KeyCode::Char('t') => self.session.show_title(),
                _ => {}
            },
        }
        Flow::Continue
    }

    fn footer(&self) -> Vec<String> {
        let message_lines = || -> Vec<String> {
            self.session
                .message()
                .map(|m| m.lines().map(str::to_string).collect())
                .unwrap_or_default()
        };

        let mut lines = match self.session.state() {
            GameState::Initializing | GameState::Title => vec![
                "LJUS & MÖRKER - samla kristallerna, håll ljuset vid liv".to_string(),
                "Pilar/WASD: gå  Shift: spring  Mellanslag: ljus  f: ficklampa  p: paus".to_string(),
                format!("Enter: starta  X: rensa rekord  q: avsluta  Bästa: {}", best_score(&self.session)),
            ],
            GameState::Running => vec![String::new(), String::new(), "p: paus  q: avsluta".to_string()],
            GameState::Paused => vec!["PAUS".to_string(), "p/Enter: fortsätt  q: avsluta".to_string()],
            GameState::LevelTransition => {
                let mut lines = message_lines();
                lines.push("Enter: nästa nivå".to_string());
                lines
            }
            GameState::GameOver | GameState::GameWon => {
                let mut lines = message_lines();
                if let Some(name) = &self.name {
                    lines.push(format!("Nytt rekord! Skriv ditt namn: {name}_"));
                } else if self.session.highscore_prompt_due() {
                    lines.push(top_scores(&self.session, 3));
                } else {
                    lines.push(String::new());
                }
                lines.push("Enter: spela igen  t: titel  q: avsluta".to_string());
                lines
            }
        };
        if self.debug && self.session.is_invincible() {
            if let Some(first) = lines.first_mut() {
                first.push_str("  [odödlig]");
            }
        }
        lines
    }
}

fn best_score(session: &GameSession) -> u32 {
    session.highscores().entries().first().map_or(0, |e| e.score)
}

fn top_scores(session: &GameSession, n: usize) -> String {
    let entries = session.highscores().entries();
    if entries.is_empty() {
        return "Inga rekord än".to_string();
    }
    entries
        .iter()
        .take(n)
        .enumerate()
        .map(|(i, e)| format!("{}. {} {} (nivå {})", i + 1, e.name, e.score, e.level))
        .collect::<Vec<_>>()
        .join("   ")
}
