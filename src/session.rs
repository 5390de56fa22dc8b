//! The game session: one owner for state, level and every entity, advanced
//! one frame at a time by [`GameSession::tick`].

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::constants::GAME_OVER_PROMPT_DELAY_MS;
use crate::crystal::Crystal;
use crate::enemy::{Enemy, Projectile, Target};
use crate::events::{GameObserver, NullObserver};
use crate::geometry::Point;
use crate::highscore::HighscoreBoard;
use crate::input::InputSnapshot;
use crate::level::LevelFactory;
use crate::maze::Maze;
use crate::player::Player;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Initializing,
    Title,
    Running,
    Paused,
    LevelTransition,
    GameOver,
    GameWon,
}

impl GameState {
    pub fn is_finished(self) -> bool {
        matches!(self, GameState::GameOver | GameState::GameWon)
    }
}

pub struct GameSession {
    factory: LevelFactory,
    rng: StdRng,
    observer: Box<dyn GameObserver>,
    highscores: HighscoreBoard,

    state: GameState,
    /// Simulation time in milliseconds. Only advances inside `tick`.
    clock: f64,
    level: u32,
    maze: Maze,
    player: Player,
    enemies: Vec<Enemy>,
    crystals: Vec<Crystal>,
    projectiles: Vec<Projectile>,

    invincible: bool,
    level_complete: bool,
    message: Option<String>,
    prompt_at: Option<f64>,
    prompt_due: bool,
    qualifies: bool,
    submitted: bool,
}

impl GameSession {
    pub fn new(config: GameConfig, mut rng: StdRng) -> Self {
        let factory = LevelFactory::new(config);
        let layout = factory.build(1, &mut rng);
        let player = Player::new(layout.player_start, factory.max_light_radius(1), factory.config());
        let highscores = HighscoreBoard::in_memory(factory.config().max_highscores);
        Self {
            factory,
            rng,
            observer: Box::new(NullObserver),
            highscores,
            state: GameState::Initializing,
            clock: 0.0,
            level: 1,
            maze: layout.maze,
            player,
            enemies: layout.enemies,
            crystals: layout.crystals,
            projectiles: Vec::new(),
            invincible: false,
            level_complete: false,
            message: None,
            prompt_at: None,
            prompt_due: false,
            qualifies: false,
            submitted: false,
        }
    }

    pub fn from_seed(config: GameConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config, rng)
    }

    pub fn with_observer(mut self, observer: Box<dyn GameObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_highscores(mut self, highscores: HighscoreBoard) -> Self {
        self.highscores = highscores;
        self
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn config(&self) -> &GameConfig {
        self.factory.config()
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn required_crystals(&self) -> u32 {
        self.factory.required_crystals(self.level)
    }

    pub fn crystals_light_gated(&self) -> bool {
        self.factory.crystals_light_gated(self.level)
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn crystals(&self) -> &[Crystal] {
        &self.crystals
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn light_radius(&self) -> f32 {
        self.player.effective_light_radius(self.factory.config())
    }

    pub fn score(&self) -> u32 {
        self.player.score
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn highscores(&self) -> &HighscoreBoard {
        &self.highscores
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible
    }

    /// Whether the finished game's score would make the highscore board.
    pub fn qualifies_for_highscore(&self) -> bool {
        self.qualifies
    }

    /// True once the post-game delay has elapsed and until a name has been
    /// submitted.
    pub fn highscore_prompt_due(&self) -> bool {
        self.prompt_due && !self.submitted
    }

    fn set_state(&mut self, to: GameState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        tracing::debug!(?from, ?to, "state changed");
        self.observer.on_state_changed(from, to);
    }

    fn show_message(&mut self, text: String) {
        self.observer.on_message(&text);
        self.message = Some(text);
    }

    pub fn show_title(&mut self) {
        if matches!(self.state, GameState::Initializing) || self.state.is_finished() {
            self.message = None;
            self.set_state(GameState::Title);
        }
    }

    /// Starts a fresh game at `start_level` (default 1, clamped to
    /// [`LevelFactory::max_start_level`]) with a zero score.
    pub fn start_game(&mut self, start_level: Option<u32>) {
        if !matches!(self.state, GameState::Initializing | GameState::Title) && !self.state.is_finished() {
            return;
        }
        let level = start_level.unwrap_or(1).clamp(1, self.factory.max_start_level());
        let start = self.load_level(level);
        self.player = Player::new(start, self.factory.max_light_radius(level), self.factory.config());
        self.update_crystals(0.0);
        self.prompt_at = None;
        self.prompt_due = false;
        self.qualifies = false;
        self.submitted = false;
        tracing::info!(level, "game started");

        self.set_state(GameState::Running);
        self.announce_level();
        self.observer.on_score_changed(self.player.score);
    }

    /// Fresh game from level 1, only once the previous one has ended.
    pub fn restart(&mut self) {
        if self.state.is_finished() {
            self.start_game(None);
        }
    }

    pub fn pause(&mut self) {
        if self.state == GameState::Running {
            self.set_state(GameState::Paused);
        }
    }

    pub fn focus_lost(&mut self) {
        tracing::debug!("focus lost");
        self.pause();
    }

    pub fn resume(&mut self) {
        if self.state == GameState::Paused {
            self.set_state(GameState::Running);
        }
    }

    /// Leaves the between-levels screen.
    pub fn continue_level(&mut self) {
        if self.state == GameState::LevelTransition {
            self.message = None;
            self.set_state(GameState::Running);
        }
    }

    #[deprecated(note = "use pause, resume and continue_level")]
    pub fn set_running(&mut self, running: bool) {
        if running {
            self.resume();
            self.continue_level();
        } else {
            self.pause();
        }
    }

    pub fn set_invincible(&mut self, invincible: bool) {
        tracing::info!(invincible, "invincibility toggled");
        self.invincible = invincible;
    }

    /// Completes the current level as if its last crystal had been taken.
    pub fn skip_level(&mut self) {
        if self.state == GameState::Running {
            self.player.crystals_collected = self.required_crystals();
            self.complete_level();
        }
    }

    pub fn add_points(&mut self, points: u32) {
        self.player.score = self.player.score.saturating_add(points);
        self.observer.on_score_changed(self.player.score);
    }

    /// Saves the finished game's result. Returns the board rank it reached.
    pub fn submit_highscore(&mut self, name: &str) -> Option<usize> {
        if !self.state.is_finished() || self.submitted {
            return None;
        }
        self.submitted = true;
        self.highscores.submit(name, self.player.score, self.level)
    }

    pub fn clear_highscores(&mut self) {
        self.highscores.clear();
    }

    /// Advances the simulation by `dt_ms`. Entities only move while running;
    /// a finished game only counts down to its highscore prompt.
    pub fn tick(&mut self, dt_ms: f32, input: &InputSnapshot) {
        let dt_ms = dt_ms.max(0.0);
        if self.state.is_finished() {
            self.clock += dt_ms as f64;
            self.check_prompt();
            return;
        }
        if self.state != GameState::Running {
            return;
        }
        self.clock += dt_ms as f64;
        let now = self.clock;
        let config = self.factory.config();

        if input.toggle_light {
            self.player.toggle_light(self.factory.max_light_radius(self.level));
        }
        if input.use_flashlight {
            if let Some(stunned) = self.player.try_activate_flashlight(now, &mut self.enemies, config) {
                tracing::debug!(stunned, "flashlight fired");
            }
        }

        self.player.update(dt_ms, now, input, &self.maze, config);
        if self.player.collect_crystals(&mut self.crystals) > 0 {
            let required = self.required_crystals();
            self.observer.on_score_changed(self.player.score);
            self.observer.on_crystals_changed(self.player.crystals_collected, required);
            if self.player.crystals_collected >= required {
                self.level_complete = true;
            }
        }
        self.notify_player_status();

        // The level is replaced at the end of the tick; nothing else of the
        // old level moves once it is done.
        if !self.level_complete {
            if self.update_enemies(dt_ms, now) {
                return;
            }
            self.update_projectiles(dt_ms, now);
            self.update_crystals(dt_ms);
        }

        if self.level_complete {
            self.complete_level();
        }
    }

    // Returns true when the game ended.
    fn update_enemies(&mut self, dt_ms: f32, now: f64) -> bool {
        let config = self.factory.config();
        let player_center = self.player.center();
        let player_radius = self.player.radius();
        let target = Target {
            center: player_center,
            light_on: self.player.light.on,
        };

        for i in 0..self.enemies.len() {
            let enemy = &mut self.enemies[i];
            if let Some(shot) = enemy.update(dt_ms, now, target, &self.maze, self.level, config, &mut self.rng) {
                self.projectiles.push(shot);
            }
            if self.enemies[i].touches(player_center, player_radius) && !self.invincible {
                self.end_game();
                return true;
            }
        }
        false
    }

    fn update_projectiles(&mut self, dt_ms: f32, now: f64) {
        let drain = self.factory.config().projectile_light_drain;
        let player_center = self.player.center();
        let player_radius = self.player.radius();
        for i in (0..self.projectiles.len()).rev() {
            let alive = self.projectiles[i].update(dt_ms, now, &self.maze);
            if !alive {
                self.projectiles.swap_remove(i);
            } else if self.projectiles[i].hits(player_center, player_radius) {
                self.projectiles.swap_remove(i);
                self.player.drain_light(drain);
                let light = self.player.light;
                let radius = self.light_radius();
                self.observer.on_light_changed(radius, light.intensity, light.on);
            }
        }
    }

    fn update_crystals(&mut self, dt_ms: f32) {
        let gated = self.crystals_light_gated();
        let center = self.player.center();
        let radius = self.light_radius();
        for crystal in &mut self.crystals {
            crystal.update_glow(dt_ms);
            crystal.update_visibility(gated, center, radius);
        }
    }

    fn complete_level(&mut self) {
        self.level_complete = false;
        if self.state != GameState::Running {
            return;
        }
        let finished = self.level;
        let bonus = self.factory.config().points_per_level.saturating_mul(finished);
        self.player.score = self.player.score.saturating_add(bonus);
        self.observer.on_score_changed(self.player.score);

        if self.factory.is_final_level(finished) {
            tracing::info!(level = finished, score = self.player.score, "game won");
            self.finish(GameState::GameWon);
            self.observer.on_game_won(self.player.score, finished);
            self.show_message(format!("Du klarade alla nivåer! Poäng: {}", self.player.score));
            return;
        }

        self.set_state(GameState::LevelTransition);
        let level = finished.saturating_add(1);
        let start = self.load_level(level);
        let radius = self.factory.max_light_radius(level);
        self.player.reset_for_new_level(start, radius, self.factory.config());
        // Nothing ticks during the transition screen; hide gated crystals now.
        self.update_crystals(0.0);
        tracing::info!(level, score = self.player.score, "level complete");
        self.announce_level();
    }

    fn end_game(&mut self) {
        if self.state != GameState::Running {
            return;
        }
        tracing::info!(level = self.level, score = self.player.score, "game over");
        self.finish(GameState::GameOver);
        self.observer.on_game_over(self.player.score, self.level);
        self.show_message(format!("Spelet är slut! Poäng: {}", self.player.score));
    }

    fn finish(&mut self, state: GameState) {
        self.qualifies = self.highscores.qualifies(self.player.score);
        self.prompt_at = Some(self.clock + GAME_OVER_PROMPT_DELAY_MS);
        self.prompt_due = false;
        self.submitted = false;
        self.set_state(state);
    }

    fn check_prompt(&mut self) {
        if let Some(at) = self.prompt_at {
            if self.clock >= at {
                self.prompt_at = None;
                self.prompt_due = true;
                self.observer.on_highscore_prompt(self.player.score, self.qualifies);
            }
        }
    }

    // Swaps in a freshly generated level and returns the player's start.
    fn load_level(&mut self, level: u32) -> Point {
        let layout = self.factory.build(level, &mut self.rng);
        self.level = level;
        self.maze = layout.maze;
        self.enemies = layout.enemies;
        self.crystals = layout.crystals;
        self.projectiles.clear();
        self.level_complete = false;
        layout.player_start
    }

    fn announce_level(&mut self) {
        let config = self.factory.config();
        let required = self.required_crystals();
        let mut text = format!("Nivå {} - Hitta {} kristaller!", self.level, required);
        if self.level == config.crystal_visibility_level {
            text.push_str("\nKristallerna syns nu bara inom ljuset!");
        } else if self.level == config.reduced_light_level {
            text.push_str("\nDitt ljus har blivit svagare!");
        }
        self.observer.on_level_changed(self.level);
        self.observer.on_crystals_changed(self.player.crystals_collected, required);
        self.notify_player_status();
        self.show_message(text);
    }

    fn notify_player_status(&mut self) {
        let config = self.factory.config();
        let light = self.player.light;
        let radius = self.player.effective_light_radius(config);
        self.observer.on_stamina_changed(self.player.stamina, config.max_stamina);
        self.observer.on_light_changed(radius, light.intensity, light.on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        levels: Vec<u32>,
        game_overs: u32,
        game_wins: u32,
        prompts: u32,
        states: Vec<(GameState, GameState)>,
    }

    struct Recorder(Rc<RefCell<Log>>);

    impl GameObserver for Recorder {
        fn on_level_changed(&mut self, level: u32) {
            self.0.borrow_mut().levels.push(level);
        }
        fn on_game_over(&mut self, _score: u32, _level: u32) {
            self.0.borrow_mut().game_overs += 1;
        }
        fn on_game_won(&mut self, _score: u32, _level: u32) {
            self.0.borrow_mut().game_wins += 1;
        }
        fn on_highscore_prompt(&mut self, _score: u32, _qualifies: bool) {
            self.0.borrow_mut().prompts += 1;
        }
        fn on_state_changed(&mut self, from: GameState, to: GameState) {
            self.0.borrow_mut().states.push((from, to));
        }
    }

    fn running_session(config: GameConfig) -> (GameSession, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut session =
            GameSession::new(config, StdRng::seed_from_u64(21)).with_observer(Box::new(Recorder(log.clone())));
        session.show_title();
        session.start_game(None);
        // Replace the generated level with an empty arena the tests control.
        session.maze = Maze::open(800.0, 600.0, 40.0);
        session.player.pos = Point::new(386.0, 286.0);
        session.enemies.clear();
        session.crystals.clear();
        (session, log)
    }

    fn crystal_on_player(session: &GameSession, points: u32) -> Crystal {
        Crystal::new(session.player.center(), 7.0, points)
    }

    fn enemy_on_player(session: &GameSession) -> Enemy {
        Enemy::new(session.player.pos, 28.0, 60.0, 0.0)
    }

    #[test]
    fn starts_at_title_then_runs() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut session = GameSession::new(GameConfig::default(), StdRng::seed_from_u64(3))
            .with_observer(Box::new(Recorder(log.clone())));
        assert_eq!(session.state(), GameState::Initializing);
        session.show_title();
        session.start_game(Some(4));
        assert_eq!(session.state(), GameState::Running);
        assert_eq!(session.level(), 4);
        assert_eq!(session.crystals().len(), 14);
        assert_eq!(session.enemies().len(), 6);
        assert_eq!(
            log.borrow().states,
            vec![
                (GameState::Initializing, GameState::Title),
                (GameState::Title, GameState::Running)
            ]
        );
        assert!(session.message().unwrap_or_default().contains("Hitta 14 kristaller"));
    }

    #[test]
    fn eighth_crystal_advances_level_exactly_once() {
        let (mut session, log) = running_session(GameConfig::default());
        log.borrow_mut().levels.clear();
        let points = session.factory.crystal_points(1);
        session.crystals = (0..8).map(|_| crystal_on_player(&session, points)).collect();
        // An enemy that would touch the player this tick: the old level must
        // not be simulated any further once its quota is met.
        let enemy = enemy_on_player(&session);
        session.enemies.push(enemy);

        session.tick(16.0, &InputSnapshot::default());

        assert_eq!(log.borrow().levels, vec![2]);
        assert_eq!(session.level(), 2);
        assert_eq!(session.state(), GameState::LevelTransition);
        assert_eq!(session.player().crystals_collected, 0);
        assert_eq!(session.score(), 8 * 10 + 100);
        assert_eq!(session.crystals().len(), 10);

        // Nothing moves between levels.
        let pos = session.player().pos;
        session.tick(16.0, &InputSnapshot { right: true, ..Default::default() });
        assert_eq!(session.player().pos, pos);
        assert_eq!(log.borrow().levels, vec![2]);

        session.continue_level();
        assert_eq!(session.state(), GameState::Running);
    }

    #[test]
    fn extra_crystals_in_the_same_tick_do_not_double_advance() {
        let (mut session, log) = running_session(GameConfig::default());
        log.borrow_mut().levels.clear();
        session.crystals = (0..9).map(|_| crystal_on_player(&session, 10)).collect();
        session.tick(16.0, &InputSnapshot::default());
        assert_eq!(log.borrow().levels, vec![2]);
        assert_eq!(session.score(), 9 * 10 + 100);
    }

    #[test]
    fn enemy_contact_ends_game_once() {
        let (mut session, log) = running_session(GameConfig::default());
        let enemy = enemy_on_player(&session);
        session.enemies.push(enemy);
        session.tick(16.0, &InputSnapshot::default());
        assert_eq!(session.state(), GameState::GameOver);
        session.tick(16.0, &InputSnapshot::default());
        session.end_game();
        session.skip_level();
        assert_eq!(log.borrow().game_overs, 1);
        assert_eq!(session.state(), GameState::GameOver);
        assert!(session.qualifies_for_highscore());
    }

    #[test]
    fn invincible_player_survives_contact() {
        let (mut session, log) = running_session(GameConfig::default());
        session.set_invincible(true);
        let enemy = enemy_on_player(&session);
        session.enemies.push(enemy);
        for _ in 0..10 {
            session.tick(16.0, &InputSnapshot::default());
        }
        assert_eq!(session.state(), GameState::Running);
        assert_eq!(log.borrow().game_overs, 0);
    }

    #[test]
    fn highscore_prompt_arrives_after_delay() {
        let (mut session, log) = running_session(GameConfig::default());
        session.add_points(250);
        let enemy = enemy_on_player(&session);
        session.enemies.push(enemy);
        session.tick(16.0, &InputSnapshot::default());
        assert_eq!(session.state(), GameState::GameOver);

        session.tick(1_000.0, &InputSnapshot::default());
        assert!(!session.highscore_prompt_due());
        session.tick(100.0, &InputSnapshot::default());
        assert!(session.highscore_prompt_due());
        session.tick(500.0, &InputSnapshot::default());
        assert_eq!(log.borrow().prompts, 1);

        assert_eq!(session.submit_highscore(""), Some(0));
        assert_eq!(session.submit_highscore("again"), None);
        assert!(!session.highscore_prompt_due());
        let best = &session.highscores().entries()[0];
        assert_eq!(best.score, 250);
        assert_eq!(best.name, "Okänd spelare");

        session.restart();
        assert_eq!(session.state(), GameState::Running);
        assert_eq!(session.score(), 0);
        assert_eq!(session.level(), 1);
    }

    #[test]
    fn pause_freezes_simulation() {
        let (mut session, _log) = running_session(GameConfig::default());
        session.resume();
        assert_eq!(session.state(), GameState::Running);
        session.focus_lost();
        assert_eq!(session.state(), GameState::Paused);
        let clock = session.clock();
        let pos = session.player().pos;
        session.tick(16.0, &InputSnapshot { left: true, ..Default::default() });
        assert_eq!(session.clock(), clock);
        assert_eq!(session.player().pos, pos);
        session.resume();
        session.tick(16.0, &InputSnapshot { left: true, ..Default::default() });
        assert!(session.player().pos.x < pos.x);
    }

    #[test]
    #[allow(deprecated)]
    fn boolean_shim_maps_onto_states() {
        let (mut session, _log) = running_session(GameConfig::default());
        session.set_running(false);
        assert_eq!(session.state(), GameState::Paused);
        session.set_running(true);
        assert_eq!(session.state(), GameState::Running);
    }

    #[test]
    fn flashlight_input_stuns_enemy_ahead() {
        let (mut session, _log) = running_session(GameConfig::default());
        let c = session.player.center();
        session.enemies.push(Enemy::new(Point::new(c.x + 80.0, c.y - 14.0), 28.0, 60.0, 0.0));
        session.player.facing = 0.0;
        session.set_invincible(true);
        session.tick(16.0, &InputSnapshot { use_flashlight: true, ..Default::default() });
        let enemy = &session.enemies()[0];
        assert!(enemy.is_stunned(session.clock()));
        assert_eq!(enemy.pos, Point::new(c.x + 80.0, c.y - 14.0));
    }

    #[test]
    fn projectile_hit_dims_light() {
        let (mut session, _log) = running_session(GameConfig::default());
        let c = session.player.center();
        session
            .projectiles
            .push(Projectile::new(Point::new(c.x - 10.0, c.y), 0.0, 100.0, 4.0, 10_000.0));
        session.tick(16.0, &InputSnapshot::default());
        assert!(session.projectiles().is_empty());
        let drain = session.config().projectile_light_drain;
        assert!((session.player().light.intensity - (100.0 - drain)).abs() < 0.1);
    }

    #[test]
    fn completing_final_level_wins() {
        let config = GameConfig {
            final_level: Some(1),
            ..GameConfig::default()
        };
        let (mut session, log) = running_session(config);
        session.skip_level();
        assert_eq!(session.state(), GameState::GameWon);
        assert_eq!(log.borrow().game_wins, 1);
        assert_eq!(session.score(), 100);
    }

    #[test]
    fn skip_level_and_points_debug_tools() {
        let (mut session, _log) = running_session(GameConfig::default());
        session.add_points(1000);
        session.skip_level();
        assert_eq!(session.level(), 2);
        assert_eq!(session.score(), 1100);
    }

    #[test]
    fn gated_crystals_hide_outside_light() {
        let (mut session, _log) = running_session(GameConfig::default());
        session.level = session.config().crystal_visibility_level;
        let c = session.player.center();
        session.crystals = vec![
            Crystal::new(Point::new(c.x + 40.0, c.y), 7.0, 30),
            Crystal::new(Point::new(c.x + 350.0, c.y), 7.0, 30),
        ];
        session.tick(16.0, &InputSnapshot::default());
        assert!(session.crystals()[0].visible);
        assert!(!session.crystals()[1].visible);
    }

    #[test]
    fn huge_start_level_is_clamped() {
        let mut session = GameSession::new(GameConfig::default(), StdRng::seed_from_u64(8));
        session.start_game(Some(u32::MAX));
        assert_eq!(session.state(), GameState::Running);
        assert_eq!(session.level(), 10);

        let endless = GameConfig {
            final_level: None,
            ..GameConfig::default()
        };
        let mut session = GameSession::new(endless, StdRng::seed_from_u64(8));
        session.start_game(Some(u32::MAX));
        assert_eq!(session.level(), crate::constants::MAX_START_LEVEL);
        assert_eq!(session.crystals().len() as u32, session.required_crystals());
    }

    #[test]
    fn pickup_near_max_score_saturates() {
        let (mut session, _log) = running_session(GameConfig::default());
        session.add_points(u32::MAX);
        let crystal = crystal_on_player(&session, 10);
        session.crystals.push(crystal);
        session.tick(16.0, &InputSnapshot::default());
        assert_eq!(session.score(), u32::MAX);
        assert_eq!(session.player().crystals_collected, 1);
    }

    #[test]
    fn gated_crystals_are_hidden_on_the_transition_screen() {
        let mut session = GameSession::new(GameConfig::default(), StdRng::seed_from_u64(17));
        let gated_level = session.config().crystal_visibility_level;
        session.start_game(Some(gated_level - 1));
        session.skip_level();
        assert_eq!(session.state(), GameState::LevelTransition);
        assert_eq!(session.level(), gated_level);

        let center = session.player().center();
        let radius = session.light_radius();
        for crystal in session.crystals() {
            assert_eq!(crystal.visible, crystal.center.distance(center) <= radius);
        }
        assert!(session.crystals().iter().any(|c| !c.visible));
    }
}
