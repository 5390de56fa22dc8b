use crate::session::GameState;

/// Notifications from the simulation to whatever presents it.
///
/// Every method has an empty default, so an observer only implements what it
/// displays. Calls happen synchronously inside `GameSession` operations and
/// must not call back into the session.
pub trait GameObserver {
    fn on_score_changed(&mut self, _score: u32) {}
    fn on_level_changed(&mut self, _level: u32) {}
    fn on_crystals_changed(&mut self, _collected: u32, _required: u32) {}
    fn on_stamina_changed(&mut self, _stamina: f32, _max: f32) {}
    fn on_light_changed(&mut self, _radius: f32, _intensity: f32, _on: bool) {}
    fn on_message(&mut self, _message: &str) {}
    fn on_game_over(&mut self, _score: u32, _level: u32) {}
    fn on_game_won(&mut self, _score: u32, _level: u32) {}
    fn on_state_changed(&mut self, _from: GameState, _to: GameState) {}
    /// The game-over screen should now ask for a highscore name.
    fn on_highscore_prompt(&mut self, _score: u32, _qualifies: bool) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl GameObserver for NullObserver {}
