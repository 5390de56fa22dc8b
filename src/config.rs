use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::*;
use crate::error::{GameError, GameResult};

/// Every effect-bearing tunable of the simulation.
///
/// Missing fields in a config file fall back to the defaults in
/// [`crate::constants`], so a file only needs to list what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub arena_width: f32,
    pub arena_height: f32,
    pub tile_size: f32,

    pub player_size: f32,
    pub enemy_size: f32,
    pub crystal_size: f32,

    pub base_speed: f32,
    pub sprint_speed: f32,
    pub tired_speed: f32,

    pub max_stamina: f32,
    pub stamina_drain_per_sec: f32,
    pub stamina_recovery_per_sec: f32,
    pub tired_duration_ms: f64,

    pub max_light_radius: f32,
    pub reduced_light_radius: f32,
    pub min_light_radius: f32,
    pub light_intensity_floor: f32,
    pub light_decay_per_sec: f32,
    pub light_recovery_per_sec: f32,

    /// Full cone width in radians.
    pub flashlight_angle: f32,
    pub flashlight_range: f32,
    pub flashlight_duration_ms: f64,
    pub flashlight_cooldown_ms: f64,
    pub enemy_stun_duration_ms: f64,

    pub points_per_crystal: u32,
    pub points_per_level: u32,
    pub base_crystals: u32,
    pub crystal_increase_per_level: u32,
    pub base_enemies: u32,
    pub enemy_increase_per_level: u32,
    pub crystal_visibility_level: u32,
    pub reduced_light_level: u32,
    /// Completing this level wins the game. `None` plays forever.
    pub final_level: Option<u32>,

    pub enemy_base_speed: f32,
    pub enemy_speed_per_level: f32,
    pub enemy_max_speed: f32,
    pub enemy_detection_range: f32,
    pub enemy_patrol_turn_ms: f64,
    pub enemy_min_spawn_distance: f32,
    pub crystal_min_spawn_distance: f32,

    pub projectile_min_level: u32,
    pub projectile_speed: f32,
    pub projectile_size: f32,
    pub projectile_range: f32,
    pub projectile_lifetime_ms: f64,
    pub projectile_cooldown_ms: f64,
    pub projectile_light_drain: f32,

    pub max_highscores: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            tile_size: TILE_SIZE,
            player_size: PLAYER_SIZE,
            enemy_size: ENEMY_SIZE,
            crystal_size: CRYSTAL_SIZE,
            base_speed: PLAYER_SPEED,
            sprint_speed: PLAYER_MAX_SPRINT_SPEED,
            tired_speed: PLAYER_TIRED_SPEED,
            max_stamina: MAX_STAMINA,
            stamina_drain_per_sec: STAMINA_DRAIN_PER_SEC,
            stamina_recovery_per_sec: STAMINA_RECOVERY_PER_SEC,
            tired_duration_ms: TIRED_DURATION_MS,
            max_light_radius: MAX_LIGHT_RADIUS,
            reduced_light_radius: REDUCED_LIGHT_RADIUS,
            min_light_radius: MIN_LIGHT_RADIUS,
            light_intensity_floor: LIGHT_INTENSITY_FLOOR,
            light_decay_per_sec: LIGHT_DECAY_PER_SEC,
            light_recovery_per_sec: LIGHT_RECOVERY_PER_SEC,
            flashlight_angle: FLASHLIGHT_ANGLE,
            flashlight_range: FLASHLIGHT_RANGE,
            flashlight_duration_ms: FLASHLIGHT_DURATION_MS,
            flashlight_cooldown_ms: FLASHLIGHT_COOLDOWN_MS,
            enemy_stun_duration_ms: ENEMY_STUN_DURATION_MS,
            points_per_crystal: BASE_POINTS_PER_CRYSTAL,
            points_per_level: POINTS_PER_LEVEL,
            base_crystals: TOTAL_CRYSTALS,
            crystal_increase_per_level: LEVEL_CRYSTAL_INCREASE,
            base_enemies: BASE_ENEMIES,
            enemy_increase_per_level: LEVEL_ENEMY_INCREASE,
            crystal_visibility_level: CRYSTAL_VISIBILITY_LEVEL,
            reduced_light_level: REDUCED_LIGHT_LEVEL,
            final_level: Some(FINAL_LEVEL),
            enemy_base_speed: ENEMY_BASE_SPEED,
            enemy_speed_per_level: ENEMY_SPEED_PER_LEVEL,
            enemy_max_speed: ENEMY_MAX_SPEED,
            enemy_detection_range: ENEMY_DETECTION_RANGE,
            enemy_patrol_turn_ms: ENEMY_PATROL_TURN_MS,
            enemy_min_spawn_distance: ENEMY_MIN_SPAWN_DISTANCE,
            crystal_min_spawn_distance: CRYSTAL_MIN_SPAWN_DISTANCE,
            projectile_min_level: PROJECTILE_MIN_LEVEL,
            projectile_speed: PROJECTILE_SPEED,
            projectile_size: PROJECTILE_SIZE,
            projectile_range: PROJECTILE_RANGE,
            projectile_lifetime_ms: PROJECTILE_LIFETIME_MS,
            projectile_cooldown_ms: PROJECTILE_COOLDOWN_MS,
            projectile_light_drain: PROJECTILE_LIGHT_DRAIN,
            max_highscores: MAX_HIGHSCORES,
        }
    }
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| GameError::io(path, e))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> GameResult<Self> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GameResult<()> {
        let positive = [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("tile_size", self.tile_size),
            ("player_size", self.player_size),
            ("enemy_size", self.enemy_size),
            ("crystal_size", self.crystal_size),
            ("base_speed", self.base_speed),
            ("max_stamina", self.max_stamina),
            ("max_light_radius", self.max_light_radius),
            ("projectile_size", self.projectile_size),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(GameError::InvalidConfig(format!("{name} must be positive, got {value}")));
            }
        }
        for (name, size) in [
            ("player_size", self.player_size),
            ("enemy_size", self.enemy_size),
            ("crystal_size", self.crystal_size),
        ] {
            if size >= self.tile_size {
                return Err(GameError::InvalidConfig(format!(
                    "{name} ({size}) must be smaller than tile_size ({})",
                    self.tile_size
                )));
            }
        }
        if self.arena_width < self.tile_size * 7.0 || self.arena_height < self.tile_size * 7.0 {
            return Err(GameError::InvalidConfig("arena must span at least 7 tiles on each axis".into()));
        }
        if self.min_light_radius > self.max_light_radius {
            return Err(GameError::InvalidConfig("min_light_radius exceeds max_light_radius".into()));
        }
        if !(0.0..=100.0).contains(&self.light_intensity_floor) {
            return Err(GameError::InvalidConfig("light_intensity_floor must lie in 0..=100".into()));
        }
        if self.base_crystals == 0 {
            return Err(GameError::InvalidConfig("base_crystals must be at least 1".into()));
        }
        if self.final_level == Some(0) {
            return Err(GameError::InvalidConfig("final_level must be at least 1".into()));
        }
        Ok(())
    }
}
