// Default tunables. `GameConfig::default()` is built from these.

pub const ARENA_WIDTH: f32 = 800.0;
pub const ARENA_HEIGHT: f32 = 600.0;
pub const TILE_SIZE: f32 = 40.0;

pub const PLAYER_SIZE: f32 = 28.0;
pub const ENEMY_SIZE: f32 = 28.0;
pub const CRYSTAL_SIZE: f32 = 14.0;

pub const PLAYER_SPEED: f32 = 150.0;
pub const PLAYER_MAX_SPRINT_SPEED: f32 = 250.0;
pub const PLAYER_TIRED_SPEED: f32 = 80.0;

pub const MAX_STAMINA: f32 = 100.0;
pub const STAMINA_DRAIN_PER_SEC: f32 = 30.0;
pub const STAMINA_RECOVERY_PER_SEC: f32 = 15.0;
pub const TIRED_DURATION_MS: f64 = 2000.0;

pub const MAX_LIGHT_RADIUS: f32 = 150.0;
pub const REDUCED_LIGHT_RADIUS: f32 = 110.0;
pub const MIN_LIGHT_RADIUS: f32 = 30.0;
pub const LIGHT_INTENSITY_FLOOR: f32 = 50.0;
pub const LIGHT_DECAY_PER_SEC: f32 = 6.25;
pub const LIGHT_RECOVERY_PER_SEC: f32 = 0.625;

pub const FLASHLIGHT_ANGLE: f32 = std::f32::consts::FRAC_PI_3;
pub const FLASHLIGHT_RANGE: f32 = 200.0;
pub const FLASHLIGHT_DURATION_MS: f64 = 1000.0;
pub const FLASHLIGHT_COOLDOWN_MS: f64 = 3000.0;
pub const ENEMY_STUN_DURATION_MS: f64 = 2000.0;

pub const BASE_POINTS_PER_CRYSTAL: u32 = 10;
pub const POINTS_PER_LEVEL: u32 = 100;
pub const TOTAL_CRYSTALS: u32 = 8;
pub const LEVEL_CRYSTAL_INCREASE: u32 = 2;
pub const BASE_ENEMIES: u32 = 3;
pub const LEVEL_ENEMY_INCREASE: u32 = 1;
pub const CRYSTAL_VISIBILITY_LEVEL: u32 = 3;
pub const REDUCED_LIGHT_LEVEL: u32 = 5;
pub const FINAL_LEVEL: u32 = 10;
pub const MAX_START_LEVEL: u32 = 50;

pub const ENEMY_BASE_SPEED: f32 = 60.0;
pub const ENEMY_SPEED_PER_LEVEL: f32 = 8.0;
pub const ENEMY_MAX_SPEED: f32 = 140.0;
pub const ENEMY_DETECTION_RANGE: f32 = 180.0;
pub const ENEMY_PATROL_TURN_MS: f64 = 2000.0;
pub const ENEMY_MIN_SPAWN_DISTANCE: f32 = 200.0;
pub const CRYSTAL_MIN_SPAWN_DISTANCE: f32 = 100.0;

pub const PROJECTILE_MIN_LEVEL: u32 = 3;
pub const PROJECTILE_SPEED: f32 = 220.0;
pub const PROJECTILE_SIZE: f32 = 8.0;
pub const PROJECTILE_RANGE: f32 = 260.0;
pub const PROJECTILE_LIFETIME_MS: f64 = 2500.0;
pub const PROJECTILE_COOLDOWN_MS: f64 = 3000.0;
pub const PROJECTILE_LIGHT_DRAIN: f32 = 25.0;

pub const MAX_HIGHSCORES: usize = 10;

// Fixed simulation constants, not exposed as tunables.
pub const SPEED_LERP: f32 = 0.1;
pub const IDLE_SPEED_LERP: f32 = 0.15;
pub const FRAME_MS: f32 = 16.0;
pub const GLOW_RATE: f32 = 0.05;
pub const SAFE_POSITION_ATTEMPTS: u32 = 50;
pub const PLACEMENT_ATTEMPTS: u32 = 100;
pub const SPAWN_ZONE_TILES: usize = 3;
pub const BRAID_CHANCE: f32 = 0.6;
pub const EXTRA_OPENINGS: f32 = 0.15;
pub const GAME_OVER_PROMPT_DELAY_MS: f64 = 1100.0;
pub const UNKNOWN_PLAYER_NAME: &str = "Okänd spelare";
