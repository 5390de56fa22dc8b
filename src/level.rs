//! Per-level difficulty curve and entity placement.

use rand::Rng;
use std::f32::consts::TAU;

use crate::config::GameConfig;
use crate::constants::{MAX_START_LEVEL, PLACEMENT_ATTEMPTS};
use crate::crystal::Crystal;
use crate::enemy::Enemy;
use crate::geometry::{find_safe_position, random_between, Point, Rect};
use crate::maze::{self, Corner, Maze};

/// Crystals keep this fraction of a tile clear of any wall on at least one
/// axis.
const CRYSTAL_WALL_MARGIN: f32 = 0.25;

/// Everything a fresh level starts with.
#[derive(Clone, Debug)]
pub struct LevelLayout {
    pub maze: Maze,
    pub player_start: Point,
    pub enemies: Vec<Enemy>,
    pub crystals: Vec<Crystal>,
}

#[derive(Clone, Debug)]
pub struct LevelFactory {
    config: GameConfig,
}

impl LevelFactory {
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn required_crystals(&self, level: u32) -> u32 {
        let extra = level.saturating_sub(1).saturating_mul(self.config.crystal_increase_per_level);
        self.config.base_crystals.saturating_add(extra)
    }

    pub fn enemy_count(&self, level: u32) -> u32 {
        let extra = level.saturating_sub(1).saturating_mul(self.config.enemy_increase_per_level);
        self.config.base_enemies.saturating_add(extra)
    }

    pub fn enemy_speed(&self, level: u32) -> f32 {
        let c = &self.config;
        (c.enemy_base_speed + level.saturating_sub(1) as f32 * c.enemy_speed_per_level).min(c.enemy_max_speed)
    }

    pub fn crystal_points(&self, level: u32) -> u32 {
        self.config.points_per_crystal.saturating_mul(level)
    }

    /// Highest level a game may start at: the final level, or
    /// `MAX_START_LEVEL` in endless games.
    pub fn max_start_level(&self) -> u32 {
        self.config.final_level.unwrap_or(MAX_START_LEVEL).max(1)
    }

    pub fn max_light_radius(&self, level: u32) -> f32 {
        if level >= self.config.reduced_light_level {
            self.config.reduced_light_radius
        } else {
            self.config.max_light_radius
        }
    }

    pub fn crystals_light_gated(&self, level: u32) -> bool {
        level >= self.config.crystal_visibility_level
    }

    pub fn is_final_level(&self, level: u32) -> bool {
        self.config.final_level.is_some_and(|last| level >= last)
    }

    pub fn generate_maze(&self, rng: &mut impl Rng) -> Maze {
        maze::generate(self.config.arena_width, self.config.arena_height, self.config.tile_size, rng)
    }

    pub fn spawn_player(&self, maze: &Maze, rng: &mut impl Rng) -> Point {
        let size = self.config.player_size;
        find_safe_position(
            &maze.walls,
            maze.zone_position(Corner::TopLeft, size),
            size,
            maze.inner_bounds(),
            maze.fallback_position(),
            rng,
        )
    }

    /// Random open spots far enough from the player. If the random search
    /// runs dry the enemy goes to the opposite corner's spawn zone.
    pub fn spawn_enemies(&self, maze: &Maze, level: u32, player_center: Point, rng: &mut impl Rng) -> Vec<Enemy> {
        let size = self.config.enemy_size;
        let speed = self.enemy_speed(level);
        let area = maze.inner_bounds();
        let mut enemies = Vec::new();

        for _ in 0..self.enemy_count(level) {
            let mut pos = None;
            for _ in 0..PLACEMENT_ATTEMPTS {
                let candidate = random_point(rng, area, size);
                let body = Rect::square(candidate, size);
                if body.center().distance(player_center) >= self.config.enemy_min_spawn_distance
                    && !maze.collides(&body)
                {
                    pos = Some(candidate);
                    break;
                }
            }
            let pos = match pos {
                Some(p) => p,
                None => {
                    tracing::debug!(level, "enemy placement exhausted, using spawn zone");
                    find_safe_position(
                        &maze.walls,
                        maze.zone_position(Corner::BottomRight, size),
                        size,
                        area,
                        maze.fallback_position(),
                        rng,
                    )
                }
            };
            enemies.push(Enemy::new(pos, size, speed, rng.gen_range(0.0..TAU)));
        }
        enemies
    }

    /// Crystals avoid the player's surroundings and hugging walls. Failed
    /// searches fall back to the other corners' spawn zones in turn.
    pub fn spawn_crystals(&self, maze: &Maze, level: u32, player_center: Point, rng: &mut impl Rng) -> Vec<Crystal> {
        let radius = self.config.crystal_size / 2.0;
        let reach = radius + self.config.tile_size * CRYSTAL_WALL_MARGIN;
        let points = self.crystal_points(level);
        let inner = maze.inner_bounds();
        let area = Rect::new(inner.x + radius, inner.y + radius, inner.width - 2.0 * radius, inner.height - 2.0 * radius);
        let mut crystals = Vec::new();
        let mut fallbacks = 0;

        for _ in 0..self.required_crystals(level) {
            let mut center = None;
            for _ in 0..PLACEMENT_ATTEMPTS {
                let c = Point::new(random_between(rng, area.x, area.right()), random_between(rng, area.y, area.bottom()));
                let padded = Rect::new(c.x - reach, c.y - reach, reach * 2.0, reach * 2.0);
                if c.distance(player_center) >= self.config.crystal_min_spawn_distance && !maze.collides(&padded) {
                    center = Some(c);
                    break;
                }
            }
            let center = center.unwrap_or_else(|| {
                tracing::debug!(level, fallbacks, "crystal placement exhausted, using spawn zone");
                fallbacks += 1;
                fallback_crystal_center(maze, fallbacks - 1)
            });
            crystals.push(Crystal::new(center, radius, points));
        }
        crystals
    }

    pub fn build(&self, level: u32, rng: &mut impl Rng) -> LevelLayout {
        let maze = self.generate_maze(rng);
        let player_start = self.spawn_player(&maze, rng);
        let player_center = Rect::square(player_start, self.config.player_size).center();
        let enemies = self.spawn_enemies(&maze, level, player_center, rng);
        let crystals = self.spawn_crystals(&maze, level, player_center, rng);
        tracing::debug!(level, enemies = enemies.len(), crystals = crystals.len(), "level built");
        LevelLayout {
            maze,
            player_start,
            enemies,
            crystals,
        }
    }
}

// Cycles through the three corners away from the player, spreading
// repeated picks across each zone.
fn fallback_crystal_center(maze: &Maze, n: usize) -> Point {
    const CORNERS: [Corner; 3] = [Corner::TopRight, Corner::BottomLeft, Corner::BottomRight];
    let zone = maze.spawn_zone(CORNERS[n % CORNERS.len()]);
    let slot = (n / CORNERS.len()) % 3;
    let shift = (slot as f32 - 1.0) * zone.width / 4.0;
    zone.center().offset(shift, 0.0)
}

fn random_point(rng: &mut impl Rng, area: Rect, size: f32) -> Point {
    Point::new(
        random_between(rng, area.x, area.right() - size),
        random_between(rng, area.y, area.bottom() - size),
    )
}
