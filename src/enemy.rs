use rand::Rng;
use std::f32::consts::TAU;

use crate::config::GameConfig;
use crate::geometry::{move_with_slide, Point, Rect};
use crate::maze::Maze;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiMode {
    Patrolling,
    Chasing,
    Stunned,
}

/// What an enemy knows about the player when it decides where to go.
#[derive(Clone, Copy, Debug)]
pub struct Target {
    pub center: Point,
    pub light_on: bool,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    /// Top-left corner of the bounding square.
    pub pos: Point,
    pub size: f32,
    pub speed: f32,
    pub mode: AiMode,
    pub stunned_until: f64,
    heading: f32,
    next_turn_at: f64,
    next_shot_at: f64,
}

impl Enemy {
    pub fn new(pos: Point, size: f32, speed: f32, heading: f32) -> Self {
        Self {
            pos,
            size,
            speed,
            mode: AiMode::Patrolling,
            stunned_until: 0.0,
            heading,
            next_turn_at: 0.0,
            next_shot_at: 0.0,
        }
    }

    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    pub fn center(&self) -> Point {
        Rect::square(self.pos, self.size).center()
    }

    pub fn is_stunned(&self, now: f64) -> bool {
        now < self.stunned_until
    }

    /// Freezes the enemy until `until`. A longer stun already in effect wins.
    pub fn stun(&mut self, until: f64) {
        self.stunned_until = self.stunned_until.max(until);
        self.mode = AiMode::Stunned;
    }

    pub fn touches(&self, center: Point, radius: f32) -> bool {
        self.center().distance(center) < self.radius() + radius
    }

    /// Advances one tick. Returns a projectile when the enemy fires.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt_ms: f32,
        now: f64,
        target: Target,
        maze: &Maze,
        level: u32,
        config: &GameConfig,
        rng: &mut impl Rng,
    ) -> Option<Projectile> {
        if self.is_stunned(now) {
            self.mode = AiMode::Stunned;
            return None;
        }

        let center = self.center();
        let dist = center.distance(target.center);
        let detection = if target.light_on {
            config.enemy_detection_range
        } else {
            config.enemy_detection_range / 2.0
        };

        if dist <= detection {
            self.mode = AiMode::Chasing;
            self.heading = center.angle_to(target.center);
        } else if self.mode != AiMode::Patrolling || now >= self.next_turn_at {
            self.mode = AiMode::Patrolling;
            self.turn(now, config, rng);
        }

        let step = self.speed * dt_ms / 1000.0;
        let wanted = self.pos.offset(self.heading.cos() * step, self.heading.sin() * step);
        let moved = move_with_slide(&maze.walls, self.pos, self.size, wanted, self.radius());
        if moved == self.pos && step > 0.0 && self.mode == AiMode::Patrolling {
            self.turn(now, config, rng);
        }
        self.pos = moved;

        if self.mode == AiMode::Chasing
            && level >= config.projectile_min_level
            && dist <= config.projectile_range
            && now >= self.next_shot_at
        {
            self.next_shot_at = now + config.projectile_cooldown_ms;
            return Some(Projectile::new(
                self.center(),
                self.heading,
                config.projectile_speed,
                config.projectile_size / 2.0,
                now + config.projectile_lifetime_ms,
            ));
        }
        None
    }

    fn turn(&mut self, now: f64, config: &GameConfig, rng: &mut impl Rng) {
        self.heading = rng.gen_range(0.0..TAU);
        self.next_turn_at = now + config.enemy_patrol_turn_ms;
    }
}

/// A dark shot fired by a chasing enemy. Dims the player's light on contact.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub center: Point,
    pub heading: f32,
    pub speed: f32,
    pub radius: f32,
    pub expires_at: f64,
}

impl Projectile {
    pub fn new(center: Point, heading: f32, speed: f32, radius: f32, expires_at: f64) -> Self {
        Self {
            center,
            heading,
            speed,
            radius,
            expires_at,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        )
    }

    /// Moves the shot. Returns `false` once it has expired, hit a wall or
    /// left the arena.
    pub fn update(&mut self, dt_ms: f32, now: f64, maze: &Maze) -> bool {
        if now >= self.expires_at {
            return false;
        }
        let step = self.speed * dt_ms / 1000.0;
        self.center = self.center.offset(self.heading.cos() * step, self.heading.sin() * step);
        maze.bounds().contains(self.center) && !maze.collides(&self.bounds())
    }

    pub fn hits(&self, center: Point, radius: f32) -> bool {
        self.center.distance(center) < self.radius + radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn far_target() -> Target {
        Target {
            center: Point::new(10_000.0, 10_000.0),
            light_on: true,
        }
    }

    #[test]
    fn stunned_enemy_stays_put_until_stun_expires() {
        let config = GameConfig::default();
        let maze = Maze::open(800.0, 600.0, 40.0);
        let mut rng = StdRng::seed_from_u64(4);
        let mut enemy = Enemy::new(Point::new(300.0, 300.0), 28.0, 80.0, 0.0);

        let t = 1_000.0;
        let d = config.enemy_stun_duration_ms;
        enemy.stun(t + d);
        let start = enemy.pos;
        let mut now = t;
        while now < t + d {
            assert!(enemy.update(16.0, now, far_target(), &maze, 1, &config, &mut rng).is_none());
            assert_eq!(enemy.pos, start);
            assert_eq!(enemy.mode, AiMode::Stunned);
            now += 16.0;
        }
        enemy.update(16.0, t + d, far_target(), &maze, 1, &config, &mut rng);
        assert_ne!(enemy.pos, start);
        assert_eq!(enemy.mode, AiMode::Patrolling);
    }

    #[test]
    fn longer_stun_is_not_shortened() {
        let mut enemy = Enemy::new(Point::default(), 28.0, 80.0, 0.0);
        enemy.stun(5_000.0);
        enemy.stun(3_000.0);
        assert_eq!(enemy.stunned_until, 5_000.0);
    }

    #[test]
    fn chases_player_in_range() {
        let config = GameConfig::default();
        let maze = Maze::open(800.0, 600.0, 40.0);
        let mut rng = StdRng::seed_from_u64(8);
        let mut enemy = Enemy::new(Point::new(300.0, 300.0), 28.0, 80.0, 0.0);
        let target = Target {
            center: Point::new(414.0, 314.0),
            light_on: true,
        };
        let before = enemy.center().distance(target.center);
        enemy.update(100.0, 0.0, target, &maze, 1, &config, &mut rng);
        assert_eq!(enemy.mode, AiMode::Chasing);
        assert!(enemy.center().distance(target.center) < before);
    }

    #[test]
    fn dark_player_is_harder_to_detect() {
        let config = GameConfig::default();
        let maze = Maze::open(800.0, 600.0, 40.0);
        let mut rng = StdRng::seed_from_u64(9);
        let mut enemy = Enemy::new(Point::new(300.0, 300.0), 28.0, 80.0, 0.0);
        // 150px away: inside full range, outside half range.
        let target = Target {
            center: Point::new(464.0, 314.0),
            light_on: false,
        };
        enemy.update(16.0, 0.0, target, &maze, 1, &config, &mut rng);
        assert_eq!(enemy.mode, AiMode::Patrolling);
    }

    #[test]
    fn fires_only_from_configured_level() {
        let config = GameConfig::default();
        let maze = Maze::open(800.0, 600.0, 40.0);
        let mut rng = StdRng::seed_from_u64(10);
        let target = Target {
            center: Point::new(414.0, 314.0),
            light_on: true,
        };

        let mut low = Enemy::new(Point::new(300.0, 300.0), 28.0, 80.0, 0.0);
        assert!(low.update(16.0, 0.0, target, &maze, 1, &config, &mut rng).is_none());

        let mut high = Enemy::new(Point::new(300.0, 300.0), 28.0, 80.0, 0.0);
        let level = config.projectile_min_level;
        assert!(high.update(16.0, 0.0, target, &maze, level, &config, &mut rng).is_some());
        // cooling down
        assert!(high.update(16.0, 16.0, target, &maze, level, &config, &mut rng).is_none());
    }

    #[test]
    fn projectile_dies_on_wall_and_expiry() {
        let maze = Maze::with_walls(800.0, 600.0, 40.0, vec![Rect::new(120.0, 0.0, 40.0, 600.0)]);
        let mut shot = Projectile::new(Point::new(100.0, 100.0), 0.0, 200.0, 4.0, 10_000.0);
        assert!(shot.update(16.0, 0.0, &maze));
        let mut alive = true;
        for i in 1..20 {
            alive = shot.update(16.0, i as f64 * 16.0, &maze);
            if !alive {
                break;
            }
        }
        assert!(!alive);

        let mut old = Projectile::new(Point::new(400.0, 300.0), 0.0, 200.0, 4.0, 50.0);
        assert!(!old.update(16.0, 50.0, &maze));
    }
}
