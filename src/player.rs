use crate::config::GameConfig;
use crate::constants::{IDLE_SPEED_LERP, SPEED_LERP};
use crate::crystal::Crystal;
use crate::enemy::Enemy;
use crate::geometry::{move_with_slide, normalize_angle, Point, Rect};
use crate::input::InputSnapshot;
use crate::maze::Maze;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    /// Radius at full intensity. Tracks the level's maximum while on.
    pub radius: f32,
    /// Percentage in `[0, 100]`.
    pub intensity: f32,
    pub on: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Flashlight {
    pub active: bool,
    pub ends_at: f64,
    pub last_used: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct Player {
    /// Top-left corner of the bounding square.
    pub pos: Point,
    pub size: f32,
    pub base_speed: f32,
    pub current_speed: f32,
    pub sprinting: bool,
    pub tired: bool,
    pub tired_until: f64,
    pub moving: bool,
    /// Facing angle in radians, kept from the last movement.
    pub facing: f32,
    pub stamina: f32,
    pub light: Light,
    pub flashlight: Flashlight,
    pub score: u32,
    pub crystals_collected: u32,
}

impl Player {
    pub fn new(pos: Point, max_light_radius: f32, config: &GameConfig) -> Self {
        Self {
            pos,
            size: config.player_size,
            base_speed: config.base_speed,
            current_speed: config.base_speed,
            sprinting: false,
            tired: false,
            tired_until: 0.0,
            moving: false,
            facing: 0.0,
            stamina: config.max_stamina,
            light: Light {
                radius: max_light_radius,
                intensity: 100.0,
                on: true,
            },
            flashlight: Flashlight::default(),
            score: 0,
            crystals_collected: 0,
        }
    }

    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    pub fn center(&self) -> Point {
        Rect::square(self.pos, self.size).center()
    }

    pub fn effective_light_radius(&self, config: &GameConfig) -> f32 {
        if self.light.on {
            self.light.radius * self.light.intensity / 100.0
        } else {
            config.min_light_radius
        }
    }

    /// Advances timers, stamina, light and position by one tick.
    pub fn update(&mut self, dt_ms: f32, now: f64, input: &InputSnapshot, maze: &Maze, config: &GameConfig) {
        if self.tired && now >= self.tired_until {
            self.tired = false;
        }
        if self.flashlight.active && now >= self.flashlight.ends_at {
            self.flashlight.active = false;
        }
        // Holding the beam roots the player in place.
        if self.flashlight.active {
            self.moving = false;
            return;
        }

        let (dx, dy) = input.direction();
        self.moving = dx != 0.0 || dy != 0.0;
        if self.moving {
            self.facing = dy.atan2(dx);
        }

        self.update_speed(dt_ms, now, input.sprint, config);
        self.update_light(dt_ms, config);

        if self.moving {
            let step = self.current_speed * dt_ms / 1000.0;
            let target = self.pos.offset(dx * step, dy * step);
            self.pos = move_with_slide(&maze.walls, self.pos, self.size, target, self.radius());
        }
    }

    fn update_speed(&mut self, dt_ms: f32, now: f64, wants_sprint: bool, config: &GameConfig) {
        let secs = dt_ms / 1000.0;
        if wants_sprint && self.moving && self.stamina > 0.0 && !self.tired {
            self.sprinting = true;
            self.stamina = (self.stamina - config.stamina_drain_per_sec * secs).max(0.0);
            self.current_speed = lerp(self.current_speed, config.sprint_speed, SPEED_LERP);
            if self.stamina <= 0.0 {
                self.tired = true;
                self.tired_until = now + config.tired_duration_ms;
                self.sprinting = false;
            }
            return;
        }

        self.sprinting = false;
        let target = if self.tired { config.tired_speed } else { self.base_speed };
        let factor = if self.moving { SPEED_LERP } else { IDLE_SPEED_LERP };
        self.current_speed = lerp(self.current_speed, target, factor);
        self.stamina = (self.stamina + config.stamina_recovery_per_sec * secs).min(config.max_stamina);
    }

    fn update_light(&mut self, dt_ms: f32, config: &GameConfig) {
        if !self.light.on {
            return;
        }
        let secs = dt_ms / 1000.0;
        let i = self.light.intensity;
        self.light.intensity = if self.sprinting && self.moving {
            if i > config.light_intensity_floor {
                (i - config.light_decay_per_sec * secs).max(config.light_intensity_floor)
            } else {
                i
            }
        } else {
            (i + config.light_recovery_per_sec * secs).min(100.0)
        };
    }

    /// Switches the light. Turning it on restores the level's radius.
    pub fn toggle_light(&mut self, max_light_radius: f32) {
        self.light.on = !self.light.on;
        if self.light.on {
            self.light.radius = max_light_radius;
        }
    }

    /// Dims the light, as when struck by a dark projectile.
    pub fn drain_light(&mut self, amount: f32) {
        self.light.intensity = (self.light.intensity - amount).clamp(0.0, 100.0);
    }

    pub fn can_use_flashlight(&self, now: f64, config: &GameConfig) -> bool {
        !self.flashlight.active
            && self
                .flashlight
                .last_used
                .map_or(true, |t| now - t >= config.flashlight_cooldown_ms)
    }

    /// Fires the flashlight cone along the facing direction and stuns every
    /// enemy caught in it. Returns how many were stunned, or `None` when the
    /// flashlight is active or cooling down.
    pub fn try_activate_flashlight(&mut self, now: f64, enemies: &mut [Enemy], config: &GameConfig) -> Option<usize> {
        if !self.can_use_flashlight(now, config) {
            return None;
        }
        self.flashlight = Flashlight {
            active: true,
            ends_at: now + config.flashlight_duration_ms,
            last_used: Some(now),
        };

        let mut stunned = 0;
        for enemy in enemies.iter_mut() {
            if self.in_flashlight_cone(enemy.center(), config) {
                enemy.stun(now + config.enemy_stun_duration_ms);
                stunned += 1;
            }
        }
        Some(stunned)
    }

    pub fn in_flashlight_cone(&self, point: Point, config: &GameConfig) -> bool {
        let center = self.center();
        if center.distance(point) > config.flashlight_range {
            return false;
        }
        let diff = normalize_angle(center.angle_to(point) - self.facing);
        diff.abs() <= config.flashlight_angle / 2.0
    }

    /// Picks up every crystal the player touches. Returns how many were taken.
    pub fn collect_crystals(&mut self, crystals: &mut [Crystal]) -> u32 {
        let center = self.center();
        let radius = self.radius();
        let mut taken = 0;
        for crystal in crystals.iter_mut() {
            if crystal.collected || center.distance(crystal.center) >= radius + crystal.radius {
                continue;
            }
            if let Some(points) = crystal.collect() {
                self.score = self.score.saturating_add(points);
                self.crystals_collected += 1;
                taken += 1;
            }
        }
        taken
    }

    /// Moves the player to a new level's spawn. Score is kept, everything
    /// else goes back to its starting value.
    pub fn reset_for_new_level(&mut self, pos: Point, max_light_radius: f32, config: &GameConfig) {
        let score = self.score;
        *self = Player::new(pos, max_light_radius, config);
        self.score = score;
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}
