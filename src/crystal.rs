use crate::constants::{FRAME_MS, GLOW_RATE};
use crate::geometry::Point;

/// A static pickup. Positions are centers, unlike players and enemies.
#[derive(Clone, Debug, PartialEq)]
pub struct Crystal {
    pub center: Point,
    pub radius: f32,
    pub points: u32,
    pub collected: bool,
    /// Oscillates in `[0, 1]`, purely cosmetic.
    pub glow: f32,
    glow_dir: f32,
    pub visible: bool,
}

impl Crystal {
    pub fn new(center: Point, radius: f32, points: u32) -> Self {
        Self {
            center,
            radius,
            points,
            collected: false,
            glow: 0.0,
            glow_dir: 1.0,
            visible: true,
        }
    }

    /// Marks the crystal taken. Returns the points it was worth, or `None` if
    /// it had already been collected.
    pub fn collect(&mut self) -> Option<u32> {
        if self.collected {
            return None;
        }
        self.collected = true;
        self.visible = false;
        Some(self.points)
    }

    pub fn update_glow(&mut self, dt_ms: f32) {
        if self.collected {
            return;
        }
        self.glow += GLOW_RATE * self.glow_dir * (dt_ms / FRAME_MS);
        if self.glow >= 1.0 {
            self.glow = 1.0;
            self.glow_dir = -1.0;
        } else if self.glow <= 0.0 {
            self.glow = 0.0;
            self.glow_dir = 1.0;
        }
    }

    /// When crystals are light-gated, only those inside the player's light
    /// are shown. Collision ignores this flag.
    pub fn update_visibility(&mut self, light_gated: bool, player_center: Point, light_radius: f32) {
        self.visible = !self.collected && (!light_gated || self.center.distance(player_center) <= light_radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_is_idempotent() {
        let mut c = Crystal::new(Point::new(10.0, 10.0), 7.0, 30);
        assert_eq!(c.collect(), Some(30));
        assert_eq!(c.collect(), None);
        assert!(c.collected);
    }

    #[test]
    fn glow_bounces_between_bounds() {
        let mut c = Crystal::new(Point::default(), 7.0, 10);
        for _ in 0..200 {
            c.update_glow(16.0);
            assert!((0.0..=1.0).contains(&c.glow));
        }
        // About 20 frames reach the top, then it heads back down.
        let mut c = Crystal::new(Point::default(), 7.0, 10);
        for _ in 0..25 {
            c.update_glow(16.0);
        }
        assert!(c.glow < 0.9);
    }

    #[test]
    fn gated_crystal_is_visible_only_in_light() {
        let mut c = Crystal::new(Point::new(100.0, 0.0), 7.0, 10);
        c.update_visibility(true, Point::new(0.0, 0.0), 50.0);
        assert!(!c.visible);
        c.update_visibility(true, Point::new(60.0, 0.0), 50.0);
        assert!(c.visible);
        c.update_visibility(false, Point::new(0.0, 0.0), 10.0);
        assert!(c.visible);
    }
}
