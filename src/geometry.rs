use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use crate::constants::SAFE_POSITION_ATTEMPTS;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        distance(self.x, self.y, other.x, other.y)
    }

    /// Angle of the vector from `self` towards `other`, in radians.
    pub fn angle_to(self, other: Point) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    pub fn offset(self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle, `x`/`y` being the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn square(top_left: Point, size: f32) -> Self {
        Self::new(top_left.x, top_left.y, size, size)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        rects_overlap(self, other)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

// Two rectangles overlap iff their projections on both axes intersect.
// Touching edges do not count as overlap.
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

/// Wraps an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

pub fn collides_with_any(walls: &[Rect], body: &Rect) -> bool {
    walls.iter().any(|wall| rects_overlap(body, wall))
}

/// Moves a square body of side `size` from `pos` towards `target`, one axis
/// at a time. A blocked axis probes perpendicular offsets `1..=max_offset`
/// and takes the first free one, so bodies hug walls instead of stopping.
/// Not swept: a body fast enough to skip a wall in one step passes through.
pub fn move_with_slide(walls: &[Rect], pos: Point, size: f32, target: Point, max_offset: f32) -> Point {
    let blocked = |x: f32, y: f32| collides_with_any(walls, &Rect::new(x, y, size, size));
    let steps = max_offset.floor().max(0.0) as u32;
    let mut x = pos.x;
    let mut y = pos.y;

    if target.x != pos.x {
        if !blocked(target.x, y) {
            x = target.x;
        } else {
            for offset in 1..=steps {
                let offset = offset as f32;
                if !blocked(target.x, y - offset) {
                    x = target.x;
                    y -= offset;
                    break;
                } else if !blocked(target.x, y + offset) {
                    x = target.x;
                    y += offset;
                    break;
                }
            }
        }
    }

    if target.y != pos.y {
        if !blocked(x, target.y) {
            y = target.y;
        } else {
            for offset in 1..=steps {
                let offset = offset as f32;
                if !blocked(x - offset, target.y) {
                    x -= offset;
                    y = target.y;
                    break;
                } else if !blocked(x + offset, target.y) {
                    x += offset;
                    y = target.y;
                    break;
                }
            }
        }
    }

    Point::new(x, y)
}

/// Finds a top-left position for a square body of side `size` inside
/// `bounds` that overlaps none of `walls`.
///
/// Tries `preferred` first (clamped into bounds), then up to
/// `SAFE_POSITION_ATTEMPTS` random candidates, then returns `fallback`
/// unchanged. The caller guarantees the fallback is open; this function never
/// fails to produce a position.
pub fn find_safe_position(
    walls: &[Rect],
    preferred: Point,
    size: f32,
    bounds: Rect,
    fallback: Point,
    rng: &mut impl Rng,
) -> Point {
    let max_x = (bounds.right() - size).max(bounds.x);
    let max_y = (bounds.bottom() - size).max(bounds.y);
    let is_free = |p: Point| !collides_with_any(walls, &Rect::square(p, size));

    let first = Point::new(preferred.x.clamp(bounds.x, max_x), preferred.y.clamp(bounds.y, max_y));
    if is_free(first) {
        return first;
    }

    for _ in 0..SAFE_POSITION_ATTEMPTS {
        let candidate = Point::new(random_between(rng, bounds.x, max_x), random_between(rng, bounds.y, max_y));
        if is_free(candidate) {
            return candidate;
        }
    }

    tracing::debug!(x = fallback.x, y = fallback.y, "safe position search exhausted, using fallback");
    fallback
}

pub(crate) fn random_between(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        lo
    } else {
        rng.gen_range(lo..hi)
    }
}
