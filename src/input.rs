/// Merged keyboard/touch state, polled once per tick.
///
/// `toggle_light` and `use_flashlight` are edge-triggered: the front-end sets
/// them for the one tick in which the key was pressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
    pub toggle_light: bool,
    pub use_flashlight: bool,
}

impl InputSnapshot {
    pub fn is_moving(&self) -> bool {
        let (dx, dy) = self.direction();
        dx != 0.0 || dy != 0.0
    }

    /// Unit direction vector. Opposite keys cancel; diagonals are normalized
    /// so they are no faster than axial movement.
    pub fn direction(&self) -> (f32, f32) {
        let dx = (self.right as i8 - self.left as i8) as f32;
        let dy = (self.down as i8 - self.up as i8) as f32;
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            (0.0, 0.0)
        } else {
            (dx / len, dy / len)
        }
    }
}
