use glam::DVec2;

use super::keys::Key;
use crate::render::camera::CameraMovement;

/// Which movement each pair of keys drives.
pub const MOVEMENT_BINDINGS: [(CameraMovement, [Key; 2]); 4] = [
    (CameraMovement::Forward, [Key::W, Key::Up]),
    (CameraMovement::Backward, [Key::S, Key::Down]),
    (CameraMovement::Left, [Key::A, Key::Left]),
    (CameraMovement::Right, [Key::D, Key::Right]),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    pressed: [bool; Key::COUNT],
}

impl KeySet {
    pub fn set(&mut self, key: Key, pressed: bool) {
        self.pressed[key.index()] = pressed;
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed[key.index()]
    }
}

#[derive(Debug, Clone)]
pub struct InputState {
    pub keys: KeySet,
    last_cursor: DVec2,
    first_mouse: bool,
}

impl InputState {
    /// `cursor` is where the pointer is assumed to start, normally the
    /// window centre.
    pub fn new(cursor: DVec2) -> Self {
        Self {
            keys: KeySet::default(),
            last_cursor: cursor,
            first_mouse: true,
        }
    }

    /// Turns an absolute cursor sample into a look offset.
    ///
    /// The first sample only seeds the last position, so a pointer that
    /// enters far from the assumed start does not whip the camera around.
    /// Y is flipped because window coordinates grow downwards.
    pub fn cursor_offset(&mut self, x: f64, y: f64) -> (f32, f32) {
        if self.first_mouse {
            self.last_cursor = DVec2::new(x, y);
            self.first_mouse = false;
        }

        let x_offset = x - self.last_cursor.x;
        let y_offset = self.last_cursor.y - y;
        self.last_cursor = DVec2::new(x, y);

        (x_offset as f32, y_offset as f32)
    }

    pub fn last_cursor(&self) -> DVec2 {
        self.last_cursor
    }

    /// Movements whose keys are currently held, in binding order.
    pub fn active_movements(&self) -> impl Iterator<Item = CameraMovement> + '_ {
        MOVEMENT_BINDINGS
            .iter()
            .filter(|(_, keys)| keys.iter().any(|k| self.keys.is_pressed(*k)))
            .map(|(movement, _)| *movement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_cursor_sample_yields_no_offset() {
        let mut input = InputState::new(DVec2::new(400.0, 300.0));

        assert_eq!(input.cursor_offset(10.0, 590.0), (0.0, 0.0));
        assert_eq!(input.cursor_offset(15.0, 580.0), (5.0, 10.0));
        assert_eq!(input.last_cursor(), DVec2::new(15.0, 580.0));
    }

    #[test]
    fn test_movement_bindings_compose() {
        let mut input = InputState::new(DVec2::ZERO);
        input.keys.set(Key::W, true);
        input.keys.set(Key::Right, true);

        let moves: Vec<_> = input.active_movements().collect();
        assert_eq!(moves, vec![CameraMovement::Forward, CameraMovement::Right]);

        input.keys.set(Key::W, false);
        let moves: Vec<_> = input.active_movements().collect();
        assert_eq!(moves, vec![CameraMovement::Right]);
    }

    #[test]
    fn test_alternate_keys_share_a_binding() {
        let mut input = InputState::new(DVec2::ZERO);
        input.keys.set(Key::S, true);
        input.keys.set(Key::Down, true);

        let moves: Vec<_> = input.active_movements().collect();
        assert_eq!(moves, vec![CameraMovement::Backward]);
    }
}
