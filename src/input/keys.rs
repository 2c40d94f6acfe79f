use winit::keyboard::KeyCode;

/// Keys the demo reacts to, in a stable index space for [`KeySet`].
///
/// [`KeySet`]: super::state::KeySet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Escape,
}

impl Key {
    pub const COUNT: usize = 9;

    pub const ALL: [Key; Key::COUNT] = [
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::Up,
        Key::Down,
        Key::Left,
        Key::Right,
        Key::Escape,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        let key = match code {
            KeyCode::KeyW => Key::W,
            KeyCode::KeyA => Key::A,
            KeyCode::KeyS => Key::S,
            KeyCode::KeyD => Key::D,
            KeyCode::ArrowUp => Key::Up,
            KeyCode::ArrowDown => Key::Down,
            KeyCode::ArrowLeft => Key::Left,
            KeyCode::ArrowRight => Key::Right,
            KeyCode::Escape => Key::Escape,
            _ => return None,
        };
        Some(key)
    }
}
