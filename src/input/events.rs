use super::keys::Key;

/// Input as queued by the window layer and drained once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key { key: Key, pressed: bool },
    /// Absolute cursor position in window pixels.
    CursorMoved { x: f64, y: f64 },
    /// Vertical scroll, positive away from the user.
    Scroll { y: f32 },
    Resized { width: u32, height: u32 },
    CloseRequested,
}
