use glam::DVec2;

/// Pointer position accumulated from relative mouse motion.
///
/// A grabbed cursor either stops at the window edge or stops reporting
/// positions at all, so while grabbed the window layer feeds raw motion in
/// here and queues the result as ordinary cursor samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualCursor {
    position: DVec2,
}

impl VirtualCursor {
    pub fn new(start: DVec2) -> Self {
        Self { position: start }
    }

    /// Moves by a raw motion delta (y grows downwards) and returns the new
    /// position. The position is never clamped.
    pub fn apply_motion(&mut self, dx: f64, dy: f64) -> DVec2 {
        self.position += DVec2::new(dx, dy);
        self.position
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }
}
