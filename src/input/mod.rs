pub mod cursor;
pub mod events;
pub mod keys;
pub mod state;

pub use cursor::VirtualCursor;
pub use events::InputEvent;
pub use keys::Key;
pub use state::{InputState, KeySet};
