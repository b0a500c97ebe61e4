pub mod pointer;
pub mod touch;
pub mod window;

pub use pointer::{PointerCell, PointerPosition};
pub use touch::{TouchEvent, TouchState};
pub use window::WindowInfo;
