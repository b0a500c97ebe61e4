pub mod focus_guard;
pub mod pointer_backend;
pub mod pointer_tracker;
pub mod touch_listener;
pub mod window_backend;

pub use focus_guard::FocusGuard;
pub use pointer_backend::create_pointer_backend;
pub use pointer_tracker::PointerTracker;
pub use touch_listener::create_touch_listener;
pub use window_backend::create_window_backend;
