//! WindowBackend service: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for querying the active
//! window (title/class/id) and for giving focus back to a previously captured
//! window. They MUST NOT contain any restore-policy logic. All restore
//! decisions are made exclusively by FocusGuard.

mod dry_run;
mod kdotool;
mod window_backend;
mod xdotool;
mod r#trait;

pub use self::r#trait::{create_window_backend, WindowBackend};
