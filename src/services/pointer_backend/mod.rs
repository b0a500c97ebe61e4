//! PointerBackend service: responsibility and boundaries
//!
//! This module is responsible ONLY for reading and setting the pointer
//! position through an external tool. Staleness tracking and the decision
//! whether to restore the pointer belong to PointerTracker and FocusGuard.

mod dry_run;
mod xdotool;
mod r#trait;

pub use self::r#trait::{create_pointer_backend, PointerBackend};
