use crate::error::Result;
use crate::events::WindowInfo;
use std::sync::Arc;

/// Trait for window backends that can run in different modes
#[async_trait::async_trait]
pub trait WindowBackend: Send + Sync {
    /// Query the currently focused window
    async fn get_active_window(&self) -> Result<WindowInfo>;

    /// Give input focus to the window and raise it to the top of the stack
    async fn activate(&self, window: &WindowInfo) -> Result<()>;
}

/// Factory function to create an appropriate window backend based on the dry_run flag
pub fn create_window_backend(dry_run: bool) -> Result<Arc<dyn WindowBackend>> {
    if dry_run {
        Ok(Arc::new(super::dry_run::DryRunWindowBackend::new()))
    } else {
        Ok(Arc::new(super::window_backend::RealWindowBackend::new()))
    }
}
