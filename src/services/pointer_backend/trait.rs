use crate::error::Result;
use crate::events::PointerPosition;
use std::sync::Arc;

/// Trait for pointer backends that can run in different modes
#[async_trait::async_trait]
pub trait PointerBackend: Send + Sync {
    /// Query the current pointer coordinates
    async fn get_position(&self) -> Result<PointerPosition>;

    /// Move the pointer to the given coordinates
    async fn move_to(&self, position: PointerPosition) -> Result<()>;
}

/// Factory function to create an appropriate pointer backend based on the dry_run flag
pub fn create_pointer_backend(dry_run: bool) -> Result<Arc<dyn PointerBackend>> {
    if dry_run {
        Ok(Arc::new(super::dry_run::DryRunPointerBackend::new()))
    } else {
        Ok(Arc::new(super::xdotool::XdotoolPointerBackend::new()))
    }
}
