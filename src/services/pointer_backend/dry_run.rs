use crate::error::Result;
use crate::events::PointerPosition;
use parking_lot::RwLock;
use tracing::info;

use super::r#trait::PointerBackend;

/// Эмуляция управления курсором для dry-run режима
pub struct DryRunPointerBackend {
    position: RwLock<PointerPosition>,
}

impl DryRunPointerBackend {
    pub fn new() -> Self {
        Self {
            position: RwLock::new(PointerPosition::new(960, 540)),
        }
    }
}

impl Default for DryRunPointerBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PointerBackend for DryRunPointerBackend {
    async fn get_position(&self) -> Result<PointerPosition> {
        Ok(*self.position.read())
    }

    async fn move_to(&self, position: PointerPosition) -> Result<()> {
        info!("[DRY RUN] Перемещение курсора в {}", position);
        *self.position.write() = position;
        Ok(())
    }
}
