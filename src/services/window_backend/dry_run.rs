use crate::error::Result;
use crate::events::WindowInfo;
use parking_lot::RwLock;
use tracing::info;

use super::r#trait::WindowBackend;

/// Эмуляция оконной системы для dry-run режима: активация просто
/// перезаписывает "текущее" окно
pub struct DryRunWindowBackend {
    active: RwLock<WindowInfo>,
}

impl DryRunWindowBackend {
    pub fn new() -> Self {
        let window = WindowInfo::new("Terminal - dry_run".to_string())
            .with_class("DryRun".to_string())
            .with_id("0x1".to_string());

        Self {
            active: RwLock::new(window),
        }
    }
}

impl Default for DryRunWindowBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WindowBackend for DryRunWindowBackend {
    async fn get_active_window(&self) -> Result<WindowInfo> {
        Ok(self.active.read().clone())
    }

    async fn activate(&self, window: &WindowInfo) -> Result<()> {
        info!("[DRY RUN] Активация окна: {}", window);
        *self.active.write() = window.clone();
        Ok(())
    }
}
