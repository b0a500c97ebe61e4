use crate::error::Result;
use crate::events::{TouchEvent, TouchState};
use crate::services::FocusGuard;
use std::sync::Arc;
use tracing::info;

use super::r#trait::TouchListenerTrait;

// BTN_TOUCH
const DRY_RUN_TOUCH_CODE: u16 = 330;

pub struct DryRunTouchListener {
    focus_guard: Arc<FocusGuard>,
}

impl DryRunTouchListener {
    pub fn new(focus_guard: Arc<FocusGuard>) -> Self {
        info!("Инициализация DryRunTouchListener");
        Self { focus_guard }
    }

    async fn run_impl(self) -> Result<()> {
        info!("Dry-run режим - TouchListener работает в режиме эмуляции");

        loop {
            // Эмулируем жест касания каждые 5 секунд
            tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;

            let press = TouchEvent::new(
                DRY_RUN_TOUCH_CODE,
                TouchState::Pressed,
                "dry-run".to_string(),
            );
            info!("Dry-run: эмулируем начало касания");
            self.focus_guard.handle_touch_event(&press).await?;

            tokio::time::sleep(tokio::time::Duration::from_millis(300)).await;

            let release = TouchEvent::new(
                DRY_RUN_TOUCH_CODE,
                TouchState::Released,
                "dry-run".to_string(),
            );
            info!("Dry-run: эмулируем завершение касания");
            self.focus_guard.handle_touch_event(&release).await?;
        }
    }
}

#[async_trait::async_trait]
impl TouchListenerTrait for DryRunTouchListener {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
