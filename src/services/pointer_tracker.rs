use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::PointerCell;
use crate::services::pointer_backend::PointerBackend;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval, Duration};
use tracing::{debug, info};

/// Фоновый опрос позиции курсора.
///
/// Каждый тик записывает текущую позицию в разделяемую ячейку; неудачный
/// опрос сбрасывает её ("координаты неизвестны"). Останавливается через
/// stop-канал, поэтому задержка завершения не привязана к интервалу опроса.
pub struct PointerTracker {
    backend: Arc<dyn PointerBackend>,
    cell: Arc<PointerCell>,
    polling_interval: Duration,
    stop_rx: watch::Receiver<bool>,
}

impl PointerTracker {
    pub fn new(
        config: Arc<Config>,
        backend: Arc<dyn PointerBackend>,
        cell: Arc<PointerCell>,
        stop_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            backend,
            cell,
            polling_interval: Duration::from_millis(config.tracker.polling_interval_ms),
            stop_rx,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        info!(
            "PointerTracker запущен, интервал опроса: {:?}",
            self.polling_interval
        );

        let mut ticker = interval(self.polling_interval);

        loop {
            tokio::select! {
                changed = self.stop_rx.changed() => {
                    // Err означает, что отправитель уничтожен - тоже повод остановиться
                    if changed.is_err() || *self.stop_rx.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    match self.backend.get_position().await {
                        Ok(position) => {
                            debug_if_enabled!("Позиция курсора: {}", position);
                            self.cell.store(position);
                        }
                        Err(e) => {
                            debug!("Не удалось опросить позицию курсора: {}", e);
                            self.cell.clear();
                        }
                    }
                }
            }
        }

        info!("PointerTracker остановлен");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TouchguardError;
    use crate::events::PointerPosition;
    use parking_lot::Mutex;

    struct ScriptedPointerBackend {
        responses: Mutex<Vec<Result<PointerPosition>>>,
        // Ответ после исчерпания сценария: Some - позиция, None - ошибка
        fallback: Option<PointerPosition>,
    }

    impl ScriptedPointerBackend {
        fn new(responses: Vec<Result<PointerPosition>>, fallback: Option<PointerPosition>) -> Self {
            Self {
                responses: Mutex::new(responses),
                fallback,
            }
        }
    }

    #[async_trait::async_trait]
    impl PointerBackend for ScriptedPointerBackend {
        async fn get_position(&self) -> Result<PointerPosition> {
            let mut responses = self.responses.lock();
            if responses.is_empty() {
                self.fallback
                    .ok_or_else(|| TouchguardError::Internal("сценарий исчерпан".to_string()))
            } else {
                responses.remove(0)
            }
        }

        async fn move_to(&self, _position: PointerPosition) -> Result<()> {
            Ok(())
        }
    }

    fn tracker_with(
        backend: Arc<dyn PointerBackend>,
    ) -> (PointerTracker, Arc<PointerCell>, watch::Sender<bool>) {
        let config = Arc::new(Config::default());
        let cell = Arc::new(PointerCell::new());
        let (stop_tx, stop_rx) = watch::channel(false);
        let tracker = PointerTracker::new(config, backend, cell.clone(), stop_rx);
        (tracker, cell, stop_tx)
    }

    #[tokio::test]
    async fn first_tick_stores_sample() {
        let backend = Arc::new(ScriptedPointerBackend::new(
            vec![],
            Some(PointerPosition::new(42, 24)),
        ));
        let (tracker, cell, stop_tx) = tracker_with(backend);

        let handle = tokio::spawn(tracker.run());

        // Первый тик interval срабатывает сразу
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(cell.load(), Some(PointerPosition::new(42, 24)));

        stop_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("трекер должен остановиться по stop-каналу")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn failed_query_clears_cell() {
        let backend = Arc::new(ScriptedPointerBackend::new(
            vec![Ok(PointerPosition::new(1, 1))],
            None,
        ));
        let config = Arc::new(Config::default());
        let cell = Arc::new(PointerCell::new());
        let (_stop_tx, stop_rx) = watch::channel(false);
        let mut tracker = PointerTracker::new(config, backend.clone(), cell.clone(), stop_rx);
        // Укорачиваем интервал, чтобы тест не ждал реальные 500мс
        tracker.polling_interval = Duration::from_millis(100);

        let handle = tokio::spawn(tracker.run());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cell.load(), Some(PointerPosition::new(1, 1)));

        // Второй тик вернул ошибку: ячейка сброшена
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cell.load(), None);

        handle.abort();
    }
}
