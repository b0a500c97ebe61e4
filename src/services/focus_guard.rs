use crate::config::{Config, PressMode, RestorePolicy};
use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::{PointerCell, PointerPosition, TouchEvent, TouchState, WindowInfo};
use crate::services::pointer_backend::PointerBackend;
use crate::services::window_backend::WindowBackend;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

/// Снимок состояния, сделанный в момент начала касания
#[derive(Debug, Clone)]
struct FocusSnapshot {
    window: WindowInfo,
    /// Позиция курсора из трекера; отсутствует, если трекер ещё не успел
    /// сделать ни одного замера
    position: Option<PointerPosition>,
}

/// Оркестратор восстановления фокуса.
///
/// Конечный автомат: None в snapshot - касаний нет, Some - касание
/// удерживается. Нажатие делает снимок (окно + позиция курсора), отпускание
/// применяет политику восстановления и очищает снимок.
pub struct FocusGuard {
    config: Arc<Config>,
    window_backend: Arc<dyn WindowBackend>,
    pointer_backend: Arc<dyn PointerBackend>,
    pointer_cell: Arc<PointerCell>,
    snapshot: RwLock<Option<FocusSnapshot>>,
}

impl FocusGuard {
    pub fn new(
        config: Arc<Config>,
        window_backend: Arc<dyn WindowBackend>,
        pointer_backend: Arc<dyn PointerBackend>,
        pointer_cell: Arc<PointerCell>,
    ) -> Self {
        info!(
            "Инициализация FocusGuard (политика: {}, режим нажатия: {})",
            config.restore.policy, config.restore.press_mode
        );

        Self {
            config,
            window_backend,
            pointer_backend,
            pointer_cell,
            snapshot: RwLock::new(None),
        }
    }

    /// Обработка события касания
    pub async fn handle_touch_event(&self, event: &TouchEvent) -> Result<()> {
        debug_if_enabled!("Обработка события касания: {}", event);

        match event.state {
            TouchState::Pressed => self.handle_press(event).await,
            TouchState::Released => self.handle_release(event).await,
        }
    }

    /// Начало касания: снимок текущего окна и позиции курсора
    async fn handle_press(&self, event: &TouchEvent) -> Result<()> {
        if self.snapshot.read().is_some() {
            match self.config.press_mode() {
                PressMode::Ignore => {
                    debug_if_enabled!(
                        "Касание уже удерживается, повторное нажатие игнорируется: {}",
                        event
                    );
                    return Ok(());
                }
                PressMode::Overwrite => {
                    debug_if_enabled!(
                        "Повторное нажатие перезаписывает сохранённое состояние: {}",
                        event
                    );
                }
            }
        }

        let window = match self.window_backend.get_active_window().await {
            Ok(window) => window,
            Err(e) => {
                // Без снимка восстанавливать нечего, остаёмся в исходном состоянии
                warn!("Не удалось получить активное окно при начале касания: {}", e);
                return Ok(());
            }
        };

        let position = self.pointer_cell.load();

        info!("Касание началось, последнее активное окно: {}", window);
        if position.is_none() {
            debug_if_enabled!("Позиция курсора ещё не известна, возврат курсора будет пропущен");
        }

        *self.snapshot.write() = Some(FocusSnapshot {
            window: window.clone(),
            position,
        });

        if self.config.restore.preemptive_refocus {
            // Превентивный возврат фокуса прямо в момент начала касания
            if let Err(e) = self.window_backend.activate(&window).await {
                warn!("Не удалось превентивно активировать окно {}: {}", window, e);
            }
        }

        Ok(())
    }

    /// Завершение касания: применяем политику восстановления
    async fn handle_release(&self, event: &TouchEvent) -> Result<()> {
        let snapshot = match self.snapshot.write().take() {
            Some(snapshot) => snapshot,
            None => {
                debug_if_enabled!("Отпускание без удерживаемого касания игнорируется: {}", event);
                return Ok(());
            }
        };

        let current = self.window_backend.get_active_window().await;

        match self.config.restore_policy() {
            RestorePolicy::Conditional => {
                let current = match current {
                    Ok(window) => window,
                    Err(e) => {
                        // Без текущего окна условие denylist проверить нельзя
                        warn!(
                            "Не удалось получить активное окно при завершении касания: {}",
                            e
                        );
                        return Ok(());
                    }
                };

                info!("Касание завершилось, текущее окно: {}", current);

                if current.class_matches_any(&self.config.restore.denylist_classes) {
                    info!(
                        "Фокус украден окном {}, возвращаем фокус: {}",
                        current, snapshot.window
                    );
                    self.activate_saved(&snapshot.window).await;
                }
            }
            RestorePolicy::Unconditional => {
                if let Ok(current) = current {
                    info!("Касание завершилось, текущее окно: {}", current);
                }

                info!("Возвращаем фокус: {}", snapshot.window);
                self.activate_saved(&snapshot.window).await;

                match snapshot.position {
                    Some(position) => {
                        if let Err(e) = self.pointer_backend.move_to(position).await {
                            warn!("Не удалось вернуть курсор в {}: {}", position, e);
                        } else {
                            info!("Курсор возвращён в {}", position);
                        }
                    }
                    None => {
                        debug_if_enabled!("Сохранённой позиции курсора нет, перемещение пропущено");
                    }
                }
            }
        }

        Ok(())
    }

    async fn activate_saved(&self, window: &WindowInfo) {
        // Окно могло быть закрыто за время касания: ошибка активации не фатальна
        if let Err(e) = self.window_backend.activate(window).await {
            warn!("Не удалось активировать окно {}: {}", window, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TouchguardError;
    use parking_lot::Mutex;

    /// Оконная система в памяти: запоминает вызовы activate
    struct FakeWindowBackend {
        active: RwLock<WindowInfo>,
        activated: Mutex<Vec<WindowInfo>>,
        fail_activate: bool,
    }

    impl FakeWindowBackend {
        fn new(active: WindowInfo) -> Self {
            Self {
                active: RwLock::new(active),
                activated: Mutex::new(Vec::new()),
                fail_activate: false,
            }
        }

        fn failing_activation(active: WindowInfo) -> Self {
            Self {
                fail_activate: true,
                ..Self::new(active)
            }
        }

        fn set_active(&self, window: WindowInfo) {
            *self.active.write() = window;
        }

        fn activated(&self) -> Vec<WindowInfo> {
            self.activated.lock().clone()
        }
    }

    #[async_trait::async_trait]
    impl WindowBackend for FakeWindowBackend {
        async fn get_active_window(&self) -> Result<WindowInfo> {
            Ok(self.active.read().clone())
        }

        async fn activate(&self, window: &WindowInfo) -> Result<()> {
            if self.fail_activate {
                return Err(TouchguardError::Internal("окно уничтожено".to_string()));
            }
            self.activated.lock().push(window.clone());
            *self.active.write() = window.clone();
            Ok(())
        }
    }

    /// Курсор в памяти: запоминает вызовы move_to
    struct FakePointerBackend {
        moves: Mutex<Vec<PointerPosition>>,
    }

    impl FakePointerBackend {
        fn new() -> Self {
            Self {
                moves: Mutex::new(Vec::new()),
            }
        }

        fn moves(&self) -> Vec<PointerPosition> {
            self.moves.lock().clone()
        }
    }

    #[async_trait::async_trait]
    impl PointerBackend for FakePointerBackend {
        async fn get_position(&self) -> Result<PointerPosition> {
            Ok(PointerPosition::new(0, 0))
        }

        async fn move_to(&self, position: PointerPosition) -> Result<()> {
            self.moves.lock().push(position);
            Ok(())
        }
    }

    fn test_config(policy: &str, press_mode: &str, preemptive_refocus: bool) -> Arc<Config> {
        let mut config = Config::default();
        config.restore.policy = policy.to_string();
        config.restore.press_mode = press_mode.to_string();
        config.restore.preemptive_refocus = preemptive_refocus;
        config.validate().expect("тестовая конфигурация валидна");
        Arc::new(config)
    }

    fn editor_window() -> WindowInfo {
        WindowInfo::new("main.rs - Visual Studio Code".to_string())
            .with_class("Code".to_string())
            .with_id("0x100".to_string())
    }

    fn browser_window() -> WindowInfo {
        WindowInfo::new("New Tab".to_string())
            .with_class("Google Chrome".to_string())
            .with_id("0x200".to_string())
    }

    fn terminal_window() -> WindowInfo {
        WindowInfo::new("~/work".to_string())
            .with_class("Alacritty".to_string())
            .with_id("0x300".to_string())
    }

    fn press() -> TouchEvent {
        TouchEvent::new(330, TouchState::Pressed, "test-touch".to_string())
    }

    fn release() -> TouchEvent {
        TouchEvent::new(330, TouchState::Released, "test-touch".to_string())
    }

    struct Harness {
        guard: FocusGuard,
        window_backend: Arc<FakeWindowBackend>,
        pointer_backend: Arc<FakePointerBackend>,
        pointer_cell: Arc<PointerCell>,
    }

    fn harness(config: Arc<Config>, window_backend: FakeWindowBackend) -> Harness {
        let window_backend = Arc::new(window_backend);
        let pointer_backend = Arc::new(FakePointerBackend::new());
        let pointer_cell = Arc::new(PointerCell::new());

        let guard = FocusGuard::new(
            config,
            window_backend.clone(),
            pointer_backend.clone(),
            pointer_cell.clone(),
        );

        Harness {
            guard,
            window_backend,
            pointer_backend,
            pointer_cell,
        }
    }

    #[tokio::test]
    async fn unconditional_restores_saved_window_and_pointer() {
        let h = harness(
            test_config("unconditional", "ignore", false),
            FakeWindowBackend::new(editor_window()),
        );
        h.pointer_cell.store(PointerPosition::new(100, 200));

        h.guard.handle_touch_event(&press()).await.unwrap();
        h.window_backend.set_active(browser_window());
        h.guard.handle_touch_event(&release()).await.unwrap();

        assert_eq!(h.window_backend.activated(), vec![editor_window()]);
        assert_eq!(h.pointer_backend.moves(), vec![PointerPosition::new(100, 200)]);
    }

    #[tokio::test]
    async fn unconditional_restores_even_for_non_denylisted_window() {
        let h = harness(
            test_config("unconditional", "ignore", false),
            FakeWindowBackend::new(editor_window()),
        );
        h.pointer_cell.store(PointerPosition::new(5, 5));

        h.guard.handle_touch_event(&press()).await.unwrap();
        h.window_backend.set_active(terminal_window());
        h.guard.handle_touch_event(&release()).await.unwrap();

        assert_eq!(h.window_backend.activated(), vec![editor_window()]);
    }

    #[tokio::test]
    async fn conditional_restores_only_for_denylisted_class() {
        let h = harness(
            test_config("conditional", "ignore", false),
            FakeWindowBackend::new(editor_window()),
        );

        h.guard.handle_touch_event(&press()).await.unwrap();
        h.window_backend.set_active(browser_window());
        h.guard.handle_touch_event(&release()).await.unwrap();

        assert_eq!(h.window_backend.activated(), vec![editor_window()]);
        // Курсор при условной политике не возвращается
        assert!(h.pointer_backend.moves().is_empty());
    }

    #[tokio::test]
    async fn conditional_leaves_focus_for_other_windows() {
        let h = harness(
            test_config("conditional", "ignore", false),
            FakeWindowBackend::new(editor_window()),
        );

        h.guard.handle_touch_event(&press()).await.unwrap();
        h.window_backend.set_active(terminal_window());
        h.guard.handle_touch_event(&release()).await.unwrap();

        assert!(h.window_backend.activated().is_empty());
        assert!(h.pointer_backend.moves().is_empty());
    }

    #[tokio::test]
    async fn pointer_restored_from_press_time_not_release_time() {
        let h = harness(
            test_config("unconditional", "ignore", false),
            FakeWindowBackend::new(editor_window()),
        );

        h.pointer_cell.store(PointerPosition::new(100, 200));
        h.guard.handle_touch_event(&press()).await.unwrap();

        // Трекер продолжает писать во время касания
        h.pointer_cell.store(PointerPosition::new(300, 400));
        h.guard.handle_touch_event(&release()).await.unwrap();

        assert_eq!(h.pointer_backend.moves(), vec![PointerPosition::new(100, 200)]);
    }

    #[tokio::test]
    async fn missing_tracker_sample_skips_pointer_move() {
        let h = harness(
            test_config("unconditional", "ignore", false),
            FakeWindowBackend::new(editor_window()),
        );

        // Трекер не успел сделать ни одного замера
        h.guard.handle_touch_event(&press()).await.unwrap();
        h.window_backend.set_active(browser_window());
        h.guard.handle_touch_event(&release()).await.unwrap();

        assert_eq!(h.window_backend.activated(), vec![editor_window()]);
        assert!(h.pointer_backend.moves().is_empty());
    }

    #[tokio::test]
    async fn press_while_touching_is_ignored() {
        let h = harness(
            test_config("unconditional", "ignore", false),
            FakeWindowBackend::new(editor_window()),
        );

        h.guard.handle_touch_event(&press()).await.unwrap();

        // Второе нажатие при другом активном окне не перезаписывает снимок
        h.window_backend.set_active(terminal_window());
        h.guard.handle_touch_event(&press()).await.unwrap();

        h.window_backend.set_active(browser_window());
        h.guard.handle_touch_event(&release()).await.unwrap();

        assert_eq!(h.window_backend.activated(), vec![editor_window()]);
    }

    #[tokio::test]
    async fn press_while_touching_overwrites_snapshot() {
        let h = harness(
            test_config("unconditional", "overwrite", false),
            FakeWindowBackend::new(editor_window()),
        );

        h.guard.handle_touch_event(&press()).await.unwrap();

        h.window_backend.set_active(terminal_window());
        h.guard.handle_touch_event(&press()).await.unwrap();

        h.window_backend.set_active(browser_window());
        h.guard.handle_touch_event(&release()).await.unwrap();

        assert_eq!(h.window_backend.activated(), vec![terminal_window()]);
    }

    #[tokio::test]
    async fn release_without_press_is_noop() {
        let h = harness(
            test_config("unconditional", "ignore", false),
            FakeWindowBackend::new(editor_window()),
        );

        h.guard.handle_touch_event(&release()).await.unwrap();

        assert!(h.window_backend.activated().is_empty());
        assert!(h.pointer_backend.moves().is_empty());
    }

    #[tokio::test]
    async fn second_gesture_starts_from_clean_state() {
        let h = harness(
            test_config("conditional", "ignore", false),
            FakeWindowBackend::new(editor_window()),
        );

        h.guard.handle_touch_event(&press()).await.unwrap();
        h.window_backend.set_active(browser_window());
        h.guard.handle_touch_event(&release()).await.unwrap();
        assert_eq!(h.window_backend.activated().len(), 1);

        // Повторное отпускание после завершённого жеста игнорируется
        h.guard.handle_touch_event(&release()).await.unwrap();
        assert_eq!(h.window_backend.activated().len(), 1);
    }

    #[tokio::test]
    async fn restore_to_unchanged_window_is_idempotent() {
        let h = harness(
            test_config("unconditional", "ignore", false),
            FakeWindowBackend::new(editor_window()),
        );

        h.guard.handle_touch_event(&press()).await.unwrap();
        // Фокус за время касания не менялся
        h.guard.handle_touch_event(&release()).await.unwrap();

        assert_eq!(h.window_backend.activated(), vec![editor_window()]);
        let active = h.window_backend.get_active_window().await.unwrap();
        assert_eq!(active, editor_window());
    }

    #[tokio::test]
    async fn preemptive_refocus_activates_on_press() {
        let h = harness(
            test_config("conditional", "ignore", true),
            FakeWindowBackend::new(editor_window()),
        );

        h.guard.handle_touch_event(&press()).await.unwrap();

        assert_eq!(h.window_backend.activated(), vec![editor_window()]);
    }

    #[tokio::test]
    async fn activation_failure_does_not_propagate() {
        let h = harness(
            test_config("unconditional", "ignore", false),
            FakeWindowBackend::failing_activation(editor_window()),
        );
        h.pointer_cell.store(PointerPosition::new(10, 10));

        h.guard.handle_touch_event(&press()).await.unwrap();
        let result = h.guard.handle_touch_event(&release()).await;

        // Окно уничтожено за время касания: ошибка логируется, не пробрасывается
        assert!(result.is_ok());
        // Курсор при этом всё равно возвращается
        assert_eq!(h.pointer_backend.moves(), vec![PointerPosition::new(10, 10)]);
    }

    #[tokio::test]
    async fn chrome_steals_focus_scenario() {
        // Касание при активном редакторе, за время касания фокус уходит в браузер
        for (policy, expect_pointer_move) in [("conditional", false), ("unconditional", true)] {
            let h = harness(
                test_config(policy, "ignore", false),
                FakeWindowBackend::new(editor_window()),
            );
            h.pointer_cell.store(PointerPosition::new(1500, 800));

            h.guard.handle_touch_event(&press()).await.unwrap();
            h.window_backend.set_active(browser_window());
            h.guard.handle_touch_event(&release()).await.unwrap();

            assert_eq!(
                h.window_backend.activated(),
                vec![editor_window()],
                "политика {}",
                policy
            );
            assert_eq!(
                h.pointer_backend.moves().len(),
                usize::from(expect_pointer_move),
                "политика {}",
                policy
            );
        }
    }
}
