use crate::error::{Result, TouchguardError};
use crate::events::WindowInfo;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::kdotool::KdotoolBackend;
use super::r#trait::WindowBackend;
use super::xdotool::XdotoolBackend;

#[derive(Debug, Clone)]
enum SessionKind {
    X11,
    Wayland,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkingMethod {
    Xdotool,
    Kdotool,
}

pub struct RealWindowBackend {
    session: SessionKind,
    working_method: RwLock<Option<WorkingMethod>>,

    // Обёртки над утилитами
    xdotool: XdotoolBackend,
    kdotool: KdotoolBackend,
}

impl RealWindowBackend {
    pub fn new() -> Self {
        info!("Инициализация RealWindowBackend");

        let session = Self::detect_session();
        info!("Обнаружен тип сессии: {:?}", session);

        Self {
            session,
            working_method: RwLock::new(None),
            xdotool: XdotoolBackend::new(),
            kdotool: KdotoolBackend::new(),
        }
    }

    fn detect_session() -> SessionKind {
        if let Ok(session) = std::env::var("XDG_SESSION_TYPE") {
            match session.as_str() {
                "x11" => return SessionKind::X11,
                "wayland" => return SessionKind::Wayland,
                _ => {}
            }
        }

        if std::env::var("WAYLAND_DISPLAY").is_ok() {
            return SessionKind::Wayland;
        }

        if std::env::var("DISPLAY").is_ok() {
            return SessionKind::X11;
        }

        SessionKind::Unknown
    }

    fn probe_order(&self) -> [WorkingMethod; 2] {
        // В Wayland-сессии xdotool бесполезен, пробуем kdotool первым
        match self.session {
            SessionKind::Wayland => [WorkingMethod::Kdotool, WorkingMethod::Xdotool],
            SessionKind::X11 | SessionKind::Unknown => {
                [WorkingMethod::Xdotool, WorkingMethod::Kdotool]
            }
        }
    }

    async fn detect_working_method(&self) -> Result<WorkingMethod> {
        info!("Определяем рабочий метод управления окнами...");

        for method in self.probe_order() {
            let probe = match method {
                WorkingMethod::Xdotool => self.xdotool.test().await,
                WorkingMethod::Kdotool => self.kdotool.test().await,
            };

            if probe.is_ok() {
                info!("Используем {:?}", method);
                return Ok(method);
            }
        }

        Err(TouchguardError::ServiceUnavailable(
            "Ни одна утилита управления окнами не работает".to_string(),
        ))
    }

    async fn ensure_working_method(&self) -> Result<WorkingMethod> {
        if let Some(method) = *self.working_method.read() {
            return Ok(method);
        }

        let method = self.detect_working_method().await?;
        *self.working_method.write() = Some(method);
        Ok(method)
    }
}

impl Default for RealWindowBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WindowBackend for RealWindowBackend {
    async fn get_active_window(&self) -> Result<WindowInfo> {
        let method = self.ensure_working_method().await?;

        let result = match method {
            WorkingMethod::Xdotool => self.xdotool.get_active_window().await,
            WorkingMethod::Kdotool => self.kdotool.get_active_window().await,
        };

        match result {
            Ok(window) => Ok(window),
            Err(e) => {
                // Сбрасываем метод: следующий вызов заново выполнит probe
                warn!("Рабочий метод {:?} перестал работать: {}", method, e);
                *self.working_method.write() = None;
                Err(e)
            }
        }
    }

    async fn activate(&self, window: &WindowInfo) -> Result<()> {
        let method = self.ensure_working_method().await?;

        debug!("Активация окна {} через {:?}", window, method);

        // Ошибка активации не сбрасывает метод: окно могло быть просто закрыто
        match method {
            WorkingMethod::Xdotool => self.xdotool.activate(window).await,
            WorkingMethod::Kdotool => self.kdotool.activate(window).await,
        }
    }
}
