use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::{Result, TouchguardError};
use crate::events::{TouchEvent, TouchState};
use crate::services::FocusGuard;
use crate::utils::DeviceFinder;
use evdev::{Device, EventType};
use std::sync::Arc;
use tracing::{error, info};

use super::r#trait::TouchListenerTrait;

pub struct RealTouchListener {
    focus_guard: Arc<FocusGuard>,
    device: Device,
}

impl RealTouchListener {
    pub fn new(config: Arc<Config>, focus_guard: Arc<FocusGuard>) -> Result<Self> {
        info!("Инициализация RealTouchListener");

        let device_path =
            DeviceFinder::find_touch_device(&config.input.device_path, &config.input.device_name)?;

        let device = Device::open(&device_path).map_err(|e| {
            TouchguardError::DeviceNotFound(format!(
                "Не удалось открыть устройство {:?}: {}",
                device_path, e
            ))
        })?;

        // Устройство НЕ захватывается эксклюзивно: касания должны
        // продолжать доходить до оконной системы
        Self::log_device(&device);

        Ok(Self {
            focus_guard,
            device,
        })
    }

    async fn run_impl(mut self) -> Result<()> {
        info!("RealTouchListener запущен, начинаем чтение событий");

        loop {
            // Чтение событий устройства (блокирующее)
            let events_vec = match self.device.fetch_events() {
                Ok(events) => events.collect::<Vec<_>>(),
                Err(e) => {
                    error!("Ошибка чтения событий: {}", e);
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                    continue;
                }
            };

            for event in events_vec {
                if let Err(e) = self.handle_event(event).await {
                    error!("Ошибка обработки события: {}", e);
                }
            }
        }
    }

    async fn handle_event(&mut self, event: evdev::InputEvent) -> Result<()> {
        if event.event_type() != EventType::KEY {
            debug_if_enabled!("Пропуск не-key события: {:?}", event);
            return Ok(());
        }

        let Some(state) = TouchState::from_event_value(event.value()) else {
            debug_if_enabled!("Пропуск значения события: {}", event.value());
            return Ok(());
        };

        let touch_event = TouchEvent::new(
            event.code(),
            state,
            self.device.name().unwrap_or("Unknown").to_string(),
        );

        debug_if_enabled!("Событие касания: {}", touch_event);

        self.focus_guard.handle_touch_event(&touch_event).await
    }

    fn log_device(device: &Device) {
        info!("Устройство: {}", device.name().unwrap_or("Unknown"));
        info!("Физический путь: {:?}", device.physical_path());
        info!("Уникальный ID: {:?}", device.unique_name());
    }
}

#[async_trait::async_trait]
impl TouchListenerTrait for RealTouchListener {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
