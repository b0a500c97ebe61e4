use crate::error::{Result, TouchguardError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct DeviceFinder;

impl DeviceFinder {
    /// Найти устройство тачскрина по фиксированному пути или подстроке имени
    pub fn find_touch_device(device_path: &str, device_name: &str) -> Result<PathBuf> {
        if device_path != "auto" {
            let path = PathBuf::from(device_path);
            return if path.exists() {
                info!("Используется указанное устройство: {:?}", path);
                Ok(path)
            } else {
                TouchguardError::device_not_found(format!(
                    "Указанное устройство не найдено: {:?}",
                    path
                ))
            };
        }

        // Автопоиск по имени среди event устройств
        Self::find_by_name(device_name)
    }

    fn find_by_name(device_name: &str) -> Result<PathBuf> {
        info!("Начинаем автопоиск устройства по имени: \"{}\"", device_name);

        let input_dir = Path::new("/dev/input");

        let entries = fs::read_dir(input_dir).map_err(|e| {
            TouchguardError::Permission(format!("Нет доступа к /dev/input: {}", e))
        })?;

        let mut event_devices = Vec::new();

        for entry in entries {
            let entry = entry.map_err(TouchguardError::Io)?;
            let path = entry.path();
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("");

            if name.starts_with("event") {
                event_devices.push(path);
            }
        }

        // Сортируем устройства по номеру
        event_devices.sort();

        for device_path in event_devices {
            debug!("Проверяем устройство: {:?}", device_path);

            if !Self::is_device_accessible(&device_path) {
                warn!("Устройство {:?} недоступно", device_path);
                continue;
            }

            if Self::device_name_matches(&device_path, device_name) {
                info!("Найдено устройство тачскрина: {:?}", device_path);
                return Ok(device_path);
            }
        }

        TouchguardError::device_not_found(format!(
            "Устройство с именем, содержащим \"{}\", не найдено. \
             Убедитесь, что пользователь добавлен в группу 'input'",
            device_name
        ))
    }

    fn device_name_matches(device_path: &Path, device_name: &str) -> bool {
        match evdev::Device::open(device_path) {
            Ok(device) => {
                let reported_name = device.name().unwrap_or("Unknown");
                debug!("Имя устройства {:?}: \"{}\"", device_path, reported_name);
                reported_name.contains(device_name)
            }
            Err(e) => {
                debug!("Не удалось открыть устройство {:?}: {}", device_path, e);
                false
            }
        }
    }

    fn is_device_accessible(device_path: &Path) -> bool {
        match fs::File::open(device_path) {
            Ok(_) => true,
            Err(e) => {
                debug!("Устройство {:?} недоступно: {}", device_path, e);
                false
            }
        }
    }
}
