use crate::error::{Result, TouchguardError};
use crate::events::WindowInfo;
use std::process::Command;
use tracing::debug;

pub struct XdotoolBackend;

impl XdotoolBackend {
    pub fn new() -> Self {
        Self
    }

    pub async fn test(&self) -> Result<()> {
        let output = Command::new("xdotool").args(["getactivewindow"]).output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(TouchguardError::Internal("xdotool failed".to_string()))
        }
    }

    pub async fn get_active_window(&self) -> Result<WindowInfo> {
        debug!("Попытка получить активное окно через xdotool");
        let id_output = Command::new("xdotool")
            .args(["getactivewindow"])
            .output()
            .map_err(|e| {
                debug!("xdotool не найден или не работает: {}", e);
                TouchguardError::Internal(format!("xdotool не найден: {}", e))
            })?;

        if !id_output.status.success() {
            let stderr = String::from_utf8_lossy(&id_output.stderr);
            debug!("xdotool вернул ошибку: {}", stderr);
            return Err(TouchguardError::Internal(format!(
                "xdotool getactivewindow вернул ошибку: {}",
                stderr
            )));
        }

        let window_id = String::from_utf8_lossy(&id_output.stdout).trim().to_string();
        debug!("xdotool получил window_id: '{}'", window_id);

        // Заголовок и класс могут быть пустыми у неуправляемых окон
        let title = Self::query_window_property("getwindowname", &window_id);
        let class = Self::query_window_property("getwindowclassname", &window_id);

        Ok(WindowInfo::new(title).with_class(class).with_id(window_id))
    }

    pub async fn activate(&self, window: &WindowInfo) -> Result<()> {
        let window_id = window.id.as_deref().ok_or_else(|| {
            TouchguardError::Internal(format!("У окна {} нет идентификатора", window))
        })?;

        let activate_output = Command::new("xdotool")
            .args(["windowactivate", window_id])
            .output()
            .map_err(|e| TouchguardError::Internal(format!("xdotool не найден: {}", e)))?;

        if !activate_output.status.success() {
            let stderr = String::from_utf8_lossy(&activate_output.stderr);
            return Err(TouchguardError::Internal(format!(
                "xdotool windowactivate вернул ошибку: {}",
                stderr
            )));
        }

        // Поднимаем окно поверх остальных
        let raise_output = Command::new("xdotool")
            .args(["windowraise", window_id])
            .output()
            .map_err(|e| TouchguardError::Internal(format!("xdotool не найден: {}", e)))?;

        if !raise_output.status.success() {
            let stderr = String::from_utf8_lossy(&raise_output.stderr);
            return Err(TouchguardError::Internal(format!(
                "xdotool windowraise вернул ошибку: {}",
                stderr
            )));
        }

        Ok(())
    }

    fn query_window_property(subcommand: &str, window_id: &str) -> String {
        let output = Command::new("xdotool").args([subcommand, window_id]).output();

        if let Ok(output) = output {
            let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
            debug!("xdotool {} вернул: '{}'", subcommand, value);
            value
        } else {
            debug!("Не удалось выполнить xdotool {}", subcommand);
            String::new()
        }
    }
}
