use crate::error::{Result, TouchguardError};
use crate::events::WindowInfo;
use std::collections::HashMap;
use std::process::Command;
use tracing::debug;

pub struct KdotoolBackend;

fn build_env_overrides() -> HashMap<String, String> {
    let mut env_vars = HashMap::new();

    if std::env::var("USER").unwrap_or_default() == "root" {
        if let Ok(sudo_user) = std::env::var("SUDO_USER") {
            if let Ok(output) = Command::new("id").args(["-u", &sudo_user]).output() {
                if let Ok(uid_str) = String::from_utf8(output.stdout) {
                    let uid = uid_str.trim();
                    let user_runtime_dir = format!("/run/user/{}", uid);
                    let dbus_address = format!("unix:path={}/bus", user_runtime_dir);

                    debug!(
                        "Подставляем переменные окружения для пользователя {}: uid={}",
                        sudo_user, uid
                    );
                    env_vars.insert("DBUS_SESSION_BUS_ADDRESS".to_string(), dbus_address);
                    env_vars.insert("XDG_RUNTIME_DIR".to_string(), user_runtime_dir);
                    env_vars.insert("USER".to_string(), sudo_user);
                }
            }
        }
    }

    if let Ok(display_var) = std::env::var("DISPLAY") {
        env_vars.insert("DISPLAY".to_string(), display_var);
    }

    env_vars
}

impl KdotoolBackend {
    pub fn new() -> Self {
        Self
    }

    fn create_command(args: &[&str]) -> Command {
        let mut cmd = if let Ok(sudo_user) = std::env::var("SUDO_USER") {
            let mut cmd = Command::new("sudo");
            cmd.args(["-E", "-u", &sudo_user, "kdotool"]);
            cmd.args(args);
            cmd
        } else {
            let mut cmd = Command::new("kdotool");
            cmd.args(args);
            cmd
        };

        // Подстановки переменных окружения (строим на лету без глобального кэша)
        for (key, value) in build_env_overrides() {
            cmd.env(key, value);
        }

        cmd
    }

    pub async fn test(&self) -> Result<()> {
        debug!("=== Тестируем kdotool ===");

        let id_output = Self::create_command(&["getactivewindow"]).output()?;
        if !id_output.status.success() {
            debug!(
                "kdotool getactivewindow failed: {}",
                String::from_utf8_lossy(&id_output.stderr)
            );
            return Err(TouchguardError::Internal(
                "kdotool getactivewindow failed".to_string(),
            ));
        }

        let window_id = String::from_utf8_lossy(&id_output.stdout).trim().to_string();
        debug!("kdotool получил window_id: '{}'", window_id);

        debug!("=== kdotool работает ===");
        Ok(())
    }

    pub async fn get_active_window(&self) -> Result<WindowInfo> {
        // Получаем ID окна
        let id_output = Self::create_command(&["getactivewindow"]).output()?;
        if !id_output.status.success() {
            return Err(TouchguardError::Internal(
                "kdotool getactivewindow failed".to_string(),
            ));
        }

        let window_id = String::from_utf8_lossy(&id_output.stdout).trim().to_string();
        if window_id.is_empty() {
            return Err(TouchguardError::Internal(
                "kdotool вернул пустой идентификатор окна".to_string(),
            ));
        }

        // Заголовок и класс по ID; могут быть пустыми у неуправляемых окон
        let title = Self::query_window_property("getwindowname", &window_id);
        let class = Self::query_window_property("getwindowclassname", &window_id);

        Ok(WindowInfo::new(title).with_class(class).with_id(window_id))
    }

    pub async fn activate(&self, window: &WindowInfo) -> Result<()> {
        let window_id = window.id.as_deref().ok_or_else(|| {
            TouchguardError::Internal(format!("У окна {} нет идентификатора", window))
        })?;

        let output = Self::create_command(&["windowactivate", window_id]).output()?;
        if !output.status.success() {
            return Err(TouchguardError::Internal(format!(
                "kdotool windowactivate вернул ошибку: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let raise_output = Self::create_command(&["windowraise", window_id]).output()?;
        if !raise_output.status.success() {
            return Err(TouchguardError::Internal(format!(
                "kdotool windowraise вернул ошибку: {}",
                String::from_utf8_lossy(&raise_output.stderr)
            )));
        }

        Ok(())
    }

    fn query_window_property(subcommand: &str, window_id: &str) -> String {
        let output = Self::create_command(&[subcommand, window_id]).output();

        if let Ok(output) = output {
            let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
            debug!("kdotool {} вернул: '{}'", subcommand, value);
            value
        } else {
            debug!("Не удалось выполнить kdotool {}", subcommand);
            String::new()
        }
    }
}
