use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub input: InputConfig,
    pub tracker: TrackerConfig,
    pub restore: RestoreConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    /// Путь к устройству или "auto" для поиска по имени
    pub device_path: String,
    /// Подстрока имени устройства для автопоиска
    pub device_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
    pub polling_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RestoreConfig {
    /// "conditional" - возвращать фокус только если его украло окно из denylist
    /// "unconditional" - всегда возвращать фокус и позицию курсора
    pub policy: String,
    /// Подстроки классов окон, которым нельзя красть фокус
    pub denylist_classes: Vec<String>,
    /// "ignore" - повторное нажатие при удерживаемом касании игнорируется
    /// "overwrite" - повторное нажатие перезаписывает сохранённое состояние
    pub press_mode: String,
    /// Возвращать фокус сразу в момент начала касания
    pub preemptive_refocus: bool,
}

/// Политика восстановления фокуса (валидированная форма restore.policy)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePolicy {
    Conditional,
    Unconditional,
}

/// Поведение при нажатии во время удерживаемого касания
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressMode {
    Ignore,
    Overwrite,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                filter: "touchguard_rust=info".to_string(),
            },
            input: InputConfig {
                device_path: "auto".to_string(),
                device_name: "Melfas LGDisplay Incell Touch".to_string(),
            },
            tracker: TrackerConfig {
                polling_interval_ms: 500,
            },
            restore: RestoreConfig {
                policy: "conditional".to_string(),
                denylist_classes: vec!["Google Chrome".to_string()],
                press_mode: "ignore".to_string(),
                preemptive_refocus: true,
            },
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        // Отсутствие файла конфигурации не ошибка: действуют значения по умолчанию
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("TOUCHGUARD_"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация настроек устройства
        if self.input.device_path == "auto" && self.input.device_name.is_empty() {
            anyhow::bail!("При device_path = \"auto\" требуется непустой device_name");
        }

        // Валидация настроек трекера
        if self.tracker.polling_interval_ms < 100 {
            anyhow::bail!("polling_interval_ms должно быть минимум 100");
        }

        // Валидация политики восстановления
        match self.restore.policy.as_str() {
            "conditional" | "unconditional" => {}
            _ => anyhow::bail!("Неверная политика восстановления: {}", self.restore.policy),
        }

        if self.restore.policy == "conditional" && self.restore.denylist_classes.is_empty() {
            anyhow::bail!("Политика \"conditional\" требует непустой denylist_classes");
        }

        match self.restore.press_mode.as_str() {
            "ignore" | "overwrite" => {}
            _ => anyhow::bail!("Неверный режим нажатия: {}", self.restore.press_mode),
        }

        Ok(())
    }

    /// Политика восстановления в валидированной форме
    pub fn restore_policy(&self) -> RestorePolicy {
        match self.restore.policy.as_str() {
            "unconditional" => RestorePolicy::Unconditional,
            _ => RestorePolicy::Conditional,
        }
    }

    /// Режим обработки повторных нажатий в валидированной форме
    pub fn press_mode(&self) -> PressMode {
        match self.restore.press_mode.as_str() {
            "overwrite" => PressMode::Overwrite,
            _ => PressMode::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let mut config = Config::default();
        config.restore.policy = "sometimes".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_conditional_requires_denylist() {
        let mut config = Config::default();
        config.restore.policy = "conditional".to_string();
        config.restore.denylist_classes.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_press_mode_rejected() {
        let mut config = Config::default();
        config.restore.press_mode = "latest".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auto_path_requires_device_name() {
        let mut config = Config::default();
        config.input.device_path = "auto".to_string();
        config.input.device_name = String::new();
        assert!(config.validate().is_err());

        // С фиксированным путём имя не обязательно
        config.input.device_path = "/dev/input/event28".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_polling_interval_lower_bound() {
        let mut config = Config::default();
        config.tracker.polling_interval_ms = 50;
        assert!(config.validate().is_err());

        config.tracker.polling_interval_ms = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_policy_accessors() {
        let mut config = Config::default();
        assert_eq!(config.restore_policy(), RestorePolicy::Conditional);
        assert_eq!(config.press_mode(), PressMode::Ignore);

        config.restore.policy = "unconditional".to_string();
        config.restore.press_mode = "overwrite".to_string();
        assert_eq!(config.restore_policy(), RestorePolicy::Unconditional);
        assert_eq!(config.press_mode(), PressMode::Overwrite);
    }
}
