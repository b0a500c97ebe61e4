use serde::{Deserialize, Serialize};
use std::fmt;

/// Информация об окне
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowInfo {
    pub title: String,
    pub class: String,
    /// Идентификатор окна у внешней утилиты управления окнами.
    /// Нужен для повторной активации; может отсутствовать у dry-run окон.
    pub id: Option<String>,
}

impl WindowInfo {
    pub fn new(title: String) -> Self {
        Self {
            title,
            class: String::new(),
            id: None,
        }
    }

    pub fn with_class(mut self, class: String) -> Self {
        self.class = class;
        self
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.id = Some(id);
        self
    }

    /// Проверить, содержит ли класс окна паттерн (регистронезависимо)
    pub fn class_matches(&self, pattern: &str) -> bool {
        if pattern.is_empty() {
            return false;
        }
        self.class
            .to_lowercase()
            .contains(&pattern.to_lowercase())
    }

    /// Проверить, содержит ли класс окна любой из паттернов
    pub fn class_matches_any(&self, patterns: &[String]) -> bool {
        patterns.iter().any(|pattern| self.class_matches(pattern))
    }
}

impl fmt::Display for WindowInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.class.is_empty() {
            write!(f, "\"{}\"", self.title)
        } else {
            write!(f, "\"{}\" ({})", self.title, self.class)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_info_creation() {
        let window = WindowInfo::new("main.rs - Visual Studio Code".to_string())
            .with_class("Code".to_string())
            .with_id("0x3400007".to_string());

        assert_eq!(window.title, "main.rs - Visual Studio Code");
        assert_eq!(window.class, "Code");
        assert_eq!(window.id, Some("0x3400007".to_string()));
    }

    #[test]
    fn test_class_matching() {
        let window = WindowInfo::new("New Tab".to_string())
            .with_class("Google Chrome".to_string());

        assert!(window.class_matches("Google Chrome"));
        assert!(window.class_matches("chrome"));
        assert!(!window.class_matches("Firefox"));
        // Пустой паттерн не совпадает ни с чем
        assert!(!window.class_matches(""));

        let patterns = vec!["firefox".to_string(), "chrome".to_string()];
        assert!(window.class_matches_any(&patterns));

        let no_patterns: Vec<String> = vec![];
        assert!(!window.class_matches_any(&no_patterns));
    }

    #[test]
    fn test_display() {
        let bare = WindowInfo::new("Untitled".to_string());
        assert_eq!(format!("{}", bare), "\"Untitled\"");

        let classed = WindowInfo::new("New Tab".to_string()).with_class("Google Chrome".to_string());
        assert_eq!(format!("{}", classed), "\"New Tab\" (Google Chrome)");
    }
}
