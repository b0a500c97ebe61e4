use crate::error::{Result, TouchguardError};
use crate::events::PointerPosition;
use std::process::Command;
use tracing::debug;

use super::r#trait::PointerBackend;

pub struct XdotoolPointerBackend;

impl XdotoolPointerBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Разобрать вывод `xdotool getmouselocation --shell`:
/// строки вида `X=1234` / `Y=567` (остальные ключи игнорируются)
fn parse_mouselocation(stdout: &str) -> Option<PointerPosition> {
    let mut x = None;
    let mut y = None;

    for line in stdout.lines() {
        if let Some(value) = line.strip_prefix("X=") {
            x = value.trim().parse().ok();
        } else if let Some(value) = line.strip_prefix("Y=") {
            y = value.trim().parse().ok();
        }
    }

    Some(PointerPosition::new(x?, y?))
}

#[async_trait::async_trait]
impl PointerBackend for XdotoolPointerBackend {
    async fn get_position(&self) -> Result<PointerPosition> {
        let output = Command::new("xdotool")
            .args(["getmouselocation", "--shell"])
            .output()
            .map_err(|e| {
                debug!("xdotool не найден или не работает: {}", e);
                TouchguardError::Internal(format!("xdotool не найден: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("xdotool getmouselocation вернул ошибку: {}", stderr);
            return Err(TouchguardError::Internal(format!(
                "xdotool getmouselocation вернул ошибку: {}",
                stderr
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);

        parse_mouselocation(&stdout).ok_or_else(|| {
            TouchguardError::Internal(format!(
                "Не удалось разобрать вывод getmouselocation: {}",
                stdout.trim()
            ))
        })
    }

    async fn move_to(&self, position: PointerPosition) -> Result<()> {
        let output = Command::new("xdotool")
            .arg("mousemove")
            .arg(position.x.to_string())
            .arg(position.y.to_string())
            .output()
            .map_err(|e| TouchguardError::Internal(format!("xdotool не найден: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TouchguardError::Internal(format!(
                "xdotool mousemove вернул ошибку: {}",
                stderr
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mouselocation() {
        let output = "X=3328\nY=1024\nSCREEN=0\nWINDOW=54525958\n";
        assert_eq!(
            parse_mouselocation(output),
            Some(PointerPosition::new(3328, 1024))
        );
    }

    #[test]
    fn test_parse_mouselocation_incomplete() {
        assert_eq!(parse_mouselocation("X=100\nSCREEN=0\n"), None);
        assert_eq!(parse_mouselocation(""), None);
        assert_eq!(parse_mouselocation("X=abc\nY=10\n"), None);
    }
}
