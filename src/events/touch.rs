use serde::{Deserialize, Serialize};
use std::fmt;

/// Состояние касания
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TouchState {
    Pressed,
    Released,
}

impl TouchState {
    /// Преобразовать значение evdev события в состояние касания.
    /// Значение 2 (аппаратный автоповтор) не является переходом и отбрасывается.
    pub fn from_event_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(TouchState::Released),
            1 => Some(TouchState::Pressed),
            _ => None,
        }
    }
}

/// Событие касания от тачскрина (key-событие сенсора)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchEvent {
    pub code: u16,
    pub state: TouchState,
    pub timestamp: std::time::Instant,
    pub device_name: String,
}

impl TouchEvent {
    pub fn new(code: u16, state: TouchState, device_name: String) -> Self {
        Self {
            code,
            state,
            timestamp: std::time::Instant::now(),
            device_name,
        }
    }
}

impl fmt::Display for TouchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KEY_{}[{}] {:?} ({}ms)",
            self.code,
            self.device_name,
            self.state,
            self.timestamp.elapsed().as_millis()
        )
    }
}
