use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Координаты курсора
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

impl PointerPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for PointerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Разделяемая ячейка с последней известной позицией курсора.
///
/// Трекер перезаписывает значение с частотой опроса, цикл обработки касаний
/// только читает его. Пустая до первого успешного опроса; сбрасывается, когда
/// опрос позиции завершился ошибкой ("координаты неизвестны").
pub struct PointerCell {
    position: RwLock<Option<PointerPosition>>,
}

impl Default for PointerCell {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerCell {
    pub fn new() -> Self {
        Self {
            position: RwLock::new(None),
        }
    }

    pub fn store(&self, position: PointerPosition) {
        *self.position.write() = Some(position);
    }

    pub fn load(&self) -> Option<PointerPosition> {
        *self.position.read()
    }

    pub fn clear(&self) {
        *self.position.write() = None;
    }
}
