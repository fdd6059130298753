//! Input events delivered by the host canvas.

use glam::Vec2;

use crate::scene::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
    Pen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
    Other(u16),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Canvas pixels, origin top-left.
    pub position: Vec2,
    /// Button involved in a press or release. `None` for plain moves and touches.
    pub button: Option<PointerButton>,
    pub source: PointerSource,
}

impl PointerEvent {
    pub fn mouse(position: Vec2, button: Option<PointerButton>) -> Self {
        Self {
            position,
            button,
            source: PointerSource::Mouse,
        }
    }

    pub fn touch(position: Vec2) -> Self {
        Self {
            position,
            button: None,
            source: PointerSource::Touch,
        }
    }

    /// Only the primary button may start a drag. Touches always can.
    pub fn can_start_drag(&self) -> bool {
        match self.source {
            PointerSource::Touch => true,
            PointerSource::Mouse | PointerSource::Pen => self.button == Some(PointerButton::Primary),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    /// Pointer left the canvas.
    PointerLeave,
    TouchCancel,
    Wheel { delta: f32 },
    /// Host selection changed.
    ObjectSelected(Option<ObjectId>),
}
