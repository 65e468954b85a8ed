//! Mouse dispatch. The detection core never clicks; this is the seam the
//! click loops drive.

use enigo::{Button as MouseButton, Coordinate, Direction, Enigo, Mouse, Settings};

use crate::errors::{PilotError, PilotResult};
use crate::geometry::ScreenPoint;

pub trait MouseInput: Send {
    fn click(&mut self, pt: ScreenPoint) -> PilotResult<()>;
    fn press(&mut self, pt: ScreenPoint) -> PilotResult<()>;
    fn release(&mut self) -> PilotResult<()>;
}

/// Real input via enigo.
pub struct MouseDriver {
    enigo: Enigo,
}

impl MouseDriver {
    pub fn new() -> PilotResult<Self> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| PilotError::Input(e.to_string()))?;
        Ok(Self { enigo })
    }

    fn move_to(&mut self, pt: ScreenPoint) -> PilotResult<()> {
        self.enigo
            .move_mouse(pt.x, pt.y, Coordinate::Abs)
            .map_err(|e| PilotError::Input(e.to_string()))
    }
}

impl MouseInput for MouseDriver {
    fn click(&mut self, pt: ScreenPoint) -> PilotResult<()> {
        self.move_to(pt)?;
        self.enigo
            .button(MouseButton::Left, Direction::Click)
            .map_err(|e| PilotError::Input(e.to_string()))?;
        tracing::debug!(x = pt.x, y = pt.y, "click");
        Ok(())
    }

    fn press(&mut self, pt: ScreenPoint) -> PilotResult<()> {
        self.move_to(pt)?;
        self.enigo
            .button(MouseButton::Left, Direction::Press)
            .map_err(|e| PilotError::Input(e.to_string()))
    }

    fn release(&mut self) -> PilotResult<()> {
        self.enigo
            .button(MouseButton::Left, Direction::Release)
            .map_err(|e| PilotError::Input(e.to_string()))
    }
}
