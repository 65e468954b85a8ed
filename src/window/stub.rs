use super::WindowLocator;
use crate::errors::{PilotError, PilotResult};
use crate::geometry::ClientArea;

/// Non-Windows stand-in; the game only ships for Windows.
pub struct GameWindow {
    title_fragment: String,
}

impl GameWindow {
    pub fn new(title_fragment: impl Into<String>) -> Self {
        Self {
            title_fragment: title_fragment.into(),
        }
    }
}

impl WindowLocator for GameWindow {
    fn client_area(&self) -> PilotResult<ClientArea> {
        Err(PilotError::Window(format!(
            "window lookup for '{}' is not supported on this platform",
            self.title_fragment
        )))
    }
}
