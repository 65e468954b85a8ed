//! Target-window geometry.
//!
//! The core consumes only the client area (screen origin + size); how it is
//! obtained is platform plumbing behind `WindowLocator`.

use crate::errors::PilotResult;
use crate::geometry::ClientArea;

pub trait WindowLocator: Send + Sync {
    /// Current client area of the target window.
    fn client_area(&self) -> PilotResult<ClientArea>;
}

#[cfg(windows)]
mod win32;
#[cfg(windows)]
pub use win32::GameWindow;

#[cfg(not(windows))]
mod stub;
#[cfg(not(windows))]
pub use stub::GameWindow;
