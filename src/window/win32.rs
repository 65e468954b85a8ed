use std::sync::Mutex;
use std::time::{Duration, Instant};

use windows::Win32::Foundation::{BOOL, HWND, LPARAM, POINT, RECT};
use windows::Win32::Graphics::Gdi::ClientToScreen;
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetClientRect, GetWindowTextW, IsWindow, IsWindowVisible,
};

use super::WindowLocator;
use crate::errors::{PilotError, PilotResult};
use crate::geometry::ClientArea;

/// Window lookup is comparatively expensive; reuse the handle briefly.
const HANDLE_CACHE_TTL: Duration = Duration::from_secs(2);

/// Finds the game window by title substring and reports its client area.
pub struct GameWindow {
    title_fragment: String,
    // Raw handle value, revalidated with IsWindow before reuse.
    cached: Mutex<Option<(Instant, isize)>>,
}

impl GameWindow {
    pub fn new(title_fragment: impl Into<String>) -> Self {
        Self {
            title_fragment: title_fragment.into(),
            cached: Mutex::new(None),
        }
    }

    fn hwnd(&self) -> PilotResult<HWND> {
        let mut cached = self.cached.lock().expect("handle cache poisoned");
        if let Some((at, raw)) = *cached {
            let hwnd = HWND(raw as *mut _);
            if at.elapsed() < HANDLE_CACHE_TTL && unsafe { IsWindow(hwnd) }.as_bool() {
                return Ok(hwnd);
            }
        }

        let mut state = EnumState {
            needle: self.title_fragment.clone(),
            found: 0,
        };
        unsafe {
            // EnumWindows reports an error when the callback stops it early;
            // that is the found case, so the result is not meaningful here.
            let _ = EnumWindows(
                Some(enum_proc),
                LPARAM(&mut state as *mut EnumState as isize),
            );
        }

        if state.found == 0 {
            *cached = None;
            return Err(PilotError::Window(format!(
                "no visible window matching '{}'",
                self.title_fragment
            )));
        }

        tracing::debug!(title = %self.title_fragment, "target window found");
        *cached = Some((Instant::now(), state.found));
        Ok(HWND(state.found as *mut _))
    }
}

struct EnumState {
    needle: String,
    found: isize,
}

unsafe extern "system" fn enum_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let state = &mut *(lparam.0 as *mut EnumState);
    let mut buf = [0u16; 512];
    let len = GetWindowTextW(hwnd, &mut buf);
    if len > 0 {
        let title = String::from_utf16_lossy(&buf[..len as usize]);
        if title.contains(&state.needle) && IsWindowVisible(hwnd).as_bool() {
            state.found = hwnd.0 as isize;
            return BOOL(0);
        }
    }
    BOOL(1)
}

impl WindowLocator for GameWindow {
    fn client_area(&self) -> PilotResult<ClientArea> {
        let hwnd = self.hwnd()?;

        let mut rect = RECT::default();
        unsafe { GetClientRect(hwnd, &mut rect) }
            .map_err(|e| PilotError::Window(format!("GetClientRect: {e}")))?;

        let mut origin = POINT::default();
        if !unsafe { ClientToScreen(hwnd, &mut origin) }.as_bool() {
            return Err(PilotError::Window("ClientToScreen failed".into()));
        }

        Ok(ClientArea {
            origin_x: origin.x,
            origin_y: origin.y,
            width: rect.right - rect.left,
            height: rect.bottom - rect.top,
        })
    }
}
