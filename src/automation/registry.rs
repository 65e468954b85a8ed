//! Frame-to-strategy dispatch.
//!
//! Each recognized frame can have an automation strategy. The table is built
//! at startup; detection results index into it by `frame_id`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::PilotResult;

use super::button::{AutomationCtx, Button};

pub trait Automator: Send + Sync {
    fn frame_id(&self) -> &str;
    /// Drive the minigame until `stop` is raised or the strategy finishes.
    fn run(&self, ctx: &mut AutomationCtx, stop: &AtomicBool) -> PilotResult<()>;
}

#[derive(Default)]
pub struct AutomatorRegistry {
    automators: HashMap<String, Arc<dyn Automator>>,
}

impl AutomatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, automator: Arc<dyn Automator>) {
        let frame_id = automator.frame_id().to_string();
        if self.automators.insert(frame_id.clone(), automator).is_some() {
            tracing::warn!(frame_id = %frame_id, "replaced existing automator");
        }
    }

    pub fn get(&self, frame_id: &str) -> Option<Arc<dyn Automator>> {
        self.automators.get(frame_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.automators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.automators.is_empty()
    }
}

/// Presses one button whenever it lights up. Covers the many minigames that
/// reduce to "click the button when it becomes clickable".
pub struct SinglePressAutomator {
    frame_id: String,
    button: Button,
    poll_interval: Duration,
}

impl SinglePressAutomator {
    pub fn new(frame_id: impl Into<String>, button: Button, poll_interval: Duration) -> Self {
        Self {
            frame_id: frame_id.into(),
            button,
            poll_interval,
        }
    }
}

impl Automator for SinglePressAutomator {
    fn frame_id(&self) -> &str {
        &self.frame_id
    }

    fn run(&self, ctx: &mut AutomationCtx, stop: &AtomicBool) -> PilotResult<()> {
        tracing::info!(frame_id = %self.frame_id, button = %self.button.name, "automation started");
        while !stop.load(Ordering::Relaxed) {
            if ctx.button_active(&self.button)? {
                ctx.click(&self.button)?;
            }
            std::thread::sleep(self.poll_interval);
        }
        tracing::info!(frame_id = %self.frame_id, "automation stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FramePercent;
    use crate::perception::button::ButtonColor;

    fn press_automator(frame_id: &str) -> Arc<dyn Automator> {
        Arc::new(SinglePressAutomator::new(
            frame_id,
            Button::new("go", FramePercent::new(0.5, 0.85), ButtonColor::Green),
            Duration::from_millis(50),
        ))
    }

    #[test]
    fn registry_resolves_by_frame_id() {
        let mut registry = AutomatorRegistry::new();
        registry.register(press_automator("1.1"));
        registry.register(press_automator("1.2"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("1.2").unwrap().frame_id(), "1.2");
        assert!(registry.get("9.9").is_none());
    }

    #[test]
    fn re_registering_replaces() {
        let mut registry = AutomatorRegistry::new();
        registry.register(press_automator("1.1"));
        registry.register(press_automator("1.1"));
        assert_eq!(registry.len(), 1);
    }
}
