//! Settings window lifecycle
//!
//! The window is auto-sized until the host reports that its first layout has
//! settled, so the default size accounts for font scaling. After that the user
//! may resize it freely.

use serde::{Deserialize, Serialize};

/// How the host should size the settings window this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowSizing {
    AutoResize,
    UserResizable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowLifecycle {
    /// No frame drawn since load
    #[default]
    Uninitialized,
    /// Drawn at least once, waiting for the host's layout signal
    PendingLayout,
    Ready,
}

impl WindowLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per drawn frame
    pub fn begin_frame(&mut self) -> WindowSizing {
        match self {
            WindowLifecycle::Uninitialized => {
                *self = WindowLifecycle::PendingLayout;
                WindowSizing::AutoResize
            }
            WindowLifecycle::PendingLayout => WindowSizing::AutoResize,
            WindowLifecycle::Ready => WindowSizing::UserResizable,
        }
    }

    /// The host finished laying out the auto-sized window
    pub fn layout_settled(&mut self) {
        match self {
            WindowLifecycle::PendingLayout => {
                log::debug!("Settings window layout settled");
                *self = WindowLifecycle::Ready;
            }
            WindowLifecycle::Uninitialized => {
                log::debug!("Ignoring layout signal before the first frame");
            }
            WindowLifecycle::Ready => {}
        }
    }

    pub fn reset(&mut self) {
        *self = WindowLifecycle::Uninitialized;
    }

    pub fn is_ready(&self) -> bool {
        *self == WindowLifecycle::Ready
    }
}
