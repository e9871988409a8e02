//! Plugin session orchestration
//!
//! - `Session` - owns the preferences and the current `VolumeControls`
//! - `WindowLifecycle` - sizing state of the settings window

mod lifecycle;
mod session;

pub use lifecycle::{WindowLifecycle, WindowSizing};
pub use session::{FrameContext, FrameView, Session};
