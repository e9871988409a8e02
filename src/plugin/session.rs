//! Plugin session

use serde::Serialize;
use std::sync::Arc;

use super::{WindowLifecycle, WindowSizing};
use crate::commands::{CommandOutcome, SoundCommand};
use crate::config::{KeyState, KeybindWatcher, PluginConfig, PreferenceStore};
use crate::controls::{SoundSnapshot, VolumeControls};
use crate::error::Result;
use crate::memory::{BaseAddress, ConfigBackend};
use crate::options::verify_option_table;

/// Per-frame facts supplied by the host
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameContext {
    pub in_cutscene: bool,
}

/// What the presentation layer needs to draw the settings window
#[derive(Debug, Clone, Serialize)]
pub struct FrameView {
    pub sizing: WindowSizing,
    pub snapshot: SoundSnapshot,
}

/// Owns everything that lives for one plugin load
pub struct Session {
    config: PluginConfig,
    store: Arc<dyn PreferenceStore>,
    controls: VolumeControls,
    lifecycle: WindowLifecycle,
    keybind: KeybindWatcher,
}

impl Session {
    /// Start a session, checking the option tables first
    pub fn new(config: PluginConfig, store: Arc<dyn PreferenceStore>) -> Result<Self> {
        if let Err(e) = verify_option_table() {
            log::error!("Option table check failed: {}", e);
            return Err(e);
        }

        log::info!("SoundSetter session started (keybind {})", config.keybind_label());
        Ok(Self {
            config,
            store,
            controls: VolumeControls::detached(),
            lifecycle: WindowLifecycle::new(),
            keybind: KeybindWatcher::new(),
        })
    }

    /// Bind the controls to a (re)resolved configuration structure
    ///
    /// Attaching the backend already in use at the address already in use
    /// does nothing. Anything else replaces the whole aggregate.
    pub fn attach(&mut self, backend: Arc<dyn ConfigBackend>, base: BaseAddress) {
        let same_base = base.is_valid() && base == self.controls.base();
        if same_base && self.controls.uses_backend(&backend) {
            return;
        }
        if same_base {
            log::info!("Option routines changed; rebinding configuration at {}", base);
        } else if base.is_valid() {
            log::info!("Attaching to configuration at {}", base);
        } else {
            log::info!("Configuration base unresolved; options unavailable");
        }
        self.controls = VolumeControls::new(backend, base);
    }

    pub fn detach(&mut self) {
        if self.controls.is_present() {
            log::info!("Detached from configuration at {}", self.controls.base());
        }
        self.controls = VolumeControls::detached();
    }

    pub fn controls(&self) -> &VolumeControls {
        &self.controls
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Change preferences and persist them
    pub fn update_config(&mut self, update: impl FnOnce(&mut PluginConfig)) {
        let before = self.config.clone();
        update(&mut self.config);
        if self.config != before {
            self.save_config();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.config.window_visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.update_config(|config| config.window_visible = visible);
    }

    pub fn toggle_visible(&mut self) {
        let visible = !self.is_visible();
        self.set_visible(visible);
    }

    pub fn layout_settled(&mut self) {
        self.lifecycle.layout_settled();
    }

    /// Run once per rendered frame
    ///
    /// Polls the keybind and, when the window is visible, reads every option
    /// so changes made through the game's own UI show up.
    pub fn frame(&mut self, keys: &dyn KeyState, context: FrameContext) -> Option<FrameView> {
        if self.keybind.poll(keys, &self.config, context.in_cutscene) {
            self.toggle_visible();
        }

        if !self.is_visible() {
            return None;
        }

        Some(FrameView {
            sizing: self.lifecycle.begin_frame(),
            snapshot: self.controls.snapshot(),
        })
    }

    /// Parse and run a chat command
    pub fn command(&mut self, command: &str, args: &str) -> Result<CommandOutcome> {
        let outcome = SoundCommand::parse(command, args)?.execute(&self.controls);
        if outcome == CommandOutcome::ToggleWindow {
            self.toggle_visible();
        }
        Ok(outcome)
    }

    fn save_config(&self) {
        if let Err(e) = self.store.save(&self.config) {
            log::warn!("Failed to save plugin config: {}", e);
        }
    }
}
