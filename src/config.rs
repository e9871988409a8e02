//! Plugin preferences
//!
//! Preferences are plain data serialized as JSON, the format the host uses for
//! plugin configuration files. Writing them to disk is up to the host, through
//! `PreferenceStore`.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const CONFIG_VERSION: u32 = 1;

macro_rules! virtual_keys {
    ($($variant:ident = $code:literal => $name:literal,)+) => {
        /// Keys that can be bound to open the settings window
        ///
        /// Codes are Win32 virtual-key codes. The first three entries are the
        /// modifier keys; the rest are major keys.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum VirtualKey {
            $($variant,)+
        }

        impl VirtualKey {
            pub const ALL: &'static [VirtualKey] = &[$(VirtualKey::$variant,)+];

            pub const fn code(self) -> u16 {
                match self {
                    $(VirtualKey::$variant => $code,)+
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(VirtualKey::$variant => $name,)+
                }
            }
        }
    };
}

virtual_keys! {
    Shift = 0x10 => "Shift",
    Control = 0x11 => "Ctrl",
    Alt = 0x12 => "Alt",
    F1 = 0x70 => "F1",
    F2 = 0x71 => "F2",
    F3 = 0x72 => "F3",
    F4 = 0x73 => "F4",
    F5 = 0x74 => "F5",
    F6 = 0x75 => "F6",
    F7 = 0x76 => "F7",
    F8 = 0x77 => "F8",
    F9 = 0x78 => "F9",
    F10 = 0x79 => "F10",
    F11 = 0x7A => "F11",
    F12 = 0x7B => "F12",
    A = 0x41 => "A",
    B = 0x42 => "B",
    C = 0x43 => "C",
    D = 0x44 => "D",
    E = 0x45 => "E",
    F = 0x46 => "F",
    G = 0x47 => "G",
    H = 0x48 => "H",
    I = 0x49 => "I",
    J = 0x4A => "J",
    K = 0x4B => "K",
    L = 0x4C => "L",
    M = 0x4D => "M",
    N = 0x4E => "N",
    O = 0x4F => "O",
    P = 0x50 => "P",
    Q = 0x51 => "Q",
    R = 0x52 => "R",
    S = 0x53 => "S",
    T = 0x54 => "T",
    U = 0x55 => "U",
    V = 0x56 => "V",
    W = 0x57 => "W",
    X = 0x58 => "X",
    Y = 0x59 => "Y",
    Z = 0x5A => "Z",
}

const MODIFIER_COUNT: usize = 3;

impl VirtualKey {
    pub fn modifiers() -> &'static [VirtualKey] {
        &Self::ALL[..MODIFIER_COUNT]
    }

    pub fn major_keys() -> &'static [VirtualKey] {
        &Self::ALL[MODIFIER_COUNT..]
    }

    pub fn is_modifier(self) -> bool {
        Self::modifiers().contains(&self)
    }

    /// Position in `modifiers()`, for combo-box selection
    pub fn modifier_index(self) -> Option<usize> {
        Self::modifiers().iter().position(|&k| k == self)
    }

    /// Position in `major_keys()`, for combo-box selection
    pub fn major_index(self) -> Option<usize> {
        Self::major_keys().iter().position(|&k| k == self)
    }

    pub fn from_modifier_index(index: usize) -> Option<Self> {
        Self::modifiers().get(index).copied()
    }

    pub fn from_major_index(index: usize) -> Option<Self> {
        Self::major_keys().get(index).copied()
    }
}

/// Plugin-local preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub version: u32,
    pub modifier_key: VirtualKey,
    pub major_key: VirtualKey,
    /// Only react to the keybind while a cutscene is playing
    pub only_show_in_cutscenes: bool,
    pub window_visible: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            modifier_key: VirtualKey::Control,
            major_key: VirtualKey::K,
            only_show_in_cutscenes: false,
            window_visible: false,
        }
    }
}

impl PluginConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: PluginConfig = serde_json::from_str(json)?;
        config.normalize();
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Put keys back in their lists if a hand-edited file swapped them
    fn normalize(&mut self) {
        let defaults = Self::default();
        if !self.modifier_key.is_modifier() {
            log::warn!("{:?} is not a modifier key; using default", self.modifier_key);
            self.modifier_key = defaults.modifier_key;
        }
        if self.major_key.is_modifier() {
            log::warn!("{:?} is not a major key; using default", self.major_key);
            self.major_key = defaults.major_key;
        }
        self.version = CONFIG_VERSION;
    }

    /// Human-readable keybind, e.g. "Ctrl+K"
    pub fn keybind_label(&self) -> String {
        format!("{}+{}", self.modifier_key.name(), self.major_key.name())
    }
}

/// Persists preferences on behalf of the host
pub trait PreferenceStore: Send + Sync {
    fn save(&self, config: &PluginConfig) -> Result<()>;
}

/// Keeps the last saved preferences as JSON in memory
#[derive(Default)]
pub struct MemoryPreferenceStore {
    saved: Mutex<Option<String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved_json(&self) -> Option<String> {
        self.saved.lock().clone()
    }

    pub fn load(&self) -> Result<PluginConfig> {
        match self.saved.lock().as_deref() {
            Some(json) => PluginConfig::from_json(json),
            None => Ok(PluginConfig::default()),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn save(&self, config: &PluginConfig) -> Result<()> {
        let json = config.to_json()?;
        *self.saved.lock() = Some(json);
        Ok(())
    }
}

/// Key-down queries supplied by the host
pub trait KeyState {
    fn is_down(&self, key: VirtualKey) -> bool;
}

/// Key state read with `GetAsyncKeyState`
///
/// Other platforms report every key as up.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsyncKeyState;

#[cfg(target_os = "windows")]
impl KeyState for AsyncKeyState {
    fn is_down(&self, key: VirtualKey) -> bool {
        use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;

        // SAFETY: GetAsyncKeyState has no preconditions.
        let state = unsafe { GetAsyncKeyState(i32::from(key.code())) };
        (state as u16) & 0x8000 != 0
    }
}

#[cfg(not(target_os = "windows"))]
impl KeyState for AsyncKeyState {
    fn is_down(&self, _key: VirtualKey) -> bool {
        false
    }
}

/// Detects keybind presses across frames
///
/// Fires once when the combination goes down, not on every frame it is held.
#[derive(Debug, Default)]
pub struct KeybindWatcher {
    was_down: bool,
}

impl KeybindWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll(&mut self, keys: &dyn KeyState, config: &PluginConfig, in_cutscene: bool) -> bool {
        let down = keys.is_down(config.modifier_key) && keys.is_down(config.major_key);
        let pressed = down && !self.was_down;
        self.was_down = down;

        pressed && (!config.only_show_in_cutscenes || in_cutscene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Default)]
    struct HeldKeys(HashSet<VirtualKey>);

    impl KeyState for HeldKeys {
        fn is_down(&self, key: VirtualKey) -> bool {
            self.0.contains(&key)
        }
    }

    fn held(keys: &[VirtualKey]) -> HeldKeys {
        HeldKeys(keys.iter().copied().collect())
    }

    #[test]
    fn test_key_lists() {
        assert_eq!(VirtualKey::modifiers(), &[VirtualKey::Shift, VirtualKey::Control, VirtualKey::Alt]);
        assert_eq!(VirtualKey::major_keys()[0], VirtualKey::F1);
        assert!(VirtualKey::Alt.is_modifier());
        assert!(!VirtualKey::K.is_modifier());
    }

    #[test]
    fn test_key_indices() {
        let index = VirtualKey::K.major_index().unwrap();
        assert_eq!(VirtualKey::from_major_index(index), Some(VirtualKey::K));
        assert_eq!(VirtualKey::Control.modifier_index(), Some(1));
        assert_eq!(VirtualKey::K.modifier_index(), None);
        assert_eq!(VirtualKey::from_modifier_index(3), None);
    }

    #[test]
    fn test_default_config() {
        let config = PluginConfig::default();
        assert_eq!(config.keybind_label(), "Ctrl+K");
        assert!(!config.only_show_in_cutscenes);
        assert!(!config.window_visible);
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = PluginConfig {
            modifier_key: VirtualKey::Alt,
            major_key: VirtualKey::F9,
            only_show_in_cutscenes: true,
            ..PluginConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(PluginConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_config_missing_fields_default() {
        let config = PluginConfig::from_json(r#"{ "major_key": "M" }"#).unwrap();
        assert_eq!(config.major_key, VirtualKey::M);
        assert_eq!(config.modifier_key, VirtualKey::Control);
        assert_eq!(config.version, CONFIG_VERSION);
    }

    #[test]
    fn test_config_swapped_keys_normalized() {
        let config =
            PluginConfig::from_json(r#"{ "modifier_key": "K", "major_key": "Shift" }"#).unwrap();
        assert_eq!(config.modifier_key, VirtualKey::Control);
        assert_eq!(config.major_key, VirtualKey::K);
    }

    #[test]
    fn test_config_invalid_json() {
        assert!(PluginConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.load().unwrap(), PluginConfig::default());

        let config = PluginConfig {
            window_visible: true,
            ..PluginConfig::default()
        };
        store.save(&config).unwrap();
        assert!(store.saved_json().unwrap().contains("window_visible"));
        assert_eq!(store.load().unwrap(), config);
    }

    #[test]
    fn test_keybind_fires_once_per_press() {
        let config = PluginConfig::default();
        let mut watcher = KeybindWatcher::new();
        let down = held(&[VirtualKey::Control, VirtualKey::K]);
        let up = HeldKeys::default();

        assert!(watcher.poll(&down, &config, false));
        assert!(!watcher.poll(&down, &config, false));
        assert!(!watcher.poll(&up, &config, false));
        assert!(watcher.poll(&down, &config, false));
    }

    #[test]
    fn test_keybind_needs_both_keys() {
        let config = PluginConfig::default();
        let mut watcher = KeybindWatcher::new();
        assert!(!watcher.poll(&held(&[VirtualKey::K]), &config, false));
        assert!(!watcher.poll(&held(&[VirtualKey::Control]), &config, false));
    }

    #[test]
    fn test_keybind_cutscene_gating() {
        let config = PluginConfig {
            only_show_in_cutscenes: true,
            ..PluginConfig::default()
        };
        let down = held(&[VirtualKey::Control, VirtualKey::K]);
        let up = HeldKeys::default();
        let mut watcher = KeybindWatcher::new();

        assert!(!watcher.poll(&down, &config, false));
        watcher.poll(&up, &config, false);
        assert!(watcher.poll(&down, &config, true));
    }
}
