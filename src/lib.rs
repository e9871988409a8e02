//! SoundSetter
//!
//! Typed read/write access to a live game's audio configuration, for use from
//! an in-process overlay plugin.
//!
//! The game keeps its audio settings in a configuration structure it owns and
//! reallocates at will. This crate resolves option identifiers to the codes
//! the game's native getter/setter understand, wraps each slot in a typed
//! option (toggle, 0–100 volume, equalizer mode) and groups them in
//! `VolumeControls`. Every access tolerates the structure being unavailable.
//!
//! This crate can be used as:
//! - A Rust library (rlib) for direct integration
//! - A dynamic library (cdylib) driven by a host through the `soundsetter_*` C ABI

pub mod commands;
pub mod config;
pub mod controls;
pub mod error;
pub mod memory;
pub mod options;
pub mod plugin;

// Re-export commonly used types
pub use commands::{CommandOutcome, SoundCommand, VolumeAction};
pub use config::{KeyState, PluginConfig, PreferenceStore, VirtualKey};
pub use controls::{Audience, Channel, FeatureToggle, SoundSnapshot, VolumeControls};
pub use error::{Result, SoundSetterError};
pub use memory::{BaseAddress, ConfigBackend, NativeConfigBackend, RawOptionAccessor};
pub use options::{
    resolve_config_code, BooleanOption, ByteOption, ConfigOption, EqualizerMode,
    EqualizerModeOption, OptionKind, TypedOption,
};
pub use plugin::{FrameContext, FrameView, Session, WindowLifecycle, WindowSizing};

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{AsyncKeyState, MemoryPreferenceStore};

// =============================================================================
// FFI Interface for Dynamic Loading
// =============================================================================

static SESSION: Mutex<Option<Session>> = Mutex::new(None);

/// Config saved while `SESSION` was locked, waiting for the host callback
static PENDING_SAVE: Mutex<Option<(SaveConfigCallback, CString)>> = Mutex::new(None);

/// Host callback that persists the plugin config JSON
///
/// Called after the library has released its session lock, so the callback
/// may call back into any `soundsetter_*` function.
pub type SaveConfigCallback = extern "C" fn(config_json: *const c_char);

struct CallbackPreferenceStore {
    save: SaveConfigCallback,
}

impl PreferenceStore for CallbackPreferenceStore {
    fn save(&self, config: &PluginConfig) -> Result<()> {
        let json = config.to_json()?;
        match CString::new(json) {
            Ok(json) => *PENDING_SAVE.lock() = Some((self.save, json)),
            Err(e) => log::warn!("Plugin config contains a NUL byte: {}", e),
        }
        Ok(())
    }
}

/// Hand the latest saved config to the host. Must not be called with
/// `SESSION` locked.
fn flush_pending_save() {
    let pending = PENDING_SAVE.lock().take();
    if let Some((save, json)) = pending {
        save(json.as_ptr());
    }
}

fn read_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: the host passes NUL-terminated strings that outlive the call.
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

fn into_c_string(s: String) -> *mut c_char {
    CString::new(s)
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

/// Start a session (call once at plugin load)
///
/// `config_json` may be null for defaults. `save` may be null, in which case
/// preferences are kept in memory only. Returns false if a session already
/// exists or the option tables are inconsistent.
#[no_mangle]
pub extern "C" fn soundsetter_init(
    config_json: *const c_char,
    save: Option<SaveConfigCallback>,
) -> bool {
    let mut guard = SESSION.lock();
    if guard.is_some() {
        return false;
    }

    let config = match read_c_str(config_json) {
        Some(json) => PluginConfig::from_json(&json).unwrap_or_else(|e| {
            log::warn!("Invalid plugin config, using defaults: {}", e);
            PluginConfig::default()
        }),
        None => PluginConfig::default(),
    };

    let store: Arc<dyn PreferenceStore> = match save {
        Some(save) => Arc::new(CallbackPreferenceStore { save }),
        None => Arc::new(MemoryPreferenceStore::new()),
    };

    match Session::new(config, store) {
        Ok(session) => {
            *guard = Some(session);
            true
        }
        Err(_) => false,
    }
}

/// End the session (call at plugin unload)
#[no_mangle]
pub extern "C" fn soundsetter_shutdown() {
    if SESSION.lock().take().is_some() {
        log::info!("SoundSetter session ended");
    }
}

/// Bind to the configuration structure at `base`
///
/// `set_option` and `get_option` are the addresses of the game's option
/// setter and getter. Returns whether options are now available.
#[no_mangle]
pub extern "C" fn soundsetter_attach(base: usize, set_option: usize, get_option: usize) -> bool {
    let mut guard = SESSION.lock();
    let Some(session) = guard.as_mut() else {
        return false;
    };

    // SAFETY: the host resolves these addresses to the game's option routines.
    let Some(backend) = (unsafe { NativeConfigBackend::from_addresses(set_option, get_option) })
    else {
        log::warn!("Option routines not resolved; staying detached");
        session.detach();
        return false;
    };

    session.attach(Arc::new(backend), BaseAddress::new(base));
    session.controls().is_present()
}

/// Drop all option bindings (structure about to move or be freed)
#[no_mangle]
pub extern "C" fn soundsetter_detach() {
    if let Some(session) = SESSION.lock().as_mut() {
        session.detach();
    }
}

/// Report that the settings window's first layout has settled
#[no_mangle]
pub extern "C" fn soundsetter_layout_settled() {
    if let Some(session) = SESSION.lock().as_mut() {
        session.layout_settled();
    }
}

/// Run one frame of the plugin
///
/// Polls the keybind and, while the settings window is visible, reads every
/// option. Returns a JSON `FrameView`, or null while the window is hidden.
/// Caller must free the returned string with soundsetter_free_string.
#[no_mangle]
pub extern "C" fn soundsetter_frame(in_cutscene: bool) -> *mut c_char {
    let view = SESSION
        .lock()
        .as_mut()
        .and_then(|session| session.frame(&AsyncKeyState, FrameContext { in_cutscene }));
    flush_pending_save();

    let Some(view) = view else {
        return std::ptr::null_mut();
    };
    match serde_json::to_string(&view) {
        Ok(json) => into_c_string(json),
        Err(e) => {
            log::warn!("Failed to serialize frame: {}", e);
            std::ptr::null_mut()
        }
    }
}

/// Run a chat command
///
/// Returns feedback text, or null when there is nothing to print.
/// Caller must free the returned string with soundsetter_free_string.
#[no_mangle]
pub extern "C" fn soundsetter_command(command: *const c_char, args: *const c_char) -> *mut c_char {
    let Some(command) = read_c_str(command) else {
        return std::ptr::null_mut();
    };
    let args = read_c_str(args).unwrap_or_default();

    let result = SESSION
        .lock()
        .as_mut()
        .map(|session| session.command(&command, &args));
    flush_pending_save();

    let message = match result {
        Some(Ok(outcome)) => outcome.to_string(),
        Some(Err(e)) => e.to_string(),
        None => return std::ptr::null_mut(),
    };
    if message.is_empty() {
        std::ptr::null_mut()
    } else {
        into_c_string(message)
    }
}

/// Read every option as a JSON `SoundSnapshot`
///
/// Caller must free the returned string with soundsetter_free_string.
#[no_mangle]
pub extern "C" fn soundsetter_snapshot_json() -> *mut c_char {
    let snapshot = SESSION
        .lock()
        .as_ref()
        .map(|s| s.controls().snapshot())
        .unwrap_or_else(|| VolumeControls::detached().snapshot());

    let json = serde_json::to_string(&snapshot).unwrap_or_else(|_| "{}".to_string());
    into_c_string(json)
}

/// Free a string returned by this library
#[no_mangle]
pub extern "C" fn soundsetter_free_string(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            let _ = CString::from_raw(s);
        }
    }
}

/// Get library version
#[no_mangle]
pub extern "C" fn soundsetter_version() -> *const c_char {
    static VERSION: &[u8] = b"0.1.0\0";
    VERSION.as_ptr() as *const c_char
}
