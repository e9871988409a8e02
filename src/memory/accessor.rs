//! Raw option slot access

use std::fmt;
use std::sync::Arc;

use super::{BaseAddress, ConfigBackend, SET_OPTION_AUX};
use crate::options::ConfigOption;

/// One option's slot in the live configuration structure
///
/// Every slot is an independently addressable u64 reached through the native
/// getter/setter; nothing else about the structure's layout is assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawSlot {
    pub base: BaseAddress,
    pub option: ConfigOption,
}

impl RawSlot {
    pub const fn new(base: BaseAddress, option: ConfigOption) -> Self {
        Self { base, option }
    }

    pub const fn code(&self) -> u64 {
        self.option.code()
    }
}

/// Reads and writes one raw slot through a `ConfigBackend`
///
/// An unresolved base address is an expected state, not an error: reads
/// report `None` and writes are skipped.
#[derive(Clone)]
pub struct RawOptionAccessor {
    backend: Arc<dyn ConfigBackend>,
    slot: RawSlot,
}

impl RawOptionAccessor {
    pub fn new(backend: Arc<dyn ConfigBackend>, base: BaseAddress, option: ConfigOption) -> Self {
        Self {
            backend,
            slot: RawSlot::new(base, option),
        }
    }

    pub fn slot(&self) -> RawSlot {
        self.slot
    }

    pub fn option(&self) -> ConfigOption {
        self.slot.option
    }

    /// Whether the slot has a resolved base address behind it
    pub fn is_present(&self) -> bool {
        self.slot.base.is_valid()
    }

    /// Read the slot's current value
    pub fn read_raw(&self) -> Option<u64> {
        if !self.is_present() {
            return None;
        }
        self.backend.read_option(self.slot.base, self.slot.code())
    }

    /// Write a value to the slot, returning whether the setter was called
    pub fn write_raw(&self, value: u64) -> bool {
        if !self.is_present() {
            log::trace!("Skipping write to {:?}: base address unresolved", self.slot.option);
            return false;
        }
        self.backend
            .write_option(self.slot.base, self.slot.code(), value, SET_OPTION_AUX);
        true
    }
}

impl fmt::Debug for RawOptionAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawOptionAccessor")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}
