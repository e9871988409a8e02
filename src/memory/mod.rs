//! Access to the game's live configuration memory
//!
//! This module is the only place that touches foreign memory. The game owns
//! the configuration structure; we only hold its base address, which may be
//! unknown (plugin just loaded) or change (structure reallocated). Every access
//! goes through a `ConfigBackend`, so tests can substitute `MockConfigBackend`
//! for the native routines.

mod accessor;
mod mock;
mod native;

pub use accessor::{RawOptionAccessor, RawSlot};
pub use mock::{MockConfigBackend, WriteRecord};
pub use native::{GetOptionFn, NativeConfigBackend, SetOptionFn};

use serde::{Deserialize, Serialize};
use std::ffi::c_void;
use std::fmt;

/// Auxiliary argument the game's option setter expects on every call
///
/// Its meaning is unknown. It is a fact about the current game build, not
/// something to derive or vary.
pub const SET_OPTION_AUX: u64 = 2;

/// Base address of the live configuration structure
///
/// Zero means "not resolved yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BaseAddress(usize);

impl BaseAddress {
    pub const NULL: BaseAddress = BaseAddress(0);

    pub const fn new(address: usize) -> Self {
        Self(address)
    }

    pub fn from_ptr(ptr: *mut c_void) -> Self {
        Self(ptr as usize)
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    pub const fn address(self) -> usize {
        self.0
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }
}

impl fmt::Display for BaseAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// Native getter/setter pair for configuration options
///
/// Implementations are only called with a valid base address; the accessor
/// layer filters out unresolved ones.
pub trait ConfigBackend: Send + Sync {
    /// Read the current value of an option's slot
    fn read_option(&self, base: BaseAddress, code: u64) -> Option<u64>;

    /// Write a value through the game's option setter
    fn write_option(&self, base: BaseAddress, code: u64, value: u64, aux: u64);
}
