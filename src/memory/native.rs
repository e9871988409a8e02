//! Native option routines inside the game process

use std::ffi::c_void;

use super::{BaseAddress, ConfigBackend};

/// The game's option setter: `(config, code, value, aux) -> config`
///
/// A member function of the configuration module. On x86 that means
/// `thiscall`; on x86-64 the Microsoft convention is the same as `C`.
#[cfg(target_arch = "x86")]
pub type SetOptionFn =
    unsafe extern "thiscall" fn(base: *mut c_void, code: u64, value: u64, aux: u64) -> *mut c_void;
#[cfg(not(target_arch = "x86"))]
pub type SetOptionFn =
    unsafe extern "C" fn(base: *mut c_void, code: u64, value: u64, aux: u64) -> *mut c_void;

/// The game's option getter: `(config, code) -> value`
#[cfg(target_arch = "x86")]
pub type GetOptionFn = unsafe extern "thiscall" fn(base: *mut c_void, code: u64) -> u64;
#[cfg(not(target_arch = "x86"))]
pub type GetOptionFn = unsafe extern "C" fn(base: *mut c_void, code: u64) -> u64;

/// Calls the game's own getter and setter through function pointers
/// supplied by the host
#[derive(Clone, Copy)]
pub struct NativeConfigBackend {
    set_option: SetOptionFn,
    get_option: GetOptionFn,
}

impl NativeConfigBackend {
    pub fn new(set_option: SetOptionFn, get_option: GetOptionFn) -> Self {
        Self {
            set_option,
            get_option,
        }
    }

    /// Build a backend from raw entry point addresses
    ///
    /// Returns `None` if either address is zero.
    ///
    /// # Safety
    /// Non-zero addresses must point at the game's setter and getter with the
    /// signatures of `SetOptionFn` and `GetOptionFn`, and stay mapped for as
    /// long as the backend is used.
    pub unsafe fn from_addresses(set_option: usize, get_option: usize) -> Option<Self> {
        if set_option == 0 || get_option == 0 {
            return None;
        }
        Some(Self {
            set_option: std::mem::transmute::<usize, SetOptionFn>(set_option),
            get_option: std::mem::transmute::<usize, GetOptionFn>(get_option),
        })
    }
}

impl ConfigBackend for NativeConfigBackend {
    fn read_option(&self, base: BaseAddress, code: u64) -> Option<u64> {
        if !base.is_valid() {
            return None;
        }
        // SAFETY: construction guarantees the pointer is the game's getter, and
        // the base address is non-null.
        Some(unsafe { (self.get_option)(base.as_ptr(), code) })
    }

    fn write_option(&self, base: BaseAddress, code: u64, value: u64, aux: u64) {
        if !base.is_valid() {
            return;
        }
        // SAFETY: as above. The returned pointer is not needed.
        unsafe {
            (self.set_option)(base.as_ptr(), code, value, aux);
        }
    }
}

#[cfg(all(test, not(target_arch = "x86")))]
mod tests {
    use super::*;
    use crate::memory::SET_OPTION_AUX;
    use std::sync::atomic::{AtomicU64, Ordering};

    static LAST_CODE: AtomicU64 = AtomicU64::new(0);
    static LAST_VALUE: AtomicU64 = AtomicU64::new(0);
    static LAST_AUX: AtomicU64 = AtomicU64::new(0);

    unsafe extern "C" fn fake_set(base: *mut c_void, code: u64, value: u64, aux: u64) -> *mut c_void {
        LAST_CODE.store(code, Ordering::SeqCst);
        LAST_VALUE.store(value, Ordering::SeqCst);
        LAST_AUX.store(aux, Ordering::SeqCst);
        base
    }

    unsafe extern "C" fn fake_get(_base: *mut c_void, code: u64) -> u64 {
        code * 2
    }

    #[test]
    fn test_native_calls_through_pointers() {
        let backend = NativeConfigBackend::new(fake_set, fake_get);
        let base = BaseAddress::new(0x1000);

        assert_eq!(backend.read_option(base, 21), Some(42));

        backend.write_option(base, 86, 75, SET_OPTION_AUX);
        assert_eq!(LAST_CODE.load(Ordering::SeqCst), 86);
        assert_eq!(LAST_VALUE.load(Ordering::SeqCst), 75);
        assert_eq!(LAST_AUX.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_native_null_base() {
        let backend = NativeConfigBackend::new(fake_set, fake_get);
        assert_eq!(backend.read_option(BaseAddress::NULL, 21), None);
    }

    #[test]
    fn test_from_addresses_rejects_zero() {
        unsafe {
            assert!(NativeConfigBackend::from_addresses(0, fake_get as usize).is_none());
            assert!(NativeConfigBackend::from_addresses(fake_set as usize, 0).is_none());
            assert!(NativeConfigBackend::from_addresses(fake_set as usize, fake_get as usize).is_some());
        }
    }
}
