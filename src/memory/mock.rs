//! In-memory configuration backend
//!
//! Stands in for the game's native option routines so option access can be
//! exercised without a running game.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{BaseAddress, ConfigBackend};
use crate::options::ConfigOption;

/// A setter call captured by `MockConfigBackend`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRecord {
    pub base: BaseAddress,
    pub code: u64,
    pub value: u64,
    pub aux: u64,
}

/// Mock backend that keeps slot values in a map and records every write
#[derive(Default)]
pub struct MockConfigBackend {
    /// Slot contents: (base address, config code) -> raw value
    slots: Mutex<HashMap<(usize, u64), u64>>,
    writes: Mutex<Vec<WriteRecord>>,
    reads: AtomicUsize,
}

impl MockConfigBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a slot value (builder form)
    pub fn with_value(self, base: BaseAddress, option: ConfigOption, raw: u64) -> Self {
        self.set_raw(base, option, raw);
        self
    }

    /// Change a slot value without recording a write, as the game itself would
    pub fn set_raw(&self, base: BaseAddress, option: ConfigOption, raw: u64) {
        self.slots.lock().insert((base.address(), option.code()), raw);
    }

    /// Current value of a slot, if it has ever been set
    pub fn raw(&self, base: BaseAddress, option: ConfigOption) -> Option<u64> {
        self.slots.lock().get(&(base.address(), option.code())).copied()
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.writes.lock().clone()
    }

    /// Writes that targeted a specific option
    pub fn writes_to(&self, option: ConfigOption) -> Vec<WriteRecord> {
        self.writes
            .lock()
            .iter()
            .filter(|w| w.code == option.code())
            .copied()
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().len()
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn clear_writes(&self) {
        self.writes.lock().clear();
    }
}

impl ConfigBackend for MockConfigBackend {
    fn read_option(&self, base: BaseAddress, code: u64) -> Option<u64> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.slots.lock().get(&(base.address(), code)).copied()
    }

    fn write_option(&self, base: BaseAddress, code: u64, value: u64, aux: u64) {
        self.slots.lock().insert((base.address(), code), value);
        self.writes.lock().push(WriteRecord {
            base,
            code,
            value,
            aux,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_seeded_values() {
        let base = BaseAddress::new(0x1000);
        let backend = MockConfigBackend::new().with_value(base, ConfigOption::Bgm, 30);

        assert_eq!(backend.raw(base, ConfigOption::Bgm), Some(30));
        assert_eq!(backend.read_option(base, ConfigOption::Bgm.code()), Some(30));
        assert_eq!(backend.read_count(), 1);
        assert_eq!(backend.write_count(), 0);
    }

    #[test]
    fn test_mock_slots_are_per_base() {
        let a = BaseAddress::new(0x1000);
        let b = BaseAddress::new(0x2000);
        let backend = MockConfigBackend::new().with_value(a, ConfigOption::Voice, 70);

        assert_eq!(backend.read_option(b, ConfigOption::Voice.code()), None);
    }

    #[test]
    fn test_mock_records_writes() {
        let base = BaseAddress::new(0x1000);
        let backend = MockConfigBackend::new();
        backend.write_option(base, ConfigOption::Master.code(), 80, 2);
        backend.write_option(base, ConfigOption::MasterMuted.code(), 1, 2);

        assert_eq!(backend.write_count(), 2);
        assert_eq!(backend.writes_to(ConfigOption::Master).len(), 1);
        assert_eq!(backend.raw(base, ConfigOption::MasterMuted), Some(1));

        backend.clear_writes();
        assert_eq!(backend.write_count(), 0);
        assert_eq!(backend.raw(base, ConfigOption::Master), Some(80));
    }
}
