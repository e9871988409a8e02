//! Typed options over raw slots
//!
//! `TypedOption<V>` pairs a `RawOptionAccessor` with the codec for its value
//! domain. Reads never fail: an unresolved target or an undecodable raw value
//! yields the domain's default (`false`, `0`, `EqualizerMode::Standard`).
//! Writes to an unresolved target are dropped.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{ConfigOption, EqualizerMode, ValueDomain};
use crate::error::{Result, SoundSetterError};
use crate::memory::{BaseAddress, ConfigBackend, RawOptionAccessor};

/// Upper bound of the percentage domain
pub const MAX_PERCENT: u8 = 100;

/// Encoding between a value domain and a raw u64 slot
pub trait OptionValue: Copy + Send + Sync + 'static {
    /// Name used in diagnostics
    const DOMAIN: &'static str;

    /// Slots this type may be bound to
    const VALUE_DOMAIN: ValueDomain;

    /// Value reported when the slot cannot be read or decoded
    fn absent() -> Self;

    fn decode(raw: u64) -> Result<Self>;

    /// Encode for the setter. Out-of-domain values must not pass through.
    fn encode(self) -> u64;
}

impl OptionValue for bool {
    const DOMAIN: &'static str = "toggle";
    const VALUE_DOMAIN: ValueDomain = ValueDomain::Toggle;

    fn absent() -> Self {
        false
    }

    fn decode(raw: u64) -> Result<Self> {
        Ok(raw != 0)
    }

    fn encode(self) -> u64 {
        u64::from(self)
    }
}

impl OptionValue for u8 {
    const DOMAIN: &'static str = "percentage";
    const VALUE_DOMAIN: ValueDomain = ValueDomain::Percent;

    fn absent() -> Self {
        0
    }

    fn decode(raw: u64) -> Result<Self> {
        Ok((raw & 0xFF) as u8)
    }

    fn encode(self) -> u64 {
        u64::from(self.min(MAX_PERCENT))
    }
}

impl OptionValue for EqualizerMode {
    const DOMAIN: &'static str = "equalizer mode";
    const VALUE_DOMAIN: ValueDomain = ValueDomain::Equalizer;

    fn absent() -> Self {
        EqualizerMode::Standard
    }

    fn decode(raw: u64) -> Result<Self> {
        EqualizerMode::from_ordinal(raw)
    }

    fn encode(self) -> u64 {
        self.ordinal()
    }
}

/// A readable/writable option with a typed value domain
pub struct TypedOption<V: OptionValue> {
    accessor: RawOptionAccessor,
    mismatches: AtomicU64,
    _value: PhantomData<fn() -> V>,
}

/// On/off option (mute flags, feature toggles)
pub type BooleanOption = TypedOption<bool>;
/// 0–100 option (volumes)
pub type ByteOption = TypedOption<u8>;
pub type EqualizerModeOption = TypedOption<EqualizerMode>;

impl<V: OptionValue> TypedOption<V> {
    /// Bind `option` against `base`
    ///
    /// Fails with `DomainMismatch` if the option's slot holds a different kind
    /// of value than `V`.
    pub fn new(
        backend: Arc<dyn ConfigBackend>,
        base: BaseAddress,
        option: ConfigOption,
    ) -> Result<Self> {
        Self::from_accessor(RawOptionAccessor::new(backend, base, option))
    }

    pub fn from_accessor(accessor: RawOptionAccessor) -> Result<Self> {
        let option = accessor.option();
        if option.domain() != V::VALUE_DOMAIN {
            return Err(SoundSetterError::DomainMismatch {
                option,
                expected: V::VALUE_DOMAIN,
            });
        }
        Ok(Self {
            accessor,
            mismatches: AtomicU64::new(0),
            _value: PhantomData,
        })
    }

    pub fn option(&self) -> ConfigOption {
        self.accessor.option()
    }

    pub fn is_present(&self) -> bool {
        self.accessor.is_present()
    }

    pub fn get_value(&self) -> V {
        match self.accessor.read_raw() {
            Some(raw) => V::decode(raw).unwrap_or_else(|err| {
                self.report_mismatch(&err);
                V::absent()
            }),
            None => V::absent(),
        }
    }

    pub fn set_value(&self, value: V) {
        self.accessor.write_raw(value.encode());
    }

    /// Number of reads whose raw value did not decode
    pub fn decode_mismatches(&self) -> u64 {
        self.mismatches.load(Ordering::Relaxed)
    }

    fn report_mismatch(&self, err: &SoundSetterError) {
        // Reads happen every frame; only the first mismatch is worth a warning.
        if self.mismatches.fetch_add(1, Ordering::Relaxed) == 0 {
            log::warn!(
                "{:?}: {}; using default. The game version may not be supported",
                self.option(),
                err
            );
        } else {
            log::trace!("{:?}: {}", self.option(), err);
        }
    }
}

impl BooleanOption {
    /// Flip the stored value, returning the new one
    pub fn toggle(&self) -> bool {
        let value = !self.get_value();
        self.set_value(value);
        value
    }
}

impl ByteOption {
    /// Set from a wider integer, clamping into 0..=100
    pub fn set_clamped(&self, value: i32) {
        self.set_value(clamp_percent(value));
    }

    /// Add `delta` to the current value, clamping into 0..=100
    pub fn adjust(&self, delta: i32) -> u8 {
        let value = clamp_percent(i32::from(self.get_value()) + delta);
        self.set_value(value);
        value
    }
}

fn clamp_percent(value: i32) -> u8 {
    value.clamp(0, i32::from(MAX_PERCENT)) as u8
}

impl<V: OptionValue> fmt::Debug for TypedOption<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedOption")
            .field("domain", &V::DOMAIN)
            .field("slot", &self.accessor.slot())
            .finish()
    }
}

/// Borrowed option of any domain, for lookups by identifier
#[derive(Debug, Clone, Copy)]
pub enum OptionRef<'a> {
    Toggle(&'a BooleanOption),
    Percent(&'a ByteOption),
    Equalizer(&'a EqualizerModeOption),
}

impl OptionRef<'_> {
    pub fn option(&self) -> ConfigOption {
        match self {
            OptionRef::Toggle(o) => o.option(),
            OptionRef::Percent(o) => o.option(),
            OptionRef::Equalizer(o) => o.option(),
        }
    }

    pub fn is_present(&self) -> bool {
        match self {
            OptionRef::Toggle(o) => o.is_present(),
            OptionRef::Percent(o) => o.is_present(),
            OptionRef::Equalizer(o) => o.is_present(),
        }
    }

    /// Current value in its encoded form
    pub fn encoded_value(&self) -> u64 {
        match self {
            OptionRef::Toggle(o) => o.get_value().encode(),
            OptionRef::Percent(o) => o.get_value().encode(),
            OptionRef::Equalizer(o) => o.get_value().encode(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockConfigBackend;

    const BASE: BaseAddress = BaseAddress::new(0x4000_0000);

    fn backend() -> Arc<MockConfigBackend> {
        Arc::new(MockConfigBackend::new())
    }

    #[test]
    fn test_boolean_round_trip() {
        let backend = backend();
        for prior in [0, 1, 7] {
            backend.set_raw(BASE, ConfigOption::BgmMuted, prior);
            let option = BooleanOption::new(backend.clone(), BASE, ConfigOption::BgmMuted).unwrap();

            option.set_value(true);
            assert!(option.get_value());
            option.set_value(false);
            assert!(!option.get_value());
        }
    }

    #[test]
    fn test_boolean_any_nonzero_is_true() {
        let backend = backend();
        backend.set_raw(BASE, ConfigOption::VoiceMuted, 0x100);
        let option = BooleanOption::new(backend.clone(), BASE, ConfigOption::VoiceMuted).unwrap();
        assert!(option.get_value());

        option.set_value(true);
        assert_eq!(backend.raw(BASE, ConfigOption::VoiceMuted), Some(1));
    }

    #[test]
    fn test_boolean_toggle() {
        let backend = backend();
        let option = BooleanOption::new(backend, BASE, ConfigOption::MasterMuted).unwrap();
        assert!(option.toggle());
        assert!(!option.toggle());
    }

    #[test]
    fn test_byte_clamps_high() {
        let backend = backend();
        let option = ByteOption::new(backend.clone(), BASE, ConfigOption::Master).unwrap();

        option.set_value(150);
        assert_eq!(option.get_value(), 100);
        assert_eq!(backend.raw(BASE, ConfigOption::Master), Some(100));
    }

    #[test]
    fn test_byte_clamps_low() {
        let backend = backend();
        let option = ByteOption::new(backend, BASE, ConfigOption::Master).unwrap();

        option.set_clamped(-5);
        assert_eq!(option.get_value(), 0);
        option.set_clamped(1_000);
        assert_eq!(option.get_value(), 100);
    }

    #[test]
    fn test_byte_decode_narrows() {
        let backend = backend();
        backend.set_raw(BASE, ConfigOption::Bgm, 0x1_32);
        let option = ByteOption::new(backend, BASE, ConfigOption::Bgm).unwrap();
        assert_eq!(option.get_value(), 0x32);
    }

    #[test]
    fn test_byte_adjust() {
        let backend = backend();
        backend.set_raw(BASE, ConfigOption::Voice, 95);
        let option = ByteOption::new(backend, BASE, ConfigOption::Voice).unwrap();

        assert_eq!(option.adjust(10), 100);
        assert_eq!(option.adjust(-30), 70);
        assert_eq!(option.adjust(-200), 0);
    }

    #[test]
    fn test_equalizer_decode() {
        let backend = backend();
        backend.set_raw(BASE, ConfigOption::EqualizerMode, 2);
        let option = EqualizerModeOption::new(backend, BASE, ConfigOption::EqualizerMode).unwrap();

        assert_eq!(option.get_value(), EqualizerMode::TrebleBoost);
        assert_eq!(option.decode_mismatches(), 0);
    }

    #[test]
    fn test_equalizer_out_of_range_defaults() {
        let backend = backend();
        backend.set_raw(BASE, ConfigOption::EqualizerMode, 9);
        let option = EqualizerModeOption::new(backend, BASE, ConfigOption::EqualizerMode).unwrap();

        assert_eq!(option.get_value(), EqualizerMode::Standard);
        assert_eq!(option.get_value(), EqualizerMode::Standard);
        assert_eq!(option.decode_mismatches(), 2);
    }

    #[test]
    fn test_equalizer_set_writes_ordinal() {
        let backend = backend();
        let option = EqualizerModeOption::new(backend.clone(), BASE, ConfigOption::EqualizerMode).unwrap();
        option.set_value(EqualizerMode::LogitechProG50Mm);
        assert_eq!(backend.raw(BASE, ConfigOption::EqualizerMode), Some(4));
    }

    #[test]
    fn test_absent_base_defaults() {
        let backend = backend();
        let toggle = BooleanOption::new(backend.clone(), BaseAddress::NULL, ConfigOption::MasterMuted).unwrap();
        let volume = ByteOption::new(backend.clone(), BaseAddress::NULL, ConfigOption::Master).unwrap();
        let eq = EqualizerModeOption::new(backend.clone(), BaseAddress::NULL, ConfigOption::EqualizerMode).unwrap();

        toggle.set_value(true);
        volume.set_value(80);
        volume.set_clamped(-1);
        eq.set_value(EqualizerMode::BassBoost);

        assert!(!toggle.is_present());
        assert!(!toggle.get_value());
        assert_eq!(volume.get_value(), 0);
        assert_eq!(eq.get_value(), EqualizerMode::Standard);
        assert_eq!(backend.write_count(), 0);
    }

    #[test]
    fn test_unseeded_slot_reads_default() {
        let option = ByteOption::new(backend(), BASE, ConfigOption::Performance).unwrap();
        assert!(option.is_present());
        assert_eq!(option.get_value(), 0);
    }

    #[test]
    fn test_new_rejects_wrong_domain() {
        let backend = backend();

        assert!(matches!(
            BooleanOption::new(backend.clone(), BASE, ConfigOption::Master),
            Err(SoundSetterError::DomainMismatch {
                option: ConfigOption::Master,
                expected: ValueDomain::Toggle,
            })
        ));
        assert!(ByteOption::new(backend.clone(), BASE, ConfigOption::EqualizerMode).is_err());
        assert!(EqualizerModeOption::new(backend.clone(), BASE, ConfigOption::BgmMuted).is_err());
        assert_eq!(backend.write_count(), 0);
    }

    #[test]
    fn test_from_accessor_checks_domain() {
        let accessor = RawOptionAccessor::new(backend(), BASE, ConfigOption::VoiceMuted);
        assert!(BooleanOption::from_accessor(accessor.clone()).is_ok());
        assert!(ByteOption::from_accessor(accessor).is_err());
    }

    #[test]
    fn test_option_ref() {
        let backend = backend();
        backend.set_raw(BASE, ConfigOption::Master, 55);
        let volume = ByteOption::new(backend, BASE, ConfigOption::Master).unwrap();
        let r = OptionRef::Percent(&volume);

        assert_eq!(r.option(), ConfigOption::Master);
        assert!(r.is_present());
        assert_eq!(r.encoded_value(), 55);
    }
}
