//! Volume controls aggregate
//!
//! `VolumeControls` binds one typed option per audio setting against a single
//! resolved base address. It is built once per base address and replaced, not
//! mutated, when the address changes. When the address is unresolved every
//! option is absent, so callers always deal in `Option<&T>`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, SoundSetterError};
use crate::memory::{BaseAddress, ConfigBackend};
use crate::options::{
    BooleanOption, ByteOption, ConfigOption, EqualizerMode, EqualizerModeOption, OptionRef,
    OptionValue, TypedOption, ValueDomain,
};

/// A sound category with a volume slider and a mute button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Master,
    Bgm,
    SoundEffects,
    Voice,
    SystemSounds,
    AmbientSounds,
    Performance,
}

impl Channel {
    pub const ALL: [Channel; 7] = [
        Channel::Master,
        Channel::Bgm,
        Channel::SoundEffects,
        Channel::Voice,
        Channel::SystemSounds,
        Channel::AmbientSounds,
        Channel::Performance,
    ];

    pub const fn volume_option(self) -> ConfigOption {
        match self {
            Channel::Master => ConfigOption::Master,
            Channel::Bgm => ConfigOption::Bgm,
            Channel::SoundEffects => ConfigOption::SoundEffects,
            Channel::Voice => ConfigOption::Voice,
            Channel::SystemSounds => ConfigOption::SystemSounds,
            Channel::AmbientSounds => ConfigOption::AmbientSounds,
            Channel::Performance => ConfigOption::Performance,
        }
    }

    pub const fn mute_option(self) -> ConfigOption {
        match self {
            Channel::Master => ConfigOption::MasterMuted,
            Channel::Bgm => ConfigOption::BgmMuted,
            Channel::SoundEffects => ConfigOption::SoundEffectsMuted,
            Channel::Voice => ConfigOption::VoiceMuted,
            Channel::SystemSounds => ConfigOption::SystemSoundsMuted,
            Channel::AmbientSounds => ConfigOption::AmbientSoundsMuted,
            Channel::Performance => ConfigOption::PerformanceMuted,
        }
    }

    /// Per-category "play while window is not active" toggle
    ///
    /// Master has none; the master switch is a separate option.
    pub const fn inactive_option(self) -> Option<ConfigOption> {
        match self {
            Channel::Master => None,
            Channel::Bgm => Some(ConfigOption::PlaySoundsWhileWindowIsNotActiveBgm),
            Channel::SoundEffects => Some(ConfigOption::PlaySoundsWhileWindowIsNotActiveSoundEffects),
            Channel::Voice => Some(ConfigOption::PlaySoundsWhileWindowIsNotActiveVoice),
            Channel::SystemSounds => Some(ConfigOption::PlaySoundsWhileWindowIsNotActiveSystemSounds),
            Channel::AmbientSounds => Some(ConfigOption::PlaySoundsWhileWindowIsNotActiveAmbientSounds),
            Channel::Performance => Some(ConfigOption::PlaySoundsWhileWindowIsNotActivePerformance),
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Channel::Master => "Master Volume",
            Channel::Bgm => "BGM",
            Channel::SoundEffects => "Sound Effects",
            Channel::Voice => "Voice",
            Channel::SystemSounds => "System Sounds",
            Channel::AmbientSounds => "Ambient Sounds",
            Channel::Performance => "Performance",
        }
    }
}

/// Whose player effects a volume applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Audience {
    Own,
    Party,
    OtherPcs,
}

impl Audience {
    pub const ALL: [Audience; 3] = [Audience::Own, Audience::Party, Audience::OtherPcs];

    pub const fn option(self) -> ConfigOption {
        match self {
            Audience::Own => ConfigOption::PlayerSelf,
            Audience::Party => ConfigOption::PlayerParty,
            Audience::OtherPcs => ConfigOption::PlayerOtherPcs,
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Audience::Own => "Self",
            Audience::Party => "Party",
            Audience::OtherPcs => "Other PCs",
        }
    }
}

/// Category enable toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureToggle {
    PlayMusicWhenMounted,
    EnableNormalBattleMusic,
    EnableCityStateBgm,
    PlaySystemSounds,
}

impl FeatureToggle {
    pub const ALL: [FeatureToggle; 4] = [
        FeatureToggle::PlayMusicWhenMounted,
        FeatureToggle::EnableNormalBattleMusic,
        FeatureToggle::EnableCityStateBgm,
        FeatureToggle::PlaySystemSounds,
    ];

    pub const fn option(self) -> ConfigOption {
        match self {
            FeatureToggle::PlayMusicWhenMounted => ConfigOption::PlayMusicWhenMounted,
            FeatureToggle::EnableNormalBattleMusic => ConfigOption::EnableNormalBattleMusic,
            FeatureToggle::EnableCityStateBgm => ConfigOption::EnableCityStateBgm,
            FeatureToggle::PlaySystemSounds => ConfigOption::PlaySystemSounds,
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            FeatureToggle::PlayMusicWhenMounted => "Play music when mounted.",
            FeatureToggle::EnableNormalBattleMusic => "Enable normal battle music.",
            FeatureToggle::EnableCityStateBgm => "Enable city-state BGM in residential areas.",
            FeatureToggle::PlaySystemSounds => "Play system sounds while waiting for Duty Finder.",
        }
    }
}

/// All audio options bound against one base address
pub struct VolumeControls {
    base: BaseAddress,
    backend: Option<Arc<dyn ConfigBackend>>,
    toggles: HashMap<ConfigOption, BooleanOption>,
    volumes: HashMap<ConfigOption, ByteOption>,
    equalizer: Option<EqualizerModeOption>,
}

impl VolumeControls {
    /// Bind every option against `base`
    ///
    /// An unresolved base yields an aggregate with every option absent.
    pub fn new(backend: Arc<dyn ConfigBackend>, base: BaseAddress) -> Self {
        if !base.is_valid() {
            log::debug!("Configuration base unresolved; all options absent");
            return Self::detached();
        }

        let mut controls = Self {
            base,
            backend: Some(backend.clone()),
            ..Self::detached()
        };

        for &option in ConfigOption::ALL {
            match option.domain() {
                ValueDomain::Toggle => {
                    if let Some(toggle) = bind(&backend, base, option) {
                        controls.toggles.insert(option, toggle);
                    }
                }
                ValueDomain::Percent => {
                    if let Some(volume) = bind(&backend, base, option) {
                        controls.volumes.insert(option, volume);
                    }
                }
                ValueDomain::Equalizer => {
                    controls.equalizer = bind(&backend, base, option);
                }
            }
        }

        log::debug!(
            "Bound {} options against configuration at {}",
            controls.len(),
            base
        );
        controls
    }

    /// An aggregate with every option absent
    pub fn detached() -> Self {
        Self {
            base: BaseAddress::NULL,
            backend: None,
            toggles: HashMap::new(),
            volumes: HashMap::new(),
            equalizer: None,
        }
    }

    pub fn base(&self) -> BaseAddress {
        self.base
    }

    pub fn is_present(&self) -> bool {
        self.len() > 0
    }

    /// Whether the options were bound through `backend`
    pub fn uses_backend(&self, backend: &Arc<dyn ConfigBackend>) -> bool {
        self.backend
            .as_ref()
            .map_or(false, |current| same_backend(current, backend))
    }

    /// Number of bound options
    pub fn len(&self) -> usize {
        self.toggles.len() + self.volumes.len() + usize::from(self.equalizer.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A toggle option by identifier
    pub fn toggle(&self, option: ConfigOption) -> Option<&BooleanOption> {
        self.toggles.get(&option)
    }

    /// A 0–100 option by identifier
    pub fn volume(&self, option: ConfigOption) -> Option<&ByteOption> {
        self.volumes.get(&option)
    }

    pub fn equalizer_mode(&self) -> Option<&EqualizerModeOption> {
        self.equalizer.as_ref()
    }

    /// Any option by identifier, failing with `TargetUnavailable` if absent
    pub fn lookup(&self, option: ConfigOption) -> Result<OptionRef<'_>> {
        let found = match option.domain() {
            ValueDomain::Toggle => self.toggle(option).map(OptionRef::Toggle),
            ValueDomain::Percent => self.volume(option).map(OptionRef::Percent),
            ValueDomain::Equalizer => self.equalizer_mode().map(OptionRef::Equalizer),
        };
        found.ok_or(SoundSetterError::TargetUnavailable(option))
    }

    pub fn channel_volume(&self, channel: Channel) -> Option<&ByteOption> {
        self.volume(channel.volume_option())
    }

    pub fn channel_muted(&self, channel: Channel) -> Option<&BooleanOption> {
        self.toggle(channel.mute_option())
    }

    pub fn player_effects(&self, audience: Audience) -> Option<&ByteOption> {
        self.volume(audience.option())
    }

    pub fn feature(&self, feature: FeatureToggle) -> Option<&BooleanOption> {
        self.toggle(feature.option())
    }

    pub fn master_volume(&self) -> Option<&ByteOption> {
        self.channel_volume(Channel::Master)
    }

    pub fn master_muted(&self) -> Option<&BooleanOption> {
        self.channel_muted(Channel::Master)
    }

    /// The "play sounds while window is not active" master switch
    pub fn play_sounds_while_inactive(&self) -> Option<&BooleanOption> {
        self.toggle(ConfigOption::PlaySoundsWhileWindowIsNotActive)
    }

    /// A per-category "while inactive" toggle
    pub fn play_while_inactive(&self, channel: Channel) -> Option<&BooleanOption> {
        channel.inactive_option().and_then(|option| self.toggle(option))
    }

    /// Whether the per-category "while inactive" toggles should be editable
    ///
    /// They are stored independently, but only take effect while the master
    /// switch is on.
    pub fn inactive_toggles_enabled(&self) -> bool {
        self.play_sounds_while_inactive()
            .map_or(false, |option| option.get_value())
    }

    /// Read every option once
    pub fn snapshot(&self) -> SoundSnapshot {
        SoundSnapshot {
            present: self.is_present(),
            play_sounds_while_inactive: self.play_sounds_while_inactive().map(|o| o.get_value()),
            inactive_toggles_enabled: self.inactive_toggles_enabled(),
            channels: Channel::ALL.map(|channel| ChannelState {
                channel,
                volume: self.channel_volume(channel).map(|o| o.get_value()),
                muted: self.channel_muted(channel).map(|o| o.get_value()),
                play_while_inactive: self.play_while_inactive(channel).map(|o| o.get_value()),
            }),
            player_effects: Audience::ALL.map(|audience| AudienceState {
                audience,
                volume: self.player_effects(audience).map(|o| o.get_value()),
            }),
            features: FeatureToggle::ALL.map(|feature| FeatureState {
                feature,
                enabled: self.feature(feature).map(|o| o.get_value()),
            }),
            equalizer_mode: self.equalizer_mode().map(|o| o.get_value()),
        }
    }
}

fn bind<V: OptionValue>(
    backend: &Arc<dyn ConfigBackend>,
    base: BaseAddress,
    option: ConfigOption,
) -> Option<TypedOption<V>> {
    TypedOption::new(backend.clone(), base, option)
        .map_err(|e| log::error!("Skipping {:?}: {}", option, e))
        .ok()
}

/// Compare by data pointer only; vtable pointers are not unique.
fn same_backend(a: &Arc<dyn ConfigBackend>, b: &Arc<dyn ConfigBackend>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Per-channel values in a `SoundSnapshot`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    pub channel: Channel,
    pub volume: Option<u8>,
    pub muted: Option<bool>,
    pub play_while_inactive: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceState {
    pub audience: Audience,
    pub volume: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureState {
    pub feature: FeatureToggle,
    pub enabled: Option<bool>,
}

/// Every option's value as read in one frame; `None` marks an absent option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundSnapshot {
    pub present: bool,
    pub play_sounds_while_inactive: Option<bool>,
    pub inactive_toggles_enabled: bool,
    pub channels: [ChannelState; 7],
    pub player_effects: [AudienceState; 3],
    pub features: [FeatureState; 4],
    pub equalizer_mode: Option<EqualizerMode>,
}

impl SoundSnapshot {
    pub fn channel(&self, channel: Channel) -> &ChannelState {
        &self.channels[channel as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockConfigBackend;

    const BASE: BaseAddress = BaseAddress::new(0x5000_0000);

    fn controls() -> (Arc<MockConfigBackend>, VolumeControls) {
        let backend = Arc::new(MockConfigBackend::new());
        let controls = VolumeControls::new(backend.clone(), BASE);
        (backend, controls)
    }

    #[test]
    fn test_every_option_bound() {
        let (_, controls) = controls();
        assert_eq!(controls.len(), ConfigOption::ALL.len());
        for &option in ConfigOption::ALL {
            let found = controls.lookup(option).unwrap();
            assert_eq!(found.option(), option);
            assert!(found.is_present());
        }
    }

    #[test]
    fn test_uses_backend() {
        let backend: Arc<dyn ConfigBackend> = Arc::new(MockConfigBackend::new());
        let other: Arc<dyn ConfigBackend> = Arc::new(MockConfigBackend::new());
        let controls = VolumeControls::new(backend.clone(), BASE);

        assert!(controls.uses_backend(&backend));
        assert!(!controls.uses_backend(&other));
        assert!(!VolumeControls::detached().uses_backend(&backend));
    }

    #[test]
    fn test_absent_controls() {
        let controls = VolumeControls::detached();

        assert!(!controls.is_present());
        assert!(controls.is_empty());
        assert!(controls.master_volume().is_none());
        assert!(controls.equalizer_mode().is_none());
        assert!(!controls.inactive_toggles_enabled());
        assert!(matches!(
            controls.lookup(ConfigOption::Bgm),
            Err(SoundSetterError::TargetUnavailable(ConfigOption::Bgm))
        ));
    }

    #[test]
    fn test_channel_pairs() {
        let (backend, controls) = controls();
        backend.set_raw(BASE, ConfigOption::Voice, 64);
        backend.set_raw(BASE, ConfigOption::VoiceMuted, 1);

        assert_eq!(controls.channel_volume(Channel::Voice).unwrap().get_value(), 64);
        assert!(controls.channel_muted(Channel::Voice).unwrap().get_value());
    }

    #[test]
    fn test_master_has_no_inactive_toggle() {
        let (_, controls) = controls();
        assert!(controls.play_while_inactive(Channel::Master).is_none());
        for channel in &Channel::ALL[1..] {
            assert!(controls.play_while_inactive(*channel).is_some());
        }
    }

    #[test]
    fn test_inactive_toggles_gated_by_master_switch() {
        let (backend, controls) = controls();
        backend.set_raw(BASE, ConfigOption::PlaySoundsWhileWindowIsNotActiveBgm, 1);
        assert!(!controls.inactive_toggles_enabled());

        controls.play_sounds_while_inactive().unwrap().set_value(true);
        assert!(controls.inactive_toggles_enabled());

        // Sub-toggles keep their own stored value either way
        controls.play_sounds_while_inactive().unwrap().set_value(false);
        assert!(controls.play_while_inactive(Channel::Bgm).unwrap().get_value());
    }

    #[test]
    fn test_snapshot() {
        let (backend, controls) = controls();
        backend.set_raw(BASE, ConfigOption::Master, 55);
        backend.set_raw(BASE, ConfigOption::PlayerParty, 30);
        backend.set_raw(BASE, ConfigOption::EnableCityStateBgm, 1);
        backend.set_raw(BASE, ConfigOption::EqualizerMode, 1);

        let snapshot = controls.snapshot();
        assert!(snapshot.present);
        assert_eq!(snapshot.channel(Channel::Master).volume, Some(55));
        assert_eq!(snapshot.channel(Channel::Master).play_while_inactive, None);
        assert_eq!(snapshot.player_effects[1].volume, Some(30));
        assert_eq!(snapshot.features[2].enabled, Some(true));
        assert_eq!(snapshot.equalizer_mode, Some(EqualizerMode::BassBoost));
    }

    #[test]
    fn test_snapshot_absent() {
        let controls = VolumeControls::new(Arc::new(MockConfigBackend::new()), BaseAddress::NULL);
        let snapshot = controls.snapshot();

        assert!(!snapshot.present);
        assert!(snapshot.channels.iter().all(|c| c.volume.is_none() && c.muted.is_none()));
        assert_eq!(snapshot.equalizer_mode, None);
    }

    #[test]
    fn test_snapshot_serializes() {
        let (_, controls) = controls();
        let json = serde_json::to_string(&controls.snapshot()).unwrap();
        let back: SoundSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, controls.snapshot());
    }
}
