//! Option identifiers
//!
//! The game addresses the same logical audio setting through two numbering
//! schemes: the code used by its settings UI option table (`OptionKind`) and
//! the code used by the backing configuration module (`ConfigOption`). The two
//! are matched by name, not by value. The name match is generated by
//! `ui_options!`, so a UI-space name with no config-space counterpart does not
//! compile; `verify_option_table` checks the numeric side at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, SoundSetterError};

/// Value domain stored in an option's slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueDomain {
    /// 0 = off, anything else = on
    Toggle,
    /// 0..=100
    Percent,
    /// Ordinal into `EqualizerMode`
    Equalizer,
}

macro_rules! config_options {
    ($($(#[$doc:meta])* $variant:ident = $code:literal => $domain:ident,)+) => {
        /// Option IDs as understood by the game's configuration module
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ConfigOption {
            $($(#[$doc])* $variant,)+
        }

        impl ConfigOption {
            /// Every config-space option, in code order
            pub const ALL: &'static [ConfigOption] = &[$(ConfigOption::$variant,)+];

            /// Numeric code passed to the native getter/setter
            pub const fn code(self) -> u64 {
                match self {
                    $(ConfigOption::$variant => $code,)+
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(ConfigOption::$variant => stringify!($variant),)+
                }
            }

            pub const fn domain(self) -> ValueDomain {
                match self {
                    $(ConfigOption::$variant => ValueDomain::$domain,)+
                }
            }
        }
    };
}

macro_rules! ui_options {
    ($($variant:ident = $code:literal,)+) => {
        /// Option IDs as understood by the game's settings UI option table
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum OptionKind {
            $($variant,)+
        }

        impl OptionKind {
            /// Every UI-space option, in code order
            pub const ALL: &'static [OptionKind] = &[$(OptionKind::$variant,)+];

            pub const fn code(self) -> u64 {
                match self {
                    $(OptionKind::$variant => $code,)+
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(OptionKind::$variant => stringify!($variant),)+
                }
            }

            /// The same-named config-space option
            pub const fn config_option(self) -> ConfigOption {
                match self {
                    $(OptionKind::$variant => ConfigOption::$variant,)+
                }
            }
        }
    };
}

config_options! {
    /// Master switch for the six per-category "while inactive" toggles
    PlaySoundsWhileWindowIsNotActive = 80 => Toggle,
    PlayMusicWhenMounted = 81 => Toggle,
    EnableNormalBattleMusic = 82 => Toggle,
    EnableCityStateBgm = 83 => Toggle,
    /// Play system sounds while waiting for the duty finder
    PlaySystemSounds = 84 => Toggle,

    Master = 86 => Percent,
    Bgm = 87 => Percent,
    SoundEffects = 88 => Percent,
    Voice = 89 => Percent,
    SystemSounds = 90 => Percent,
    AmbientSounds = 91 => Percent,
    Performance = 92 => Percent,

    /// Player effects volume: own character
    PlayerSelf = 93 => Percent,
    /// Player effects volume: party members
    PlayerParty = 94 => Percent,
    /// Player effects volume: everyone else
    PlayerOtherPcs = 95 => Percent,

    MasterMuted = 96 => Toggle,
    BgmMuted = 97 => Toggle,
    SoundEffectsMuted = 98 => Toggle,
    VoiceMuted = 99 => Toggle,
    SystemSoundsMuted = 100 => Toggle,
    AmbientSoundsMuted = 101 => Toggle,
    PerformanceMuted = 102 => Toggle,

    PlaySoundsWhileWindowIsNotActiveBgm = 106 => Toggle,
    PlaySoundsWhileWindowIsNotActiveSoundEffects = 107 => Toggle,
    PlaySoundsWhileWindowIsNotActiveVoice = 108 => Toggle,
    PlaySoundsWhileWindowIsNotActiveSystemSounds = 109 => Toggle,
    PlaySoundsWhileWindowIsNotActiveAmbientSounds = 110 => Toggle,
    PlaySoundsWhileWindowIsNotActivePerformance = 111 => Toggle,

    EqualizerMode = 112 => Equalizer,
}

ui_options! {
    PlayMusicWhenMounted = 18,
    EnableNormalBattleMusic = 19,
    EnableCityStateBgm = 20,
    PlaySystemSounds = 21,

    Master = 23,
    Bgm = 24,
    SoundEffects = 25,
    Voice = 26,
    SystemSounds = 27,
    AmbientSounds = 28,
    Performance = 29,

    PlayerSelf = 30,
    PlayerParty = 31,
    PlayerOtherPcs = 32,

    MasterMuted = 33,
    BgmMuted = 34,
    SoundEffectsMuted = 35,
    VoiceMuted = 36,
    SystemSoundsMuted = 37,
    AmbientSoundsMuted = 38,
    PerformanceMuted = 39,

    EqualizerMode = 49,
}

impl OptionKind {
    /// Look up a UI-space option by its numeric code
    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.code() == code)
    }
}

impl ConfigOption {
    /// Look up a config-space option by its numeric code
    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.iter().copied().find(|option| option.code() == code)
    }

    /// The same-named UI-space option, if the settings UI exposes one
    ///
    /// The "while inactive" toggles only exist in config space.
    pub fn ui_kind(self) -> Option<OptionKind> {
        OptionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.config_option() == self)
    }
}

/// Resolve a UI-space code to its config-space option
///
/// Codes outside the table are an error. 0 is never used as a fallback since
/// it may be a real code in either space.
pub fn resolve_config_code(ui_code: u64) -> Result<ConfigOption> {
    OptionKind::from_code(ui_code)
        .map(OptionKind::config_option)
        .ok_or(SoundSetterError::UnknownIdentifier(ui_code))
}

/// Check the two option tables against each other
///
/// Run once when a session is created. A failure means the tables drifted
/// after a game update and must be fixed before the plugin can be used.
pub fn verify_option_table() -> Result<()> {
    let mut ui_codes = HashSet::new();
    for kind in OptionKind::ALL {
        if !ui_codes.insert(kind.code()) {
            return Err(SoundSetterError::TableMismatch(format!(
                "duplicate UI code {} ({})",
                kind.code(),
                kind.name()
            )));
        }
    }

    let mut config_codes = HashSet::new();
    for option in ConfigOption::ALL {
        if !config_codes.insert(option.code()) {
            return Err(SoundSetterError::TableMismatch(format!(
                "duplicate config code {} ({})",
                option.code(),
                option.name()
            )));
        }
    }

    let mut mapped = HashSet::new();
    for kind in OptionKind::ALL {
        let option = kind.config_option();
        if option.name() != kind.name() {
            return Err(SoundSetterError::TableMismatch(format!(
                "{} maps to {}",
                kind.name(),
                option.name()
            )));
        }
        if !mapped.insert(option) {
            return Err(SoundSetterError::TableMismatch(format!(
                "{} is the target of more than one UI option",
                option.name()
            )));
        }
        if option.ui_kind() != Some(*kind) {
            return Err(SoundSetterError::TableMismatch(format!(
                "{} does not map back to {}",
                option.name(),
                kind.name()
            )));
        }
    }

    log::debug!(
        "Option table verified: {} UI options, {} config options",
        OptionKind::ALL.len(),
        ConfigOption::ALL.len()
    );
    Ok(())
}
