//! Equalizer modes

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SoundSetterError};

/// Equalizer presets, in the order the game stores them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EqualizerMode {
    #[default]
    Standard,
    BassBoost,
    TrebleBoost,
    VoiceBoost,
    LogitechProG50Mm,
}

impl EqualizerMode {
    pub const ALL: [EqualizerMode; 5] = [
        EqualizerMode::Standard,
        EqualizerMode::BassBoost,
        EqualizerMode::TrebleBoost,
        EqualizerMode::VoiceBoost,
        EqualizerMode::LogitechProG50Mm,
    ];

    /// Names shown in the mode selector, indexed by ordinal
    pub const NAMES: [&'static str; 5] = [
        "Standard",
        "Bass Boost",
        "Treble Boost",
        "Voice Boost",
        "Logitech Pro-G 50mm",
    ];

    pub const fn ordinal(self) -> u64 {
        self as u64
    }

    pub const fn display_name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    /// Decode a raw slot value
    pub fn from_ordinal(raw: u64) -> Result<Self> {
        usize::try_from(raw)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or(SoundSetterError::DecodeMismatch {
                domain: "equalizer mode",
                raw,
            })
    }

    /// Convert a selector index coming from the presentation layer
    pub fn from_index(index: i32) -> Result<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(SoundSetterError::OutOfRangeValue {
                value: i64::from(index),
                min: 0,
                max: Self::ALL.len() as i64 - 1,
            })
    }
}

impl fmt::Display for EqualizerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
