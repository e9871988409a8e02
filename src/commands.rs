//! Chat commands
//!
//! `/ssconfig` toggles the settings window. Each channel has a command that
//! takes a volume (`50`), a relative change (`+10`, `-10`), or `mute`,
//! `unmute`, `toggle`. No argument toggles mute.

use std::fmt;

use crate::controls::{Channel, VolumeControls};
use crate::error::{Result, SoundSetterError};
use crate::options::MAX_PERCENT;

pub const CONFIG_COMMAND: &str = "/ssconfig";

impl Channel {
    pub const fn command(self) -> &'static str {
        match self {
            Channel::Master => "/ssmv",
            Channel::Bgm => "/ssbgm",
            Channel::SoundEffects => "/sssfx",
            Channel::Voice => "/ssv",
            Channel::SystemSounds => "/sssys",
            Channel::AmbientSounds => "/ssas",
            Channel::Performance => "/ssp",
        }
    }

    pub fn from_command(command: &str) -> Option<Self> {
        Channel::ALL
            .iter()
            .copied()
            .find(|channel| channel.command().eq_ignore_ascii_case(command))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeAction {
    Set(u8),
    Adjust(i32),
    Mute,
    Unmute,
    ToggleMute,
}

impl VolumeAction {
    pub fn parse(args: &str) -> Result<Self> {
        let args = args.trim();
        match args.to_ascii_lowercase().as_str() {
            "" | "toggle" => return Ok(VolumeAction::ToggleMute),
            "mute" => return Ok(VolumeAction::Mute),
            "unmute" => return Ok(VolumeAction::Unmute),
            _ => {}
        }

        if let Some(delta) = args.strip_prefix('+') {
            return parse_number(delta).map(|d| VolumeAction::Adjust(d as i32));
        }
        if let Some(delta) = args.strip_prefix('-') {
            return parse_number(delta).map(|d| VolumeAction::Adjust(-(d as i32)));
        }

        let value = parse_number(args)?;
        if value > i64::from(MAX_PERCENT) {
            return Err(SoundSetterError::OutOfRangeValue {
                value,
                min: 0,
                max: i64::from(MAX_PERCENT),
            });
        }
        Ok(VolumeAction::Set(value as u8))
    }
}

/// Parse a non-negative amount, capped so it always fits an i32
fn parse_number(text: &str) -> Result<i64> {
    text.trim()
        .parse::<u32>()
        .map(|n| i64::from(n.min(u32::from(u16::MAX))))
        .map_err(|_| SoundSetterError::InvalidCommand(format!("expected a number, got '{}'", text)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCommand {
    ToggleWindow,
    Volume { channel: Channel, action: VolumeAction },
}

impl SoundCommand {
    pub fn parse(command: &str, args: &str) -> Result<Self> {
        let command = command.trim();
        if command.eq_ignore_ascii_case(CONFIG_COMMAND) {
            return Ok(SoundCommand::ToggleWindow);
        }

        let channel = Channel::from_command(command)
            .ok_or_else(|| SoundSetterError::InvalidCommand(format!("unknown command {}", command)))?;
        let action = VolumeAction::parse(args)?;
        Ok(SoundCommand::Volume { channel, action })
    }

    /// Every command name the host should register
    pub fn names() -> impl Iterator<Item = &'static str> {
        std::iter::once(CONFIG_COMMAND).chain(Channel::ALL.iter().map(|c| c.command()))
    }

    /// Apply a volume command. `ToggleWindow` is the session's business and
    /// is returned untouched as `CommandOutcome::ToggleWindow`.
    pub fn execute(&self, controls: &VolumeControls) -> CommandOutcome {
        let (channel, action) = match *self {
            SoundCommand::ToggleWindow => return CommandOutcome::ToggleWindow,
            SoundCommand::Volume { channel, action } => (channel, action),
        };

        match action {
            VolumeAction::Set(value) => match controls.channel_volume(channel) {
                Some(volume) => {
                    volume.set_value(value);
                    CommandOutcome::VolumeSet { channel, volume: value.min(MAX_PERCENT) }
                }
                None => unavailable(channel),
            },
            VolumeAction::Adjust(delta) => match controls.channel_volume(channel) {
                Some(volume) => CommandOutcome::VolumeSet { channel, volume: volume.adjust(delta) },
                None => unavailable(channel),
            },
            VolumeAction::Mute | VolumeAction::Unmute | VolumeAction::ToggleMute => {
                let Some(muted) = controls.channel_muted(channel) else {
                    return unavailable(channel);
                };
                let value = match action {
                    VolumeAction::Mute => true,
                    VolumeAction::Unmute => false,
                    _ => !muted.get_value(),
                };
                muted.set_value(value);
                CommandOutcome::MuteSet { channel, muted: value }
            }
        }
    }
}

fn unavailable(channel: Channel) -> CommandOutcome {
    log::debug!("{} skipped: options unavailable", channel.command());
    CommandOutcome::Unavailable
}

/// Result of running a command, used for chat feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    ToggleWindow,
    VolumeSet { channel: Channel, volume: u8 },
    MuteSet { channel: Channel, muted: bool },
    /// The game's configuration is not reachable yet; nothing was changed
    Unavailable,
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::ToggleWindow => Ok(()),
            CommandOutcome::VolumeSet { channel, volume } => {
                write!(f, "{} set to {}.", channel.display_name(), volume)
            }
            CommandOutcome::MuteSet { channel, muted } => {
                let state = if *muted { "muted" } else { "unmuted" };
                write!(f, "{} {}.", channel.display_name(), state)
            }
            CommandOutcome::Unavailable => Ok(()),
        }
    }
}
