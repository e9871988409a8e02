//! Option identifiers and typed option wrappers

mod equalizer;
mod kind;
mod typed;

pub use equalizer::EqualizerMode;
pub use kind::{resolve_config_code, verify_option_table, ConfigOption, OptionKind, ValueDomain};
pub use typed::{
    BooleanOption, ByteOption, EqualizerModeOption, OptionRef, OptionValue, TypedOption,
    MAX_PERCENT,
};
