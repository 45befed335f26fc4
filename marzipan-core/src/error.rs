use alloc::fmt;

/// Result type shared by the battle simulator.
pub type MarsResult<T> = core::result::Result<T, MarsError>;

/// Possible error kinds raised while configuring or running a battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarsError {
    /// A [`crate::mars::Config`] value is out of range or internally
    /// inconsistent.
    InvalidConfig(&'static str),

    /// A warrior's instructions don't fit in the core at the requested
    /// load address.
    LoadOutOfBounds,

    /// A start position passed to `run_battle` is not a valid core address.
    InvalidStartPosition,

    /// Implementation bug.
    ///
    /// If this ever shows up, please create an issue:
    /// <https://https://github.com/base0x10/Marzipan/issues/new>
    Internal(&'static str),
}

impl fmt::Display for MarsError {
    #[allow(clippy::pattern_type_mismatch)]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => {
                write!(f, "invalid mars configuration: {msg}")
            }
            Self::LoadOutOfBounds => {
                write!(f, "warrior instructions don't fit in the core at the requested load address")
            }
            Self::InvalidStartPosition => {
                write!(f, "start position is not a valid core address")
            }
            Self::Internal(msg) => {
                write!(f, "internal mars implementation error: {msg}. ")?;
                write!(f, "this is a bug, we would appreciate a bug report: https://https://github.com/base0x10/Marzipan/issues/new")
            }
        }
    }
}

impl core::error::Error for MarsError {}
