use std::fmt;

pub type PulseResult<T> = Result<T, PulseError>;

/// Musical axis named by a [`PulseError::Range`] failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Bar,
    Beat,
    SubBeat,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bar => "bar",
            Self::Beat => "beat",
            Self::SubBeat => "sub-beat",
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PulseError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("range error: {axis} {value} is outside [1, {max}]")]
    Range { axis: Axis, value: i64, max: i64 },

    #[error("sheet parse error: {0}")]
    Parse(String),

    #[error("action error: {0}")]
    Action(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PulseError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn range(axis: Axis, value: i64, max: i64) -> Self {
        Self::Range { axis, value, max }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn action(msg: impl Into<String>) -> Self {
        Self::Action(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for out-of-range musical positions.
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Range { .. })
    }
}

/// Check `value` against the inclusive range `[1, max]`.
pub(crate) fn check_range(axis: Axis, value: i64, max: i64) -> PulseResult<()> {
    if value < 1 || value > max {
        return Err(PulseError::range(axis, value, max));
    }
    Ok(())
}
