use thiserror::Error;

use crate::math::Coord;

/// Top-level error type for infill generation.
#[derive(Debug, Error)]
pub enum InfillError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Connect(#[from] ConnectError),
}

/// Precondition violations, detected before any geometry work starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterError {
    #[error("parameter {name} = {value} must be positive")]
    NonPositive { name: &'static str, value: Coord },

    #[error("parameter {name} = {value} must not be negative")]
    Negative { name: &'static str, value: Coord },

    #[error("infill multiplier must be at least 1")]
    ZeroMultiplier,

    #[error("invalid zigzag configuration: {0}")]
    InvalidZigzag(String),

    #[error("pattern {0} requires a provider that was not supplied")]
    MissingProvider(&'static str),
}

/// Which end of a line segment a link refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentEnd {
    Start,
    End,
}

impl SegmentEnd {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }
}

/// Internal invariant violations of the segment connector.
///
/// These indicate a defect in the connection algorithm; the call that hit
/// one is aborted rather than emitting corrupted toolpath topology.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("segment end {end:?} is already linked")]
    AlreadyLinked { end: SegmentEnd },

    #[error("segment not found in the arena")]
    MissingSegment,

    #[error("neighbouring segment does not link back")]
    BrokenChain,
}

/// Convenience type alias for results using [`InfillError`].
pub type Result<T> = std::result::Result<T, InfillError>;
