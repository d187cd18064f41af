//! Unified error types for the rf24boot node core.
//!
//! Two very different kinds of failure live here:
//!
//! - [`Error`] covers startup problems (bad config, too many partitions,
//!   malformed partition headers).  These are fatal before the poll loop
//!   ever runs.
//! - [`LinkFault`] covers the two ways the radio link can wedge at runtime.
//!   A fault unwinds the current dispatch with `?` and the poll entry point
//!   escalates it to a platform reset.
//!
//! Protocol-level invalid input (unknown op, partition index out of range)
//! is not an error at all: it is dropped silently.

use core::fmt;

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// More partitions were registered than the table can hold.
    RegistryFull { capacity: usize },
    /// A partition header failed validation.
    InvalidPartition(&'static str),
    /// Configuration is invalid or could not be decoded.
    Config(ConfigError),
    /// The radio link failed and could not be recovered locally.
    Link(LinkFault),
    /// The scheduler has no free task slot.
    SchedulerFull,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegistryFull { capacity } => {
                write!(f, "partition table full (capacity {capacity})")
            }
            Self::InvalidPartition(msg) => write!(f, "invalid partition: {msg}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::SchedulerFull => write!(f, "scheduler task list full"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<LinkFault> for Error {
    fn from(e: LinkFault) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Link faults
// ---------------------------------------------------------------------------

/// Unrecoverable radio link conditions.  Each one ends in a platform reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFault {
    /// The transmit queue stayed full for the whole deadtime window.
    SendDeadtime { attempts: u32 },
    /// The transmit queue did not drain before switching back to receive.
    SyncTimeout,
}

impl fmt::Display for LinkFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendDeadtime { attempts } => {
                write!(f, "send queue stuck after {attempts} attempts")
            }
            Self::SyncTimeout => write!(f, "transmit queue sync timed out"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
