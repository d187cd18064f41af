//! Node configuration.
//!
//! Everything the node needs to know before its first poll: the fixed
//! receive address, the identifying string sent during the handshake, the
//! transceiver setup, and the two recovery timeouts.
//!
//! The config can be persisted as a compact `postcard` blob (no heap) and,
//! on the host simulator, loaded from JSON.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::RadioAddress;

/// Maximum visible characters in the slave id (a NUL terminator follows on
/// the wire).
pub const SLAVE_ID_MAX: usize = 28;

/// Identifying string reported to the host in the HELLO response.
pub type SlaveId = heapless::String<SLAVE_ID_MAX>;

/// Core node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootConfig {
    /// Receive address of pipe 0.
    pub local_address: RadioAddress,
    /// Identifier sent to the host during the handshake.
    pub slave_id: SlaveId,
    /// Transceiver setup applied at startup.
    pub radio: RadioConfig,
    /// Send retry policy for the reliable responder.
    pub retry: RetryPolicy,
    /// Queue-sync timeout when switching back to receive mode (milliseconds).
    pub sync_timeout_ms: u32,
}

impl Default for BootConfig {
    fn default() -> Self {
        let mut slave_id = SlaveId::new();
        let _ = slave_id.push_str("rf24boot node");
        Self {
            local_address: [0xb0, 0x0b, 0x10, 0xad, 0xed],
            slave_id,
            radio: RadioConfig::default(),
            retry: RetryPolicy::default(),
            sync_timeout_ms: 250,
        }
    }
}

impl BootConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.radio.validate()?;
        self.retry.validate()?;
        if self.sync_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("sync_timeout_ms must be > 0"));
        }
        if !self.slave_id.is_ascii() || self.slave_id.contains('\0') {
            return Err(ConfigError::ValidationFailed(
                "slave_id must be printable ASCII",
            ));
        }
        Ok(())
    }

    /// Serialize into `buf` as a postcard blob.  Returns the used prefix.
    pub fn to_blob<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Encoding)
    }

    /// Decode and validate a postcard blob produced by [`to_blob`](Self::to_blob).
    pub fn from_blob(blob: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(blob).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Radio
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataRate {
    Kbps250,
    Mbps1,
    Mbps2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaLevel {
    Min,
    Low,
    High,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrcLength {
    Disabled,
    Crc8,
    Crc16,
}

/// Transceiver setup handed to [`Transceiver::configure`](crate::app::ports::Transceiver::configure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioConfig {
    /// RF channel (0-125).
    pub channel: u8,
    pub pa_level: PaLevel,
    pub data_rate: DataRate,
    pub crc: CrcLength,
    pub dynamic_payloads: bool,
    /// Hardware auto-retransmit count (0-15).
    pub auto_retries: u8,
    /// Hardware auto-retransmit delay in 250 us steps (0-15).
    pub auto_retry_delay: u8,
    /// Bitmask of pipes with auto-ack enabled.
    pub auto_ack_pipes: u8,
    /// Static payload size when dynamic payloads are off (1-32).
    pub payload_size: u8,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            channel: 76,
            pa_level: PaLevel::Max,
            data_rate: DataRate::Mbps2,
            crc: CrcLength::Crc16,
            dynamic_payloads: true,
            auto_retries: 15,
            auto_retry_delay: 15,
            auto_ack_pipes: 0xff,
            payload_size: 32,
        }
    }
}

impl RadioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel > 125 {
            return Err(ConfigError::ValidationFailed("channel must be 0-125"));
        }
        if self.auto_retries > 15 {
            return Err(ConfigError::ValidationFailed("auto_retries must be 0-15"));
        }
        if self.auto_retry_delay > 15 {
            return Err(ConfigError::ValidationFailed("auto_retry_delay must be 0-15"));
        }
        if self.payload_size == 0 || self.payload_size > 32 {
            return Err(ConfigError::ValidationFailed("payload_size must be 1-32"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Retry policy
// ---------------------------------------------------------------------------

/// How long the reliable responder keeps retrying a full send queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// Retry every `slice_ms` until `deadtime_ms` of wall-clock time has
    /// elapsed, then give up and reset.
    Deadtime { deadtime_ms: u32, slice_ms: u32 },
    /// Retry forever.  A wedged transceiver hangs the node instead of
    /// resetting it.
    Unbounded,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // 255 attempts, 20 ms apart.
        Self::Deadtime {
            deadtime_ms: 5_100,
            slice_ms: 20,
        }
    }
}

impl RetryPolicy {
    /// Number of enqueue attempts that fit in the deadtime window, or
    /// `None` for [`RetryPolicy::Unbounded`].
    pub fn attempt_budget(&self) -> Option<u32> {
        match *self {
            Self::Deadtime {
                deadtime_ms,
                slice_ms,
            } => Some(deadtime_ms.div_ceil(slice_ms.max(1))),
            Self::Unbounded => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::Deadtime {
                deadtime_ms,
                slice_ms,
            } => {
                if slice_ms == 0 {
                    return Err(ConfigError::ValidationFailed("retry slice_ms must be > 0"));
                }
                if deadtime_ms < slice_ms {
                    return Err(ConfigError::ValidationFailed(
                        "retry deadtime_ms must be >= slice_ms",
                    ));
                }
                Ok(())
            }
            Self::Unbounded => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.
    ValidationFailed(&'static str),
    /// The persisted blob could not be decoded.
    Corrupted,
    /// The output buffer is too small for the blob.
    Encoding,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Corrupted => write!(f, "config blob corrupted"),
            Self::Encoding => write!(f, "config blob does not fit buffer"),
        }
    }
}
