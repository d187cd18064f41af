//! Port traits: the hexagonal boundary between the protocol core and the
//! node's hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BootService (domain)
//! ```
//!
//! The transceiver driver, the platform reset/delay primitives and the
//! event consumer all live outside this crate's core.  The
//! [`BootService`](super::service::BootService) consumes them via generics,
//! so the core never touches SPI registers or reset vectors directly.

use core::fmt;

use embedded_hal::delay::DelayNs;

use crate::config::RadioConfig;
use crate::protocol::RadioAddress;

// ───────────────────────────────────────────────────────────────
// Transceiver port (driven adapter: core ↔ packet radio)
// ───────────────────────────────────────────────────────────────

/// Half-duplex packet radio with a small hardware transmit queue.
///
/// Modelled on the nRF24L01 family: one reading pipe carries commands in,
/// one writing pipe is pointed at the last host that said HELLO.
pub trait Transceiver {
    /// Apply channel, power, rate, CRC and retry settings.
    fn configure(&mut self, config: &RadioConfig);

    /// Bind a reading pipe to `address`.
    fn open_reading_pipe(&mut self, pipe: u8, address: &RadioAddress);

    /// Point the transmit pipe at `address`.
    fn open_writing_pipe(&mut self, address: &RadioAddress);

    /// Non-blocking: the pipe holding a received packet, if any.
    fn available(&mut self) -> Option<u8>;

    /// Length of the packet at the head of the receive queue.
    fn dynamic_payload_len(&mut self) -> usize;

    /// Pop the head of the receive queue into `buf`.
    fn read(&mut self, buf: &mut [u8]);

    /// Push one frame into the hardware send queue.
    ///
    /// Fails with [`RadioError::TxQueueFull`] when the queue has no room;
    /// the caller decides whether to retry.
    fn enqueue(&mut self, frame: &[u8]) -> Result<(), RadioError>;

    /// Wait up to `timeout_ms` for the send queue to drain.
    fn queue_sync(&mut self, timeout_ms: u32) -> Result<(), RadioError>;

    fn start_listening(&mut self);

    fn stop_listening(&mut self);

    /// Drop everything waiting in the receive queue.
    fn flush_rx(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Platform port (driven adapter: core → MCU)
// ───────────────────────────────────────────────────────────────

/// Reset, delay and a monotonic millisecond clock.
pub trait Platform: DelayNs {
    /// Milliseconds since boot.  Must be monotonic.
    fn uptime_ms(&self) -> u64;

    /// Full device reset.
    ///
    /// Does not return on hardware.  Simulations and test doubles may
    /// return; the core then stops touching the radio until the next poll.
    fn reset(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: core → logging / indicators)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`BootEvent`](super::events::BootEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::BootEvent);
}

/// Sink that drops every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &super::events::BootEvent) {}
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors reported by a [`Transceiver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// The hardware send queue is full.
    TxQueueFull,
    /// Queued frames were still undelivered when the sync timed out.
    SyncTimeout,
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TxQueueFull => write!(f, "transmit queue full"),
            Self::SyncTimeout => write!(f, "transmit queue sync timed out"),
        }
    }
}
