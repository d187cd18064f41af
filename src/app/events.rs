//! Outbound boot events.
//!
//! The [`BootService`](super::service::BootService) and the dispatcher emit
//! these through the [`EventSink`](super::ports::EventSink) port.  What
//! happens to them (serial log, LED, test journal) is up to the adapter.

use crate::error::LinkFault;
use crate::protocol::RadioAddress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootEvent {
    /// Radio configured and listening.
    Started { partitions: u8 },

    /// A host completed the handshake.
    Hello { host: RadioAddress },

    /// A READ finished; `bytes` is the final cursor.
    ReadServed { part: u8, bytes: u32, packets: u32 },

    /// A WRITE chunk was handed to the partition.
    WriteForwarded { part: u8, addr: u32, len: usize },

    /// Control is about to pass to a partition image.
    Booting { part: u8 },

    /// Packet dropped: unknown op or partition index out of range.
    Ignored { op: u8 },

    /// The link wedged; a reset follows.
    LinkFault(LinkFault),
}
