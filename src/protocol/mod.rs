//! rf24boot radio protocol.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Protocol stack                         │
//! │                                                              │
//! │  Transceiver ──▶ CommandPacket ──▶ BootEngine (dispatcher)   │
//! │  (port)          (packet)          │        │                │
//! │      ▲                             ▼        ▼                │
//! │      │                      PartitionTable  Responder        │
//! │      │                                      │   │            │
//! │      └───────────── LinkMode ◀──────────────┘   ▼            │
//! │                     (rx/tx switch)          enqueue w/ retry │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! One packet in, zero or more packets out, no state carried between
//! packets except the link direction and the host address learned from
//! the last HELLO.

pub mod engine;
pub mod link;
pub mod packet;
pub mod responder;

/// 5-byte radio pipe address.
pub type RadioAddress = [u8; 5];
