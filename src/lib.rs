//! rf24boot node core.
//!
//! Node side of an over-the-air firmware loader for nRF24-class packet
//! radios.  A host enumerates the node's partitions, reads and writes them
//! in small chunks, and asks the node to boot one of them.
//!
//! The protocol core ([`app`], [`protocol`], [`partition`]) is free of I/O
//! and heap allocation; hardware is reached through the traits in
//! [`app::ports`].  [`adapters`] holds the host implementations used by the
//! simulator and the tests.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod handshake;
pub mod partition;
pub mod protocol;
pub mod scheduler;
