//! Partitions: named, independently readable, writable and bootable
//! regions exposed to the host.
//!
//! The protocol core only ever sees the [`Partition`] capability trait.
//! Concrete kinds live in submodules:
//!
//! | Kind              | Backing                               | Bootable |
//! |-------------------|---------------------------------------|----------|
//! | [`flash`]         | `embedded-storage` NOR flash region   | yes      |
//! | [`memory`]        | RAM buffer (debug / scratch)          | no       |

pub mod flash;
pub mod memory;
pub mod table;

use crate::error::{Error, Result};

/// Bytes in the on-wire name field.
pub const NAME_LEN: usize = 8;

/// Encoded size of a [`PartitionHeader`].
pub const HEADER_LEN: usize = 4 + 2 + 1 + NAME_LEN;

// ── Capability trait ──────────────────────────────────────────

/// One addressable region the host can read, write and boot.
pub trait Partition {
    /// Metadata sent verbatim to the host during the handshake.
    fn header(&self) -> &PartitionHeader;

    /// Copy up to one chunk starting at `addr` into `buf`.  Returns the
    /// number of bytes produced, which is short (or zero) at the end of the
    /// region.
    fn read(&mut self, addr: u32, buf: &mut [u8]) -> usize;

    /// Store `data` at `addr`.  Failures are logged by the implementation
    /// and are not visible to the protocol.
    fn write(&mut self, addr: u32, data: &[u8]);

    /// Transfer control into the partition image.  Does not return when the
    /// image is bootable.
    fn boot(&mut self);

    fn name(&self) -> &str {
        self.header().name()
    }
}

// ── Header ────────────────────────────────────────────────────

/// Partition metadata, little-endian on the wire:
///
/// ```text
/// ┌──────────┬───────────┬─────┬──────────────┐
/// │ size (4) │ iosize (2)│ pad │ name (8)     │
/// └──────────┴───────────┴─────┴──────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionHeader {
    size: u32,
    io_size: u16,
    name: [u8; NAME_LEN],
    name_len: u8,
}

impl PartitionHeader {
    /// `name` must be 1-8 ASCII bytes; `io_size` is the chunk size the
    /// host should use for reads and writes.
    pub fn new(name: &str, size: u32, io_size: u16) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidPartition("name is empty"));
        }
        if name.len() > NAME_LEN {
            return Err(Error::InvalidPartition("name longer than 8 bytes"));
        }
        if !name.is_ascii() || name.contains('\0') {
            return Err(Error::InvalidPartition("name must be ASCII"));
        }
        if io_size == 0 {
            return Err(Error::InvalidPartition("io_size is zero"));
        }

        let mut buf = [0u8; NAME_LEN];
        buf[..name.len()].copy_from_slice(name.as_bytes());
        Ok(Self {
            size,
            io_size,
            name: buf,
            name_len: name.len() as u8,
        })
    }

    pub fn name(&self) -> &str {
        // Constructed from a validated ASCII &str.
        core::str::from_utf8(&self.name[..self.name_len as usize]).unwrap_or("")
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn io_size(&self) -> u16 {
        self.io_size
    }

    /// Write the wire form into `out`.  Returns [`HEADER_LEN`].
    pub fn encode(&self, out: &mut [u8]) -> usize {
        out[0..4].copy_from_slice(&self.size.to_le_bytes());
        out[4..6].copy_from_slice(&self.io_size.to_le_bytes());
        out[6] = 0;
        out[7..HEADER_LEN].copy_from_slice(&self.name);
        HEADER_LEN
    }
}
