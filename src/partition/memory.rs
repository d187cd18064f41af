//! RAM-backed partition.
//!
//! A scratch region for bring-up and tests.  Reads and writes behave like a
//! flash partition, but there is nothing to boot.

use log::warn;

use crate::error::Result;

use super::{Partition, PartitionHeader};

pub struct MemoryPartition<const N: usize> {
    header: PartitionHeader,
    mem: [u8; N],
}

impl<const N: usize> MemoryPartition<N> {
    /// Partition of `N` bytes, initially all zero.
    pub fn new(name: &str, io_size: u16) -> Result<Self> {
        Ok(Self {
            header: PartitionHeader::new(name, N as u32, io_size)?,
            mem: [0; N],
        })
    }

    pub fn contents(&self) -> &[u8] {
        &self.mem
    }

    pub fn contents_mut(&mut self) -> &mut [u8] {
        &mut self.mem
    }
}

impl<const N: usize> Partition for MemoryPartition<N> {
    fn header(&self) -> &PartitionHeader {
        &self.header
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> usize {
        let start = addr as usize;
        if start >= N {
            return 0;
        }
        let n = (N - start)
            .min(self.header.io_size() as usize)
            .min(buf.len());
        buf[..n].copy_from_slice(&self.mem[start..start + n]);
        n
    }

    fn write(&mut self, addr: u32, data: &[u8]) {
        let start = addr as usize;
        match start.checked_add(data.len()) {
            Some(end) if end <= N => self.mem[start..end].copy_from_slice(data),
            _ => warn!(
                "{}: write {}@{:#x} outside partition",
                self.header.name(),
                data.len(),
                addr
            ),
        }
    }

    fn boot(&mut self) {
        warn!("{}: RAM partition is not bootable", self.header.name());
    }
}
