//! Flash-region partition.
//!
//! Exposes `base..base + size` of any `embedded-storage` NOR flash as a
//! partition.  Writes follow the usual NOR rules: a sector is erased the
//! first time a chunk touches its start, chunks are padded with `0xFF` up
//! to the flash write granularity, and failures are logged rather than
//! reported (the protocol has no WRITE acknowledgement).
//!
//! Booting hands the region base to an [`ImageLauncher`], which owns the
//! architecture-specific jump.

use embedded_storage::nor_flash::NorFlash;
use log::{error, info, warn};

use crate::error::{Error, Result};

use super::{Partition, PartitionHeader};

/// Largest padded chunk a single write may produce.
const PAD_BUF_LEN: usize = 64;

/// Transfers control to an image at a flash address.
pub trait ImageLauncher {
    /// Jump to the image whose vector table starts at `base`.  Does not
    /// return on hardware.
    fn launch(&mut self, base: u32);
}

pub struct FlashPartition<F, L> {
    header: PartitionHeader,
    flash: F,
    base: u32,
    launcher: L,
}

impl<F: NorFlash, L: ImageLauncher> FlashPartition<F, L> {
    /// `base` must be sector-aligned, the region must fit the device and
    /// `io_size` must be a multiple of the flash write size, since the host
    /// places WRITE chunks at multiples of it.
    pub fn new(
        name: &str,
        flash: F,
        base: u32,
        size: u32,
        io_size: u16,
        launcher: L,
    ) -> Result<Self> {
        let header = PartitionHeader::new(name, size, io_size)?;
        if base as usize % F::ERASE_SIZE != 0 {
            return Err(Error::InvalidPartition("flash base not sector-aligned"));
        }
        if usize::from(io_size) % F::WRITE_SIZE != 0 {
            return Err(Error::InvalidPartition(
                "io_size not a multiple of flash write size",
            ));
        }
        let end = u64::from(base) + u64::from(size);
        if end > flash.capacity() as u64 {
            return Err(Error::InvalidPartition("flash region exceeds device"));
        }
        Ok(Self {
            header,
            flash,
            base,
            launcher,
        })
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Erase every sector whose first byte lies in `start..end`.
    fn erase_touched_sectors(&mut self, start: u32, end: u32) -> core::result::Result<(), F::Error> {
        let sector = F::ERASE_SIZE as u32;
        let mut at = start.next_multiple_of(sector);
        while at < end {
            self.flash.erase(at, at + sector)?;
            at += sector;
        }
        Ok(())
    }
}

impl<F: NorFlash, L: ImageLauncher> Partition for FlashPartition<F, L> {
    fn header(&self) -> &PartitionHeader {
        &self.header
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> usize {
        let size = self.header.size();
        if addr >= size {
            return 0;
        }
        let n = (size - addr)
            .min(u32::from(self.header.io_size()))
            .min(buf.len() as u32) as usize;
        if let Err(e) = self.flash.read(self.base + addr, &mut buf[..n]) {
            // Keep the host's read loop moving: report erased bytes.
            error!("{}: read at {:#x} failed: {:?}", self.header.name(), addr, e);
            buf[..n].fill(0xff);
        }
        n
    }

    fn write(&mut self, addr: u32, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        let name = self.header.name();
        let in_bounds = u64::from(addr) + data.len() as u64 <= u64::from(self.header.size());
        if !in_bounds {
            warn!("{}: write {}@{:#x} outside partition", name, data.len(), addr);
            return;
        }

        let start = self.base + addr;
        if start as usize % F::WRITE_SIZE != 0 {
            warn!("{}: write at {:#x} not aligned to {}", name, addr, F::WRITE_SIZE);
            return;
        }
        let padded = data.len().next_multiple_of(F::WRITE_SIZE);
        if padded > PAD_BUF_LEN {
            warn!("{}: chunk of {} bytes too large", name, data.len());
            return;
        }
        let mut chunk = [0xffu8; PAD_BUF_LEN];
        chunk[..data.len()].copy_from_slice(data);

        if let Err(e) = self.erase_touched_sectors(start, start + padded as u32) {
            error!("{}: erase at {:#x} failed: {:?}", self.header.name(), addr, e);
            return;
        }
        if let Err(e) = self.flash.write(start, &chunk[..padded]) {
            error!("{}: write at {:#x} failed: {:?}", self.header.name(), addr, e);
        }
    }

    fn boot(&mut self) {
        info!("{}: jumping to {:#010x}", self.header.name(), self.base);
        self.launcher.launch(self.base);
    }
}
