//! RAM-backed NOR flash.
//!
//! Behaves like a small on-chip flash: erased bytes read `0xFF`, writes can
//! only clear bits, and erase/write offsets must respect the sector and
//! word granularity.  Used by the simulator and by tests of
//! [`FlashPartition`](crate::partition::flash::FlashPartition).

use embedded_storage::nor_flash::{
    ErrorType, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};

pub const SECTOR_SIZE: usize = 1024;
pub const WORD_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RamFlashError {
    OutOfBounds,
    NotAligned,
}

impl NorFlashError for RamFlashError {
    fn kind(&self) -> NorFlashErrorKind {
        match self {
            Self::OutOfBounds => NorFlashErrorKind::OutOfBounds,
            Self::NotAligned => NorFlashErrorKind::NotAligned,
        }
    }
}

pub struct RamFlash<const N: usize> {
    mem: [u8; N],
    erases: u32,
}

impl<const N: usize> RamFlash<N> {
    pub fn new() -> Self {
        Self {
            mem: [0xff; N],
            erases: 0,
        }
    }

    /// Sectors erased since construction.
    pub fn erase_count(&self) -> u32 {
        self.erases
    }

    pub fn contents(&self) -> &[u8] {
        &self.mem
    }

    fn range(offset: u32, len: usize) -> Result<core::ops::Range<usize>, RamFlashError> {
        let start = offset as usize;
        let end = start.checked_add(len).ok_or(RamFlashError::OutOfBounds)?;
        if end > N {
            return Err(RamFlashError::OutOfBounds);
        }
        Ok(start..end)
    }
}

impl<const N: usize> Default for RamFlash<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ErrorType for RamFlash<N> {
    type Error = RamFlashError;
}

impl<const N: usize> ReadNorFlash for RamFlash<N> {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let r = Self::range(offset, bytes.len())?;
        bytes.copy_from_slice(&self.mem[r]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> NorFlash for RamFlash<N> {
    const WRITE_SIZE: usize = WORD_SIZE;
    const ERASE_SIZE: usize = SECTOR_SIZE;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        if from > to {
            return Err(RamFlashError::OutOfBounds);
        }
        if from as usize % SECTOR_SIZE != 0 || to as usize % SECTOR_SIZE != 0 {
            return Err(RamFlashError::NotAligned);
        }
        let r = Self::range(from, (to - from) as usize)?;
        self.mem[r].fill(0xff);
        self.erases += (to - from) / SECTOR_SIZE as u32;
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if offset as usize % WORD_SIZE != 0 || bytes.len() % WORD_SIZE != 0 {
            return Err(RamFlashError::NotAligned);
        }
        let r = Self::range(offset, bytes.len())?;
        for (cell, b) in self.mem[r].iter_mut().zip(bytes) {
            *cell &= *b;
        }
        Ok(())
    }
}
