//! Partition registry.
//!
//! Fixed-capacity, ordered, append-only.  Partitions are registered once
//! at startup by the modules that own them; the table only borrows them and
//! never removes or mutates a registration afterwards.  Registration order
//! is the index the host uses on the wire.

use log::{debug, info};

use crate::error::{Error, Result};

use super::{Partition, PartitionHeader};

/// Maximum number of registered partitions.
pub const MAX_PARTITIONS: usize = 3;

pub struct PartitionTable<'a> {
    parts: heapless::Vec<&'a mut dyn Partition, MAX_PARTITIONS>,
}

impl<'a> PartitionTable<'a> {
    pub const fn new() -> Self {
        Self {
            parts: heapless::Vec::new(),
        }
    }

    /// Append a partition.  Returns its wire index.
    ///
    /// A full table is a configuration error.  Instead of aborting the
    /// process, it is reported as [`Error::RegistryFull`] and startup code
    /// must treat it as fatal (the simulator propagates it out of `main`)
    /// rather than carry on with a partial table.
    pub fn register(&mut self, part: &'a mut dyn Partition) -> Result<u8> {
        let index = self.parts.len();
        debug!("Registering partition {}: {}", index, part.name());
        self.parts.push(part).map_err(|_| Error::RegistryFull {
            capacity: MAX_PARTITIONS,
        })?;
        Ok(index as u8)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Partition at wire index `index`, if registered.
    pub fn get_mut(&mut self, index: u8) -> Option<&mut (dyn Partition + 'a)> {
        self.parts.get_mut(index as usize).map(|p| &mut **p)
    }

    /// Headers in registration order.
    pub fn headers(&self) -> impl Iterator<Item = &PartitionHeader> + '_ {
        self.parts.iter().map(|p| p.header())
    }

    /// First partition whose name matches exactly.
    pub fn find_by_name(&mut self, name: &str) -> Option<&mut (dyn Partition + 'a)> {
        self.parts
            .iter_mut()
            .find(|p| p.name() == name)
            .map(|p| &mut **p)
    }

    /// Boot the first partition named `name`.  Returns `false` when no
    /// partition matches.
    pub fn boot_by_name(&mut self, name: &str) -> bool {
        match self.find_by_name(name) {
            Some(part) => {
                info!("Booting partition '{}'", name);
                part.boot();
                true
            }
            None => false,
        }
    }
}

impl Default for PartitionTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}
