//! Boot service: the hexagonal core.
//!
//! [`BootService`] owns the partition table, the protocol engine and the
//! three ports.  Startup code builds it, registers partitions, calls
//! [`init`](BootService::init) once and then hands it to the scheduler,
//! which calls [`poll`](BootService::poll) every tick.
//!
//! ```text
//!  Transceiver ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                  │       BootService         │
//!     Platform ◀── │  PartitionTable · Engine  │
//!                  └──────────────────────────┘
//! ```

use log::{debug, error, info};

use crate::config::BootConfig;
use crate::error::{LinkFault, Result};
use crate::handshake::HandshakeFlag;
use crate::partition::Partition;
use crate::partition::table::PartitionTable;
use crate::protocol::engine::BootEngine;
use crate::protocol::packet::{CommandPacket, FRAME_CAPACITY};
use crate::scheduler::Task;

use super::events::BootEvent;
use super::ports::{EventSink, Platform, Transceiver};

/// Pipe the node listens on for host commands.
const COMMAND_PIPE: u8 = 0;

pub struct BootService<'a, R, P, S> {
    config: BootConfig,
    table: PartitionTable<'a>,
    engine: BootEngine<'a>,
    radio: R,
    platform: P,
    sink: S,
}

impl<'a, R: Transceiver, P: Platform, S: EventSink> BootService<'a, R, P, S> {
    /// Build the service.  Does **not** touch the radio; call
    /// [`init`](Self::init) after registering partitions.
    pub fn new(
        config: BootConfig,
        radio: R,
        platform: P,
        sink: S,
        handshake: &'a HandshakeFlag,
    ) -> Self {
        let engine = BootEngine::new(&config, handshake);
        Self {
            config,
            table: PartitionTable::new(),
            engine,
            radio,
            platform,
            sink,
        }
    }

    // ── Registration / operator API ───────────────────────────

    /// Add a partition to the table.  Returns its wire index.
    pub fn register_partition(&mut self, part: &'a mut dyn Partition) -> Result<u8> {
        self.table.register(part)
    }

    /// Boot the first partition named exactly `name`.  Returns `false`
    /// (and does nothing) when none matches.
    pub fn boot_by_name(&mut self, name: &str) -> bool {
        self.table.boot_by_name(name)
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Configure the transceiver and start listening on the local address.
    pub fn init(&mut self) {
        let radio_cfg = &self.config.radio;
        self.radio.configure(radio_cfg);
        self.radio
            .open_reading_pipe(COMMAND_PIPE, &self.config.local_address);
        self.radio.start_listening();

        info!(
            "rf24boot: ch {} {:?} {:?} crc {:?}, addr {:02x?}, id '{}'",
            radio_cfg.channel,
            radio_cfg.data_rate,
            radio_cfg.pa_level,
            radio_cfg.crc,
            self.config.local_address,
            self.config.slave_id
        );
        for (i, h) in self.table.headers().enumerate() {
            info!(
                "  part {}: {:<8} size {} io {}",
                i,
                h.name(),
                h.size(),
                h.io_size()
            );
        }
        self.sink.emit(&BootEvent::Started {
            partitions: self.table.len() as u8,
        });
    }

    /// Handle at most one received command.
    ///
    /// Returns `Ok(false)` when nothing was waiting.  A link fault is logged,
    /// reported to the sink and escalated to exactly one platform reset
    /// before it is returned.
    pub fn poll(&mut self) -> core::result::Result<bool, LinkFault> {
        if self.radio.available().is_none() {
            return Ok(false);
        }

        let mut packet = CommandPacket::new();
        let len = self.radio.dynamic_payload_len().min(FRAME_CAPACITY);
        self.radio.read(&mut packet.buffer_mut()[..len]);
        debug!("got packet, len {}", len);

        let outcome = self.engine.dispatch(
            &mut packet,
            len,
            &mut self.table,
            &mut self.radio,
            &mut self.platform,
            &mut self.sink,
        );
        if let Err(fault) = outcome {
            error!("{}, resetting", fault);
            self.sink.emit(&BootEvent::LinkFault(fault));
            self.platform.reset();
            return Err(fault);
        }
        Ok(true)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &BootConfig {
        &self.config
    }

    pub fn is_listening(&self) -> bool {
        self.engine.link().is_listening()
    }

    pub fn partition_count(&self) -> usize {
        self.table.len()
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<R: Transceiver, P: Platform, S: EventSink> Task for BootService<'_, R, P, S> {
    fn name(&self) -> &'static str {
        "rf24boot"
    }

    fn run(&mut self) {
        // Faults are already escalated inside poll.
        let _ = self.poll();
    }
}
