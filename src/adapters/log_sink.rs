//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing boot events to the `log` facade
//! (UART on a node, the terminal in the simulator).

use log::{error, info, warn};

use crate::app::events::BootEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BootEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink {
    emitted: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events seen so far.
    pub fn emitted(&self) -> u32 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BootEvent) {
        self.emitted = self.emitted.wrapping_add(1);
        match event {
            BootEvent::Started { partitions } => {
                info!("START | partitions={}", partitions);
            }
            BootEvent::Hello { host } => {
                info!("HELLO | host={:02x?}", host);
            }
            BootEvent::ReadServed {
                part,
                bytes,
                packets,
            } => {
                info!("READ  | part={} bytes={} packets={}", part, bytes, packets);
            }
            BootEvent::WriteForwarded { part, addr, len } => {
                info!("WRITE | part={} addr={:#x} len={}", part, addr, len);
            }
            BootEvent::Booting { part } => {
                info!("BOOT  | part={}", part);
            }
            BootEvent::Ignored { op } => {
                warn!("DROP  | op={:#04x}", op);
            }
            BootEvent::LinkFault(fault) => {
                error!("FAULT | {}", fault);
            }
        }
    }
}
