//! Protocol dispatcher.
//!
//! Runs one received command to completion.  Responses go through the
//! [`Responder`]; every burst of responses is closed by turning the link
//! back to receive.  A [`LinkFault`] from either aborts the command on the
//! spot and is handed back to the poll loop, which resets the node.
//!
//! | Op     | Responses                          | Partition call |
//! |--------|------------------------------------|----------------|
//! | HELLO  | HELLO, then one PARTINFO per part  | `header`       |
//! | READ   | one READ per chunk                 | `read`         |
//! | WRITE  | none                               | `write`        |
//! | BOOT   | none                               | `boot`         |
//!
//! Anything else, and any partition index past the end of the table, is
//! dropped without a response.

use log::{debug, info};

use crate::app::events::BootEvent;
use crate::app::ports::{EventSink, Platform, Transceiver};
use crate::config::{BootConfig, SlaveId};
use crate::error::LinkFault;
use crate::handshake::HandshakeFlag;
use crate::partition::table::PartitionTable;

use super::RadioAddress;
use super::link::LinkMode;
use super::packet::{Command, CommandPacket, DATA_HEADER_LEN, Op};
use super::responder::Responder;

pub struct BootEngine<'f> {
    link: LinkMode,
    responder: Responder,
    slave_id: SlaveId,
    handshake: &'f HandshakeFlag,
}

impl<'f> BootEngine<'f> {
    pub fn new(config: &BootConfig, handshake: &'f HandshakeFlag) -> Self {
        Self {
            link: LinkMode::new(config.sync_timeout_ms),
            responder: Responder::new(config.retry),
            slave_id: config.slave_id.clone(),
            handshake,
        }
    }

    pub fn link(&self) -> &LinkMode {
        &self.link
    }

    /// Execute the command in `packet`, of which `frame_len` bytes were
    /// received.  The packet buffer is reused for the responses.
    pub fn dispatch(
        &mut self,
        packet: &mut CommandPacket,
        frame_len: usize,
        table: &mut PartitionTable<'_>,
        radio: &mut impl Transceiver,
        platform: &mut impl Platform,
        sink: &mut impl EventSink,
    ) -> Result<(), LinkFault> {
        match Command::decode(packet, frame_len) {
            Command::Hello { host } => self.hello(host, packet, table, radio, platform, sink),
            Command::Read {
                part,
                requested_length,
            } => self.read(part, requested_length, packet, table, radio, platform, sink),
            Command::Write { part, addr, len } => {
                let op = packet.op();
                let Some(target) = table.get_mut(part) else {
                    ignore(op, sink);
                    return Ok(());
                };
                target.write(addr, &packet.data()[..len]);
                debug!("write part {} addr {:#x} len {}", part, addr, len);
                sink.emit(&BootEvent::WriteForwarded { part, addr, len });
                Ok(())
            }
            Command::Boot { part } => {
                let op = packet.op();
                let Some(target) = table.get_mut(part) else {
                    ignore(op, sink);
                    return Ok(());
                };
                info!("boot part {} ({})", part, target.name());
                sink.emit(&BootEvent::Booting { part });
                target.boot();
                Ok(())
            }
            Command::Unsupported(op) => {
                ignore(op, sink);
                Ok(())
            }
        }
    }

    fn hello(
        &mut self,
        host: RadioAddress,
        packet: &mut CommandPacket,
        table: &PartitionTable<'_>,
        radio: &mut impl Transceiver,
        platform: &mut impl Platform,
        sink: &mut impl EventSink,
    ) -> Result<(), LinkFault> {
        info!("hello from {:02x?}", host);
        radio.open_writing_pipe(&host);

        let len = packet.write_hello(table.len() as u8, &self.slave_id);
        packet.set_response_op(Op::Hello);
        radio.flush_rx();
        self.responder
            .respond(&mut self.link, radio, platform, packet.frame(len))?;
        self.handshake.mark();

        for header in table.headers() {
            let len = packet.write_partinfo(header);
            packet.set_response_op(Op::PartInfo);
            self.responder
                .respond(&mut self.link, radio, platform, packet.frame(len))?;
        }
        self.link.enter_receive(radio)?;

        sink.emit(&BootEvent::Hello { host });
        Ok(())
    }

    /// The `addr` field of a READ request is the total length wanted; the
    /// node always reads from offset 0.  A partition that returns 0 bytes
    /// before `requested_length` is reached keeps this loop sending empty
    /// chunks forever.
    #[allow(clippy::too_many_arguments)]
    fn read(
        &mut self,
        part: u8,
        requested_length: u32,
        packet: &mut CommandPacket,
        table: &mut PartitionTable<'_>,
        radio: &mut impl Transceiver,
        platform: &mut impl Platform,
        sink: &mut impl EventSink,
    ) -> Result<(), LinkFault> {
        let op = packet.op();
        let Some(target) = table.get_mut(part) else {
            ignore(op, sink);
            return Ok(());
        };
        packet.set_response_op(Op::Read);

        let mut cursor: u32 = 0;
        let mut packets: u32 = 0;
        loop {
            let n = target.read(cursor, packet.data_mut());
            packet.set_addr(cursor);
            self.responder
                .respond(&mut self.link, radio, platform, packet.frame(DATA_HEADER_LEN + n))?;
            packets = packets.wrapping_add(1);
            cursor = cursor.wrapping_add(n as u32);
            if cursor >= requested_length {
                break;
            }
        }
        self.link.enter_receive(radio)?;

        debug!("read part {} done, {} bytes in {} packets", part, cursor, packets);
        sink.emit(&BootEvent::ReadServed {
            part,
            bytes: cursor,
            packets,
        });
        Ok(())
    }
}

fn ignore(op: u8, sink: &mut impl EventSink) {
    debug!("ignoring op {:#04x}", op);
    sink.emit(&BootEvent::Ignored { op });
}
