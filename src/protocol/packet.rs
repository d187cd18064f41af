//! Wire layout of rf24boot packets.
//!
//! ```text
//! ┌────┬──────────────────────────────────────────────────────┐
//! │ op │ payload (up to 32 B)                                 │
//! └────┴──────────────────────────────────────────────────────┘
//!
//! HELLO request   payload: host address (5 B)
//! HELLO response  payload: numparts (1) │ is_big_endian (1) │ id (29, NUL-terminated)
//! PARTINFO        payload: partition header (15 B)
//! data record     payload: part (1) │ addr (LE u32) │ data (up to 27 B)
//! ```
//!
//! Only the low nibble of `op` selects the operation; the high nibble is
//! reserved and echoed back unchanged in responses.  Multi-byte fields are
//! little-endian.

use crate::partition::PartitionHeader;

use super::RadioAddress;

/// Payload bytes following the op byte.
pub const PAYLOAD_CAPACITY: usize = 32;

/// Whole packet buffer: op byte plus payload.
pub const FRAME_CAPACITY: usize = 1 + PAYLOAD_CAPACITY;

/// Size of the `part` + `addr` prefix of a data record.
pub const DATA_HEADER_LEN: usize = 5;

/// Data bytes available to a single READ/WRITE chunk.
pub const DATA_CAPACITY: usize = PAYLOAD_CAPACITY - DATA_HEADER_LEN;

/// Size of the id field in the HELLO response, terminator included.
pub const ID_FIELD_LEN: usize = 29;

/// Payload length of a HELLO response.
pub const HELLO_RESPONSE_LEN: usize = 2 + ID_FIELD_LEN;

/// Value reported in the HELLO response's endianness field.  Fixed; no
/// negotiation happens.
pub const ENDIAN_SENTINEL: u8 = 0;

const OP_MASK: u8 = 0x0f;

// ── Operation codes ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Op {
    Hello = 1,
    Read = 2,
    Write = 3,
    Boot = 4,
    /// Emitted during the handshake, never accepted.
    PartInfo = 5,
}

impl Op {
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode the low nibble of a raw op byte.
    pub fn decode(raw: u8) -> Option<Self> {
        match raw & OP_MASK {
            1 => Some(Self::Hello),
            2 => Some(Self::Read),
            3 => Some(Self::Write),
            4 => Some(Self::Boot),
            5 => Some(Self::PartInfo),
            _ => None,
        }
    }
}

// ── Packet buffer ─────────────────────────────────────────────

/// One radio packet, stack-allocated.
///
/// The same buffer carries the incoming command and is then rewritten in
/// place for each response, the way the handshake and READ loops reuse it.
#[derive(Clone)]
pub struct CommandPacket {
    bytes: [u8; FRAME_CAPACITY],
}

impl CommandPacket {
    pub const fn new() -> Self {
        Self {
            bytes: [0; FRAME_CAPACITY],
        }
    }

    /// Copy a received frame into a fresh packet.  Bytes past
    /// [`FRAME_CAPACITY`] are dropped; missing bytes read as zero.
    /// Returns the packet and the number of bytes kept.
    pub fn from_frame(frame: &[u8]) -> (Self, usize) {
        let mut packet = Self::new();
        let len = frame.len().min(FRAME_CAPACITY);
        packet.bytes[..len].copy_from_slice(&frame[..len]);
        (packet, len)
    }

    /// Raw buffer for the transceiver to read into.
    pub fn buffer_mut(&mut self) -> &mut [u8; FRAME_CAPACITY] {
        &mut self.bytes
    }

    pub fn op(&self) -> u8 {
        self.bytes[0]
    }

    /// Replace the operation code, keeping the reserved high nibble.
    pub fn set_response_op(&mut self, op: Op) {
        self.bytes[0] = (self.bytes[0] & !OP_MASK) | op.code();
    }

    pub fn payload(&self) -> &[u8] {
        &self.bytes[1..]
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[1..]
    }

    /// First five payload bytes, read as the host address of a HELLO.
    pub fn host_address(&self) -> RadioAddress {
        let mut addr = [0u8; 5];
        addr.copy_from_slice(&self.bytes[1..6]);
        addr
    }

    // ── Data record view ─────────────────────────────────────

    pub fn part(&self) -> u8 {
        self.bytes[1]
    }

    pub fn addr(&self) -> u32 {
        u32::from_le_bytes([self.bytes[2], self.bytes[3], self.bytes[4], self.bytes[5]])
    }

    pub fn set_addr(&mut self, addr: u32) {
        self.bytes[2..6].copy_from_slice(&addr.to_le_bytes());
    }

    pub fn data(&self) -> &[u8] {
        &self.bytes[1 + DATA_HEADER_LEN..]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[1 + DATA_HEADER_LEN..]
    }

    // ── Response builders ────────────────────────────────────

    /// Overwrite the payload with a HELLO response.  Returns the payload
    /// length.
    pub fn write_hello(&mut self, numparts: u8, slave_id: &str) -> usize {
        let payload = self.payload_mut();
        payload[0] = numparts;
        payload[1] = ENDIAN_SENTINEL;
        let id = &mut payload[2..2 + ID_FIELD_LEN];
        id.fill(0);
        let visible = slave_id.len().min(ID_FIELD_LEN - 1);
        id[..visible].copy_from_slice(&slave_id.as_bytes()[..visible]);
        HELLO_RESPONSE_LEN
    }

    /// Overwrite the payload with a PARTINFO response.  Returns the payload
    /// length.
    pub fn write_partinfo(&mut self, header: &PartitionHeader) -> usize {
        header.encode(self.payload_mut())
    }

    /// The op byte followed by `payload_len` payload bytes, ready to
    /// enqueue.
    pub fn frame(&self, payload_len: usize) -> &[u8] {
        &self.bytes[..1 + payload_len.min(PAYLOAD_CAPACITY)]
    }
}

impl Default for CommandPacket {
    fn default() -> Self {
        Self::new()
    }
}

// ── Decoded commands ──────────────────────────────────────────

/// An incoming packet, decoded by its low op nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Hello {
        host: RadioAddress,
    },
    /// The wire `addr` field carries the total length the host wants.
    Read {
        part: u8,
        requested_length: u32,
    },
    /// `len` data bytes follow the record header.
    Write {
        part: u8,
        addr: u32,
        len: usize,
    },
    Boot {
        part: u8,
    },
    /// PARTINFO or an unassigned code.  Dropped by the dispatcher.
    Unsupported(u8),
}

impl Command {
    /// Decode `packet`, of which `frame_len` bytes (op included) were
    /// actually received.
    pub fn decode(packet: &CommandPacket, frame_len: usize) -> Self {
        match Op::decode(packet.op()) {
            Some(Op::Hello) => Self::Hello {
                host: packet.host_address(),
            },
            Some(Op::Read) => Self::Read {
                part: packet.part(),
                requested_length: packet.addr(),
            },
            Some(Op::Write) => Self::Write {
                part: packet.part(),
                addr: packet.addr(),
                len: frame_len
                    .saturating_sub(1 + DATA_HEADER_LEN)
                    .min(DATA_CAPACITY),
            },
            Some(Op::Boot) => Self::Boot {
                part: packet.part(),
            },
            Some(Op::PartInfo) | None => Self::Unsupported(packet.op()),
        }
    }
}
