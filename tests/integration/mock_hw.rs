//! Mock hardware for integration tests.
//!
//! Radio, platform and partitions all append to one shared [`Journal`], so
//! tests can assert on the exact interleaving of radio traffic, partition
//! I/O and resets.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use rf24boot::app::events::BootEvent;
use rf24boot::app::ports::{EventSink, Platform, RadioError, Transceiver};
use rf24boot::app::service::BootService;
use rf24boot::config::{BootConfig, RadioConfig};
use rf24boot::handshake::HandshakeFlag;
use rf24boot::partition::{Partition, PartitionHeader};
use rf24boot::protocol::RadioAddress;

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    Configure,
    OpenReadingPipe { pipe: u8, address: RadioAddress },
    OpenWritingPipe(RadioAddress),
    ReadPacket(usize),
    /// Frame accepted by the send queue.
    Sent(Vec<u8>),
    /// Enqueue attempt bounced off a full queue.
    Rejected,
    QueueSync { ok: bool },
    StartListening,
    StopListening,
    FlushRx,
    DelayNs(u32),
    Reset,
    PartRead { part: &'static str, addr: u32 },
    PartWrite { part: &'static str, addr: u32, data: Vec<u8> },
    PartBoot(&'static str),
}

#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<HwCall>>>);

#[allow(dead_code)]
impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: HwCall) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<HwCall> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Frames accepted by the radio, in order.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                HwCall::Sent(f) => Some(f.clone()),
                _ => None,
            })
            .collect()
    }

    /// Radio calls only (no delays, partition I/O or resets).
    pub fn radio_calls(&self) -> Vec<HwCall> {
        self.0
            .borrow()
            .iter()
            .filter(|c| {
                !matches!(
                    c,
                    HwCall::DelayNs(_)
                        | HwCall::Reset
                        | HwCall::PartRead { .. }
                        | HwCall::PartWrite { .. }
                        | HwCall::PartBoot(_)
                )
            })
            .cloned()
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&HwCall) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }
}

// ── MockRadio ─────────────────────────────────────────────────

pub struct MockRadio {
    journal: Journal,
    inbox: VecDeque<Vec<u8>>,
    /// Reject this many upcoming enqueues (`u32::MAX` = forever).
    pub reject_enqueues: u32,
    pub sync_ok: bool,
    pub listening: bool,
}

#[allow(dead_code)]
impl MockRadio {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            inbox: VecDeque::new(),
            reject_enqueues: 0,
            sync_ok: true,
            listening: false,
        }
    }

    pub fn push_packet(&mut self, frame: &[u8]) {
        self.inbox.push_back(frame.to_vec());
    }

    pub fn pending(&self) -> usize {
        self.inbox.len()
    }
}

impl Transceiver for MockRadio {
    fn configure(&mut self, _config: &RadioConfig) {
        self.journal.push(HwCall::Configure);
    }

    fn open_reading_pipe(&mut self, pipe: u8, address: &RadioAddress) {
        self.journal.push(HwCall::OpenReadingPipe {
            pipe,
            address: *address,
        });
    }

    fn open_writing_pipe(&mut self, address: &RadioAddress) {
        self.journal.push(HwCall::OpenWritingPipe(*address));
    }

    fn available(&mut self) -> Option<u8> {
        if self.inbox.is_empty() { None } else { Some(0) }
    }

    fn dynamic_payload_len(&mut self) -> usize {
        self.inbox.front().map_or(0, Vec::len)
    }

    fn read(&mut self, buf: &mut [u8]) {
        if let Some(frame) = self.inbox.pop_front() {
            let n = frame.len().min(buf.len());
            buf[..n].copy_from_slice(&frame[..n]);
            self.journal.push(HwCall::ReadPacket(n));
        }
    }

    fn enqueue(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        if self.reject_enqueues > 0 {
            if self.reject_enqueues != u32::MAX {
                self.reject_enqueues -= 1;
            }
            self.journal.push(HwCall::Rejected);
            return Err(RadioError::TxQueueFull);
        }
        self.journal.push(HwCall::Sent(frame.to_vec()));
        Ok(())
    }

    fn queue_sync(&mut self, _timeout_ms: u32) -> Result<(), RadioError> {
        self.journal.push(HwCall::QueueSync { ok: self.sync_ok });
        if self.sync_ok {
            Ok(())
        } else {
            Err(RadioError::SyncTimeout)
        }
    }

    fn start_listening(&mut self) {
        self.listening = true;
        self.journal.push(HwCall::StartListening);
    }

    fn stop_listening(&mut self) {
        self.listening = false;
        self.journal.push(HwCall::StopListening);
    }

    fn flush_rx(&mut self) {
        self.inbox.clear();
        self.journal.push(HwCall::FlushRx);
    }
}

// ── MockPlatform ──────────────────────────────────────────────

/// Simulated clock: time only passes when the core delays.
pub struct MockPlatform {
    journal: Journal,
    now_ns: u64,
    pub resets: u32,
}

#[allow(dead_code)]
impl MockPlatform {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            now_ns: 0,
            resets: 0,
        }
    }
}

impl DelayNs for MockPlatform {
    fn delay_ns(&mut self, ns: u32) {
        self.now_ns += u64::from(ns);
        self.journal.push(HwCall::DelayNs(ns));
    }
}

impl Platform for MockPlatform {
    fn uptime_ms(&self) -> u64 {
        self.now_ns / 1_000_000
    }

    fn reset(&mut self) {
        self.resets += 1;
        self.journal.push(HwCall::Reset);
    }
}

// ── MockPartition ─────────────────────────────────────────────

pub struct MockPartition {
    header: PartitionHeader,
    label: &'static str,
    journal: Journal,
    pub data: Vec<u8>,
    pub boots: u32,
}

#[allow(dead_code)]
impl MockPartition {
    pub fn new(name: &'static str, size: u32, io_size: u16, journal: &Journal) -> Self {
        Self {
            header: PartitionHeader::new(name, size, io_size).unwrap(),
            label: name,
            journal: journal.clone(),
            data: (0..size).map(|i| i as u8).collect(),
            boots: 0,
        }
    }
}

impl Partition for MockPartition {
    fn header(&self) -> &PartitionHeader {
        &self.header
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> usize {
        self.journal.push(HwCall::PartRead {
            part: self.label,
            addr,
        });
        let start = addr as usize;
        if start >= self.data.len() {
            return 0;
        }
        let n = (self.data.len() - start)
            .min(usize::from(self.header.io_size()))
            .min(buf.len());
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        n
    }

    fn write(&mut self, addr: u32, data: &[u8]) {
        self.journal.push(HwCall::PartWrite {
            part: self.label,
            addr,
            data: data.to_vec(),
        });
    }

    fn boot(&mut self) {
        self.boots += 1;
        self.journal.push(HwCall::PartBoot(self.label));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<BootEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &BootEvent) {
        self.events.push(*event);
    }
}

// ── Service under test ────────────────────────────────────────

pub type TestService<'a> = BootService<'a, MockRadio, MockPlatform, RecordingSink>;

pub const HOST: RadioAddress = [0x11, 0x22, 0x33, 0x44, 0x55];

/// Service over fresh mocks.  Not yet initialised.
pub fn service<'a>(journal: &Journal, flag: &'a HandshakeFlag, config: BootConfig) -> TestService<'a> {
    BootService::new(
        config,
        MockRadio::new(journal),
        MockPlatform::new(journal),
        RecordingSink::default(),
        flag,
    )
}

/// Queue `frame` on the radio and poll once.
#[allow(dead_code)]
pub fn deliver(svc: &mut TestService<'_>, frame: &[u8]) -> Result<bool, rf24boot::error::LinkFault> {
    svc.radio_mut().push_packet(frame);
    svc.poll()
}

#[allow(dead_code)]
pub fn hello_frame(host: RadioAddress) -> Vec<u8> {
    let mut f = vec![0x01];
    f.extend_from_slice(&host);
    f
}

#[allow(dead_code)]
pub fn data_frame(op: u8, part: u8, addr: u32, data: &[u8]) -> Vec<u8> {
    let mut f = vec![op, part];
    f.extend_from_slice(&addr.to_le_bytes());
    f.extend_from_slice(data);
    f
}
