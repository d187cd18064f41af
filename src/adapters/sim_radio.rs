//! In-process radio link for the simulator.
//!
//! [`sim_link`] returns the two ends of one simulated air channel: a
//! [`SimRadio`] that implements [`Transceiver`] for the node, and a
//! [`HostEnd`] the host script uses to send commands and collect replies.
//!
//! The node side models the parts of an nRF24 that matter to the core: a
//! three-deep transmit FIFO that only drains while a writing pipe is open,
//! and a receive queue that is only visible while listening.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::trace;

use crate::app::ports::{RadioError, Transceiver};
use crate::config::RadioConfig;
use crate::protocol::RadioAddress;
use crate::protocol::packet::FRAME_CAPACITY;

/// Hardware transmit FIFO depth.
pub const TX_FIFO_DEPTH: usize = 3;

#[derive(Default)]
struct Air {
    to_node: VecDeque<Vec<u8>>,
    to_host: VecDeque<Vec<u8>>,
}

pub fn sim_link() -> (SimRadio, HostEnd) {
    let air = Rc::new(RefCell::new(Air::default()));
    let radio = SimRadio {
        air: Rc::clone(&air),
        tx_fifo: VecDeque::new(),
        listening: false,
        reading_pipe: None,
        writing_pipe: None,
        config: None,
    };
    (radio, HostEnd { air })
}

pub struct SimRadio {
    air: Rc<RefCell<Air>>,
    tx_fifo: VecDeque<Vec<u8>>,
    listening: bool,
    reading_pipe: Option<RadioAddress>,
    writing_pipe: Option<RadioAddress>,
    config: Option<RadioConfig>,
}

impl SimRadio {
    pub fn config(&self) -> Option<&RadioConfig> {
        self.config.as_ref()
    }

    pub fn reading_pipe(&self) -> Option<RadioAddress> {
        self.reading_pipe
    }

    pub fn writing_pipe(&self) -> Option<RadioAddress> {
        self.writing_pipe
    }

    /// Move queued frames onto the air.  Nothing leaves without a
    /// destination.
    fn pump(&mut self) {
        if self.writing_pipe.is_none() {
            return;
        }
        let mut air = self.air.borrow_mut();
        while let Some(frame) = self.tx_fifo.pop_front() {
            trace!("air: node -> host {:02x?}", frame);
            air.to_host.push_back(frame);
        }
    }
}

impl Transceiver for SimRadio {
    fn configure(&mut self, config: &RadioConfig) {
        self.config = Some(*config);
    }

    fn open_reading_pipe(&mut self, _pipe: u8, address: &RadioAddress) {
        self.reading_pipe = Some(*address);
    }

    fn open_writing_pipe(&mut self, address: &RadioAddress) {
        self.writing_pipe = Some(*address);
    }

    fn available(&mut self) -> Option<u8> {
        if self.listening && !self.air.borrow().to_node.is_empty() {
            Some(0)
        } else {
            None
        }
    }

    fn dynamic_payload_len(&mut self) -> usize {
        self.air.borrow().to_node.front().map_or(0, Vec::len)
    }

    fn read(&mut self, buf: &mut [u8]) {
        if let Some(frame) = self.air.borrow_mut().to_node.pop_front() {
            let n = frame.len().min(buf.len());
            buf[..n].copy_from_slice(&frame[..n]);
        }
    }

    fn enqueue(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        if self.tx_fifo.len() >= TX_FIFO_DEPTH {
            return Err(RadioError::TxQueueFull);
        }
        self.tx_fifo.push_back(frame.to_vec());
        self.pump();
        Ok(())
    }

    fn queue_sync(&mut self, _timeout_ms: u32) -> Result<(), RadioError> {
        self.pump();
        if self.tx_fifo.is_empty() {
            Ok(())
        } else {
            Err(RadioError::SyncTimeout)
        }
    }

    fn start_listening(&mut self) {
        self.listening = true;
    }

    fn stop_listening(&mut self) {
        self.listening = false;
    }

    fn flush_rx(&mut self) {
        self.air.borrow_mut().to_node.clear();
    }
}

/// Host side of the simulated channel.
pub struct HostEnd {
    air: Rc<RefCell<Air>>,
}

impl HostEnd {
    /// Put a frame on the air towards the node.  Frames longer than a
    /// radio packet are truncated.
    pub fn send(&self, frame: &[u8]) {
        let n = frame.len().min(FRAME_CAPACITY);
        trace!("air: host -> node {:02x?}", &frame[..n]);
        self.air.borrow_mut().to_node.push_back(frame[..n].to_vec());
    }

    pub fn recv(&self) -> Option<Vec<u8>> {
        self.air.borrow_mut().to_host.pop_front()
    }

    /// Everything the node has sent so far.
    pub fn drain(&self) -> Vec<Vec<u8>> {
        self.air.borrow_mut().to_host.drain(..).collect()
    }
}
