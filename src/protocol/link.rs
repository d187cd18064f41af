//! Link mode controller.
//!
//! Tracks which direction the half-duplex radio is facing.  Turning
//! around to receive is the expensive direction: anything still sitting in
//! the transmit queue has to drain first, and a queue that will not drain
//! means the transceiver is wedged.

use log::{debug, error};

use crate::app::ports::Transceiver;
use crate::error::LinkFault;

/// Receive/transmit direction of the radio.
#[derive(Debug)]
pub struct LinkMode {
    listening: bool,
    sync_timeout_ms: u32,
}

impl LinkMode {
    /// The node boots listening.
    pub fn new(sync_timeout_ms: u32) -> Self {
        Self {
            listening: true,
            sync_timeout_ms,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Stop receiving so frames can be queued.  No-op in transmit mode.
    pub fn enter_transmit(&mut self, radio: &mut impl Transceiver) {
        if self.listening {
            radio.stop_listening();
            self.listening = false;
            debug!("link: transmit");
        }
    }

    /// Drain the transmit queue and resume receiving.  No-op when already
    /// listening.
    ///
    /// A queue that does not drain within the sync timeout leaves the link
    /// in transmit mode and returns [`LinkFault::SyncTimeout`]; the caller
    /// must reset the node.
    pub fn enter_receive(&mut self, radio: &mut impl Transceiver) -> Result<(), LinkFault> {
        if self.listening {
            return Ok(());
        }
        if let Err(e) = radio.queue_sync(self.sync_timeout_ms) {
            error!("link: {} after {} ms", e, self.sync_timeout_ms);
            return Err(LinkFault::SyncTimeout);
        }
        radio.start_listening();
        self.listening = true;
        debug!("link: receive");
        Ok(())
    }
}
