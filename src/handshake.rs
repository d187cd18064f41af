//! "Handshake observed" flag.
//!
//! Set by the dispatcher each time a HELLO is answered, read by anything
//! outside the protocol core that wants to react to host activity (the
//! activity LED, a boot-timeout watchdog).  It carries no protocol meaning.

use core::sync::atomic::{AtomicBool, Ordering};

/// Process-wide instance used by the firmware and the simulator.
pub static HANDSHAKE_OBSERVED: HandshakeFlag = HandshakeFlag::new();

pub struct HandshakeFlag {
    seen: AtomicBool,
}

impl HandshakeFlag {
    pub const fn new() -> Self {
        Self {
            seen: AtomicBool::new(false),
        }
    }

    pub fn mark(&self) {
        self.seen.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.seen.load(Ordering::Acquire)
    }

    /// Read and clear.  Each handshake is reported to exactly one caller.
    pub fn take(&self) -> bool {
        self.seen.swap(false, Ordering::AcqRel)
    }
}

impl Default for HandshakeFlag {
    fn default() -> Self {
        Self::new()
    }
}
