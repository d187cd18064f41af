//! Reliable responder.
//!
//! Pushes one response frame into the transceiver's send queue.  A full
//! queue is normal on a busy link and is retried; a queue that stays full
//! for the whole deadtime window is not, and ends the dispatch with a
//! [`LinkFault`].
//!
//! The deadtime is measured on the platform's monotonic clock, not by
//! counting loop iterations, so the same config gives the same recovery
//! window on any MCU.

use log::{debug, warn};

use crate::app::ports::{Platform, Transceiver};
use crate::config::RetryPolicy;
use crate::error::LinkFault;

use super::link::LinkMode;

pub struct Responder {
    policy: RetryPolicy,
}

impl Responder {
    pub fn new(policy: RetryPolicy) -> Self {
        if policy == RetryPolicy::Unbounded {
            warn!("responder: unbounded retry, a stuck transceiver will hang the node");
        }
        Self { policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Switch the link to transmit and enqueue `frame`.
    ///
    /// Returns the number of enqueue attempts it took.  The link is left in
    /// transmit mode either way; turning back to receive is the caller's
    /// job once its burst of responses is done.
    pub fn respond(
        &self,
        link: &mut LinkMode,
        radio: &mut impl Transceiver,
        platform: &mut impl Platform,
        frame: &[u8],
    ) -> Result<u32, LinkFault> {
        link.enter_transmit(radio);

        let started = platform.uptime_ms();
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            if radio.enqueue(frame).is_ok() {
                debug!(
                    "resp op {:#04x} attempts {} len {}",
                    frame.first().copied().unwrap_or(0),
                    attempts,
                    frame.len()
                );
                return Ok(attempts);
            }

            match self.policy {
                RetryPolicy::Unbounded => {}
                RetryPolicy::Deadtime {
                    deadtime_ms,
                    slice_ms,
                } => {
                    platform.delay_ms(slice_ms);
                    let elapsed = platform.uptime_ms().saturating_sub(started);
                    if elapsed >= u64::from(deadtime_ms) {
                        warn!(
                            "resp op {:#04x}: queue full for {} ms ({} attempts)",
                            frame.first().copied().unwrap_or(0),
                            elapsed,
                            attempts
                        );
                        return Err(LinkFault::SendDeadtime { attempts });
                    }
                }
            }
        }
    }
}
