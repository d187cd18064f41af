//! Host-activity LED.
//!
//! Lights a GPIO for a fixed number of scheduler ticks each time the
//! dispatcher answers a HELLO.  The driver consumes the
//! [`HandshakeFlag`] with `take`, so back-to-back handshakes within one
//! window only extend it.  A hold of 0 ticks still gives a one-tick
//! pulse.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::handshake::HandshakeFlag;
use crate::scheduler::Task;

pub struct ActivityLed<'a, P> {
    pin: P,
    flag: &'a HandshakeFlag,
    hold_ticks: u32,
    remaining: u32,
}

impl<'a, P: OutputPin> ActivityLed<'a, P> {
    pub fn new(pin: P, flag: &'a HandshakeFlag, hold_ticks: u32) -> Self {
        Self {
            pin,
            flag,
            hold_ticks,
            remaining: 0,
        }
    }

    pub fn is_lit(&self) -> bool {
        self.remaining > 0
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    pub fn tick(&mut self) {
        if self.flag.take() {
            if self.remaining == 0 {
                self.drive(true);
            }
            self.remaining = self.hold_ticks.max(1);
            return;
        }
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.drive(false);
            }
        }
    }

    fn drive(&mut self, on: bool) {
        let r = if on { self.pin.set_high() } else { self.pin.set_low() };
        if let Err(e) = r {
            warn!("activity led: {:?}", e);
        }
    }
}

impl<P: OutputPin> Task for ActivityLed<'_, P> {
    fn name(&self) -> &'static str {
        "activity-led"
    }

    fn run(&mut self) {
        self.tick();
    }
}
