//! Host platform adapter.
//!
//! Implements [`Platform`] on top of `std` so the node core can run as a
//! desktop simulation:
//!
//! - monotonic clock from [`std::time::Instant`]
//! - delays via [`std::thread::sleep`]
//! - reset ends the process with a non-zero exit code
//!
//! Also provides the host stand-ins for the two other pieces of MCU glue
//! the core needs: an [`ImageLauncher`] and an activity LED pin.

use core::convert::Infallible;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use log::{debug, error, info};

use crate::app::ports::Platform;
use crate::partition::flash::ImageLauncher;

/// Exit code of a simulated reset.
pub const RESET_EXIT_CODE: i32 = 3;

pub struct HostPlatform {
    start: Instant,
}

impl Default for HostPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HostPlatform {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl DelayNs for HostPlatform {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

impl Platform for HostPlatform {
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn reset(&mut self) {
        error!("platform reset after {} ms uptime", self.uptime_ms());
        std::process::exit(RESET_EXIT_CODE);
    }
}

/// Records the jump instead of performing it.
#[derive(Debug, Default)]
pub struct HostLauncher {
    launched: Option<u32>,
}

impl HostLauncher {
    pub fn launched(&self) -> Option<u32> {
        self.launched
    }
}

impl ImageLauncher for HostLauncher {
    fn launch(&mut self, base: u32) {
        info!("would jump to image at {:#010x}", base);
        self.launched = Some(base);
    }
}

/// Output pin that only logs its level.
#[derive(Debug, Default)]
pub struct LogPin {
    label: &'static str,
    high: bool,
}

impl LogPin {
    pub fn new(label: &'static str) -> Self {
        Self { label, high: false }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }
}

impl ErrorType for LogPin {
    type Error = Infallible;
}

impl OutputPin for LogPin {
    fn set_high(&mut self) -> Result<(), Infallible> {
        debug!("{}: on", self.label);
        self.high = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        debug!("{}: off", self.label);
        self.high = false;
        Ok(())
    }
}
