//! Fuzz target: `BootService::poll`
//!
//! Splits the input into length-prefixed radio frames, delivers them one
//! per poll and checks that the node never panics and never sends a frame
//! larger than a radio packet.
//!
//! READ lengths are folded into the partition size: a READ past the end
//! of a partition never terminates.
//!
//! cargo fuzz run fuzz_poll

#![no_main]

use embedded_hal::delay::DelayNs;
use libfuzzer_sys::fuzz_target;
use rf24boot::adapters::host_platform::HostLauncher;
use rf24boot::adapters::ram_flash::RamFlash;
use rf24boot::adapters::sim_radio::sim_link;
use rf24boot::app::ports::{NullSink, Platform};
use rf24boot::app::service::BootService;
use rf24boot::config::{BootConfig, RetryPolicy};
use rf24boot::handshake::HandshakeFlag;
use rf24boot::partition::flash::FlashPartition;
use rf24boot::partition::memory::MemoryPartition;
use rf24boot::protocol::packet::FRAME_CAPACITY;

const PART_SIZE: u32 = 256;

#[derive(Default)]
struct FakeClock {
    now_ns: u64,
    resets: u32,
}

impl DelayNs for FakeClock {
    fn delay_ns(&mut self, ns: u32) {
        self.now_ns += u64::from(ns);
    }
}

impl Platform for FakeClock {
    fn uptime_ms(&self) -> u64 {
        self.now_ns / 1_000_000
    }

    fn reset(&mut self) {
        self.resets += 1;
    }
}

fuzz_target!(|data: &[u8]| {
    let flag = HandshakeFlag::new();
    let mut config = BootConfig::default();
    config.retry = RetryPolicy::Deadtime {
        deadtime_ms: 100,
        slice_ms: 10,
    };

    let Ok(mut app) = FlashPartition::new(
        "app",
        RamFlash::<2048>::new(),
        1024,
        PART_SIZE,
        24,
        HostLauncher::default(),
    ) else {
        return;
    };
    let Ok(mut ram) = MemoryPartition::<{ PART_SIZE as usize }>::new("ram", 16) else {
        return;
    };

    let (radio, host) = sim_link();
    let mut svc = BootService::new(config, radio, FakeClock::default(), NullSink, &flag);
    if svc.register_partition(&mut app).is_err() || svc.register_partition(&mut ram).is_err() {
        return;
    }
    svc.init();

    let mut rest = data;
    while let Some((&len, tail)) = rest.split_first() {
        let n = usize::from(len).min(tail.len()).min(40);
        let mut frame = tail[..n].to_vec();
        rest = &tail[n..];

        if frame.first().is_some_and(|op| op & 0x0f == 0x02) {
            frame.resize(frame.len().max(6), 0);
            let want = u32::from_le_bytes([frame[2], frame[3], frame[4], frame[5]]) % (PART_SIZE + 1);
            frame[2..6].copy_from_slice(&want.to_le_bytes());
        }

        host.send(&frame);
        let _ = svc.poll();
        for sent in host.drain() {
            assert!(sent.len() <= FRAME_CAPACITY);
        }
    }
});
