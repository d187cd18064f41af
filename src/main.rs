//! rf24boot simulator: runs the node core against an in-process radio.
//!
//! ```text
//! ┌──────────────┐   air    ┌──────────────────────────────────────┐
//! │ ScriptedHost │ ◀──────▶ │ SimRadio ─▶ BootService ─▶ LogSink   │
//! │ (task 0)     │          │ "app": FlashPartition over RamFlash  │
//! └──────────────┘          │ "cfg": MemoryPartition               │
//!                           └──────────────────────────────────────┘
//! ```
//!
//! The host script performs one full update session: HELLO, WRITE a demo
//! image into "app" chunk by chunk, READ it back, verify, BOOT.  An
//! optional first argument names a JSON [`BootConfig`] file.

use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use log::{info, warn};

use rf24boot::adapters::host_platform::{HostLauncher, HostPlatform, LogPin};
use rf24boot::adapters::log_sink::LogEventSink;
use rf24boot::adapters::ram_flash::RamFlash;
use rf24boot::adapters::sim_radio::{HostEnd, sim_link};
use rf24boot::app::service::BootService;
use rf24boot::config::BootConfig;
use rf24boot::drivers::activity_led::ActivityLed;
use rf24boot::error::Error;
use rf24boot::handshake::HANDSHAKE_OBSERVED;
use rf24boot::partition::flash::FlashPartition;
use rf24boot::partition::memory::MemoryPartition;
use rf24boot::protocol::packet::{DATA_CAPACITY, DATA_HEADER_LEN, Op};
use rf24boot::scheduler::{RoundRobin, Task};

// ── Simulated board ───────────────────────────────────────────

const FLASH_SIZE: usize = 16 * 1024;
const APP_BASE: u32 = 4 * 1024;
const APP_SIZE: u32 = 8 * 1024;
const APP_IO_SIZE: u16 = 24;
const CFG_SIZE: usize = 256;
const CFG_IO_SIZE: u16 = 16;

const HOST_ADDRESS: [u8; 5] = [0xc0, 0xff, 0xee, 0x00, 0x01];
const IMAGE_LEN: usize = 500;
const LED_HOLD_TICKS: u32 = 4;
const MAX_TICKS: u64 = 200;

// ── Host script ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Hello,
    AwaitHello,
    Write { offset: usize },
    Read,
    AwaitRead,
    Boot,
    Done,
}

#[derive(Debug)]
struct RemotePart {
    name: String,
    size: u32,
    io_size: u16,
}

struct ScriptedHost<'h> {
    link: &'h HostEnd,
    image: &'h [u8],
    target: &'static str,
    step: Step,
    parts: Vec<RemotePart>,
    target_index: u8,
    readback: Vec<u8>,
    verified: Option<bool>,
    idle_ticks: u32,
}

impl<'h> ScriptedHost<'h> {
    fn new(link: &'h HostEnd, image: &'h [u8], target: &'static str) -> Self {
        Self {
            link,
            image,
            target,
            step: Step::Hello,
            parts: Vec::new(),
            target_index: 0,
            readback: Vec::new(),
            verified: None,
            idle_ticks: 0,
        }
    }

    fn hello(&mut self) {
        let mut frame = vec![Op::Hello.code()];
        frame.extend_from_slice(&HOST_ADDRESS);
        self.link.send(&frame);
        self.step = Step::AwaitHello;
    }

    fn await_hello(&mut self) {
        let replies = self.link.drain();
        let Some((first, rest)) = replies.split_first() else {
            self.idle_ticks += 1;
            return;
        };
        let numparts = first[1];
        let id_field = &first[3..];
        let id_len = id_field.iter().position(|b| *b == 0).unwrap_or(id_field.len());
        info!(
            "host: node '{}' with {} partitions",
            String::from_utf8_lossy(&id_field[..id_len]),
            numparts
        );

        self.parts = rest.iter().map(Vec::as_slice).filter_map(parse_partinfo).collect();
        for p in &self.parts {
            info!("host:   {:<8} size {} io {}", p.name, p.size, p.io_size);
        }
        match self.parts.iter().position(|p| p.name == self.target) {
            Some(i) => {
                self.target_index = i as u8;
                self.step = Step::Write { offset: 0 };
            }
            None => {
                warn!("host: node has no '{}' partition", self.target);
                self.step = Step::Done;
            }
        }
    }

    fn write_chunk(&mut self, offset: usize) {
        let io = usize::from(self.parts[self.target_index as usize].io_size).min(DATA_CAPACITY);
        let end = (offset + io).min(self.image.len());

        let mut frame = vec![Op::Write.code(), self.target_index];
        frame.extend_from_slice(&(offset as u32).to_le_bytes());
        frame.extend_from_slice(&self.image[offset..end]);
        self.link.send(&frame);

        self.step = if end >= self.image.len() {
            Step::Read
        } else {
            Step::Write { offset: end }
        };
    }

    fn read(&mut self) {
        let mut frame = vec![Op::Read.code(), self.target_index];
        frame.extend_from_slice(&(self.image.len() as u32).to_le_bytes());
        self.link.send(&frame);
        self.step = Step::AwaitRead;
    }

    fn await_read(&mut self) {
        let replies = self.link.drain();
        if replies.is_empty() {
            self.idle_ticks += 1;
            return;
        }
        self.readback = vec![0; self.image.len()];
        for frame in &replies {
            let addr = u32::from_le_bytes([frame[2], frame[3], frame[4], frame[5]]) as usize;
            let data = &frame[1 + DATA_HEADER_LEN..];
            let end = (addr + data.len()).min(self.readback.len());
            if addr < end {
                self.readback[addr..end].copy_from_slice(&data[..end - addr]);
            }
        }
        let ok = self.readback == self.image;
        info!(
            "host: read back {} bytes in {} packets, verify {}",
            self.image.len(),
            replies.len(),
            if ok { "ok" } else { "FAILED" }
        );
        self.verified = Some(ok);
        self.step = if ok { Step::Boot } else { Step::Done };
    }

    fn boot(&mut self) {
        self.link.send(&[Op::Boot.code(), self.target_index]);
        self.step = Step::Done;
    }
}

impl Task for ScriptedHost<'_> {
    fn name(&self) -> &'static str {
        "host-script"
    }

    fn run(&mut self) {
        match self.step {
            Step::Hello => self.hello(),
            Step::AwaitHello => self.await_hello(),
            Step::Write { offset } => self.write_chunk(offset),
            Step::Read => self.read(),
            Step::AwaitRead => self.await_read(),
            Step::Boot => self.boot(),
            Step::Done => {}
        }
    }
}

fn parse_partinfo(frame: &[u8]) -> Option<RemotePart> {
    if frame.len() < 16 || frame[0] & 0x0f != Op::PartInfo.code() {
        return None;
    }
    let p = &frame[1..];
    let name = &p[7..15];
    let name_len = name.iter().position(|b| *b == 0).unwrap_or(name.len());
    Some(RemotePart {
        name: String::from_utf8_lossy(&name[..name_len]).into_owned(),
        size: u32::from_le_bytes([p[0], p[1], p[2], p[3]]),
        io_size: u16::from_le_bytes([p[4], p[5]]),
    })
}

fn demo_image(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(7)).collect()
}

fn load_config(path: Option<&Path>) -> Result<BootConfig> {
    let Some(path) = path else {
        return Ok(BootConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: BootConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
    config.validate().map_err(Error::from)?;
    info!("Config loaded from {}", path.display());
    Ok(config)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    let _ = simplelog::TermLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    info!("rf24boot simulator v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1);
    let config = load_config(config_path.as_deref().map(Path::new))?;

    let mut app = FlashPartition::new(
        "app",
        RamFlash::<FLASH_SIZE>::new(),
        APP_BASE,
        APP_SIZE,
        APP_IO_SIZE,
        HostLauncher::default(),
    )?;
    let mut cfg = MemoryPartition::<CFG_SIZE>::new("cfg", CFG_IO_SIZE)?;

    let (radio, host_end) = sim_link();
    let image = demo_image(IMAGE_LEN);
    let mut host = ScriptedHost::new(&host_end, &image, "app");

    {
        let mut service = BootService::new(
            config,
            radio,
            HostPlatform::new(),
            LogEventSink::new(),
            &HANDSHAKE_OBSERVED,
        );
        service.register_partition(&mut app)?;
        service.register_partition(&mut cfg)?;
        service.init();

        let mut led = ActivityLed::new(LogPin::new("activity"), &HANDSHAKE_OBSERVED, LED_HOLD_TICKS);

        let mut sched: RoundRobin<'_, 3> = RoundRobin::new();
        sched.add(&mut host)?;
        sched.add(&mut service)?;
        sched.add(&mut led)?;
        sched.run_for(MAX_TICKS);
    }

    if host.step != Step::Done {
        bail!(
            "host script stalled in {:?} after {} idle ticks",
            host.step,
            host.idle_ticks
        );
    }
    ensure!(host.verified == Some(true), "read-back did not match the image");

    let stored = &app.flash().contents()[APP_BASE as usize..][..IMAGE_LEN];
    ensure!(stored == image.as_slice(), "flash contents differ from the image");
    ensure!(
        app.launcher().launched() == Some(APP_BASE),
        "node never jumped to the image"
    );

    info!("session complete: {} bytes written, verified and booted", IMAGE_LEN);
    Ok(())
}
