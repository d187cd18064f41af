//! Node core: protocol orchestration behind port traits.
//!
//! The radio, the MCU (delay, clock, reset) and the event consumer are
//! reached only through the traits in [`ports`], so the whole core runs
//! unchanged against the mocks in `tests/integration/mock_hw.rs`.

pub mod events;
pub mod ports;
pub mod service;
