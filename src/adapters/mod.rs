//! Adapters: concrete implementations of the port traits for running the
//! node core on a host.
//!
//! | Adapter         | Implements                 | Connects to               |
//! |-----------------|----------------------------|---------------------------|
//! | `host_platform` | Platform, ImageLauncher    | `std` clock, process exit |
//! |                 | OutputPin                  | log output                |
//! | `log_sink`      | EventSink                  | `log` facade              |
//! | `ram_flash`     | NorFlash                   | RAM array                 |
//! | `sim_radio`     | Transceiver                | in-process air channel    |

pub mod host_platform;
pub mod log_sink;
pub mod ram_flash;
pub mod sim_radio;
