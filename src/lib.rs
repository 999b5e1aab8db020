#![warn(missing_docs)]

//! `mmdc-rs` samples the profiling counters of the i.MX6 [MMDC] (multi-mode
//! DDR controller) and reports DDR bus utilization.
//!
//! Each MMDC instance has a small profiling block that counts total and busy
//! cycles, read and write transactions, and read and write bytes. The block
//! can be restricted to the traffic of one AXI bus master (an IPU, the GPU,
//! USB, ...) through an AXI ID filter, see [`filter`].
//!
//! The registers are reached by mapping `/dev/mem`, so sampling needs root and
//! a kernel that allows access to the MMDC range.
//!
//! ```no_run
//! use std::time::Duration;
//! use mmdc::format::Mode;
//!
//! let usb = mmdc::filter::lookup("usb")?;
//! let mut set = mmdc::initialize(Some(usb))?;
//!
//! set.run_cycle(Duration::from_secs(1))?;
//! if let Some(line) = set.render(Mode::Human) {
//!     println!("{}", line);
//! }
//! #
//! # Ok::<(), mmdc::error::Error>(())
//! ```
//!
//! See "Multi Mode DDR Controller (MMDC)" in the i.MX 6Dual/6Quad
//! Applications Processor Reference Manual for the register descriptions.
//!
//! [MMDC]: https://www.nxp.com/docs/en/reference-manual/IMX6DQRM.pdf

#[macro_use]
extern crate lazy_static;
extern crate libc;

pub mod error;
pub mod filter;
pub mod format;
pub mod signal;

mod instance;
pub use self::instance::Instance;

mod window;
pub use self::window::{Registers, Window};

pub mod counter;
pub use self::counter::{Controller, Snapshot};

mod session;
pub use self::session::{initialize, initialize_at, ControllerSet, DEV_MEM};

pub use self::format::Mode;

/// Render `snapshot` prefixed with `tag`. See [`format::format`].
pub fn render(tag: &str, snapshot: &Snapshot, mode: Mode) -> String {
    format::format(tag, snapshot, mode)
}

/// Names of all known AXI masters, for help and error output.
pub fn list_filter_names() -> impl Iterator<Item = &'static str> + Clone {
    filter::names()
}
