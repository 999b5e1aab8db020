//! The MMDC profiling block protocol.

use tracing::{debug, warn};

use crate::error::{new_error, Error, ErrorKind};
use crate::filter::Filter;
use crate::window::Registers;

/// Profiling control register.
pub const MADPCR0: usize = 0x0410;
/// Profiling AXI ID filter register.
pub const MADPCR1: usize = 0x0414;
/// Total cycles.
pub const MADPSR0: usize = 0x0418;
/// Busy cycles.
pub const MADPSR1: usize = 0x041c;
/// Total read accesses.
pub const MADPSR2: usize = 0x0420;
/// Total write accesses.
pub const MADPSR3: usize = 0x0424;
/// Total read bytes.
pub const MADPSR4: usize = 0x0428;
/// Total write bytes.
pub const MADPSR5: usize = 0x042c;

/// Profiling enable.
pub const DBG_EN: u32 = 1 << 0;
/// Reset all profiling counters.
pub const DBG_RST: u32 = 1 << 1;
/// Freeze the profiling counters.
pub const PRF_FRZ: u32 = 1 << 2;
/// Cycle counter overflowed; write 1 to clear.
pub const CYC_OVF: u32 = 1 << 3;

/// Counter values read from a frozen profiling block.
///
/// All values accumulate from the last [`Controller::start`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// Total cycles (`MADPSR0`).
    pub cycles: u32,
    /// Cycles in which the controller was busy (`MADPSR1`).
    pub busy_cycles: u32,
    /// Read transactions (`MADPSR2`).
    pub read_accesses: u32,
    /// Write transactions (`MADPSR3`).
    pub write_accesses: u32,
    /// Bytes read (`MADPSR4`).
    pub read_bytes: u32,
    /// Bytes written (`MADPSR5`).
    pub write_bytes: u32,

    /// The cycle counter wrapped while running, so `cycles` (and the busy
    /// percentage derived from it) cannot be trusted.
    pub overflow: bool,
}

impl Snapshot {
    fn read<R: Registers>(regs: &R, overflow: bool) -> Self {
        Snapshot {
            cycles: regs.read32(MADPSR0),
            busy_cycles: regs.read32(MADPSR1),
            read_accesses: regs.read32(MADPSR2),
            write_accesses: regs.read32(MADPSR3),
            read_bytes: regs.read32(MADPSR4),
            write_bytes: regs.read32(MADPSR5),
            overflow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Armed,
    Running,
    Frozen(Snapshot),
}

/// Drives the profiling block of one MMDC instance.
///
/// A controller is armed with an AXI filter when created and then cycles
/// between running and frozen:
///
/// ```no_run
/// # use mmdc::{error::Error, filter::Filter, Controller, Registers};
/// # fn sample<R: Registers>(regs: R) -> Result<(), Error> {
/// use std::{thread, time::Duration};
///
/// let mut ctl = Controller::arm(regs, Filter::PASS_ALL);
///
/// ctl.start();
/// thread::sleep(Duration::from_secs(1));
/// let snap = ctl.stop()?;
///
/// println!("busy: {} of {} cycles", snap.busy_cycles, snap.cycles);
/// # Ok(())
/// # }
/// ```
///
/// A controller built with [`Controller::absent`] stands in for an instance
/// whose registers could not be mapped; it ignores `start` and never produces
/// a snapshot.
///
/// Dropping a running controller freezes its counters.
#[derive(Debug)]
pub struct Controller<R: Registers> {
    regs: Option<R>,
    state: State,
}

impl<R: Registers> Controller<R> {
    /// Reset the profiling block, enable it in the frozen state and latch
    /// `filter`.
    pub fn arm(mut regs: R, filter: Filter) -> Self {
        regs.write32(MADPCR0, 0);
        // Assert reset, write 1 to clear the overflow flag
        regs.write32(MADPCR0, DBG_RST | CYC_OVF);
        // Deassert reset, enable and freeze
        regs.write32(MADPCR0, DBG_EN | PRF_FRZ);

        regs.write32(MADPCR1, filter.encode());

        debug!("armed profiling block, MADPCR1 = {:#010x}", filter.encode());

        Controller {
            regs: Some(regs),
            state: State::Armed,
        }
    }

    /// A controller with no hardware behind it.
    pub fn absent() -> Self {
        Controller {
            regs: None,
            state: State::Armed,
        }
    }

    /// Whether this controller has registers to drive.
    pub fn is_present(&self) -> bool {
        self.regs.is_some()
    }

    /// Whether the counters are currently accumulating.
    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Zero the counters and let them run.
    ///
    /// Calling `start` on a running controller restarts the measurement from
    /// zero.
    pub fn start(&mut self) {
        let regs = match self.regs.as_mut() {
            Some(r) => r,
            None => return,
        };

        let ctl = regs.read32(MADPCR0);
        regs.write32(MADPCR0, ctl | DBG_RST | CYC_OVF);
        let ctl = regs.read32(MADPCR0);
        regs.write32(MADPCR0, ctl & !(DBG_RST | PRF_FRZ));

        self.state = State::Running;
    }

    /// Freeze the counters and read them.
    ///
    /// Returns [`ErrorKind::NotRunning`] if the counters were not started,
    /// and [`ErrorKind::Absent`] for a controller without hardware. An
    /// overflowed cycle counter is reported through [`Snapshot::overflow`],
    /// not as an error.
    ///
    /// [`ErrorKind::NotRunning`]: crate::error::ErrorKind::NotRunning
    /// [`ErrorKind::Absent`]: crate::error::ErrorKind::Absent
    pub fn stop(&mut self) -> Result<Snapshot, Error> {
        let regs = match self.regs.as_mut() {
            Some(r) => r,
            None => return Err(new_error(ErrorKind::Absent)),
        };

        if self.state != State::Running {
            return Err(new_error(ErrorKind::NotRunning));
        }

        // CYC_OVF is write-1-to-clear, so it must not be written back
        let ctl = regs.read32(MADPCR0);
        regs.write32(MADPCR0, (ctl | PRF_FRZ) & !CYC_OVF);

        let overflow = (ctl | regs.read32(MADPCR0)) & CYC_OVF != 0;
        if overflow {
            warn!("profiling cycle counter overflowed");
        }

        let snap = Snapshot::read(&*regs, overflow);
        self.state = State::Frozen(snap);

        Ok(snap)
    }

    /// The counters read by the last successful [`stop`](Controller::stop).
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self.state {
            State::Frozen(ref s) => Some(s),
            _ => None,
        }
    }
}

impl<R: Registers> Drop for Controller<R> {
    fn drop(&mut self) {
        if self.state != State::Running {
            return;
        }
        if let Some(regs) = self.regs.as_mut() {
            let ctl = regs.read32(MADPCR0);
            regs.write32(MADPCR0, (ctl | PRF_FRZ) & !CYC_OVF);
        }
    }
}
