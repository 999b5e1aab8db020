use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::counter::{Controller, Snapshot};
use crate::error::{Error, ErrorKind};
use crate::filter::{Filter, FilterEntry};
use crate::format::{self, Mode};
use crate::instance::Instance;
use crate::window::{Registers, Window};

/// Path of the physical memory device the registers are mapped from.
pub const DEV_MEM: &str = "/dev/mem";

/// Both MMDC controllers, armed with the same AXI filter.
///
/// The first controller is always present; the second may be absent on
/// parts or boards without it.
#[derive(Debug)]
pub struct ControllerSet<R: Registers> {
    primary: Controller<R>,
    secondary: Controller<R>,
    filter: Filter,
}

/// Open [`DEV_MEM`], map both controllers and arm them with `filter`.
///
/// `None` selects the pass-all filter.
pub fn initialize(filter: Option<&FilterEntry>) -> Result<ControllerSet<Window>, Error> {
    initialize_at(DEV_MEM, filter)
}

/// Like [`initialize`], mapping the registers through `device`.
///
/// The device descriptor is closed before returning; the mappings outlive it.
/// Fails if MMDC0 cannot be mapped. MMDC1 failing to map leaves the second
/// controller absent.
pub fn initialize_at(
    device: impl AsRef<Path>,
    filter: Option<&FilterEntry>,
) -> Result<ControllerSet<Window>, Error> {
    let dev = OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_SYNC)
        .open(device.as_ref())?;

    let primary = Window::open(&dev, Instance::Mmdc0.base())?;
    let secondary = match Window::open(&dev, Instance::Mmdc1.base()) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!(error = %e, "{} not available, sampling {} only", Instance::Mmdc1.tag(), Instance::Mmdc0.tag());
            None
        }
    };

    let filter = filter.map(Filter::from).unwrap_or(Filter::PASS_ALL);
    Ok(ControllerSet::new(primary, secondary, filter))
}

impl<R: Registers> ControllerSet<R> {
    /// Arm the given register blocks with `filter`.
    pub fn new(primary: R, secondary: Option<R>, filter: Filter) -> Self {
        debug!(
            id = filter.id,
            mask = filter.mask,
            controllers = 1 + secondary.is_some() as usize,
            "arming controllers"
        );

        ControllerSet {
            primary: Controller::arm(primary, filter),
            secondary: match secondary {
                Some(r) => Controller::arm(r, filter),
                None => Controller::absent(),
            },
            filter,
        }
    }

    /// The AXI filter latched into both controllers.
    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Whether the second controller has hardware behind it.
    pub fn has_secondary(&self) -> bool {
        self.secondary.is_present()
    }

    /// The controller for `instance`.
    pub fn controller(&self, instance: Instance) -> &Controller<R> {
        match instance {
            Instance::Mmdc0 => &self.primary,
            Instance::Mmdc1 => &self.secondary,
        }
    }

    /// Zero and release the counters of both controllers.
    pub fn start(&mut self) {
        self.primary.start();
        self.secondary.start();
    }

    /// Freeze and read both controllers.
    ///
    /// The second snapshot is `None` when the second controller is absent.
    pub fn stop(&mut self) -> Result<(Snapshot, Option<Snapshot>), Error> {
        let first = self.primary.stop()?;
        let second = match self.secondary.stop() {
            Ok(s) => Some(s),
            Err(ref e) if e.kind() == &ErrorKind::Absent => None,
            Err(e) => return Err(e),
        };

        Ok((first, second))
    }

    /// Measure one `interval`: start both controllers, sleep, then freeze and
    /// read both.
    ///
    /// The two controllers are started and stopped one after the other, so
    /// their windows are offset by a few register accesses.
    pub fn run_cycle(&mut self, interval: Duration) -> Result<(Snapshot, Option<Snapshot>), Error> {
        self.start();
        thread::sleep(interval);
        self.stop()
    }

    /// Render the last cycle as one line, omitting a second controller that
    /// produced no data.
    ///
    /// Returns `None` before the first completed cycle.
    pub fn render(&self, mode: Mode) -> Option<String> {
        let first = self.primary.snapshot()?;
        let second = self
            .secondary
            .snapshot()
            .map(|s| (Instance::Mmdc1.tag(), s));

        Some(format::format_cycle((Instance::Mmdc0.tag(), first), second, mode))
    }
}
