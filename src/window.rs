use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::ptr;

use tracing::debug;

use crate::error::{new_os_error, Error, ErrorKind};

lazy_static! {
    static ref PAGE_SIZE: usize = page_size();
}

fn page_size() -> usize {
    match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
        n if n > 0 => n as usize,
        _ => 4096,
    }
}

/// 32-bit register access to a controller's profiling block.
///
/// Offsets are byte offsets from the start of the block and must be 4-byte
/// aligned.
pub trait Registers {
    /// Read the register at `offset`.
    fn read32(&self, offset: usize) -> u32;

    /// Write `value` to the register at `offset`.
    fn write32(&mut self, offset: usize, value: u32);
}

/// One page of controller registers mapped from physical memory.
///
/// The page is unmapped when the window is dropped.
///
/// ```no_run
/// # use mmdc::{error::Error, Registers, Window};
/// use std::fs::OpenOptions;
/// use std::os::unix::fs::OpenOptionsExt;
///
/// let dev = OpenOptions::new()
///     .read(true)
///     .write(true)
///     .custom_flags(libc::O_SYNC)
///     .open("/dev/mem")?;
///
/// let window = Window::open(&dev, 0x021b_0000)?;
/// drop(dev);
///
/// println!("MADPCR0: {:#x}", window.read32(0x410));
/// #
/// # Ok::<(), Error>(())
/// ```
#[derive(Debug)]
pub struct Window {
    base: u64,
    mem: *mut u32,
    len: usize,
}

impl Window {
    /// Map the page at physical address `base` through `device`.
    ///
    /// `device` is normally `/dev/mem` opened read-write with `O_SYNC`, which
    /// makes the kernel map the range uncached. The descriptor may be closed
    /// once the window is open.
    pub fn open(device: &File, base: u64) -> Result<Self, Error> {
        let len = *PAGE_SIZE;

        let mem = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                device.as_raw_fd(),
                base as libc::off_t,
            )
        };

        if mem == libc::MAP_FAILED {
            return match io::Error::last_os_error().raw_os_error() {
                Some(libc::EPERM) | Some(libc::EACCES) => Err(new_os_error(ErrorKind::Forbidden)),
                _ => Err(new_os_error(ErrorKind::Map)),
            };
        }

        debug!("mapped {} byte register window at {:#010x}", len, base);

        Ok(Window {
            base,
            mem: mem as *mut u32,
            len,
        })
    }

    /// The physical base address of this window.
    pub fn base(&self) -> u64 {
        self.base
    }

    fn index(&self, offset: usize) -> usize {
        assert!(
            offset % 4 == 0 && offset + 4 <= self.len,
            "register offset {:#x} outside {:#x} byte window",
            offset,
            self.len
        );
        offset / 4
    }
}

impl Registers for Window {
    fn read32(&self, offset: usize) -> u32 {
        let idx = self.index(offset);
        unsafe { ptr::read_volatile(self.mem.add(idx)) }
    }

    fn write32(&mut self, offset: usize, value: u32) {
        let idx = self.index(offset);
        unsafe { ptr::write_volatile(self.mem.add(idx), value) }
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.mem as *mut libc::c_void, self.len);
        }
    }
}
