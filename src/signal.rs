//! Latches termination signals so a sampling loop can stop between cycles
//! and release its register mappings in order.

use std::sync::atomic::{AtomicUsize, Ordering};

static LAST_SIG: AtomicUsize = AtomicUsize::new(0);

extern "C" fn interrupt(sig: libc::c_int) {
	LAST_SIG.store(sig as usize, Ordering::SeqCst);
}

/// Install the latching handler for each of `sigs`.
pub fn watch_for(sigs: &[libc::c_int]) {
	for sig in sigs {
		unsafe {
			libc::signal(*sig, interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t);
		}
	}
}

/// The last watched signal received, if any.
pub fn pending() -> Option<libc::c_int> {
	match LAST_SIG.load(Ordering::SeqCst) as libc::c_int {
		0 => None,
		sig => Some(sig),
	}
}
