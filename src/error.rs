#![allow(missing_docs)]

use std::{error, fmt, io};

#[derive(Debug)]
pub struct Error {
	kind: ErrorKind,
	cause: Option<Box<dyn error::Error + Send + Sync>>,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
	/// The controller register page could not be mapped.
	///
	/// Usually `/dev/mem` is missing or the kernel was built with
	/// `CONFIG_STRICT_DEVMEM` covering the MMDC range.
	Map,

	/// The caller does not have the appropriate permissions to map the
	/// controller registers.
	Forbidden,

	/// The requested AXI master is not in the filter catalog.
	FilterNotFound,

	/// The requested operation can only be performed on a running
	/// [`Controller`].
	///
	/// [`Controller`]: crate::Controller
	///
	NotRunning,

	/// The [`Controller`] has no hardware behind it.
	///
	/// [`Controller`]: crate::Controller
	///
	Absent,
}

impl ErrorKind {
	fn describe(&self) -> &'static str {
		match self {
			ErrorKind::Map => "failed to map controller registers",
			ErrorKind::Forbidden => "forbidden",
			ErrorKind::FilterNotFound => "unknown AXI master",
			ErrorKind::NotRunning => "counters not running",
			ErrorKind::Absent => "controller not present",
		}
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self.cause {
			None => None,
			Some(ref b) => Some(b.as_ref()),
		}
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.cause {
			None => write!(f, "{}", self.kind.describe()),
			Some(ref cause) => write!(f, "{}: {}", self.kind.describe(), cause),
		}
	}
}

#[doc(hidden)]
impl PartialEq for Error {
	fn eq(&self, other: &Error) -> bool {
		self.kind == other.kind
	}
}

impl Error {
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}
}

impl From<io::Error> for Error {
	fn from(err: io::Error) -> Self {
		let kind = match err.kind() {
			io::ErrorKind::PermissionDenied => ErrorKind::Forbidden,
			_ => ErrorKind::Map,
		};
		Error {
			kind,
			cause: Some(Box::new(err)),
		}
	}
}

pub(crate) fn new_os_error(kind: ErrorKind) -> Error {
	// Get the last OS error to reference as the cause
	Error {
		kind,
		cause: Some(Box::new(io::Error::last_os_error())),
	}
}

pub(crate) fn new_error(kind: ErrorKind) -> Error {
	Error { kind, cause: None }
}
