//! AXI master filters.
//!
//! The profiling block only counts transactions whose AXI ID matches the
//! configured filter:
//!
//! ```text
//! (AXI_ID & PRF_AXI_ID_MASK) XNOR (PRF_AXI_ID & PRF_AXI_ID_MASK)
//! ```
//!
//! To monitor AXI IDs from `0xa100` to `0xa1ff`, use `PRF_AXI_ID = 0xa100`
//! and `PRF_AXI_ID_MASK = 0xff00`. An all-zero filter matches everything.

use tracing::debug;

use crate::error::{new_error, Error, ErrorKind};

/// A named AXI master from the catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterEntry {
    /// Master name, as accepted on the command line.
    pub name: &'static str,
    /// 14-bit mask applied to both the transaction ID and `id`.
    pub id_mask: u16,
    /// 14-bit AXI ID of the master.
    pub id: u16,
}

impl FilterEntry {
    /// The filter to latch into the profiling block for this master.
    pub fn filter(&self) -> Filter {
        Filter {
            id: self.id,
            mask: self.id_mask,
        }
    }
}

/// The AXI ID filter programmed into `MADPCR1`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Filter {
    /// AXI ID to match.
    pub id: u16,
    /// Bits of the AXI ID that take part in the match.
    pub mask: u16,
}

impl Filter {
    /// Count every transaction.
    pub const PASS_ALL: Filter = Filter { id: 0, mask: 0 };

    /// The `MADPCR1` register value: mask in the high half, ID in the low.
    pub fn encode(&self) -> u32 {
        (u32::from(self.mask) << 16) | u32::from(self.id)
    }

    /// Whether a transaction tagged `axi_id` is counted under this filter.
    pub fn matches(&self, axi_id: u16) -> bool {
        (axi_id & self.mask) == (self.id & self.mask)
    }
}

impl From<&FilterEntry> for Filter {
    fn from(entry: &FilterEntry) -> Self {
        entry.filter()
    }
}

macro_rules! masters {
    ($($name:literal => ($mask:literal, $id:literal),)*) => {
        &[$(FilterEntry { name: $name, id_mask: $mask, id: $id },)*]
    };
}

// Table 43-8. i.MX 6Dual/6Quad AXI ID
static FILTERS: &[FilterEntry] = masters! {
    "arm-s0"    => (0b11100000000111, 0b00000000000000),
    "arm-s1"    => (0b11100000000111, 0b00000000000001),
    "ipu1"      => (0b11111111100111, 0b00000000000100),
    "ipu1-0"    => (0b11111111111111, 0b00000000000100),
    "ipu1-1"    => (0b11111111111111, 0b00000000001100),
    "ipu1-2"    => (0b11111111111111, 0b00000000010100),
    "ipu1-3"    => (0b11111111111111, 0b00000000011100),
    "ipu2"      => (0b11111111100111, 0b00000000000101),
    "ipu2-0"    => (0b11111111111111, 0b00000000000101),
    "ipu2-1"    => (0b11111111111111, 0b00000000001101),
    "ipu2-2"    => (0b11111111111111, 0b00000000010101),
    "ipu2-3"    => (0b11111111111111, 0b00000000011101),
    "gpu3d-a"   => (0b11110000111111, 0b00000000000010),
    "gpu2d-a"   => (0b11110000111111, 0b00000000001010),
    "vdoa"      => (0b11111100111111, 0b00000000010010),
    "openvg"    => (0b11110000111111, 0b00000000100010),
    "hdmi"      => (0b11111111111111, 0b00000100011010),
    "sdma-brst" => (0b11111111111111, 0b00000101011010),
    "sdma-per"  => (0b11111111111111, 0b00000110011010),
    "caam"      => (0b00001111111111, 0b00000000011010),
    "usb"       => (0b11001111111111, 0b00000001011010),
    "enet"      => (0b11111111111111, 0b00000010011010),
    "hsi"       => (0b11111111111111, 0b00000011011010),
    "usdhc1"    => (0b11111111111111, 0b00000111011010),
    "gpu3d-b"   => (0b11110000111111, 0b00000000000011),
    // The reference manual lists a second gpu3d-b here instead of gpu2d-b.
    "gpu2d-b"   => (0b11110000111111, 0b00000000001011),
    "vpu-prime" => (0b11110000111111, 0b00000000010011),
    "pcie"      => (0b11100000111111, 0b00000000011011),
    "dap"       => (0b11111111111111, 0b00000000100011),
    "apbh-dma"  => (0b11111111111111, 0b00000010100011),
    "bch40"     => (0b00001111111111, 0b00000001100011),
    "sata"      => (0b11111111111111, 0b00000011100011),
    "mlb150"    => (0b11111111111111, 0b00000100100011),
    "usdhc2"    => (0b11111111111111, 0b00000101100011),
    "usdhc3"    => (0b11111111111111, 0b00000110100011),
    "usdhc4"    => (0b11111111111111, 0b00000111100011),
};

/// Find the catalog entry for the AXI master `name`.
///
/// Names are matched exactly and case-sensitively.
///
/// ```
/// # use mmdc::filter;
/// let usb = filter::lookup("usb")?;
/// assert_eq!(usb.filter().encode(), 0x33ff_005a);
///
/// assert!(filter::lookup("USB").is_err());
/// #
/// # Ok::<(), mmdc::error::Error>(())
/// ```
pub fn lookup(name: &str) -> Result<&'static FilterEntry, Error> {
    match FILTERS.iter().find(|f| f.name == name) {
        Some(f) => {
            debug!(master = f.name, id = f.id, mask = f.id_mask, "selected AXI filter");
            Ok(f)
        }
        None => Err(new_error(ErrorKind::FilterNotFound)),
    }
}

/// All catalog entries in reference manual order.
pub fn all() -> impl Iterator<Item = &'static FilterEntry> + Clone {
    FILTERS.iter()
}

/// The names of all catalog entries in reference manual order.
pub fn names() -> impl Iterator<Item = &'static str> + Clone {
    all().map(|f| f.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    #[test]
    fn test_catalog_names_unique() {
        let names: HashSet<_> = names().collect();
        assert_eq!(names.len(), all().count());
        assert_eq!(all().count(), 36);
    }

    #[test]
    fn test_catalog_fits_14_bits() {
        for f in all() {
            assert!(f.id < 1 << 14, "{}", f.name);
            assert!(f.id_mask < 1 << 14, "{}", f.name);
        }
    }

    #[test]
    fn test_lookup_every_entry() {
        for f in all() {
            let got = lookup(f.name).expect("catalog entry not found");
            assert_eq!((got.id, got.id_mask), (f.id, f.id_mask));
        }
    }

    #[test]
    fn test_lookup_spot_checks() {
        let usb = lookup("usb").unwrap();
        assert_eq!(usb.id, 0b00000001011010);
        assert_eq!(usb.id_mask, 0b11001111111111);

        let arm = lookup("arm-s0").unwrap();
        assert_eq!(arm.filter(), Filter { id: 0, mask: 0b11100000000111 });
    }

    #[test]
    fn test_lookup_not_found() {
        assert_eq!(lookup("nonexistent").unwrap_err().kind(), &ErrorKind::FilterNotFound);
        assert_eq!(lookup("Usb").unwrap_err().kind(), &ErrorKind::FilterNotFound);
        assert_eq!(lookup("").unwrap_err().kind(), &ErrorKind::FilterNotFound);
    }

    #[test]
    fn test_not_found_falls_back_to_pass_all() {
        let filter = lookup("nonexistent")
            .map(Filter::from)
            .unwrap_or(Filter::PASS_ALL);
        assert_eq!(filter, Filter { id: 0, mask: 0 });
        assert_eq!(filter.encode(), 0);
    }

    #[test]
    fn test_all_is_restartable() {
        let it = all();
        let first: Vec<_> = it.clone().collect();
        let second: Vec<_> = it.collect();
        assert_eq!(first, second);
        assert_eq!(names().next(), Some("arm-s0"));
        assert_eq!(names().last(), Some("usdhc4"));
    }

    #[test]
    fn test_encode() {
        let f = Filter { id: 0x1234, mask: 0x3f00 };
        assert_eq!(f.encode(), 0x3f00_1234);
    }

    #[test]
    fn test_matches() {
        assert!(Filter::PASS_ALL.matches(0));
        assert!(Filter::PASS_ALL.matches(0x3fff));

        let usb = lookup("usb").unwrap().filter();
        assert!(usb.matches(0b00000001011010));
        // Bits 10 and 11 are masked out.
        assert!(usb.matches(0b00110001011010));
        assert!(!usb.matches(0b00000010011010));

        // ipu1 covers all four ipu1 channels.
        let ipu1 = lookup("ipu1").unwrap().filter();
        for ch in &["ipu1-0", "ipu1-1", "ipu1-2", "ipu1-3"] {
            assert!(ipu1.matches(lookup(ch).unwrap().id), "{}", ch);
        }
        assert!(!ipu1.matches(lookup("ipu2-0").unwrap().id));
    }
}
