//! Rendering of counter snapshots.

use crate::counter::Snapshot;

const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

/// Output style for [`format`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// Busy percentage plus raw access and byte counts.
    Raw,
    /// Busy percentage, scaled byte totals and mean access size.
    Human,
}

/// `100 * busy_cycles / cycles`, or NaN when no cycles were counted.
pub fn busy_percent(s: &Snapshot) -> f64 {
    if s.cycles == 0 {
        return f64::NAN;
    }
    100.0 * f64::from(s.busy_cycles) / f64::from(s.cycles)
}

/// Mean bytes per access, rounded up. Zero when there were no accesses.
pub fn bytes_per_access(bytes: u32, accesses: u32) -> u64 {
    if accesses == 0 {
        return 0;
    }
    (u64::from(bytes) + u64::from(accesses) - 1) / u64::from(accesses)
}

/// Scale `bytes` down by 1024 (truncating) until it is at most 1023 or
/// reaches GiB. Returns the scaled value and the number of steps taken.
pub fn scale(bytes: u32) -> (u32, usize) {
    let mut value = bytes;
    let mut steps = 0;
    while value > 1023 && steps < UNITS.len() - 1 {
        value /= 1024;
        steps += 1;
    }
    (value, steps)
}

/// Render one controller's snapshot prefixed with `tag`.
///
/// ```
/// # use mmdc::{format::{format, Mode}, Snapshot};
/// let snap = Snapshot {
///     cycles: 400,
///     busy_cycles: 100,
///     read_accesses: 2,
///     read_bytes: 4096,
///     ..Snapshot::default()
/// };
///
/// assert_eq!(
///     format("MMDC0", &snap, Mode::Human),
///     "MMDC0 25.00% busy 4 KiB reads (2048 B / access) 0 B writes (0 B / access)",
/// );
/// ```
pub fn format(tag: &str, s: &Snapshot, mode: Mode) -> String {
    let busy = busy_percent(s);

    match mode {
        Mode::Raw => format!(
            "{} {:.2}% busy {} reads ({} bytes) {} writes ({} bytes)",
            tag, busy, s.read_accesses, s.read_bytes, s.write_accesses, s.write_bytes
        ),
        Mode::Human => {
            let (reads, read_unit) = scale(s.read_bytes);
            let (writes, write_unit) = scale(s.write_bytes);
            format!(
                "{} {:.2}% busy {} {} reads ({} B / access) {} {} writes ({} B / access)",
                tag,
                busy,
                reads,
                UNITS[read_unit],
                bytes_per_access(s.read_bytes, s.read_accesses),
                writes,
                UNITS[write_unit],
                bytes_per_access(s.write_bytes, s.write_accesses),
            )
        }
    }
}

/// Render one sampling cycle as a single line.
///
/// The second controller is appended after a tab only when it counted any
/// cycles; a missing or idle second controller is left out entirely.
pub fn format_cycle(
    primary: (&str, &Snapshot),
    secondary: Option<(&str, &Snapshot)>,
    mode: Mode,
) -> String {
    let mut line = format(primary.0, primary.1, mode);
    if let Some((tag, snap)) = secondary {
        if snap.cycles != 0 {
            line.push('\t');
            line.push_str(&format(tag, snap, mode));
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(cycles: u32, busy_cycles: u32) -> Snapshot {
        Snapshot {
            cycles,
            busy_cycles,
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_busy_percent_formula() {
        let cases = [
            (100_000_000, 25_000_000, "25.00"),
            (3, 1, "33.33"),
            (3, 2, "66.67"),
            (1, 1, "100.00"),
            (7, 0, "0.00"),
            (u32::MAX, 1, "0.00"),
        ];
        for &(cycles, busy, want) in cases.iter() {
            let got = format!("{:.2}", busy_percent(&snap(cycles, busy)));
            assert_eq!(got, want, "cycles={} busy={}", cycles, busy);

            let exact = 100.0 * busy as f64 / cycles as f64;
            assert_eq!(got, format!("{:.2}", exact));
        }
    }

    #[test]
    fn test_busy_above_cycles_not_clamped() {
        assert_eq!(format!("{:.2}", busy_percent(&snap(100, 150))), "150.00");
    }

    #[test]
    fn test_zero_cycles_renders_nan() {
        let s = Snapshot {
            busy_cycles: 5,
            read_accesses: 1,
            read_bytes: 64,
            ..Snapshot::default()
        };
        assert!(busy_percent(&s).is_nan());

        assert_eq!(
            format("MMDC1", &s, Mode::Raw),
            "MMDC1 NaN% busy 1 reads (64 bytes) 0 writes (0 bytes)"
        );
        assert_eq!(
            format("MMDC1", &s, Mode::Human),
            "MMDC1 NaN% busy 64 B reads (64 B / access) 0 B writes (0 B / access)"
        );
    }

    #[test]
    fn test_raw() {
        let s = Snapshot {
            cycles: 1000,
            busy_cycles: 125,
            read_accesses: 10,
            write_accesses: 5,
            read_bytes: 640,
            write_bytes: 320,
            overflow: false,
        };
        assert_eq!(
            format("MMDC0", &s, Mode::Raw),
            "MMDC0 12.50% busy 10 reads (640 bytes) 5 writes (320 bytes)"
        );
    }

    #[test]
    fn test_bytes_per_access_rounds_up() {
        assert_eq!(bytes_per_access(640, 10), 64);
        assert_eq!(bytes_per_access(641, 10), 65);
        assert_eq!(bytes_per_access(1, 3), 1);
        assert_eq!(bytes_per_access(0, 3), 0);
        assert_eq!(bytes_per_access(100, 0), 0);
        assert_eq!(bytes_per_access(u32::MAX, u32::MAX), 1);
        assert_eq!(bytes_per_access(u32::MAX, 2), 2_147_483_648);
    }

    #[test]
    fn test_scale_units() {
        assert_eq!(scale(0), (0, 0));
        assert_eq!(scale(1023), (1023, 0));
        assert_eq!(scale(1024), (1, 1));
        assert_eq!(scale(1024 * 1024 - 1), (1023, 1));
        assert_eq!(scale(1024 * 1024), (1, 2));
        assert_eq!(scale(1 << 30), (1, 3));
        assert_eq!(scale(u32::MAX), (3, 3));
    }

    #[test]
    fn test_scale_bounds() {
        let samples = [
            0u32, 1, 1000, 1023, 1024, 1025, 4095, 65_536, 1_000_000, 1_048_575,
            1_048_576, 123_456_789, 1 << 30, (1 << 30) + 1, 3_000_000_000, u32::MAX,
        ];
        for &bytes in samples.iter() {
            let (value, steps) = scale(bytes);
            assert!(steps <= 3);
            assert!(value <= 1023, "{} scaled to {}", bytes, value);

            let unit = 1024u64.pow(steps as u32);
            let v = u64::from(value);
            assert!(v * unit <= u64::from(bytes));
            assert!(u64::from(bytes) < (v + 1) * unit);
        }
    }

    #[test]
    fn test_human_units_independent() {
        let s = Snapshot {
            cycles: 10,
            busy_cycles: 10,
            read_accesses: 4,
            write_accesses: 1,
            read_bytes: 3 * 1024 * 1024 + 5,
            write_bytes: 100,
            overflow: false,
        };
        assert_eq!(
            format("MMDC0", &s, Mode::Human),
            "MMDC0 100.00% busy 3 MiB reads (786434 B / access) 100 B writes (100 B / access)"
        );
    }

    #[test]
    fn test_cycle_omits_idle_secondary() {
        let a = snap(10, 5);
        let idle = Snapshot::default();

        assert_eq!(
            format_cycle(("MMDC0", &a), Some(("MMDC1", &idle)), Mode::Raw),
            "MMDC0 50.00% busy 0 reads (0 bytes) 0 writes (0 bytes)"
        );
        assert_eq!(
            format_cycle(("MMDC0", &a), None, Mode::Raw),
            "MMDC0 50.00% busy 0 reads (0 bytes) 0 writes (0 bytes)"
        );
    }

    #[test]
    fn test_cycle_with_secondary() {
        let a = snap(10, 5);
        let b = snap(10, 1);

        assert_eq!(
            format_cycle(("MMDC0", &a), Some(("MMDC1", &b)), Mode::Raw),
            "MMDC0 50.00% busy 0 reads (0 bytes) 0 writes (0 bytes)\t\
             MMDC1 10.00% busy 0 reads (0 bytes) 0 writes (0 bytes)"
        );
    }
}
