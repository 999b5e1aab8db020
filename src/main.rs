//! `mmdc-stat`: print i.MX6 DDR controller utilization once per interval.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use mmdc::filter::{self, FilterEntry};
use mmdc::{signal, Mode};

/// Longest supported sampling interval, in seconds.
const MAX_INTERVAL: i64 = 4;

/// Sample the i.MX6 MMDC profiling counters.
#[derive(Parser, Debug)]
#[command(name = "mmdc-stat", version, about, disable_help_flag = true)]
struct Cli {
    /// Output in human readable format.
    #[arg(short = 'h', long)]
    human: bool,

    /// Logging verbosity level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Interval in seconds (1-4), or an AXI master filter.
    #[arg(allow_negative_numbers = true)]
    interval: Option<String>,

    /// AXI master filter.
    filter: Option<String>,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

/// What the positional arguments select.
#[derive(Debug, PartialEq)]
struct Selection<'a> {
    interval: u64,
    filter: Option<&'a str>,
}

impl<'a> Selection<'a> {
    /// Interpret the positionals the way `imx6_ddrstat` always has: the first
    /// is an interval if it starts with a number, and only counts as a filter
    /// name when it is not numeric and stands alone.
    fn from_positionals(first: Option<&'a str>, second: Option<&'a str>) -> Result<Self> {
        let mut sel = Selection {
            interval: 1,
            filter: None,
        };

        if let Some(arg) = first {
            match leading_int(arg) {
                Some(n) if n > MAX_INTERVAL => {
                    bail!("interval {} s out of range (1-{})", n, MAX_INTERVAL)
                }
                Some(n) if n > 0 => sel.interval = n as u64,
                Some(_) => {}
                None if second.is_none() => sel.filter = Some(arg),
                None => {}
            }
        }
        if second.is_some() {
            sel.filter = second;
        }

        Ok(sel)
    }
}

/// Parse the integer at the start of `s`, `strtol` style: optional sign,
/// `0x` for hex, a leading `0` for octal. Trailing garbage is ignored.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (neg, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    // "0x" without a hex digit after it parses as the lone "0"
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .filter(|h| h.starts_with(|c: char| c.is_ascii_hexdigit()));

    let (radix, digits) = if let Some(h) = hex {
        (16, h)
    } else if s.starts_with('0') {
        (8, s)
    } else {
        (10, s)
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or_else(|| digits.len());
    if end == 0 {
        return None;
    }

    let n = i64::from_str_radix(&digits[..end], radix).unwrap_or(i64::MAX);
    Some(if neg { -n } else { n })
}

fn masters_help() -> String {
    let mut help = String::from("Possible AXI master filters:\n ");
    for name in mmdc::list_filter_names() {
        help.push(' ');
        help.push_str(name);
    }
    help
}

fn select_filter(name: &str) -> Option<&'static FilterEntry> {
    match filter::lookup(name) {
        Ok(entry) => {
            println!("filtering for AXI IDs from master '{}'", entry.name);
            Some(entry)
        }
        Err(_) => {
            println!("not filtering for AXI IDs. Possible AXI masters:");
            let names: Vec<_> = mmdc::list_filter_names().collect();
            println!("  {}", names.join(" "));
            None
        }
    }
}

fn main() -> Result<()> {
    let matches = Cli::command().after_help(masters_help()).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let filter = EnvFilter::try_new(&cli.log_level)
        .with_context(|| format!("invalid log level: {}", cli.log_level))?;
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let sel = Selection::from_positionals(cli.interval.as_deref(), cli.filter.as_deref())?;
    let entry = sel.filter.and_then(select_filter);
    let mode = if cli.human { Mode::Human } else { Mode::Raw };

    println!("interval {} s", sel.interval);

    let mut set = mmdc::initialize(entry).context("mapping MMDC registers")?;

    signal::watch_for(&[libc::SIGINT, libc::SIGTERM]);

    let interval = Duration::from_secs(sel.interval);
    while signal::pending().is_none() {
        let (first, second) = set.run_cycle(interval)?;

        if first.overflow {
            println!("overflow 0!");
        }
        if second.map_or(false, |s| s.overflow) {
            println!("overflow 1!");
        }
        if let Some(line) = set.render(mode) {
            println!("{}", line);
        }
    }

    info!(signal = ?signal::pending(), "stopping");

    Ok(())
}
