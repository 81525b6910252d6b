//! Command-line front end: `--fast`, `--stop D U`, `--wait`.
//!
//! This mirrors `process_args()` in the reference implementation's
//! semantics, down to the prefix-matching rule for duration units
//! (`strncmp` against a fixed prefix length per unit, so `"sec"`, `"secs"`,
//! `"second"` and even `"secxyz"` all match, since only the fixed-length
//! prefix is ever compared, but `"se"` does not). It does not mirror that
//! function's single-dash, GNU-style flag spelling: CLI parsing is an
//! out-of-scope external collaborator per the spec, so this uses `clap`'s
//! ordinary double-dash long options instead of hand-rolling a
//! single-dash parser.

use anyhow::{bail, Context};
use clap::Parser;

use reactor_core::Interval;
use reactor_runtime::Config;

/// Parsed command-line arguments for a reactor program.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    /// Skip physical-time pacing in `wait_until`; run as fast as possible.
    #[arg(long = "fast")]
    pub fast: bool,

    /// Terminate after this much logical time, e.g. `-stop 500 msec`.
    #[arg(long = "stop", num_args = 2, value_names = ["DURATION", "UNIT"])]
    pub stop: Option<Vec<String>>,

    /// Do not terminate when the event queue empties; idle until the stop
    /// time (if any) is reached.
    #[arg(long = "wait")]
    pub wait: bool,
}

impl CliArgs {
    /// Build a [`Config`] from parsed arguments, resolving `-stop`'s two
    /// tokens into an [`Interval`].
    pub fn into_config(self) -> anyhow::Result<Config> {
        let stop_duration = match self.stop {
            Some(tokens) => {
                let [duration, unit] = <[String; 2]>::try_from(tokens)
                    .map_err(|_| anyhow::anyhow!("-stop takes exactly two arguments"))?;
                Some(parse_duration(&duration, &unit)?)
            }
            None => None,
        };

        let mut config = Config::new().fast(self.fast).wait(self.wait);
        if let Some(d) = stop_duration {
            config = config.stop_after(d);
        }
        Ok(config)
    }
}

/// Parse `process_args`'s `-stop D U` pair into an [`Interval`].
///
/// `D` must be a nonnegative 64-bit integer (the literal `"0"` is valid;
/// any other parse failure is an error). `U` is matched by prefix against
/// `nsec`, `usec`, `msec`, `sec`, `minute`, `hour`, `day`, `week`, each
/// with an optional trailing `s`, using the same prefix lengths as the
/// reference implementation: 3 characters for `sec`/`day`, 4 for
/// `msec`/`usec`/`nsec`/`hour`/`week`, 6 for `minute`.
pub fn parse_duration(duration: &str, unit: &str) -> anyhow::Result<Interval> {
    let magnitude: i64 = duration
        .parse()
        .with_context(|| format!("invalid duration value {duration:?}"))?;
    if magnitude < 0 {
        bail!("duration must be nonnegative, got {magnitude}");
    }

    let nanos_per_unit = unit_nanos(unit)
        .ok_or_else(|| anyhow::anyhow!("unrecognised duration unit {unit:?}"))?;

    Ok(Interval::from_nanos(magnitude * nanos_per_unit))
}

/// `strncmp(unit, name, len) == 0` semantics: only the fixed-length prefix
/// is compared, byte-for-byte and case-sensitively (`strncmp` does not
/// fold case), and whatever follows it (nothing, `"s"`, or any other
/// trailing text such as `"onds"`) is ignored, matching the reference
/// implementation's `strncmp` call exactly.
fn matches_prefix(unit: &str, name: &str, len: usize) -> bool {
    if unit.len() < len {
        return false;
    }
    unit.as_bytes()[..len] == name.as_bytes()[..len]
}

fn unit_nanos(unit: &str) -> Option<i64> {
    const NSEC: i64 = 1;
    const USEC: i64 = 1_000;
    const MSEC: i64 = 1_000_000;
    const SEC: i64 = 1_000_000_000;
    const MINUTE: i64 = 60 * SEC;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const WEEK: i64 = 7 * DAY;

    if matches_prefix(unit, "nsec", 4) {
        Some(NSEC)
    } else if matches_prefix(unit, "usec", 4) {
        Some(USEC)
    } else if matches_prefix(unit, "msec", 4) {
        Some(MSEC)
    } else if matches_prefix(unit, "hour", 4) {
        Some(HOUR)
    } else if matches_prefix(unit, "week", 4) {
        Some(WEEK)
    } else if matches_prefix(unit, "minute", 6) {
        Some(MINUTE)
    } else if matches_prefix(unit, "sec", 3) {
        Some(SEC)
    } else if matches_prefix(unit, "day", 3) {
        Some(DAY)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_unit_by_exact_name() {
        assert_eq!(parse_duration("1", "nsec").unwrap(), Interval::from_nanos(1));
        assert_eq!(parse_duration("1", "usec").unwrap(), Interval::from_nanos(1_000));
        assert_eq!(parse_duration("1", "msec").unwrap(), Interval::from_nanos(1_000_000));
        assert_eq!(parse_duration("1", "sec").unwrap(), Interval::from_nanos(1_000_000_000));
        assert_eq!(
            parse_duration("1", "minute").unwrap(),
            Interval::from_nanos(60_000_000_000)
        );
        assert_eq!(
            parse_duration("1", "hour").unwrap(),
            Interval::from_nanos(3_600_000_000_000)
        );
        assert_eq!(
            parse_duration("1", "day").unwrap(),
            Interval::from_nanos(86_400_000_000_000)
        );
        assert_eq!(
            parse_duration("1", "week").unwrap(),
            Interval::from_nanos(604_800_000_000_000)
        );
    }

    #[test]
    fn matches_by_prefix_ignoring_anything_past_it() {
        assert_eq!(parse_duration("2", "secs").unwrap(), Interval::from_nanos(2_000_000_000));
        // strncmp semantics: only the first 3 characters are compared, so
        // "seconds" matches "sec" the same as "secs" does.
        assert_eq!(parse_duration("2", "seconds").unwrap(), Interval::from_nanos(2_000_000_000));
        assert_eq!(
            parse_duration("3", "msecs").unwrap(),
            Interval::from_nanos(3_000_000)
        );
    }

    #[test]
    fn rejects_prefix_too_short() {
        assert!(parse_duration("1", "se").is_err());
        assert!(parse_duration("1", "mi").is_err());
    }

    #[test]
    fn rejects_uppercase_unit() {
        // strncmp is a byte comparison, not case-folding: "SEC" must not
        // match "sec".
        assert!(parse_duration("1", "SEC").is_err());
        assert!(parse_duration("1", "Sec").is_err());
    }

    #[test]
    fn zero_is_a_valid_duration() {
        assert_eq!(parse_duration("0", "sec").unwrap(), Interval::ZERO);
    }

    #[test]
    fn rejects_negative_and_non_numeric_durations() {
        assert!(parse_duration("-1", "sec").is_err());
        assert!(parse_duration("abc", "sec").is_err());
    }
}
