//! Duration codec.
//!
//! Converts a non-negative number of seconds to a compact human string and
//! back. Two renderings are supported:
//!
//! - compact (default): `"1h30m"`, `"2.500s"`, `"12s"`, `"250ms"`, `"5.25ms"`
//! - precise: zero-padded sub-day units with a `ms,μs` suffix on the
//!   seconds field, e.g. `"1h01m02.003,004s"`
//!
//! Anything below one millisecond is rendered in microseconds in both modes.
//! Days are calendar-free (one day is always 86 400 seconds).

use crate::error::{Result, TempoError};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const US_PER_MS: u64 = 1_000;
const US_PER_SEC: u64 = 1_000_000;
const US_PER_MIN: u64 = 60 * US_PER_SEC;
const US_PER_HOUR: u64 = 60 * US_PER_MIN;
const US_PER_DAY: u64 = 24 * US_PER_HOUR;

/// Format `seconds` as a human-readable duration.
///
/// Fails with [`TempoError::InvalidDuration`] for NaN, infinite or negative
/// input. Every finite non-negative input yields a non-empty string.
pub fn format_secs(seconds: f64, precise: bool) -> Result<String> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(TempoError::InvalidDuration(format!(
            "cannot format {seconds} seconds (must be finite and non-negative)"
        )));
    }
    Ok(render(seconds, precise))
}

/// Format a [`Duration`] using the compact rendering.
pub fn format_duration(duration: Duration) -> String {
    render(duration.as_secs_f64(), false)
}

/// Parse a duration string into seconds.
///
/// The grammar is a concatenation of `<number><unit>` tokens with units
/// `d`, `h`, `m`, `s`, `ms` and `μs` (`us` is accepted as an ASCII spelling
/// of `μs`). Each unit may appear at most once. A comma inside a number is a
/// digit-group separator (as produced by the precise rendering) and is
/// ignored.
pub fn parse_secs(input: &str) -> Result<f64> {
    let text = input.trim();
    if text.is_empty() {
        return Err(invalid(input, "empty duration"));
    }

    let mut seen: Vec<Unit> = Vec::with_capacity(6);
    let mut total = 0.0;
    let mut rest = text;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(invalid(input, "expected a number"));
        }
        let (number, tail) = rest.split_at(number_len);

        let (unit, tail) =
            Unit::strip_prefix(tail).ok_or_else(|| invalid(input, "expected a unit after number"))?;
        if seen.contains(&unit) {
            return Err(invalid(input, &format!("duplicate unit '{}'", unit.symbol())));
        }
        seen.push(unit);

        let value: f64 = number
            .replace(',', "")
            .parse()
            .map_err(|_| invalid(input, &format!("malformed number '{number}'")))?;
        total += unit.to_secs(value);
        rest = tail;
    }

    Ok(total)
}

/// Parse a duration string into a [`Duration`].
pub fn parse_duration(input: &str) -> Result<Duration> {
    let micros = (parse_secs(input)? * 1e6).round();
    if micros >= u64::MAX as f64 {
        return Err(invalid(input, "duration overflows"));
    }
    Ok(Duration::from_micros(micros as u64))
}

fn invalid(input: &str, reason: &str) -> TempoError {
    TempoError::InvalidDuration(format!("'{input}': {reason}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Day,
    Hour,
    Minute,
    Second,
    Milli,
    Micro,
}

impl Unit {
    /// Longest spellings first so that `ms` is never read as `m` + `s`.
    fn strip_prefix(text: &str) -> Option<(Unit, &str)> {
        const SPELLINGS: [(&str, Unit); 7] = [
            ("ms", Unit::Milli),
            ("μs", Unit::Micro),
            ("us", Unit::Micro),
            ("d", Unit::Day),
            ("h", Unit::Hour),
            ("m", Unit::Minute),
            ("s", Unit::Second),
        ];
        SPELLINGS
            .iter()
            .find_map(|(spelling, unit)| text.strip_prefix(spelling).map(|rest| (*unit, rest)))
    }

    fn to_secs(self, value: f64) -> f64 {
        match self {
            Unit::Day => value * 86_400.0,
            Unit::Hour => value * 3_600.0,
            Unit::Minute => value * 60.0,
            Unit::Second => value,
            Unit::Milli => value / 1e3,
            Unit::Micro => value / 1e6,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Unit::Day => "d",
            Unit::Hour => "h",
            Unit::Minute => "m",
            Unit::Second => "s",
            Unit::Milli => "ms",
            Unit::Micro => "μs",
        }
    }
}

/// Caller guarantees `seconds` is finite and non-negative.
fn render(seconds: f64, precise: bool) -> String {
    if seconds == 0.0 {
        return "0s".to_string();
    }
    if seconds < 0.001 {
        return format!("{}μs", trim_decimal(seconds * 1e6));
    }

    // `as` saturates, so absurdly large inputs still render.
    let total_us = (seconds * 1e6).round() as u64;
    if precise {
        render_precise(total_us)
    } else {
        render_compact(total_us)
    }
}

fn render_precise(total_us: u64) -> String {
    let days = total_us / US_PER_DAY;
    let rem = total_us % US_PER_DAY;
    let hours = rem / US_PER_HOUR;
    let minutes = rem % US_PER_HOUR / US_PER_MIN;
    let secs = rem % US_PER_MIN / US_PER_SEC;
    let frac = rem % US_PER_SEC;
    let (millis, micros) = (frac / US_PER_MS, frac % US_PER_MS);

    let head = if days > 0 {
        format!("{days}d{hours:02}h{minutes:02}m{secs:02}")
    } else if hours > 0 {
        format!("{hours}h{minutes:02}m{secs:02}")
    } else if minutes > 0 {
        format!("{minutes}m{secs:02}")
    } else {
        format!("{secs}")
    };
    format!("{head}.{millis:03},{micros:03}s")
}

fn render_compact(total_us: u64) -> String {
    if total_us < US_PER_SEC {
        let millis = total_us as f64 / US_PER_MS as f64;
        if millis < 10.0 {
            return format!("{}ms", trim_decimal(millis));
        }
        let millis = millis.round() as u64;
        return if millis < 1000 {
            format!("{millis}ms")
        } else {
            "1s".to_string()
        };
    }

    let mut days = total_us / US_PER_DAY;
    let rem = total_us % US_PER_DAY;
    let mut hours = rem / US_PER_HOUR;
    let mut minutes = rem % US_PER_HOUR / US_PER_MIN;
    let mut secs = rem % US_PER_MIN / US_PER_SEC;
    let frac_us = rem % US_PER_SEC;

    let mut millis = 0;
    if secs >= 10 {
        if frac_us >= US_PER_SEC / 2 {
            secs += 1;
        }
    } else {
        millis = (frac_us + US_PER_MS / 2) / US_PER_MS;
        if millis == 1000 {
            secs += 1;
            millis = 0;
        }
    }

    // Rounding carries.
    if secs == 60 {
        secs = 0;
        minutes += 1;
    }
    if minutes == 60 {
        minutes = 0;
        hours += 1;
    }
    if hours == 24 {
        hours = 0;
        days += 1;
    }

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days}d"));
    }
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    if millis > 0 {
        out.push_str(&format!("{secs}.{millis:03}s"));
    } else if secs > 0 || out.is_empty() {
        out.push_str(&format!("{secs}s"));
    }
    out
}

/// At most three decimals, trailing zeros removed.
fn trim_decimal(value: f64) -> String {
    let text = format!("{value:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// A [`Duration`] that reads and writes itself as a human string.
///
/// Used for configuration fields: `"1h30m"`, `"250ms"` and plain numbers of
/// seconds are all accepted when deserializing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HumanDuration(pub Duration);

impl HumanDuration {
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub const fn as_duration(&self) -> Duration {
        self.0
    }

    /// Shortest rendering that parses back to the same microsecond count.
    fn lossless_string(&self) -> String {
        let secs = self.0.as_secs_f64();
        let compact = render(secs, false);
        let exact = parse_secs(&compact)
            .map(|parsed| (parsed * 1e6).round() == (secs * 1e6).round())
            .unwrap_or(false);
        if exact {
            compact
        } else {
            render(secs, true)
        }
    }
}

impl From<Duration> for HumanDuration {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl From<HumanDuration> for Duration {
    fn from(value: HumanDuration) -> Self {
        value.0
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

impl FromStr for HumanDuration {
    type Err = TempoError;

    fn from_str(s: &str) -> Result<Self> {
        parse_duration(s).map(Self)
    }
}

impl Serialize for HumanDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.lossless_string())
    }
}

impl<'de> Deserialize<'de> for HumanDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct HumanDurationVisitor;

        impl Visitor<'_> for HumanDurationVisitor {
            type Value = HumanDuration;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a duration string such as \"1h30m\" or a number of seconds")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<HumanDuration, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<HumanDuration, E> {
                Ok(HumanDuration::from_secs(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<HumanDuration, E> {
                u64::try_from(v)
                    .map(HumanDuration::from_secs)
                    .map_err(|_| E::custom(format!("negative duration: {v}")))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<HumanDuration, E> {
                Duration::try_from_secs_f64(v)
                    .map(HumanDuration)
                    .map_err(E::custom)
            }
        }

        deserializer.deserialize_any(HumanDurationVisitor)
    }
}
