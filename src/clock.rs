use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

pub const CLOCK_KEY_SCALE: u64 = 60_000;

static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:\+(\d+))?$").expect("clock regex compiles"));

/// A match-clock instant: base minute plus stoppage (added) minutes.
///
/// Ordering is lexicographic, so `45+2` sorts after `45` and before `46`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchClock {
    pub base: u32,
    pub added: u32,
}

impl MatchClock {
    pub fn new(base: u32, added: u32) -> Self {
        Self { base, added }
    }

    pub fn order_key(self) -> u64 {
        clock_order_key(self.base, self.added)
    }

    pub fn minute_label(self) -> String {
        format!("{self}'")
    }
}

impl fmt::Display for MatchClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.added > 0 {
            write!(f, "{}+{}", self.base, self.added)
        } else {
            write!(f, "{}", self.base)
        }
    }
}

pub fn parse_clock(raw: Option<&str>) -> MatchClock {
    parse_clock_strict(raw).unwrap_or_default()
}

/// Oversized numbers saturate to `u32::MAX`, so they sort last.
pub fn parse_clock_strict(raw: Option<&str>) -> Option<MatchClock> {
    let cleaned: String = raw?
        .chars()
        .filter(|&c| !c.is_whitespace() && !matches!(c, '\'' | '\u{2019}' | '\u{2018}' | '"'))
        .collect();

    if let Some(caps) = CLOCK_RE.captures(&cleaned) {
        let base = caps.get(1).map(|m| saturating_digits(m.as_str())).unwrap_or(0);
        let added = caps.get(2).map(|m| saturating_digits(m.as_str())).unwrap_or(0);
        return Some(MatchClock::new(base, added));
    }

    leading_int(&cleaned).map(|base| MatchClock::new(base, 0))
}

pub fn clock_order_key(base: u32, added: u32) -> u64 {
    u64::from(base) * CLOCK_KEY_SCALE + u64::from(added)
}

pub fn format_duration(ms: u64) -> String {
    let total_secs = ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    if hours > 0 {
        format!("{hours:02}:{mins:02}:{secs:02}")
    } else {
        format!("{mins:02}:{secs:02}")
    }
}

pub fn format_duration_precise(ms: u64) -> String {
    let base = format_duration(ms);
    let millis = ms % 1000;
    if millis > 0 {
        format!("{base}.{millis:03}")
    } else {
        base
    }
}

pub(crate) fn leading_int(raw: &str) -> Option<u32> {
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    if end == 0 {
        return None;
    }
    Some(saturating_digits(&raw[..end]))
}

fn saturating_digits(digits: &str) -> u32 {
    digits.bytes().fold(0u32, |acc, b| {
        acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
    })
}
