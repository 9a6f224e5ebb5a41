use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::leading_int;

static FULL_TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2})[.,](\d{3})$").expect("timestamp regex compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptCue {
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl TranscriptCue {
    pub fn contains(&self, time_ms: u64) -> bool {
        self.start_ms <= time_ms && time_ms < self.end_ms
    }
}

/// Malformed timestamps read as 0 instead of failing the whole document.
pub fn parse_cues(text: &str) -> Vec<TranscriptCue> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();
    let mut cues = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim().trim_start_matches('\u{FEFF}');
        if line.is_empty() || is_header(line) {
            i += 1;
            continue;
        }
        if is_metadata_block(line) {
            i = skip_block(&lines, i);
            continue;
        }

        let mut id = None;
        let mut timing = line;
        if !timing.contains("-->") {
            id = Some(line.to_string());
            i += 1;
            timing = lines.get(i).map(|l| l.trim()).unwrap_or_default();
        }

        if let Some((start_raw, end_raw)) = timing.split_once("-->") {
            let start_ms = parse_timestamp_ms(first_token(start_raw));
            let end_ms = parse_timestamp_ms(first_token(end_raw));
            i += 1;
            let mut text_lines = Vec::new();
            while i < lines.len() && !lines[i].trim().is_empty() {
                text_lines.push(lines[i]);
                i += 1;
            }
            cues.push(TranscriptCue {
                start_ms,
                end_ms,
                text: text_lines.join("\n"),
                id,
            });
        }

        while i < lines.len() && lines[i].trim().is_empty() {
            i += 1;
        }
    }

    cues.sort_by_key(|cue| cue.start_ms);
    debug!(cues = cues.len(), "transcript cues parsed");
    cues
}

pub fn parse_timestamp_ms(raw: &str) -> u64 {
    let raw = raw.trim();
    if let Some(caps) = FULL_TIMESTAMP_RE.captures(raw) {
        let part = |n: usize| caps.get(n).map(|m| component(m.as_str())).unwrap_or(0);
        return part(1) * 3_600_000 + part(2) * 60_000 + part(3) * 1000 + part(4);
    }
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() == 2 {
        let (secs, millis) = parts[1]
            .split_once(['.', ','])
            .unwrap_or((parts[1], ""));
        return component(parts[0]) * 60_000 + component(secs) * 1000 + component(millis);
    }
    0
}

/// Index of the cue playing at `time_ms`.
///
/// Falls back to the nearest index (clamped to the list) when `time_ms` is in
/// a gap or outside the transcript, so any non-empty list yields `Some`.
pub fn active_cue_index(cues: &[TranscriptCue], time_ms: u64) -> Option<usize> {
    if cues.is_empty() {
        return None;
    }
    let mut low = 0usize;
    let mut high = cues.len();
    while low < high {
        let mid = low + (high - low) / 2;
        let cue = &cues[mid];
        if time_ms < cue.start_ms {
            high = mid;
        } else if time_ms >= cue.end_ms {
            low = mid + 1;
        } else {
            return Some(mid);
        }
    }
    Some(low.min(cues.len() - 1))
}

pub fn filter_cues(cues: &[TranscriptCue], query: &str) -> Vec<usize> {
    let needle = query.trim();
    cues.iter()
        .enumerate()
        .filter(|(_, cue)| contains_ascii_ci(&cue.text, needle))
        .map(|(idx, _)| idx)
        .collect()
}

pub fn step_cue(cues: &[TranscriptCue], active: usize, delta: isize) -> Option<usize> {
    let last = cues.len().checked_sub(1)?;
    Some(active.saturating_add_signed(delta).min(last))
}

pub fn transcript_duration_ms(cues: &[TranscriptCue], media_duration_ms: Option<u64>) -> u64 {
    match media_duration_ms {
        Some(ms) if ms > 0 => ms,
        _ => cues.last().map(|cue| cue.end_ms).unwrap_or(0),
    }
}

pub fn remaining_in_cue(cues: &[TranscriptCue], active: usize, time_ms: u64) -> Option<u64> {
    let cue = cues.get(active)?;
    let remaining = cue.end_ms.checked_sub(time_ms)?;
    (remaining > 0).then_some(remaining)
}

fn is_header(line: &str) -> bool {
    line == "WEBVTT" || line.starts_with("WEBVTT ") || line.starts_with("WEBVTT\t")
}

fn is_metadata_block(line: &str) -> bool {
    ["NOTE", "STYLE", "REGION"].iter().any(|kw| {
        line.strip_prefix(kw)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', '\t']))
    })
}

fn skip_block(lines: &[&str], mut idx: usize) -> usize {
    while idx < lines.len() && !lines[idx].trim().is_empty() {
        idx += 1;
    }
    idx
}

// Cue settings may follow the timestamp on the timing line.
fn first_token(raw: &str) -> &str {
    raw.split_whitespace().next().unwrap_or_default()
}

fn component(raw: &str) -> u64 {
    leading_int(raw.trim()).map(u64::from).unwrap_or(0)
}

fn contains_ascii_ci(haystack: &str, needle: &str) -> bool {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.len() > h.len() {
        return false;
    }
    if n.is_empty() {
        return true;
    }
    h.windows(n.len())
        .any(|window| window.iter().zip(n).all(|(a, b)| a.eq_ignore_ascii_case(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(start_ms: u64, end_ms: u64) -> TranscriptCue {
        TranscriptCue {
            start_ms,
            end_ms,
            text: format!("{start_ms}-{end_ms}"),
            id: None,
        }
    }

    fn sample() -> Vec<TranscriptCue> {
        vec![cue(0, 1000), cue(1000, 2500), cue(3000, 4000)]
    }

    #[test]
    fn finds_cue_containing_time() {
        let cues = sample();
        assert_eq!(active_cue_index(&cues, 0), Some(0));
        assert_eq!(active_cue_index(&cues, 999), Some(0));
        assert_eq!(active_cue_index(&cues, 1000), Some(1));
        assert_eq!(active_cue_index(&cues, 1500), Some(1));
        assert_eq!(active_cue_index(&cues, 3999), Some(2));
    }

    #[test]
    fn gaps_and_out_of_range_clamp() {
        let cues = sample();
        let gap = active_cue_index(&cues, 2700).unwrap();
        assert!(gap == 1 || gap == 2);
        assert_eq!(active_cue_index(&cues, 60_000), Some(2));
        assert_eq!(active_cue_index(&[], 10), None);

        let late_start = vec![cue(500, 900)];
        assert_eq!(active_cue_index(&late_start, 100), Some(0));
    }

    #[test]
    fn parses_both_timestamp_shapes() {
        assert_eq!(parse_timestamp_ms("01:02:03.004"), 3_723_004);
        assert_eq!(parse_timestamp_ms("1:00:00.000"), 3_600_000);
        assert_eq!(parse_timestamp_ms("02:03.500"), 123_500);
        assert_eq!(parse_timestamp_ms("00:00:01,250"), 1_250);
        assert_eq!(parse_timestamp_ms("xx:03.500"), 3_500);
        assert_eq!(parse_timestamp_ms("garbage"), 0);
    }

    #[test]
    fn parses_blocks_with_and_without_ids() {
        let text = "WEBVTT\r\n\r\nintro\r\n00:01.000 --> 00:02.500 align:start\r\nKick-off!\r\nWe are under way.\r\n\r\n00:00.000 --> 00:01.000\r\nWelcome\r\n";
        let cues = parse_cues(text);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "Welcome");
        assert_eq!(cues[0].id, None);
        assert_eq!(cues[1].id.as_deref(), Some("intro"));
        assert_eq!(cues[1].start_ms, 1000);
        assert_eq!(cues[1].end_ms, 2500);
        assert_eq!(cues[1].text, "Kick-off!\nWe are under way.");
    }

    #[test]
    fn skips_note_blocks() {
        let text = "WEBVTT\n\nNOTE written by hand\nsecond note line\n\n00:00.000 --> 00:01.000\nHello\n";
        let cues = parse_cues(text);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Hello");
    }

    #[test]
    fn filter_is_case_insensitive_and_keeps_indices() {
        let mut cues = sample();
        cues[1].text = "GOAL for Lyon".to_string();
        assert_eq!(filter_cues(&cues, " goal "), vec![1]);
        assert_eq!(filter_cues(&cues, "   "), vec![0, 1, 2]);
    }

    #[test]
    fn step_and_duration_helpers() {
        let cues = sample();
        assert_eq!(step_cue(&cues, 0, -1), Some(0));
        assert_eq!(step_cue(&cues, 1, 1), Some(2));
        assert_eq!(step_cue(&cues, 2, 5), Some(2));
        assert_eq!(step_cue(&[], 0, 1), None);
        assert_eq!(transcript_duration_ms(&cues, None), 4000);
        assert_eq!(transcript_duration_ms(&cues, Some(0)), 4000);
        assert_eq!(transcript_duration_ms(&cues, Some(90_000)), 90_000);
        assert_eq!(remaining_in_cue(&cues, 1, 2000), Some(500));
        assert_eq!(remaining_in_cue(&cues, 1, 2500), None);
    }
}
