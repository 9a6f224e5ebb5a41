use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, warn};

use crate::clock::MatchClock;
use crate::events::{
    RawEvent, RawEventKind, SECOND_YELLOW_LABEL, Side, Timeline, TimelineEvent, UNKNOWN_TIME,
    score_line,
};

/// Turn the analysis service's flat event list into an ordered timeline with
/// running score and HT/FT markers.
pub fn reconstruct(home_team: &str, raw_events: &[Value]) -> Timeline {
    reconstruct_events(home_team, sanitize_events(raw_events))
}

pub fn reconstruct_events(home_team: &str, events: Vec<RawEvent>) -> Timeline {
    let merged = merge_second_yellows(events);
    let ordered = order_by_clock(merged);
    let walk = ordered
        .iter()
        .fold(ScoreWalk::default(), |walk, event| walk.step(home_team, event))
        .finish();
    debug!(
        emitted = walk.events.len(),
        final_score = %walk.final_score,
        "timeline reconstructed"
    );
    walk
}

pub fn sanitize_events(raw_events: &[Value]) -> Vec<RawEvent> {
    let mut out = Vec::with_capacity(raw_events.len());
    for (idx, entry) in raw_events.iter().enumerate() {
        let Some(obj) = entry.as_object() else {
            warn!(index = idx, "dropping event that is not an object");
            continue;
        };
        let type_name = obj.get("type").and_then(|v| v.as_str()).unwrap_or_default();
        let Some(kind) = RawEventKind::parse(type_name) else {
            warn!(index = idx, event_type = type_name, "dropping event of unknown type");
            continue;
        };
        out.push(RawEvent {
            kind,
            team: text_field(entry, "team"),
            player: text_field(entry, "player"),
            player_in: text_field(entry, "player_in"),
            player_out: text_field(entry, "player_out"),
            time: clock_field(entry.get("time")).unwrap_or_else(|| UNKNOWN_TIME.to_string()),
            details: text_field(entry, "details").unwrap_or_default(),
            confidence: entry.get("confidence").and_then(|v| v.as_f64()),
            label: text_field(entry, "label"),
            score: text_field(entry, "score"),
        });
    }
    debug!(raw = raw_events.len(), kept = out.len(), "events sanitized");
    out
}

/// Collapse a yellow card and a red card given to the same player at the same
/// clock into a single second-yellow dismissal. Applying it twice is a no-op.
pub fn merge_second_yellows(events: Vec<RawEvent>) -> Vec<RawEvent> {
    let (promote, dropped) = {
        let mut groups: HashMap<(MatchClock, &str, &str), Vec<usize>> = HashMap::new();
        for (idx, event) in events.iter().enumerate() {
            let (Some(team), Some(player)) = (event.team.as_deref(), event.player.as_deref())
            else {
                continue;
            };
            groups
                .entry((event.clock(), team, player))
                .or_default()
                .push(idx);
        }

        let mut promote = Vec::new();
        let mut dropped = HashSet::new();
        for members in groups.values() {
            let first_of = |kind: RawEventKind| {
                members.iter().copied().find(|&i| events[i].kind == kind)
            };
            if let (Some(yellow), Some(red)) =
                (first_of(RawEventKind::YellowCard), first_of(RawEventKind::RedCard))
            {
                promote.push(red);
                dropped.insert(yellow);
            }
        }
        (promote, dropped)
    };
    if promote.is_empty() {
        return events;
    }
    debug!(merged = promote.len(), "second yellows merged");

    let mut events = events;
    for idx in promote {
        let event = &mut events[idx];
        event.kind = RawEventKind::YellowRed;
        if event.label.is_none() {
            event.label = Some(SECOND_YELLOW_LABEL.to_string());
        }
    }
    events
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| !dropped.contains(idx))
        .map(|(_, event)| event)
        .collect()
}

pub fn order_by_clock(mut events: Vec<RawEvent>) -> Vec<RawEvent> {
    // Stable: simultaneous events keep their upstream order.
    events.sort_by_cached_key(|event| event.clock().order_key());
    events
}

#[derive(Debug, Default)]
struct ScoreWalk {
    home: u32,
    away: u32,
    had_first_half: bool,
    inserted_half: bool,
    inserted_full: bool,
    events: Vec<TimelineEvent>,
}

impl ScoreWalk {
    fn step(mut self, home_team: &str, event: &RawEvent) -> Self {
        let clock = event.clock();
        if clock.base <= 45 {
            self.had_first_half = true;
        }
        if clock.base > 45 && self.had_first_half && !self.inserted_half {
            self.events.push(TimelineEvent::half(self.score()));
            self.inserted_half = true;
        }
        if clock.base > 90 && !self.inserted_full {
            self.events.push(TimelineEvent::full(self.score()));
            self.inserted_full = true;
        }

        let side = Side::resolve(event.team.as_deref(), home_team);
        let time = event.time_label();
        let player = event.player.clone();
        let emitted = match event.kind {
            RawEventKind::Goal => {
                self.credit(side);
                TimelineEvent::Goal {
                    time,
                    team: side,
                    player,
                    score: self.score(),
                }
            }
            RawEventKind::Penalty => {
                // A supplied score (shoot-outs, misses) is kept as given and
                // leaves the running tally alone.
                let score = match event.score.clone() {
                    Some(given) => given,
                    None => {
                        self.credit(side);
                        self.score()
                    }
                };
                TimelineEvent::Penalty {
                    time,
                    team: side,
                    player,
                    score,
                }
            }
            RawEventKind::YellowCard => TimelineEvent::YellowCard {
                time,
                team: side,
                player,
            },
            RawEventKind::RedCard => TimelineEvent::RedCard {
                time,
                team: side,
                player,
            },
            RawEventKind::YellowRed => TimelineEvent::YellowRed {
                time,
                team: side,
                player,
                label: event
                    .label
                    .clone()
                    .unwrap_or_else(|| SECOND_YELLOW_LABEL.to_string()),
            },
            RawEventKind::Substitution => TimelineEvent::Substitution {
                time,
                team: side,
                player_in: event.player_in.clone(),
                player_out: event.player_out.clone(),
            },
        };
        self.events.push(emitted);
        self
    }

    fn credit(&mut self, side: Option<Side>) {
        match side {
            Some(Side::Home) => self.home += 1,
            Some(Side::Away) => self.away += 1,
            None => {}
        }
    }

    fn score(&self) -> String {
        score_line(self.home, self.away)
    }

    fn finish(mut self) -> Timeline {
        if self.had_first_half && !self.inserted_half {
            self.events.push(TimelineEvent::half(self.score()));
        }
        if !self.inserted_full {
            self.events.push(TimelineEvent::full(self.score()));
        }
        Timeline {
            final_score: self.score(),
            events: self.events,
        }
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => match map.get("name") {
            Some(Value::String(name)) if !name.trim().is_empty() => Some(name.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn clock_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
