use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, TimelineError};
use crate::events::{Timeline, TimelineEvent};
use crate::reconstruct::reconstruct;

/// The analysis service's response, reduced to what the timeline needs.
/// `score` and `players` are reported upstream but never trusted for the
/// timeline, which recomputes score from events.
#[derive(Debug, Clone)]
pub struct MatchPayload {
    pub home_team: String,
    pub away_team: String,
    pub reported_score: Option<Value>,
    pub events: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchTimeline {
    pub home_team: String,
    pub away_team: String,
    pub final_score: String,
    pub events: Vec<TimelineEvent>,
}

pub fn parse_match_payload_json(raw: &str) -> Result<MatchPayload> {
    let root: Value = serde_json::from_str(raw.trim())?;
    parse_match_payload(&root)
}

pub fn parse_match_payload(root: &Value) -> Result<MatchPayload> {
    if !root.is_object() {
        return Err(TimelineError::InvalidPayload(
            "payload is not an object".to_string(),
        ));
    }
    let analysis = match root.get("analysis") {
        Some(Value::Object(analysis)) => analysis,
        Some(_) => {
            return Err(TimelineError::InvalidPayload(
                "`analysis` is not an object".to_string(),
            ));
        }
        None => {
            return Err(TimelineError::InvalidPayload(
                "`analysis` is missing".to_string(),
            ));
        }
    };
    let events = match analysis.get("events") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(list)) => list.clone(),
        Some(_) => {
            return Err(TimelineError::InvalidPayload(
                "`analysis.events` is not an array".to_string(),
            ));
        }
    };

    Ok(MatchPayload {
        home_team: team_name(root, "home_team"),
        away_team: team_name(root, "away_team"),
        reported_score: root.get("score").cloned(),
        events,
    })
}

pub fn build_timeline(payload: &MatchPayload) -> MatchTimeline {
    let Timeline {
        final_score,
        events,
    } = reconstruct(&payload.home_team, &payload.events);
    MatchTimeline {
        home_team: payload.home_team.clone(),
        away_team: payload.away_team.clone(),
        final_score,
        events,
    }
}

fn team_name(root: &Value, key: &str) -> String {
    root.get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_default()
}
