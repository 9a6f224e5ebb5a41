use serde::{Deserialize, Serialize};

use crate::clock::{MatchClock, parse_clock, parse_clock_strict};

pub const SECOND_YELLOW_LABEL: &str = "Second yellow → Red";
pub const HALF_TIME_LABEL: &str = "HT";
pub const FULL_TIME_LABEL: &str = "FT";
pub const HALF_TIME_CLOCK: &str = "45'";
pub const FULL_TIME_CLOCK: &str = "90'";
pub const UNKNOWN_TIME: &str = "?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawEventKind {
    Goal,
    YellowCard,
    RedCard,
    YellowRed,
    Substitution,
    Penalty,
}

impl RawEventKind {
    /// Match an analysis-service `type` string. Older service versions
    /// emit hyphenated names, so `-` and `_` are interchangeable.
    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_ascii_lowercase().replace('-', "_");
        match lowered.as_str() {
            "goal" => Some(Self::Goal),
            "yellow_card" => Some(Self::YellowCard),
            "red_card" => Some(Self::RedCard),
            "yellow_red" | "red_yellow_card" | "second_yellow" => Some(Self::YellowRed),
            "substitution" => Some(Self::Substitution),
            "penalty" => Some(Self::Penalty),
            _ => None,
        }
    }
}

/// A sanitized analysis-service event. Every field the service may omit is
/// already defaulted here, so downstream passes never look at raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub kind: RawEventKind,
    pub team: Option<String>,
    pub player: Option<String>,
    pub player_in: Option<String>,
    pub player_out: Option<String>,
    pub time: String,
    pub details: String,
    pub confidence: Option<f64>,
    pub label: Option<String>,
    pub score: Option<String>,
}

impl RawEvent {
    pub fn new(kind: RawEventKind, time: &str) -> Self {
        Self {
            kind,
            team: None,
            player: None,
            player_in: None,
            player_out: None,
            time: time.to_string(),
            details: String::new(),
            confidence: None,
            label: None,
            score: None,
        }
    }

    pub fn with_team(mut self, team: &str) -> Self {
        self.team = Some(team.to_string());
        self
    }

    pub fn with_player(mut self, player: &str) -> Self {
        self.player = Some(player.to_string());
        self
    }

    pub fn clock(&self) -> MatchClock {
        parse_clock(Some(&self.time))
    }

    pub fn time_label(&self) -> String {
        match parse_clock_strict(Some(&self.time)) {
            Some(clock) => clock.minute_label(),
            None => format!("{UNKNOWN_TIME}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn resolve(team: Option<&str>, home_team: &str) -> Option<Self> {
        team.map(|name| if name == home_team { Self::Home } else { Self::Away })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineEvent {
    Goal {
        time: String,
        team: Option<Side>,
        player: Option<String>,
        score: String,
    },
    YellowCard {
        time: String,
        team: Option<Side>,
        player: Option<String>,
    },
    RedCard {
        time: String,
        team: Option<Side>,
        player: Option<String>,
    },
    YellowRed {
        time: String,
        team: Option<Side>,
        player: Option<String>,
        label: String,
    },
    Substitution {
        time: String,
        team: Option<Side>,
        player_in: Option<String>,
        player_out: Option<String>,
    },
    Penalty {
        time: String,
        team: Option<Side>,
        player: Option<String>,
        score: String,
    },
    Half {
        time: String,
        label: String,
        score: String,
    },
    Full {
        time: String,
        label: String,
        score: String,
    },
}

impl TimelineEvent {
    pub fn half(score: String) -> Self {
        Self::Half {
            time: HALF_TIME_CLOCK.to_string(),
            label: HALF_TIME_LABEL.to_string(),
            score,
        }
    }

    pub fn full(score: String) -> Self {
        Self::Full {
            time: FULL_TIME_CLOCK.to_string(),
            label: FULL_TIME_LABEL.to_string(),
            score,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Goal { .. } => "goal",
            Self::YellowCard { .. } => "yellow_card",
            Self::RedCard { .. } => "red_card",
            Self::YellowRed { .. } => "yellow_red",
            Self::Substitution { .. } => "substitution",
            Self::Penalty { .. } => "penalty",
            Self::Half { .. } => "half",
            Self::Full { .. } => "full",
        }
    }

    pub fn time(&self) -> &str {
        match self {
            Self::Goal { time, .. }
            | Self::YellowCard { time, .. }
            | Self::RedCard { time, .. }
            | Self::YellowRed { time, .. }
            | Self::Substitution { time, .. }
            | Self::Penalty { time, .. }
            | Self::Half { time, .. }
            | Self::Full { time, .. } => time.as_str(),
        }
    }

    pub fn team(&self) -> Option<Side> {
        match self {
            Self::Goal { team, .. }
            | Self::YellowCard { team, .. }
            | Self::RedCard { team, .. }
            | Self::YellowRed { team, .. }
            | Self::Substitution { team, .. }
            | Self::Penalty { team, .. } => *team,
            Self::Half { .. } | Self::Full { .. } => None,
        }
    }

    pub fn score(&self) -> Option<&str> {
        match self {
            Self::Goal { score, .. }
            | Self::Penalty { score, .. }
            | Self::Half { score, .. }
            | Self::Full { score, .. } => Some(score.as_str()),
            _ => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::YellowRed { label, .. } | Self::Half { label, .. } | Self::Full { label, .. } => {
                Some(label.as_str())
            }
            _ => None,
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, Self::Half { .. } | Self::Full { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub final_score: String,
    pub events: Vec<TimelineEvent>,
}

pub fn score_line(home: u32, away: u32) -> String {
    format!("{home} - {away}")
}
