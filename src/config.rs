use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

const LOG_VAR: &str = "MATCH_TIMELINE_LOG";
const PRECISE_TIMES_VAR: &str = "MATCH_TIMELINE_PRECISE_TIMES";
const HOME_TEAM_VAR: &str = "MATCH_TIMELINE_HOME_TEAM";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_level: Level,
    pub precise_times: bool,
    pub home_team_override: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            precise_times: true,
            home_team_override: None,
        }
    }
}

impl Settings {
    /// Load `.env.local` / `.env` (if present) and read settings from the environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let log_level = lookup(LOG_VAR)
            .and_then(|val| val.trim().parse::<Level>().ok())
            .unwrap_or(defaults.log_level);
        let precise_times = lookup(PRECISE_TIMES_VAR)
            .and_then(|val| parse_flag(&val))
            .unwrap_or(defaults.precise_times);
        let home_team_override = lookup(HOME_TEAM_VAR).filter(|val| !val.trim().is_empty());
        Self {
            log_level,
            precise_times,
            home_team_override,
        }
    }

    /// `log_level` as the default directive; `directives` (usually `RUST_LOG`)
    /// can raise or lower individual targets on top of it.
    pub fn log_filter(&self, directives: Option<&str>) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(self.log_level).into())
            .parse_lossy(directives.unwrap_or_default())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(settings(&[]), Settings::default());
    }

    #[test]
    fn reads_values() {
        let s = settings(&[
            (LOG_VAR, "debug"),
            (PRECISE_TIMES_VAR, "off"),
            (HOME_TEAM_VAR, "Lyon"),
        ]);
        assert_eq!(s.log_level, Level::DEBUG);
        assert!(!s.precise_times);
        assert_eq!(s.home_team_override.as_deref(), Some("Lyon"));
    }

    #[test]
    fn log_filter_starts_from_configured_level() {
        let s = settings(&[(LOG_VAR, "warn")]);
        assert_eq!(s.log_filter(None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            s.log_filter(Some("match_timeline=trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
        assert_eq!(
            Settings::default().log_filter(Some("")).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }

    #[test]
    fn bad_values_fall_back() {
        let s = settings(&[(LOG_VAR, "loud"), (PRECISE_TIMES_VAR, "maybe"), (HOME_TEAM_VAR, " ")]);
        assert_eq!(s, Settings::default());
    }
}
