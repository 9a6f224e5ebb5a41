use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing_subscriber::FmtSubscriber;

use match_timeline::clock::{format_duration, format_duration_precise};
use match_timeline::config::Settings;
use match_timeline::cues::{active_cue_index, filter_cues, parse_cues};
use match_timeline::payload::{build_timeline, parse_match_payload_json};

const USAGE: &str = "usage:
  match_timeline timeline <payload.json> [--home=NAME]
  match_timeline cues <file.vtt> [--at=MS] [--find=TEXT]";

fn main() -> Result<()> {
    let settings = Settings::from_env();
    let directives = std::env::var("RUST_LOG").ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(settings.log_filter(directives.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some((command, rest)) = args.split_first() else {
        bail!("{USAGE}");
    };
    match command.as_str() {
        "timeline" => run_timeline(&settings, rest),
        "cues" => run_cues(&settings, rest),
        other => bail!("unknown command `{other}`\n{USAGE}"),
    }
}

fn run_timeline(settings: &Settings, args: &[String]) -> Result<()> {
    let path = positional_path(args).context("missing payload path")?;
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read payload {}", path.display()))?;
    let mut payload = parse_match_payload_json(&raw).context("decode match payload")?;

    let home = flag_value(args, "--home=").or_else(|| settings.home_team_override.clone());
    if let Some(home) = home {
        payload.home_team = home;
    }

    let timeline = build_timeline(&payload);
    tracing::info!(
        home = %timeline.home_team,
        away = %timeline.away_team,
        events = timeline.events.len(),
        "timeline ready"
    );
    let json = serde_json::to_string_pretty(&timeline).context("serialize timeline")?;
    println!("{json}");
    Ok(())
}

fn run_cues(settings: &Settings, args: &[String]) -> Result<()> {
    let path = positional_path(args).context("missing subtitle path")?;
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read subtitles {}", path.display()))?;
    let cues = parse_cues(&raw);
    if cues.is_empty() {
        println!("No cues found.");
        return Ok(());
    }

    let at = match flag_value(args, "--at=") {
        Some(val) => Some(
            val.parse::<u64>()
                .with_context(|| format!("invalid --at value `{val}`"))?,
        ),
        None => None,
    };
    let active = at.and_then(|ms| active_cue_index(&cues, ms));
    let visible = match flag_value(args, "--find=") {
        Some(query) => filter_cues(&cues, &query),
        None => (0..cues.len()).collect(),
    };
    if visible.is_empty() {
        println!("No matching lines.");
        return Ok(());
    }

    for idx in visible {
        let cue = &cues[idx];
        let stamp = if settings.precise_times {
            format_duration_precise(cue.start_ms)
        } else {
            format_duration(cue.start_ms)
        };
        let marker = if active == Some(idx) { ">" } else { " " };
        println!("{marker} {stamp:>10}  {}", cue.text.replace('\n', " / "));
    }
    Ok(())
}

fn positional_path(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .find(|arg| !arg.starts_with("--"))
        .map(|arg| PathBuf::from(arg.trim()))
}

fn flag_value(args: &[String], prefix: &str) -> Option<String> {
    args.iter()
        .filter_map(|arg| arg.strip_prefix(prefix))
        .map(str::trim)
        .find(|val| !val.is_empty())
        .map(str::to_string)
}
