use std::fs;
use std::path::PathBuf;

use match_timeline::clock::format_duration_precise;
use match_timeline::cues::{TranscriptCue, active_cue_index, filter_cues, parse_cues, step_cue};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_commentary_fixture() {
    let cues = parse_cues(&read_fixture("commentary.vtt"));
    assert_eq!(cues.len(), 5);
    assert_eq!(cues[0].id.as_deref(), Some("1"));
    assert_eq!(cues[1].end_ms, 9_000);
    assert_eq!(cues[3].id, None);
    assert_eq!(cues[3].text, "What a finish,\nright into the top corner.");
    assert_eq!(cues[4].start_ms, 3_723_000);
    assert!(cues.windows(2).all(|w| w[0].start_ms <= w[1].start_ms));
}

#[test]
fn lookup_follows_playback() {
    let cues = parse_cues(&read_fixture("commentary.vtt"));
    assert_eq!(active_cue_index(&cues, 5_000), Some(1));
    assert_eq!(active_cue_index(&cues, 16_000), Some(3));
    let gap = active_cue_index(&cues, 10_000).unwrap();
    assert!(gap == 1 || gap == 2);
    assert_eq!(active_cue_index(&cues, 10_000_000), Some(4));
}

#[test]
fn search_and_skip() {
    let cues = parse_cues(&read_fixture("commentary.vtt"));
    let hits = filter_cues(&cues, "goal");
    assert_eq!(hits, vec![2]);
    assert_eq!(step_cue(&cues, hits[0], 1), Some(3));
    assert_eq!(format_duration_precise(cues[2].start_ms), "00:12.500");
}

#[test]
fn cues_serialize_with_camel_case_keys() {
    let cue = TranscriptCue {
        start_ms: 0,
        end_ms: 1000,
        text: "Hi".to_string(),
        id: None,
    };
    let json = serde_json::to_value(&cue).unwrap();
    assert_eq!(json["startMs"], 0);
    assert_eq!(json["endMs"], 1000);
    assert!(json.get("id").is_none());
}
