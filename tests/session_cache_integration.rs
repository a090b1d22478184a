// Integration tests for the lap cache and the analysis runner on top of it

use std::io::Write;

use chrono::{DateTime, TimeZone, Utc};
use f1analyst::analysis::{self, Chart};
use f1analyst::controls::{self, NOT_APPLICABLE};
use f1analyst::laps::loader;
use f1analyst::provider::available_events;
use f1analyst::{
    AnalysisRequest, AnalystError, Compound, FileCacheProvider, LapProvider, SessionKey,
    SessionKind, Stint,
};
use tempfile::{NamedTempFile, TempDir};

const EVENT: &str = "Bahrain Grand Prix";

// Sunday evening after the Bahrain race
fn after_race() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 2, 20, 0, 0).unwrap()
}

// Friday afternoon, between FP1 and FP2
fn friday_afternoon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 29, 14, 0, 0).unwrap()
}

const PRACTICE_CSV: &str = "\
Driver,Team,Compound,LapNumber,LapTime,Sector1Time,Sector2Time,Sector3Time,PitInTime
VER,Red Bull Racing,SOFT,1,0 days 00:01:31.500000,0 days 00:00:30.100000,0 days 00:00:31.000000,0 days 00:00:30.400000,
VER,Red Bull Racing,SOFT,2,0 days 00:01:31.200000,0 days 00:00:30.000000,0 days 00:00:30.900000,0 days 00:00:30.300000,
VER,Red Bull Racing,MEDIUM,3,0 days 00:01:33.000000,0 days 00:00:30.800000,0 days 00:00:31.400000,0 days 00:00:30.800000,0 days 01:02:03.000000
LEC,Ferrari,SOFT,1,91.1,29.9,31.1,30.1,
LEC,Ferrari,SOFT,2,,,,,
SAI,Ferrari,MEDIUM,1,91.9,30.2,31.3,30.4,
,,,,,,,,
";

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn race_weekend(dir: &TempDir) -> FileCacheProvider {
    let provider = FileCacheProvider::new(dir.path().join("cache"))
        .unwrap()
        .with_clock(after_race);

    let csv = write_csv(PRACTICE_CSV);
    let laps = loader::load_laps_csv(csv.path()).unwrap();
    for (session, start) in [
        (SessionKind::FP1, Utc.with_ymd_and_hms(2024, 2, 29, 11, 30, 0).unwrap()),
        (SessionKind::FP2, Utc.with_ymd_and_hms(2024, 2, 29, 15, 0, 0).unwrap()),
        (SessionKind::Q, Utc.with_ymd_and_hms(2024, 3, 1, 16, 0, 0).unwrap()),
    ] {
        provider
            .save_laps(&SessionKey::new(2024, EVENT, session), &laps)
            .unwrap();
        provider.register_session(2024, EVENT, session, start).unwrap();
    }
    provider
}

fn request(analysis: &str, session: Option<SessionKind>) -> AnalysisRequest {
    AnalysisRequest {
        triggered: true,
        year: Some(2024),
        event: Some(EVENT.to_string()),
        session,
        analysis: analysis.to_string(),
        ..Default::default()
    }
}

#[test]
fn test_csv_import_round_trips_through_cache() {
    let dir = TempDir::new().unwrap();
    let provider = race_weekend(&dir);

    let laps = provider
        .load_laps(&SessionKey::new(2024, EVENT, SessionKind::FP1))
        .unwrap();
    // the blank CSV row is dropped
    assert_eq!(laps.len(), 6);
    assert_eq!(laps.drivers(), vec!["LEC", "SAI", "VER"]);
    assert_eq!(laps.laps[2].compound, Compound::Medium);
    assert!(laps.laps[2].is_pit_in_lap());
    assert_eq!(laps.laps[4].lap_time, None);
    assert_eq!(
        f1analyst::laps::format_time(laps.laps[1].lap_time),
        "91s200ms"
    );
}

#[test]
fn test_schedule_drives_available_sessions() {
    let dir = TempDir::new().unwrap();
    let provider = race_weekend(&dir);

    let events = available_events(&provider, 2024, after_race()).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].1,
        vec![SessionKind::FP1, SessionKind::FP2, SessionKind::Q]
    );

    let events = available_events(&provider, 2024, friday_afternoon()).unwrap();
    assert_eq!(events[0].1, vec![SessionKind::FP1]);

    let options =
        controls::session_options(&provider, Some(2024), Some(EVENT), "power_qualify", after_race());
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].label, NOT_APPLICABLE);
}

#[test]
fn test_missing_session_is_not_found_or_not_yet_run() {
    let dir = TempDir::new().unwrap();
    let provider = race_weekend(&dir);
    provider
        .register_session(
            2024,
            EVENT,
            SessionKind::R,
            Utc.with_ymd_and_hms(2024, 3, 2, 19, 0, 0).unwrap(),
        )
        .unwrap();

    assert!(matches!(
        provider.load_laps(&SessionKey::new(2024, EVENT, SessionKind::R)),
        Err(AnalystError::SessionNotYetOccurred { .. })
    ));
    assert!(matches!(
        provider.load_laps(&SessionKey::new(2024, EVENT, SessionKind::FP3)),
        Err(AnalystError::SessionNotFound { .. })
    ));
}

#[test]
fn test_analyses_over_cached_sessions() {
    let dir = TempDir::new().unwrap();
    let provider = race_weekend(&dir);

    let output = analysis::run(&provider, &request("bestlap", Some(SessionKind::FP1)));
    let info = output.info.expect("sector summary");
    assert_eq!(
        info.lines()[0],
        "Sector 1: LEC Time: 29s900ms".to_string()
    );
    let Chart::Bar { bars, .. } = output.chart else {
        panic!("expected a bar chart");
    };
    assert_eq!(
        bars.iter().map(|b| b.label.as_str()).collect::<Vec<_>>(),
        vec!["LEC", "VER", "SAI"]
    );

    let output = analysis::run(&provider, &request("power_qualify", None));
    let Chart::Bar { bars, .. } = output.chart else {
        panic!("expected a bar chart");
    };
    // Ferrari: (91.1 + 91.9) / 2 = 91.5, Red Bull: 91.2
    assert_eq!(bars[0].label, "Red Bull Racing");
    assert_eq!(bars[1].text, "+0.300s");

    let output = analysis::run(&provider, &request("power_race", None));
    assert!(matches!(output.chart, Chart::Bar { .. }));

    let output = analysis::run(&provider, &request("pitwindow", None));
    assert_eq!(
        output.chart,
        Chart::placeholder(analysis::NO_PIT_WINDOW_DATA)
    );
}

#[test]
fn test_native_stints_are_used_for_pit_windows() {
    let dir = TempDir::new().unwrap();
    let provider = race_weekend(&dir);
    let race = SessionKey::new(2024, EVENT, SessionKind::R);

    let csv = write_csv(PRACTICE_CSV);
    provider
        .save_laps(&race, &loader::load_laps_csv(csv.path()).unwrap())
        .unwrap();
    let output = analysis::run(&provider, &request("pitwindow", None));
    let Chart::Timeline { rows, bars, .. } = output.chart else {
        panic!("expected a timeline");
    };
    assert_eq!(rows, vec!["LEC", "SAI", "VER"]);
    assert_eq!(bars.len(), 4);

    provider
        .save_stints(
            &race,
            &[Stint {
                driver: "HAM".to_string(),
                stint_index: 1,
                compound: Compound::Hard,
                start_lap: 1,
                length_laps: 57,
            }],
        )
        .unwrap();
    let output = analysis::run(&provider, &request("pitwindow", None));
    let Chart::Timeline { rows, .. } = output.chart else {
        panic!("expected a timeline");
    };
    assert_eq!(rows, vec!["HAM"]);
}

#[test]
fn test_report_output_serializes_to_json() {
    let dir = TempDir::new().unwrap();
    let provider = race_weekend(&dir);
    let output = analysis::run(&provider, &request("heatmap", Some(SessionKind::FP2)));

    let path = dir.path().join("report.json");
    f1analyst::writer::write_json(&path, &output).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["chart"]["kind"], "heatmap");
    assert_eq!(json["chart"]["rows"][0]["label"], "LEC");
    assert_eq!(json["info"]["sectors"][0]["driver"], "LEC");
}

#[test]
fn test_corrupt_lap_file_becomes_load_error_placeholder() {
    let dir = TempDir::new().unwrap();
    let provider = race_weekend(&dir);
    let key = SessionKey::new(2024, EVENT, SessionKind::FP2);
    let path = provider
        .save_laps(&key, &f1analyst::LapTable::default())
        .unwrap();
    std::fs::write(
        &path,
        r#"{"Driver":"VER","Team":"Red Bull Racing","Compound":"SOFT","LapNumber":1,"LapTime":1e300}"#,
    )
    .unwrap();

    assert!(matches!(
        provider.load_laps(&key),
        Err(AnalystError::LapLoaderError { .. })
    ));
    let output = analysis::run(&provider, &request("bestlap", Some(SessionKind::FP2)));
    assert_eq!(output.chart, Chart::placeholder(analysis::SESSION_LOAD_ERROR));
    assert!(output.info.is_none());

    // the race projection skips the unreadable practice session
    let output = analysis::run(&provider, &request("power_race", None));
    assert!(matches!(output.chart, Chart::Bar { .. }));

    std::fs::write(&path, "this is not json\n").unwrap();
    let output = analysis::run(&provider, &request("heatmap", Some(SessionKind::FP2)));
    assert_eq!(output.chart, Chart::placeholder(analysis::SESSION_LOAD_ERROR));
}

#[test]
fn test_import_of_out_of_range_csv_fails_cleanly() {
    let csv = write_csv(
        "Driver,Team,Compound,LapNumber,LapTime\nVER,Red Bull Racing,SOFT,1,1e30\n",
    );
    assert!(matches!(
        loader::load_laps_csv(csv.path()),
        Err(AnalystError::InvalidDuration { .. })
    ));
}
