use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use f1analyst::analysis::{aggregator, fastest_laps, race_pace_strength};
use f1analyst::laps::segment_session_stints;
use f1analyst::{Compound, Lap, LapFilter, LapTable};
use std::time::Duration;

const TEAMS: [&str; 10] = [
    "Red Bull Racing",
    "Ferrari",
    "Mercedes",
    "McLaren",
    "Aston Martin",
    "Alpine",
    "Williams",
    "RB",
    "Kick Sauber",
    "Haas F1 Team",
];

// 20 drivers, two per team, each running `laps_per_driver` laps with two stops
fn create_session(laps_per_driver: u32) -> LapTable {
    (0..20)
        .flat_map(|driver_no| {
            (1..=laps_per_driver).map(move |lap_number| {
                let compound = match lap_number * 3 / laps_per_driver.max(1) {
                    0 => Compound::Medium,
                    1 => Compound::Hard,
                    _ => Compound::Soft,
                };
                let lap_s = 90. + driver_no as f64 * 0.05 + (lap_number % 7) as f64 * 0.11;
                Lap {
                    driver: format!("D{:02}", driver_no),
                    team: TEAMS[driver_no / 2].to_string(),
                    compound,
                    lap_number,
                    lap_time: Some(Duration::from_secs_f64(lap_s)),
                    sector1_time: Some(Duration::from_secs_f64(lap_s * 0.31)),
                    sector2_time: Some(Duration::from_secs_f64(lap_s * 0.36)),
                    sector3_time: Some(Duration::from_secs_f64(lap_s * 0.33)),
                    ..Default::default()
                }
            })
        })
        .collect()
}

fn bench_session_aggregations(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_aggregations");

    for laps_per_driver in [20u32, 57, 100] {
        let session = create_session(laps_per_driver);

        group.bench_with_input(
            BenchmarkId::new("fastest_laps", laps_per_driver),
            &session,
            |b, session| b.iter(|| black_box(fastest_laps(session))),
        );

        group.bench_with_input(
            BenchmarkId::new("segment_stints", laps_per_driver),
            &session,
            |b, session| b.iter(|| black_box(segment_session_stints(session))),
        );

        group.bench_with_input(
            BenchmarkId::new("race_pace_strength", laps_per_driver),
            &session,
            |b, session| b.iter(|| black_box(race_pace_strength(session))),
        );
    }

    group.finish();
}

fn bench_filter_and_pace(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_and_pace");
    let session = create_session(57);

    group.bench_function("filter_two_drivers_soft_medium", |b| {
        let filter = LapFilter::new(
            [Compound::Soft, Compound::Medium],
            ["D00".to_string(), "D07".to_string()],
        );
        b.iter(|| black_box(filter.apply(&session)));
    });

    group.bench_function("pace_series_one_driver", |b| {
        b.iter(|| black_box(aggregator::pace_series(&session, "D03")));
    });

    group.finish();
}

criterion_group!(benches, bench_session_aggregations, bench_filter_and_pace);
criterion_main!(benches);
