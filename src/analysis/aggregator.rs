use std::time::Duration;

use itertools::Itertools;
use serde::Serialize;
use simple_moving_average::{SMA, SumTreeSMA};

use crate::laps::{Compound, Lap, LapTable, Sector, format_time};

/// Laps averaged by the pace trend line
const PACE_TREND_WINDOW: usize = 3;

/// Each driver's fastest timed lap, quickest first. Drivers without a timed
/// lap do not appear.
pub fn fastest_laps(table: &LapTable) -> Vec<Lap> {
    table
        .timed()
        .into_group_map_by(|l| l.driver.as_str())
        .into_values()
        .filter_map(|laps| laps.into_iter().min_by_key(|l| l.lap_time).cloned())
        .sorted_by(|a, b| a.lap_time.cmp(&b.lap_time).then_with(|| a.driver.cmp(&b.driver)))
        .collect()
}

/// Quickest time in one sector and who set it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectorBest {
    pub driver: String,
    #[serde(with = "crate::laps::optional_seconds")]
    pub time: Option<Duration>,
}

/// Session-wide best per sector, `None` where no lap has a time for it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectorSummary {
    pub sectors: [Option<SectorBest>; 3],
}

impl SectorSummary {
    pub fn lines(&self) -> Vec<String> {
        Sector::ALL
            .iter()
            .zip(&self.sectors)
            .map(|(sector, best)| match best {
                Some(best) => format!(
                    "{}: {} Time: {}",
                    sector.label(),
                    best.driver,
                    format_time(best.time)
                ),
                None => format!("{}: --", sector.label()),
            })
            .collect()
    }
}

pub fn fastest_sectors(table: &LapTable) -> SectorSummary {
    let best_for = |sector: Sector| {
        table
            .iter()
            .filter_map(|l| l.sector_time(sector).map(|t| (l, t)))
            .min_by_key(|(_, t)| *t)
            .map(|(lap, time)| SectorBest {
                driver: lap.driver.clone(),
                time: Some(time),
            })
    };
    SectorSummary {
        sectors: Sector::ALL.map(best_for),
    }
}

/// Number of laps a driver completed on one compound
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompoundUsage {
    pub driver: String,
    pub compound: Compound,
    pub laps: usize,
}

/// Lap counts per driver and compound. Drivers follow `ranking` order, with
/// drivers missing from it appended alphabetically.
pub fn stint_composition(table: &LapTable, ranking: &[Lap]) -> Vec<CompoundUsage> {
    let counts = table.laps.iter().counts_by(|l| (l.driver.clone(), l.compound));
    let order = driver_order(table, ranking);
    counts
        .into_iter()
        .sorted_by_key(|((driver, compound), _)| {
            let rank = order.iter().position(|d| d == driver).unwrap_or(usize::MAX);
            (rank, *compound)
        })
        .map(|((driver, compound), laps)| CompoundUsage {
            driver,
            compound,
            laps,
        })
        .collect()
}

/// Drivers in ranking order followed by unranked drivers alphabetically
pub fn driver_order(table: &LapTable, ranking: &[Lap]) -> Vec<String> {
    let mut order = ranking.iter().map(|l| l.driver.clone()).collect_vec();
    for driver in table.drivers() {
        if !order.contains(&driver) {
            order.push(driver);
        }
    }
    order
}

/// Sector times of a driver's fastest lap, in seconds
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectorRow {
    pub driver: String,
    pub sectors: [Option<f64>; 3],
}

/// Heatmap rows ordered by sector 1 time, drivers without one last
pub fn sector_rows(fastest: &[Lap]) -> Vec<SectorRow> {
    fastest
        .iter()
        .map(|lap| SectorRow {
            driver: lap.driver.clone(),
            sectors: Sector::ALL.map(|s| lap.sector_time(s).map(|t| t.as_secs_f64())),
        })
        .sorted_by(|a, b| match (a.sectors[0], b.sectors[0]) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        })
        .collect()
}

/// Race pace of one driver
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaceSeries {
    pub driver: String,
    pub team: Option<String>,
    /// (lap number, lap time in seconds)
    pub points: Vec<[f64; 2]>,
    /// Moving average of the lap times over the last few laps
    pub trend: Vec<[f64; 2]>,
}

/// Timed laps of `driver` that did not end in the pit lane, by lap number.
pub fn pace_series(table: &LapTable, driver: &str) -> PaceSeries {
    let laps = table
        .timed()
        .filter(|l| l.driver == driver && !l.is_pit_in_lap())
        .sorted_by_key(|l| l.lap_number)
        .collect_vec();

    let points = laps
        .iter()
        .filter_map(|l| l.lap_time_s().map(|t| [l.lap_number as f64, t]))
        .collect_vec();

    let mut window: SumTreeSMA<f64, f64, PACE_TREND_WINDOW> = SumTreeSMA::new();
    let trend = points
        .iter()
        .filter_map(|[lap, time]| {
            window.add_sample(*time);
            (window.get_num_samples() >= PACE_TREND_WINDOW).then(|| [*lap, window.get_average()])
        })
        .collect();

    PaceSeries {
        driver: driver.to_string(),
        team: laps.first().map(|l| l.team.clone()),
        points,
        trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::laps::test_support::lap;
    use proptest::prelude::*;

    fn with_sectors(mut lap: Lap, s1: Option<f64>, s2: Option<f64>, s3: Option<f64>) -> Lap {
        lap.sector1_time = s1.map(Duration::from_secs_f64);
        lap.sector2_time = s2.map(Duration::from_secs_f64);
        lap.sector3_time = s3.map(Duration::from_secs_f64);
        lap
    }

    #[test]
    fn test_fastest_laps_sorted_and_excludes_untimed_drivers() {
        let table = LapTable::new(vec![
            lap("VER", "Red Bull Racing", Compound::Soft, 1, Some(90.4)),
            lap("VER", "Red Bull Racing", Compound::Soft, 2, Some(89.9)),
            lap("LEC", "Ferrari", Compound::Soft, 1, Some(89.7)),
            lap("SAR", "Williams", Compound::Soft, 1, None),
        ]);
        let fastest = fastest_laps(&table);
        assert_eq!(
            fastest
                .iter()
                .map(|l| (l.driver.as_str(), l.lap_number))
                .collect_vec(),
            vec![("LEC", 1), ("VER", 2)]
        );
    }

    #[test]
    fn test_fastest_sectors_reports_missing_sector() {
        let table = LapTable::new(vec![
            with_sectors(
                lap("VER", "Red Bull Racing", Compound::Soft, 1, Some(90.)),
                Some(28.2),
                Some(31.0),
                None,
            ),
            with_sectors(
                lap("LEC", "Ferrari", Compound::Soft, 1, Some(90.)),
                Some(28.1),
                Some(31.3),
                None,
            ),
        ]);
        let summary = fastest_sectors(&table);
        assert_eq!(summary.sectors[0].as_ref().unwrap().driver, "LEC");
        assert_eq!(summary.sectors[1].as_ref().unwrap().driver, "VER");
        assert!(summary.sectors[2].is_none());
        assert_eq!(
            summary.lines(),
            vec![
                "Sector 1: LEC Time: 28s100ms".to_string(),
                "Sector 2: VER Time: 31s000ms".to_string(),
                "Sector 3: --".to_string(),
            ]
        );
    }

    #[test]
    fn test_stint_composition_follows_ranking() {
        let table = LapTable::new(vec![
            lap("VER", "Red Bull Racing", Compound::Medium, 1, Some(91.)),
            lap("VER", "Red Bull Racing", Compound::Medium, 2, Some(91.)),
            lap("VER", "Red Bull Racing", Compound::Soft, 3, Some(90.)),
            lap("LEC", "Ferrari", Compound::Soft, 1, Some(89.)),
            lap("ALB", "Williams", Compound::Hard, 1, None),
        ]);
        let ranking = fastest_laps(&table);
        let usage = stint_composition(&table, &ranking);
        assert_eq!(
            usage
                .iter()
                .map(|u| (u.driver.as_str(), u.compound, u.laps))
                .collect_vec(),
            vec![
                ("LEC", Compound::Soft, 1),
                ("VER", Compound::Soft, 1),
                ("VER", Compound::Medium, 2),
                ("ALB", Compound::Hard, 1),
            ]
        );
    }

    #[test]
    fn test_sector_rows_sorted_by_first_sector() {
        let fastest = vec![
            with_sectors(lap("VER", "Red Bull Racing", Compound::Soft, 1, Some(90.)), Some(28.3), Some(31.), Some(30.7)),
            with_sectors(lap("LEC", "Ferrari", Compound::Soft, 1, Some(90.1)), Some(28.1), Some(31.2), Some(30.8)),
            with_sectors(lap("NOR", "McLaren", Compound::Soft, 1, Some(90.2)), None, Some(31.1), Some(30.9)),
        ];
        let rows = sector_rows(&fastest);
        assert_eq!(rows.iter().map(|r| r.driver.as_str()).collect_vec(), vec!["LEC", "VER", "NOR"]);
        assert_eq!(rows[2].sectors[0], None);
    }

    #[test]
    fn test_pace_series_skips_pit_laps_and_builds_trend() {
        let mut pit_lap = lap("VER", "Red Bull Racing", Compound::Medium, 3, Some(110.));
        pit_lap.pit_in_time = Some(Duration::from_secs(4000));
        let table = LapTable::new(vec![
            lap("VER", "Red Bull Racing", Compound::Medium, 2, Some(92.)),
            lap("VER", "Red Bull Racing", Compound::Medium, 1, Some(95.)),
            pit_lap,
            lap("VER", "Red Bull Racing", Compound::Hard, 4, Some(93.)),
            lap("VER", "Red Bull Racing", Compound::Hard, 5, None),
            lap("LEC", "Ferrari", Compound::Medium, 1, Some(94.)),
        ]);
        let pace = pace_series(&table, "VER");
        assert_eq!(pace.team.as_deref(), Some("Red Bull Racing"));
        assert_eq!(pace.points, vec![[1., 95.], [2., 92.], [4., 93.]]);
        assert_eq!(pace.trend.len(), 1);
        assert_eq!(pace.trend[0][0], 4.);
        assert!((pace.trend[0][1] - 93.333_333).abs() < 1e-3);

        let nobody = pace_series(&table, "HAM");
        assert!(nobody.points.is_empty());
        assert_eq!(nobody.team, None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_fastest_laps_only_contains_timed_drivers(
            times in prop::collection::vec(prop::option::of(80.0f64..120.0), 1..40),
        ) {
            let drivers = ["VER", "LEC", "NOR", "HAM"];
            let table: LapTable = times
                .iter()
                .enumerate()
                .map(|(i, t)| lap(drivers[i % drivers.len()], "Team", Compound::Soft, i as u32 + 1, *t))
                .collect();
            let fastest = fastest_laps(&table);

            // Property: exactly the drivers with a timed lap appear, once each
            let timed_drivers = table.timed().map(|l| l.driver.clone()).sorted().dedup().collect_vec();
            let listed = fastest.iter().map(|l| l.driver.clone()).sorted().collect_vec();
            prop_assert_eq!(listed, timed_drivers);

            // Property: each entry is that driver's minimum and the list is ascending
            for best in &fastest {
                let min = table.timed().filter(|l| l.driver == best.driver).map(|l| l.lap_time).min().flatten();
                prop_assert_eq!(best.lap_time, min);
            }
            for pair in fastest.windows(2) {
                prop_assert!(pair[0].lap_time <= pair[1].lap_time);
            }
        }
    }
}
