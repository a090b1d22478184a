use std::time::Duration;

use itertools::Itertools;
use serde::Serialize;

use super::aggregator::fastest_laps;
use crate::laps::{LapTable, format_gap};

/// Laps per driver averaged for the race pace projection
pub const RACE_PACE_LAPS: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeamStrength {
    pub team: String,
    /// Mean of the per-driver times feeding this team, in seconds
    pub time_s: f64,
    pub gap_to_leader_s: f64,
}

impl TeamStrength {
    pub fn gap_label(&self) -> String {
        format_gap(self.gap_to_leader_s)
    }
}

/// Averages per-driver times by team, sorts quickest first and computes the gap
/// to the quickest team.
pub fn rank_teams(driver_times: impl IntoIterator<Item = (String, Duration)>) -> Vec<TeamStrength> {
    let mut teams = driver_times
        .into_iter()
        .into_group_map()
        .into_iter()
        .map(|(team, times)| TeamStrength {
            team,
            time_s: times.iter().map(Duration::as_secs_f64).sum::<f64>() / times.len() as f64,
            gap_to_leader_s: 0.,
        })
        .sorted_by(|a, b| a.time_s.total_cmp(&b.time_s).then_with(|| a.team.cmp(&b.team)))
        .collect_vec();

    if let Some(leader_time) = teams.first().map(|t| t.time_s) {
        for team in &mut teams {
            team.gap_to_leader_s = team.time_s - leader_time;
        }
    }
    teams
}

/// Team strength from each driver's best qualifying lap.
pub fn qualifying_strength(qualifying: &LapTable) -> Vec<TeamStrength> {
    rank_teams(
        fastest_laps(qualifying)
            .into_iter()
            .filter_map(|lap| lap.lap_time.map(|t| (lap.team, t))),
    )
}

/// Race pace projection from practice running: each driver's
/// [`RACE_PACE_LAPS`] quickest laps across all practice sessions.
pub fn race_pace_strength(practice: &LapTable) -> Vec<TeamStrength> {
    let driver_times = practice
        .timed()
        .into_group_map_by(|l| l.driver.as_str())
        .into_values()
        .flat_map(|laps| {
            laps.into_iter()
                .filter_map(|l| l.lap_time.map(|t| (l.team.clone(), t)))
                .k_smallest_by_key(RACE_PACE_LAPS, |(_, t)| *t)
        })
        .collect_vec();
    rank_teams(driver_times)
}
