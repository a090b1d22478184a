use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{Compound, Lap, LapTable};

/// A contiguous run of laps by one driver on one tyre compound.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stint {
    pub driver: String,
    /// 1-based position of the stint within the driver's race
    pub stint_index: u32,
    pub compound: Compound,
    pub start_lap: u32,
    pub length_laps: u32,
}

impl Stint {
    /// Last lap number covered by the stint
    pub fn end_lap(&self) -> u32 {
        self.start_lap + self.length_laps - 1
    }
}

/// Splits one driver's laps into stints at every compound change.
///
/// `laps` must already be sorted by lap number. A stint closed by a compound
/// change spans up to the lap before the change; the final stint runs to the
/// highest lap number seen. Lap numbers are assumed unique per driver; a
/// repeated number across a compound change shortens the closed stint.
pub fn segment_driver_stints(driver: &str, laps: &[&Lap]) -> Vec<Stint> {
    let Some(first) = laps.first() else {
        return Vec::new();
    };

    let mut stints = Vec::new();
    let mut stint_start = first.lap_number;
    let mut stint_compound = first.compound;
    let mut prev_compound = first.compound;

    for lap in &laps[1..] {
        if lap.compound != prev_compound {
            stints.push(Stint {
                driver: driver.to_string(),
                stint_index: stints.len() as u32 + 1,
                compound: stint_compound,
                start_lap: stint_start,
                length_laps: lap.lap_number - stint_start,
            });
            stint_start = lap.lap_number;
            stint_compound = lap.compound;
        }
        prev_compound = lap.compound;
    }

    let max_lap = laps
        .iter()
        .map(|l| l.lap_number)
        .max()
        .unwrap_or(stint_start);
    stints.push(Stint {
        driver: driver.to_string(),
        stint_index: stints.len() as u32 + 1,
        compound: stint_compound,
        start_lap: stint_start,
        length_laps: max_lap - stint_start + 1,
    });
    stints
}

/// Segments every driver of a session, ordered by driver then stint index.
pub fn segment_session_stints(table: &LapTable) -> Vec<Stint> {
    table
        .laps
        .iter()
        .into_group_map_by(|l| l.driver.as_str())
        .into_iter()
        .sorted_by(|a, b| a.0.cmp(b.0))
        .flat_map(|(driver, laps)| {
            let ordered = laps
                .into_iter()
                .sorted_by_key(|l| l.lap_number)
                .collect_vec();
            segment_driver_stints(driver, &ordered)
        })
        .collect()
}
