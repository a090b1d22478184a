pub mod filter;
pub mod loader;
pub mod stints;

use std::{fmt, str::FromStr, time::Duration};

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use filter::LapFilter;
pub use stints::{Stint, segment_driver_stints, segment_session_stints};

/// Tyre compound fitted for a lap. Anything the provider reports outside the
/// known set is kept as `Unknown` and treated like any other compound value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Compound {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
    #[default]
    Unknown,
}

impl Compound {
    pub const ALL: [Compound; 6] = [
        Compound::Soft,
        Compound::Medium,
        Compound::Hard,
        Compound::Intermediate,
        Compound::Wet,
        Compound::Unknown,
    ];

    /// Compounds offered in the dry-weather compound filter
    pub const DRY: [Compound; 3] = [Compound::Soft, Compound::Medium, Compound::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Compound::Soft => "SOFT",
            Compound::Medium => "MEDIUM",
            Compound::Hard => "HARD",
            Compound::Intermediate => "INTERMEDIATE",
            Compound::Wet => "WET",
            Compound::Unknown => "UNKNOWN",
        }
    }

    /// Parses a compound for the compound filter, which only knows [`Compound::DRY`].
    pub fn parse_dry(value: &str) -> Result<Compound, String> {
        let compound: Compound = value.parse().unwrap_or_default();
        if Compound::DRY.contains(&compound) {
            Ok(compound)
        } else {
            Err(format!(
                "'{}' is not one of {}",
                value,
                Compound::DRY.iter().map(Compound::as_str).join(", ")
            ))
        }
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compound {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_uppercase().as_str() {
            "SOFT" => Compound::Soft,
            "MEDIUM" => Compound::Medium,
            "HARD" => Compound::Hard,
            "INTERMEDIATE" => Compound::Intermediate,
            "WET" => Compound::Wet,
            _ => Compound::Unknown,
        })
    }
}

impl Serialize for Compound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Compound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .map(|s| s.parse().unwrap_or_default())
            .unwrap_or_default())
    }
}

/// One of the three timed track segments
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sector {
    One,
    Two,
    Three,
}

impl Sector {
    pub const ALL: [Sector; 3] = [Sector::One, Sector::Two, Sector::Three];

    pub fn label(&self) -> &'static str {
        match self {
            Sector::One => "Sector 1",
            Sector::Two => "Sector 2",
            Sector::Three => "Sector 3",
        }
    }
}

/// A single timed lap as reported by the lap provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Lap {
    pub driver: String,
    pub team: String,
    #[serde(default)]
    pub compound: Compound,
    pub lap_number: u32,
    #[serde(default, with = "optional_seconds")]
    pub lap_time: Option<Duration>,
    #[serde(default, rename = "Sector1Time", with = "optional_seconds")]
    pub sector1_time: Option<Duration>,
    #[serde(default, rename = "Sector2Time", with = "optional_seconds")]
    pub sector2_time: Option<Duration>,
    #[serde(default, rename = "Sector3Time", with = "optional_seconds")]
    pub sector3_time: Option<Duration>,
    /// Session time at which the car entered the pit lane on this lap
    #[serde(default, with = "optional_seconds")]
    pub pit_in_time: Option<Duration>,
}

impl Lap {
    pub fn sector_time(&self, sector: Sector) -> Option<Duration> {
        match sector {
            Sector::One => self.sector1_time,
            Sector::Two => self.sector2_time,
            Sector::Three => self.sector3_time,
        }
    }

    pub fn lap_time_s(&self) -> Option<f64> {
        self.lap_time.map(|t| t.as_secs_f64())
    }

    pub fn is_pit_in_lap(&self) -> bool {
        self.pit_in_time.is_some()
    }
}

/// All laps of one session, in provider order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LapTable {
    pub laps: Vec<Lap>,
}

impl LapTable {
    pub fn new(laps: Vec<Lap>) -> Self {
        Self { laps }
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lap> {
        self.laps.iter()
    }

    /// Sorted, de-duplicated driver codes present in the table
    pub fn drivers(&self) -> Vec<String> {
        self.laps
            .iter()
            .map(|l| l.driver.clone())
            .sorted()
            .dedup()
            .collect()
    }

    /// Laps that carry a lap time
    pub fn timed(&self) -> impl Iterator<Item = &Lap> {
        self.laps.iter().filter(|l| l.lap_time.is_some())
    }

    /// Concatenates several tables, keeping the order of each source.
    pub fn concat(tables: impl IntoIterator<Item = LapTable>) -> LapTable {
        LapTable {
            laps: tables.into_iter().flat_map(|t| t.laps).collect(),
        }
    }
}

impl FromIterator<Lap> for LapTable {
    fn from_iter<T: IntoIterator<Item = Lap>>(iter: T) -> Self {
        Self {
            laps: iter.into_iter().collect(),
        }
    }
}

/// Formats a lap or sector time as `<seconds>s<millis>ms`, `--` when absent.
pub fn format_time(time: Option<Duration>) -> String {
    match time {
        Some(t) => {
            let total_ms = t.as_millis();
            format!("{}s{:03}ms", total_ms / 1000, total_ms % 1000)
        }
        None => "--".to_string(),
    }
}

/// Formats a gap to the leader for display, empty for the leader itself.
pub fn format_gap(gap_s: f64) -> String {
    if gap_s == 0. {
        String::new()
    } else {
        format!("+{:.3}s", gap_s)
    }
}

/// (De)serializes optional durations as float seconds, `null` when absent.
pub(crate) mod optional_seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        match Option::<f64>::deserialize(deserializer)? {
            Some(s) if s.is_finite() && s >= 0. => Duration::try_from_secs_f64(s)
                .map(Some)
                .map_err(|e| D::Error::custom(format!("duration {} out of range: {}", s, e))),
            _ => Ok(None),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(Some(Duration::from_millis(90_123))), "90s123ms");
        assert_eq!(format_time(Some(Duration::from_millis(28_005))), "28s005ms");
        assert_eq!(format_time(Some(Duration::from_micros(31_999_900))), "31s999ms");
        assert_eq!(format_time(None), "--");
    }

    #[test]
    fn test_compound_filter_accepts_dry_compounds_only() {
        assert_eq!(Compound::parse_dry("soft"), Ok(Compound::Soft));
        assert_eq!(Compound::parse_dry(" HARD "), Ok(Compound::Hard));
        assert_eq!(
            Compound::parse_dry("WET"),
            Err("'WET' is not one of SOFT, MEDIUM, HARD".to_string())
        );
        assert!(Compound::parse_dry("INTERMEDIATE").is_err());
        assert!(Compound::parse_dry("purple").is_err());
    }

    #[test]
    fn test_format_gap() {
        assert_eq!(format_gap(0.), "");
        assert_eq!(format_gap(0.5), "+0.500s");
        assert_eq!(format_gap(1.23456), "+1.235s");
    }

    #[test]
    fn test_lap_deserializes_provider_columns() {
        let lap: Lap = serde_json::from_str(
            r#"{"Driver":"VER","Team":"Red Bull Racing","Compound":"soft","LapNumber":3,"LapTime":90.125,"Sector1Time":28.5,"Sector2Time":null,"Sector3Time":30.0,"PitInTime":null}"#,
        )
        .unwrap();
        assert_eq!(lap.driver, "VER");
        assert_eq!(lap.compound, Compound::Soft);
        assert_eq!(lap.lap_number, 3);
        assert_eq!(lap.lap_time, Some(Duration::from_secs_f64(90.125)));
        assert_eq!(lap.sector2_time, None);
        assert!(!lap.is_pit_in_lap());
    }

    #[test]
    fn test_missing_or_odd_compound_is_unknown() {
        let missing: Lap =
            serde_json::from_str(r#"{"Driver":"HAM","Team":"Mercedes","LapNumber":1}"#).unwrap();
        assert_eq!(missing.compound, Compound::Unknown);
        assert_eq!(missing.lap_time, None);

        let odd: Lap = serde_json::from_str(
            r#"{"Driver":"HAM","Team":"Mercedes","Compound":"TEST_UNKNOWN","LapNumber":1}"#,
        )
        .unwrap();
        assert_eq!(odd.compound, Compound::Unknown);
    }

    #[test]
    fn test_drivers_sorted_unique() {
        let table: LapTable = ["NOR", "ALO", "NOR", "VER"]
            .iter()
            .map(|d| test_support::lap(d, "T", Compound::Soft, 1, None))
            .collect();
        assert_eq!(table.drivers(), vec!["ALO", "NOR", "VER"]);
    }
}
