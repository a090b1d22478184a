use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::provider::SessionKind;

/// The analyses the dashboard can produce
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisKind {
    FastestLap,
    Stints,
    SectorHeatmap,
    PaceComparison,
    PitWindows,
    TeamStrengthRace,
    TeamStrengthQualifying,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 7] = [
        AnalysisKind::FastestLap,
        AnalysisKind::Stints,
        AnalysisKind::SectorHeatmap,
        AnalysisKind::PaceComparison,
        AnalysisKind::PitWindows,
        AnalysisKind::TeamStrengthRace,
        AnalysisKind::TeamStrengthQualifying,
    ];

    /// Stable identifier used on the command line and in the config file
    pub fn id(&self) -> &'static str {
        match self {
            AnalysisKind::FastestLap => "bestlap",
            AnalysisKind::Stints => "stint",
            AnalysisKind::SectorHeatmap => "heatmap",
            AnalysisKind::PaceComparison => "ritmo",
            AnalysisKind::PitWindows => "pitwindow",
            AnalysisKind::TeamStrengthRace => "power_race",
            AnalysisKind::TeamStrengthQualifying => "power_qualify",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisKind::FastestLap => "🏁 Fastest Lap",
            AnalysisKind::Stints => "📊 Stints per Driver",
            AnalysisKind::SectorHeatmap => "🔥 Sector Heatmap",
            AnalysisKind::PaceComparison => "📈 Pace: 2 Drivers",
            AnalysisKind::PitWindows => "🛠 Pit Stop Windows",
            AnalysisKind::TeamStrengthRace => "🔮 Team Strength (Race)",
            AnalysisKind::TeamStrengthQualifying => "🔮 Team Strength (Qualifying)",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        AnalysisKind::ALL.into_iter().find(|k| k.id() == id)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        AnalysisKind::ALL.into_iter().find(|k| k.label() == label)
    }

    /// Whether the analysis works on the session picked in the session selector
    pub fn uses_selected_session(&self) -> bool {
        matches!(plan_for(*self).source, SessionSource::Selected)
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::from_id(s).ok_or_else(|| {
            format!(
                "unknown analysis '{}', expected one of: {}",
                s,
                AnalysisKind::ALL.map(|k| k.id()).join(", ")
            )
        })
    }
}

/// Where an analysis takes its laps from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionSource {
    /// The session chosen by the user
    Selected,
    /// Every free practice session of the event that can be loaded
    AllPractice,
    /// The event's qualifying session
    Qualifying,
    /// The event's race
    Race,
}

impl SessionSource {
    /// Sessions to load for this source, `None` when the user's choice is used
    pub fn fixed_sessions(&self) -> Option<&'static [SessionKind]> {
        match self {
            SessionSource::Selected => None,
            SessionSource::AllPractice => Some(&SessionKind::PRACTICE),
            SessionSource::Qualifying => Some(&[SessionKind::Q]),
            SessionSource::Race => Some(&[SessionKind::R]),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Aggregation {
    FastestLapPerDriver,
    StintComposition,
    SectorRows,
    PaceSeries,
    StintSegments,
    RacePaceStrength,
    QualifyingStrength,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartShape {
    Bar,
    StackedBar,
    Heatmap,
    Line,
    Timeline,
}

/// What to compute and draw for one analysis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewPlan {
    pub aggregations: &'static [Aggregation],
    pub source: SessionSource,
    pub chart: ChartShape,
    /// Whether the compound and driver filters apply
    pub filtered: bool,
    /// Whether the fastest-sector summary is shown alongside the chart
    pub sector_summary: bool,
}

pub fn plan_for(kind: AnalysisKind) -> ViewPlan {
    use Aggregation::*;

    match kind {
        AnalysisKind::FastestLap => ViewPlan {
            aggregations: &[FastestLapPerDriver],
            source: SessionSource::Selected,
            chart: ChartShape::Bar,
            filtered: true,
            sector_summary: true,
        },
        AnalysisKind::Stints => ViewPlan {
            aggregations: &[FastestLapPerDriver, StintComposition],
            source: SessionSource::Selected,
            chart: ChartShape::StackedBar,
            filtered: true,
            sector_summary: true,
        },
        AnalysisKind::SectorHeatmap => ViewPlan {
            aggregations: &[FastestLapPerDriver, SectorRows],
            source: SessionSource::Selected,
            chart: ChartShape::Heatmap,
            filtered: true,
            sector_summary: true,
        },
        AnalysisKind::PaceComparison => ViewPlan {
            aggregations: &[PaceSeries],
            source: SessionSource::Selected,
            chart: ChartShape::Line,
            filtered: true,
            sector_summary: true,
        },
        AnalysisKind::PitWindows => ViewPlan {
            aggregations: &[StintSegments],
            source: SessionSource::Race,
            chart: ChartShape::Timeline,
            filtered: false,
            sector_summary: false,
        },
        AnalysisKind::TeamStrengthRace => ViewPlan {
            aggregations: &[RacePaceStrength],
            source: SessionSource::AllPractice,
            chart: ChartShape::Bar,
            filtered: false,
            sector_summary: false,
        },
        AnalysisKind::TeamStrengthQualifying => ViewPlan {
            aggregations: &[QualifyingStrength],
            source: SessionSource::Qualifying,
            chart: ChartShape::Bar,
            filtered: false,
            sector_summary: false,
        },
    }
}

/// Looks up the plan for an analysis identifier; unknown identifiers have none.
pub fn plan_for_id(id: &str) -> Option<(AnalysisKind, ViewPlan)> {
    AnalysisKind::from_id(id).map(|k| (k, plan_for(k)))
}
