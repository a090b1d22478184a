// Turns a dashboard request into an info box and a chart

pub mod aggregator;
pub mod chart;
pub mod team_strength;
pub mod view;

use itertools::Itertools;
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    AnalystError,
    laps::{Compound, Lap, LapFilter, LapTable, Sector, Stint, format_time, segment_session_stints},
    provider::{LapProvider, SessionKey, SessionKind},
};

pub use aggregator::{SectorSummary, fastest_laps, fastest_sectors};
pub use chart::{Chart, Rgb};
pub use team_strength::{TeamStrength, qualifying_strength, race_pace_strength};
pub use view::{AnalysisKind, ViewPlan, plan_for, plan_for_id};

use view::{Aggregation, ChartShape, SessionSource};

pub const PROMPT_SELECT_FILTERS: &str = "Select the filters and press Fetch!";
pub const NOT_ENOUGH_PRACTICE: &str = "Not enough data for a race projection!";
pub const NO_PRACTICE_DATA: &str = "No data for this practice!";
pub const NO_QUALIFYING_DATA: &str = "No qualifying data for this GP!";
pub const NO_PIT_WINDOW_DATA: &str = "No pit window data for this race!";
pub const SESSION_LOAD_ERROR: &str = "Error loading data for this session!";
pub const NO_SESSION_DATA: &str = "No data for this session!";
pub const PROMPT_TWO_DRIVERS: &str = "Select at least two drivers to compare pace.";

/// Everything the user picked in the controls, plus whether Fetch was pressed
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisRequest {
    pub triggered: bool,
    pub year: Option<i32>,
    pub event: Option<String>,
    pub session: Option<SessionKind>,
    pub analysis: String,
    pub compounds: Vec<Compound>,
    /// Selected drivers in selection order
    pub drivers: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisOutput {
    pub info: Option<SectorSummary>,
    pub chart: Chart,
}

impl AnalysisOutput {
    fn chart(chart: Chart) -> Self {
        Self { info: None, chart }
    }

    fn placeholder(title: &str) -> Self {
        Self::chart(Chart::placeholder(title))
    }
}

/// Runs one analysis. Provider failures never escape: they become placeholder
/// charts and are logged.
///
/// The analysis plan drives every step: its session source decides what gets
/// loaded, its aggregations what gets computed and its chart shape what gets
/// drawn.
pub fn run(provider: &dyn LapProvider, request: &AnalysisRequest) -> AnalysisOutput {
    info!(
        "Running analysis '{}' for {:?} {:?} {:?} (compounds: {:?}, drivers: {:?})",
        request.analysis,
        request.year,
        request.event,
        request.session,
        request.compounds,
        request.drivers
    );

    let (Some(year), Some(event), true) = (request.year, request.event.as_deref(), request.triggered)
    else {
        return AnalysisOutput::placeholder(PROMPT_SELECT_FILTERS);
    };

    let Some((kind, plan)) = plan_for_id(&request.analysis) else {
        warn!("Unknown analysis '{}'", request.analysis);
        return AnalysisOutput::chart(Chart::Blank);
    };
    debug!("Plan for {}: {:?}", kind, plan);

    let data = match load_source(provider, year, event, &plan, request) {
        Ok(data) => data,
        Err(title) => return AnalysisOutput::placeholder(title),
    };

    let info = match &data {
        SourceData::Session { laps, .. } if plan.sector_summary => Some(fastest_sectors(laps)),
        _ => None,
    };
    let chart = match aggregate(&plan, &data, &request.drivers) {
        Ok(aggregates) => draw(&plan, &aggregates),
        Err(title) => Chart::placeholder(title),
    };
    AnalysisOutput { info, chart }
}

/// Lap data loaded for a plan's session source
enum SourceData {
    /// The user's session, whole for the info box and filtered for the chart
    Session { laps: LapTable, filtered: LapTable },
    Practice(LapTable),
    Qualifying(LapTable),
    Race(Vec<Stint>),
}

fn load_source(
    provider: &dyn LapProvider,
    year: i32,
    event: &str,
    plan: &ViewPlan,
    request: &AnalysisRequest,
) -> Result<SourceData, &'static str> {
    let Some(sessions) = plan.source.fixed_sessions() else {
        let session = request.session.ok_or(PROMPT_SELECT_FILTERS)?;
        let key = SessionKey::new(year, event, session);
        let laps = provider.load_laps(&key).map_err(|e| {
            warn!("Failed to load {}: {}", key, e);
            SESSION_LOAD_ERROR
        })?;
        info!("Loaded {} laps for {}", laps.len(), key);
        if laps.is_empty() {
            return Err(NO_SESSION_DATA);
        }

        let filtered = if plan.filtered {
            LapFilter::new(request.compounds.iter().copied(), request.drivers.iter().cloned())
                .apply(&laps)
        } else {
            laps.clone()
        };
        debug!("{} laps left after filtering", filtered.len());
        return Ok(SourceData::Session { laps, filtered });
    };

    let keys = sessions
        .iter()
        .map(|session| SessionKey::new(year, event, *session))
        .collect_vec();
    match plan.source {
        SessionSource::AllPractice => {
            let practice = keys
                .iter()
                .filter_map(|key| {
                    provider
                        .load_laps(key)
                        .inspect_err(|e| warn!("Skipping {}: {}", key, e))
                        .ok()
                })
                .collect_vec();
            if practice.is_empty() {
                return Err(NOT_ENOUGH_PRACTICE);
            }
            info!("Loaded {} practice sessions for {} {}", practice.len(), year, event);
            Ok(SourceData::Practice(LapTable::concat(practice)))
        }
        SessionSource::Qualifying => {
            let qualifying = keys
                .iter()
                .map(|key| {
                    provider
                        .load_laps(key)
                        .inspect_err(|e| warn!("Failed to load {}: {}", key, e))
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| NO_QUALIFYING_DATA)?;
            Ok(SourceData::Qualifying(LapTable::concat(qualifying)))
        }
        SessionSource::Race => {
            let stints = keys
                .iter()
                .map(|key| {
                    race_stints(provider, key)
                        .inspect_err(|e| warn!("Failed to load stints for {}: {}", key, e))
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| NO_PIT_WINDOW_DATA)?;
            Ok(SourceData::Race(stints.into_iter().flatten().collect()))
        }
        SessionSource::Selected => Err(PROMPT_SELECT_FILTERS),
    }
}

/// Results of a plan's aggregations, filled in plan order
#[derive(Default)]
struct Aggregates {
    fastest: Vec<Lap>,
    composition: Vec<aggregator::CompoundUsage>,
    driver_order: Vec<String>,
    sector_rows: Vec<aggregator::SectorRow>,
    pace: Vec<aggregator::PaceSeries>,
    stints: Vec<Stint>,
    teams: Vec<TeamStrength>,
}

fn aggregate(plan: &ViewPlan, data: &SourceData, drivers: &[String]) -> Result<Aggregates, &'static str> {
    let mut out = Aggregates::default();
    for aggregation in plan.aggregations {
        match (aggregation, data) {
            (Aggregation::FastestLapPerDriver, SourceData::Session { filtered, .. }) => {
                out.fastest = fastest_laps(filtered);
            }
            (Aggregation::StintComposition, SourceData::Session { filtered, .. }) => {
                out.composition = aggregator::stint_composition(filtered, &out.fastest);
                out.driver_order = aggregator::driver_order(filtered, &out.fastest);
            }
            (Aggregation::SectorRows, SourceData::Session { .. }) => {
                out.sector_rows = aggregator::sector_rows(&out.fastest);
            }
            (Aggregation::PaceSeries, SourceData::Session { filtered, .. }) => {
                let [first, second, ..] = drivers else {
                    return Err(PROMPT_TWO_DRIVERS);
                };
                out.pace = [first, second]
                    .into_iter()
                    .map(|driver| aggregator::pace_series(filtered, driver))
                    .collect();
            }
            (Aggregation::StintSegments, SourceData::Race(stints)) => {
                if stints.is_empty() {
                    return Err(NO_PIT_WINDOW_DATA);
                }
                out.stints = stints
                    .iter()
                    .cloned()
                    .sorted_by(|a, b| a.driver.cmp(&b.driver).then(a.stint_index.cmp(&b.stint_index)))
                    .collect();
            }
            (Aggregation::RacePaceStrength, SourceData::Practice(practice)) => {
                out.teams = race_pace_strength(practice);
                if out.teams.is_empty() {
                    return Err(NO_PRACTICE_DATA);
                }
            }
            (Aggregation::QualifyingStrength, SourceData::Qualifying(qualifying)) => {
                out.teams = qualifying_strength(qualifying);
                if out.teams.is_empty() {
                    return Err(NO_QUALIFYING_DATA);
                }
            }
            (aggregation, _) => warn!("{:?} does not apply to the loaded sessions", aggregation),
        }
    }
    Ok(out)
}

fn draw(plan: &ViewPlan, aggregates: &Aggregates) -> Chart {
    match plan.chart {
        ChartShape::Bar if !aggregates.teams.is_empty() => {
            let (title, y_label) = match plan.source {
                SessionSource::AllPractice => (
                    "🔮 Team strength in race trim (gap to leader, practice averages)",
                    "Average pace (s)",
                ),
                _ => (
                    "🔮 Team strength in qualifying (gap to leader, best qualifying laps)",
                    "Average best lap (s)",
                ),
            };
            team_strength_chart(title, y_label, &aggregates.teams)
        }
        ChartShape::Bar => fastest_lap_chart(&aggregates.fastest),
        ChartShape::StackedBar => stint_chart(&aggregates.composition, &aggregates.driver_order),
        ChartShape::Heatmap => heatmap_chart(&aggregates.sector_rows),
        ChartShape::Line => pace_chart(&aggregates.pace),
        ChartShape::Timeline => pit_window_chart(&aggregates.stints),
    }
}

fn fastest_lap_chart(fastest: &[Lap]) -> Chart {
    if fastest.is_empty() {
        return Chart::placeholder(NO_SESSION_DATA);
    }

    let bars = fastest
        .iter()
        .map(|lap| chart::BarItem {
            label: lap.driver.clone(),
            value: lap.lap_time_s().unwrap_or_default(),
            color: chart::team_color(&lap.team),
            text: format_time(lap.lap_time),
            hover: format!(
                "Driver: {}\nTeam: {}\nCompound: {}\nLap time: {}",
                lap.driver,
                lap.team,
                lap.compound,
                format_time(lap.lap_time)
            ),
        })
        .collect_vec();
    let y_range = chart::padded_range(bars.iter().map(|b| b.value));

    Chart::Bar {
        title: "🏁 Fastest lap per driver".to_string(),
        y_label: "Best lap (s)".to_string(),
        bars,
        y_range,
    }
}

fn stint_chart(usage: &[aggregator::CompoundUsage], driver_order: &[String]) -> Chart {
    let categories = driver_order
        .iter()
        .filter(|driver| usage.iter().any(|u| &u.driver == *driver))
        .cloned()
        .collect();

    Chart::StackedBar {
        title: "📊 Stints per driver and compound".to_string(),
        y_label: "Laps".to_string(),
        categories,
        segments: usage
            .iter()
            .map(|u| chart::StackSegment {
                category: u.driver.clone(),
                series: u.compound.to_string(),
                value: u.laps as f64,
                color: chart::tyre_color(u.compound),
            })
            .collect(),
    }
}

fn heatmap_chart(rows: &[aggregator::SectorRow]) -> Chart {
    Chart::Heatmap {
        title: "🔥 Sector time heatmap".to_string(),
        columns: Sector::ALL.iter().map(|s| s.label().to_string()).collect(),
        rows: rows
            .iter()
            .map(|row| chart::HeatmapRow {
                label: row.driver.clone(),
                values: row.sectors.to_vec(),
            })
            .collect(),
    }
}

fn pace_chart(pace: &[aggregator::PaceSeries]) -> Chart {
    let [first, second, ..] = pace else {
        return Chart::placeholder(PROMPT_TWO_DRIVERS);
    };

    let series = [first, second]
        .into_iter()
        .flat_map(|pace| {
            let color = pace
                .team
                .as_deref()
                .map(chart::team_color)
                .unwrap_or(Rgb::FALLBACK_TEAM);
            [
                chart::Series {
                    name: pace.driver.clone(),
                    color,
                    points: pace.points.clone(),
                    is_trend: false,
                },
                chart::Series {
                    name: format!("{} (3-lap avg)", pace.driver),
                    color,
                    points: pace.trend.clone(),
                    is_trend: true,
                },
            ]
        })
        .collect();

    Chart::Line {
        title: format!("📈 Pace: {} vs {}", first.driver, second.driver),
        x_label: "Lap".to_string(),
        y_label: "Lap time (s)".to_string(),
        series,
    }
}

fn team_strength_chart(title: &str, y_label: &str, teams: &[TeamStrength]) -> Chart {
    let bars = teams
        .iter()
        .map(|t| chart::BarItem {
            label: t.team.clone(),
            value: t.time_s,
            color: chart::team_color(&t.team),
            text: t.gap_label(),
            hover: format!(
                "Team: {}\nAverage: {:.3}s\nGap to leader: {}",
                t.team,
                t.time_s,
                t.gap_label()
            ),
        })
        .collect_vec();
    let y_range = chart::padded_range(bars.iter().map(|b| b.value));

    Chart::Bar {
        title: title.to_string(),
        y_label: y_label.to_string(),
        bars,
        y_range,
    }
}

fn pit_window_chart(stints: &[Stint]) -> Chart {
    if stints.is_empty() {
        return Chart::placeholder(NO_PIT_WINDOW_DATA);
    }

    Chart::Timeline {
        title: "🛠 Pit windows and tyre strategy".to_string(),
        x_label: "Lap".to_string(),
        y_label: "Driver".to_string(),
        rows: stints.iter().map(|s| s.driver.clone()).dedup().collect(),
        bars: stints
            .iter()
            .map(|s| chart::TimelineBar {
                row: s.driver.clone(),
                label: s.compound.to_string(),
                base: s.start_lap as f64,
                length: s.length_laps as f64,
                color: chart::tyre_color(s.compound),
                hover: format!(
                    "Driver: {}\nStint: {}\nStart lap: {}\nLength: {} laps\nTyre: {}",
                    s.driver, s.stint_index, s.start_lap, s.length_laps, s.compound
                ),
            })
            .collect(),
    }
}

/// Stints of a race, from the provider when it has them and segmented from
/// the laps otherwise.
pub fn race_stints(provider: &dyn LapProvider, key: &SessionKey) -> Result<Vec<Stint>, AnalystError> {
    if let Some(stints) = provider.load_stints(key)? {
        debug!("Using {} provider stints for {}", stints.len(), key);
        return Ok(stints);
    }
    let laps = provider.load_laps(key)?;
    Ok(segment_session_stints(&laps))
}
