// Derived state of the dashboard selectors

use chrono::{DateTime, Datelike, Utc};
use log::warn;

use crate::{
    analysis::AnalysisKind,
    provider::{LapProvider, SessionKey, SessionKind, available_events},
};

/// Oldest season offered in the year selector
pub const FIRST_YEAR: i32 = 2010;

/// Label of the disabled session option shown for session-less analyses
pub const NOT_APPLICABLE: &str = "N/A";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOption {
    pub label: String,
    pub value: Option<SessionKind>,
    pub enabled: bool,
}

impl SessionOption {
    fn session(kind: SessionKind) -> Self {
        Self {
            label: kind.to_string(),
            value: Some(kind),
            enabled: true,
        }
    }

    fn not_applicable() -> Self {
        Self {
            label: NOT_APPLICABLE.to_string(),
            value: None,
            enabled: false,
        }
    }
}

/// Seasons from the current one back to [`FIRST_YEAR`].
pub fn year_options(now: DateTime<Utc>) -> Vec<i32> {
    (FIRST_YEAR..=now.year().max(FIRST_YEAR)).rev().collect()
}

/// Events of `year` with at least one finished session, in schedule order.
pub fn event_options(provider: &dyn LapProvider, year: Option<i32>, now: DateTime<Utc>) -> Vec<String> {
    let Some(year) = year else {
        return Vec::new();
    };
    match available_events(provider, year, now) {
        Ok(events) => events.into_iter().map(|(name, _)| name).collect(),
        Err(e) => {
            warn!("No events for {}: {}", year, e);
            Vec::new()
        }
    }
}

fn is_sessionless(analysis: &str) -> bool {
    AnalysisKind::from_id(analysis).is_some_and(|k| !k.uses_selected_session())
}

pub fn session_options(
    provider: &dyn LapProvider,
    year: Option<i32>,
    event: Option<&str>,
    analysis: &str,
    now: DateTime<Utc>,
) -> Vec<SessionOption> {
    let (Some(year), Some(event)) = (year, event) else {
        return Vec::new();
    };
    if is_sessionless(analysis) {
        return vec![SessionOption::not_applicable()];
    }
    match available_events(provider, year, now) {
        Ok(events) => events
            .into_iter()
            .find(|(name, _)| name == event)
            .map(|(_, sessions)| sessions.into_iter().map(SessionOption::session).collect())
            .unwrap_or_default(),
        Err(e) => {
            warn!("No sessions for {} {}: {}", year, event, e);
            Vec::new()
        }
    }
}

/// Drivers of the selected session, plus the current driver selection narrowed
/// to drivers that are still present (`None` when nothing is left).
pub fn driver_options(
    provider: &dyn LapProvider,
    year: Option<i32>,
    event: Option<&str>,
    session: Option<SessionKind>,
    analysis: &str,
    current: &[String],
) -> (Vec<String>, Option<Vec<String>>) {
    let (Some(year), Some(event), Some(session)) = (year, event, session) else {
        return (Vec::new(), None);
    };
    if is_sessionless(analysis) {
        return (Vec::new(), None);
    }

    let key = SessionKey::new(year, event, session);
    let drivers = match provider.load_laps(&key) {
        Ok(laps) => laps.drivers(),
        Err(e) => {
            warn!("No drivers for {}: {}", key, e);
            return (Vec::new(), None);
        }
    };
    let kept: Vec<String> = current
        .iter()
        .filter(|d| drivers.contains(d))
        .cloned()
        .collect();
    (drivers, (!kept.is_empty()).then_some(kept))
}

/// What is currently picked in the selectors. Setters apply the reset rules
/// between dependent selectors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    year: Option<i32>,
    event: Option<String>,
    session: Option<SessionKind>,
    analysis: String,
}

impl Selection {
    pub fn new(year: Option<i32>, analysis: impl Into<String>) -> Self {
        Self {
            year,
            analysis: analysis.into(),
            ..Default::default()
        }
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    pub fn session(&self) -> Option<SessionKind> {
        self.session
    }

    pub fn analysis(&self) -> &str {
        &self.analysis
    }

    pub fn set_year(&mut self, year: Option<i32>) {
        if self.year != year {
            self.year = year;
            self.event = None;
            self.session = None;
        }
    }

    pub fn set_event(&mut self, event: Option<String>) {
        if self.event != event {
            self.event = event;
            self.session = None;
        }
    }

    pub fn set_analysis(&mut self, analysis: impl Into<String>) {
        let analysis = analysis.into();
        if self.analysis != analysis {
            self.analysis = analysis;
            self.session = None;
        }
    }

    pub fn set_session(&mut self, session: Option<SessionKind>) {
        self.session = session;
    }
}
