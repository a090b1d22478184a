// Lap data provider interface and schedule types

pub mod file_cache;

use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    AnalystError,
    laps::{LapTable, Stint},
};

pub use file_cache::FileCacheProvider;

/// Sessions are treated as finished this long after their scheduled start
pub const SESSION_DURATION_HOURS: i64 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SessionKind {
    FP1,
    FP2,
    FP3,
    Q,
    R,
}

impl SessionKind {
    pub const ALL: [SessionKind; 5] = [
        SessionKind::FP1,
        SessionKind::FP2,
        SessionKind::FP3,
        SessionKind::Q,
        SessionKind::R,
    ];

    pub const PRACTICE: [SessionKind; 3] = [SessionKind::FP1, SessionKind::FP2, SessionKind::FP3];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::FP1 => "FP1",
            SessionKind::FP2 => "FP2",
            SessionKind::FP3 => "FP3",
            SessionKind::Q => "Q",
            SessionKind::R => "R",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = AnalystError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AnalystError::InvalidUserInput {
                field: "session".to_string(),
                reason: format!("'{}' is not one of FP1, FP2, FP3, Q, R", s),
            })
    }
}

/// Identifies one session of one Grand Prix weekend
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub year: i32,
    pub event: String,
    pub session: SessionKind,
}

impl SessionKey {
    pub fn new(year: i32, event: impl Into<String>, session: SessionKind) -> Self {
        Self {
            year,
            event: event.into(),
            session,
        }
    }

    pub(crate) fn not_found(&self) -> AnalystError {
        AnalystError::SessionNotFound {
            year: self.year,
            event: self.event.clone(),
            session: self.session.to_string(),
        }
    }

    pub(crate) fn not_yet_occurred(&self) -> AnalystError {
        AnalystError::SessionNotYetOccurred {
            year: self.year,
            event: self.event.clone(),
            session: self.session.to_string(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.year, self.event, self.session)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSession {
    pub kind: SessionKind,
    pub start: DateTime<Utc>,
}

impl ScheduledSession {
    pub fn end(&self) -> DateTime<Utc> {
        self.start + ChronoDuration::hours(SESSION_DURATION_HOURS)
    }

    pub fn is_finished(&self, now: DateTime<Utc>) -> bool {
        self.end() < now
    }
}

/// One Grand Prix weekend in a season schedule
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub event_name: String,
    #[serde(default)]
    pub sessions: Vec<ScheduledSession>,
}

impl ScheduledEvent {
    /// Sessions of this event that have already finished, in weekend order
    pub fn finished_sessions(&self, now: DateTime<Utc>) -> Vec<SessionKind> {
        let mut finished: Vec<SessionKind> = self
            .sessions
            .iter()
            .filter(|s| s.is_finished(now))
            .map(|s| s.kind)
            .collect();
        finished.sort();
        finished.dedup();
        finished
    }
}

/// Source of lap timing data. Implementations own any caching they do.
pub trait LapProvider {
    /// Event schedule of a season, in calendar order
    fn schedule(&self, year: i32) -> Result<Vec<ScheduledEvent>, AnalystError>;

    /// Lap table of one session
    fn load_laps(&self, key: &SessionKey) -> Result<LapTable, AnalystError>;

    /// Stint table computed by the data source itself, when it has one
    fn load_stints(&self, _key: &SessionKey) -> Result<Option<Vec<Stint>>, AnalystError> {
        Ok(None)
    }
}

/// Events of a season with at least one finished session, and those sessions.
pub fn available_events(
    provider: &dyn LapProvider,
    year: i32,
    now: DateTime<Utc>,
) -> Result<Vec<(String, Vec<SessionKind>)>, AnalystError> {
    Ok(provider
        .schedule(year)?
        .into_iter()
        .filter_map(|event| {
            let sessions = event.finished_sessions(now);
            (!sessions.is_empty()).then_some((event.event_name, sessions))
        })
        .collect())
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_session_kind_parsing() {
        assert_eq!("fp2".parse::<SessionKind>().unwrap(), SessionKind::FP2);
        assert_eq!(" R ".parse::<SessionKind>().unwrap(), SessionKind::R);
        assert!(matches!(
            "Sprint".parse::<SessionKind>(),
            Err(AnalystError::InvalidUserInput { .. })
        ));
    }

    #[test]
    fn test_session_finishes_two_hours_after_start() {
        let session = ScheduledSession {
            kind: SessionKind::Q,
            start: utc(2024, 3, 2, 14),
        };
        assert!(!session.is_finished(utc(2024, 3, 2, 15)));
        assert!(!session.is_finished(utc(2024, 3, 2, 16)));
        assert!(session.is_finished(utc(2024, 3, 2, 17)));
    }

    #[test]
    fn test_available_events_only_lists_finished_sessions() {
        let mut provider = MemoryProvider::default();
        provider.schedules.insert(
            2024,
            vec![
                weekend("Bahrain Grand Prix", 2024, 3, 1),
                weekend("Saudi Arabian Grand Prix", 2024, 3, 8),
            ],
        );

        // Saturday evening of the Bahrain weekend
        let events = available_events(&provider, 2024, utc(2024, 3, 2, 20)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "Bahrain Grand Prix");
        assert_eq!(
            events[0].1,
            vec![SessionKind::FP1, SessionKind::FP2, SessionKind::FP3, SessionKind::Q]
        );
    }

    #[test]
    fn test_available_events_propagates_missing_schedule() {
        let provider = MemoryProvider::default();
        assert!(matches!(
            available_events(&provider, 2019, utc(2024, 1, 1, 0)),
            Err(AnalystError::ScheduleNotFound { year: 2019 })
        ));
    }
}
