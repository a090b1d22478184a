// Session cache provider backed by a local directory tree

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use super::{LapProvider, ScheduledEvent, ScheduledSession, SessionKey, SessionKind};
use crate::errors::AnalystError;
use crate::laps::{LapTable, Stint, loader};
use crate::writer;

const SCHEDULE_FILE_NAME: &str = "schedule.json";
const LAPS_EXTENSION: &str = "jsonl";
const STINTS_EXTENSION: &str = "stints.jsonl";

/// Reads lap tables and schedules from a cache directory laid out as
/// `<root>/<year>/schedule.json` and `<root>/<year>/<event>/<SESSION>.jsonl`.
pub struct FileCacheProvider {
    /// Root directory of the session cache
    cache_dir: PathBuf,
    /// Source of the current time, used to tell missing sessions from future ones
    clock: fn() -> DateTime<Utc>,
}

impl FileCacheProvider {
    /// Create a provider rooted at `cache_dir`, creating the directory if needed
    pub fn new(cache_dir: PathBuf) -> Result<Self, AnalystError> {
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir).map_err(|e| AnalystError::CacheDirError {
                path: cache_dir.clone(),
                source: e,
            })?;
        }

        Ok(Self {
            cache_dir,
            clock: Utc::now,
        })
    }

    /// Create a provider in the default application cache directory
    pub fn new_default() -> Result<Self, AnalystError> {
        Self::new(Self::default_cache_path()?)
    }

    /// Default location of the session cache
    pub fn default_cache_path() -> Result<PathBuf, AnalystError> {
        let cache_dir = dirs::cache_dir().ok_or(AnalystError::NoConfigDir)?;
        Ok(cache_dir.join("f1analyst"))
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Current time as seen by this provider
    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Normalize event name for consistent directory naming
    pub fn normalize_event_name(event: &str) -> String {
        event
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    }

    fn schedule_path(&self, year: i32) -> PathBuf {
        self.cache_dir.join(year.to_string()).join(SCHEDULE_FILE_NAME)
    }

    fn event_dir(&self, year: i32, event: &str) -> PathBuf {
        self.cache_dir
            .join(year.to_string())
            .join(Self::normalize_event_name(event))
    }

    fn laps_path(&self, key: &SessionKey) -> PathBuf {
        self.event_dir(key.year, &key.event)
            .join(format!("{}.{}", key.session, LAPS_EXTENSION))
    }

    fn stints_path(&self, key: &SessionKey) -> PathBuf {
        self.event_dir(key.year, &key.event)
            .join(format!("{}.{}", key.session, STINTS_EXTENSION))
    }

    /// Work out why a session has no lap file
    fn missing_session_error(&self, key: &SessionKey) -> AnalystError {
        let now = self.now();
        let scheduled_in_future = self
            .schedule(key.year)
            .ok()
            .and_then(|events| {
                events
                    .into_iter()
                    .find(|e| e.event_name == key.event)
                    .and_then(|e| e.sessions.into_iter().find(|s| s.kind == key.session))
            })
            .is_some_and(|s| !s.is_finished(now));

        if scheduled_in_future {
            key.not_yet_occurred()
        } else {
            key.not_found()
        }
    }

    /// Store a lap table for a session, replacing any previous one
    pub fn save_laps(&self, key: &SessionKey, table: &LapTable) -> Result<PathBuf, AnalystError> {
        let dir = self.event_dir(key.year, &key.event);
        fs::create_dir_all(&dir).map_err(|e| AnalystError::CacheDirError {
            path: dir.clone(),
            source: e,
        })?;
        let path = self.laps_path(key);
        writer::write_json_lines(&path, &table.laps)?;
        info!("Stored {} laps for {} in {:?}", table.len(), key, path);
        Ok(path)
    }

    /// Store a provider-computed stint table for a session
    pub fn save_stints(&self, key: &SessionKey, stints: &[Stint]) -> Result<PathBuf, AnalystError> {
        let dir = self.event_dir(key.year, &key.event);
        fs::create_dir_all(&dir).map_err(|e| AnalystError::CacheDirError {
            path: dir.clone(),
            source: e,
        })?;
        let path = self.stints_path(key);
        writer::write_json_lines(&path, stints)?;
        Ok(path)
    }

    /// Add or move a session in the season schedule
    pub fn register_session(
        &self,
        year: i32,
        event: &str,
        kind: SessionKind,
        start: DateTime<Utc>,
    ) -> Result<(), AnalystError> {
        let mut events = match self.schedule(year) {
            Ok(events) => events,
            Err(AnalystError::ScheduleNotFound { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };

        let position = match events.iter().position(|e| e.event_name == event) {
            Some(position) => position,
            None => {
                events.push(ScheduledEvent {
                    event_name: event.to_string(),
                    sessions: Vec::new(),
                });
                events.len() - 1
            }
        };
        let sessions = &mut events[position].sessions;
        sessions.retain(|s| s.kind != kind);
        sessions.push(ScheduledSession { kind, start });
        sessions.sort_by_key(|s| s.kind);

        events.sort_by_key(|e| e.sessions.first().map(|s| s.start));
        self.save_schedule(year, &events)
    }

    pub fn save_schedule(&self, year: i32, events: &[ScheduledEvent]) -> Result<(), AnalystError> {
        let path = self.schedule_path(year);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| AnalystError::CacheDirError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        writer::write_json(&path, &events)?;
        debug!("Saved schedule for {} with {} events", year, events.len());
        Ok(())
    }
}

impl LapProvider for FileCacheProvider {
    fn schedule(&self, year: i32) -> Result<Vec<ScheduledEvent>, AnalystError> {
        let path = self.schedule_path(year);
        if !path.exists() {
            debug!("Schedule file does not exist: {:?}", path);
            return Err(AnalystError::ScheduleNotFound { year });
        }

        let content = fs::read_to_string(&path).map_err(|e| AnalystError::ScheduleReadError {
            path: path.clone(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| AnalystError::ScheduleParseError { path, source: e })
    }

    fn load_laps(&self, key: &SessionKey) -> Result<LapTable, AnalystError> {
        let path = self.laps_path(key);
        if !path.exists() {
            debug!("Lap file does not exist: {:?}", path);
            return Err(self.missing_session_error(key));
        }
        loader::load_laps_jsonl(&path)
    }

    fn load_stints(&self, key: &SessionKey) -> Result<Option<Vec<Stint>>, AnalystError> {
        let path = self.stints_path(key);
        if !path.exists() {
            return Ok(None);
        }
        match loader::load_stints_jsonl(&path) {
            Ok(stints) => Ok(Some(stints)),
            Err(e) => {
                warn!("Ignoring unreadable stint table {:?}: {}", path, e);
                Ok(None)
            }
        }
    }
}
