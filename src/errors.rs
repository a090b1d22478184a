// Error types for f1analyst

use snafu::Snafu;
use std::{io, path::PathBuf};

#[derive(Debug, Snafu)]
pub enum AnalystError {
    // Errors for the session cache provider
    #[snafu(display("Session {session} of {event} {year} not found in the cache"))]
    SessionNotFound {
        year: i32,
        event: String,
        session: String,
    },
    #[snafu(display("Session {session} of {event} {year} has not taken place yet"))]
    SessionNotYetOccurred {
        year: i32,
        event: String,
        session: String,
    },
    #[snafu(display("No event schedule available for {year}"))]
    ScheduleNotFound { year: i32 },
    #[snafu(display("Error reading event schedule {path:?}"))]
    ScheduleReadError { path: PathBuf, source: io::Error },
    #[snafu(display("Error parsing event schedule {path:?}"))]
    ScheduleParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[snafu(display("Could not create session cache directory {path:?}"))]
    CacheDirError { path: PathBuf, source: io::Error },

    // Errors while loading lap tables
    #[snafu(display("Error loading lap table {path:?}"))]
    LapLoaderError { path: PathBuf, source: io::Error },
    #[snafu(display("Invalid lap record in {path:?} at line {line}: {reason}"))]
    InvalidLapRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    // Errors while importing CSV lap exports
    #[snafu(display("Error reading CSV lap export {path:?}"))]
    CsvImportError { path: PathBuf, source: csv::Error },
    #[snafu(display("Invalid duration '{value}' in column {column}"))]
    InvalidDuration { column: String, value: String },

    // Errors for the report and lap writers
    #[snafu(display("Error writing file {path:?}"))]
    WriterError { path: PathBuf, source: io::Error },
    #[snafu(display("Error serializing output"))]
    SerializeError { source: serde_json::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // UI errors
    #[snafu(display("Could not start the dashboard: {message}"))]
    DashboardError { message: String },

    // User input validation errors
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },
}
