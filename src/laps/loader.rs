use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;

use super::{Compound, Lap, LapTable, Stint};
use crate::AnalystError;

/// On-disk layouts a lap table can come in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LapFileFormat {
    /// One JSON lap object per line, durations in float seconds
    JsonLines,
    /// Comma separated export with a header row, as written by pandas
    Csv,
}

pub fn load_laps_jsonl(source_file: &Path) -> Result<LapTable, AnalystError> {
    let laps = serde_jsonlines::json_lines(source_file)
        .map_err(|e| AnalystError::LapLoaderError {
            path: source_file.to_path_buf(),
            source: e,
        })?
        .collect::<Result<Vec<Lap>, std::io::Error>>()
        .map_err(|e| AnalystError::LapLoaderError {
            path: source_file.to_path_buf(),
            source: e,
        })?;

    if let Some((idx, _)) = laps.iter().enumerate().find(|(_, l)| l.lap_number == 0) {
        return Err(AnalystError::InvalidLapRecord {
            path: source_file.to_path_buf(),
            line: idx + 1,
            reason: "LapNumber must be at least 1".to_string(),
        });
    }

    let table = LapTable::new(laps);
    info!(
        "Loaded {:?}, found {} laps for {} drivers",
        source_file,
        table.len(),
        table.drivers().len()
    );
    Ok(table)
}

pub fn load_stints_jsonl(source_file: &Path) -> Result<Vec<Stint>, AnalystError> {
    let stints = serde_jsonlines::json_lines(source_file)
        .map_err(|e| AnalystError::LapLoaderError {
            path: source_file.to_path_buf(),
            source: e,
        })?
        .collect::<Result<Vec<Stint>, std::io::Error>>()
        .map_err(|e| AnalystError::LapLoaderError {
            path: source_file.to_path_buf(),
            source: e,
        })?;
    debug!("Loaded {} stints from {:?}", stints.len(), source_file);
    Ok(stints)
}

/// Guesses the format of a lap file by looking at its first line.
pub fn detect_lap_format(source_file: &Path) -> Option<LapFileFormat> {
    let file = File::open(source_file).ok()?;
    let mut reader = BufReader::new(file);
    let mut first_line = String::new();
    reader.read_line(&mut first_line).ok()?;

    let trimmed = first_line.trim_start();
    if trimmed.starts_with('{') {
        return serde_json::from_str::<serde_json::Value>(trimmed)
            .ok()
            .filter(|v| v.get("Driver").is_some())
            .map(|_| LapFileFormat::JsonLines);
    }

    let has_driver_column = trimmed.split(',').any(|c| c.trim() == "Driver");
    let has_lap_column = trimmed.split(',').any(|c| c.trim() == "LapNumber");
    (has_driver_column && has_lap_column).then_some(LapFileFormat::Csv)
}

#[derive(Debug, Deserialize)]
struct CsvLapRecord {
    #[serde(rename = "Driver")]
    driver: String,
    #[serde(rename = "Team", default)]
    team: String,
    #[serde(rename = "Compound", default)]
    compound: Option<String>,
    #[serde(rename = "LapNumber")]
    lap_number: Option<f64>,
    #[serde(rename = "LapTime", default)]
    lap_time: Option<String>,
    #[serde(rename = "Sector1Time", default)]
    sector1_time: Option<String>,
    #[serde(rename = "Sector2Time", default)]
    sector2_time: Option<String>,
    #[serde(rename = "Sector3Time", default)]
    sector3_time: Option<String>,
    #[serde(rename = "PitInTime", default)]
    pit_in_time: Option<String>,
}

/// Reads a CSV lap export. Rows without a lap number are skipped.
pub fn load_laps_csv(source_file: &Path) -> Result<LapTable, AnalystError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(source_file)
        .map_err(|e| AnalystError::CsvImportError {
            path: source_file.to_path_buf(),
            source: e,
        })?;

    let mut laps = Vec::new();
    for record in reader.deserialize::<CsvLapRecord>() {
        let raw = record.map_err(|e| AnalystError::CsvImportError {
            path: source_file.to_path_buf(),
            source: e,
        })?;
        let Some(lap_number) = raw.lap_number.filter(|n| *n >= 1.) else {
            debug!("Skipping {} row without a lap number", raw.driver);
            continue;
        };
        laps.push(Lap {
            driver: raw.driver,
            team: raw.team,
            compound: raw
                .compound
                .map(|c| c.parse().unwrap_or_default())
                .unwrap_or(Compound::Unknown),
            lap_number: lap_number.round() as u32,
            lap_time: parse_duration("LapTime", raw.lap_time.as_deref())?,
            sector1_time: parse_duration("Sector1Time", raw.sector1_time.as_deref())?,
            sector2_time: parse_duration("Sector2Time", raw.sector2_time.as_deref())?,
            sector3_time: parse_duration("Sector3Time", raw.sector3_time.as_deref())?,
            pit_in_time: parse_duration("PitInTime", raw.pit_in_time.as_deref())?,
        });
    }

    info!("Imported {} laps from {:?}", laps.len(), source_file);
    Ok(LapTable::new(laps))
}

/// Parses a duration cell. Accepts float seconds, `[D days ]HH:MM:SS[.ffffff]`
/// and `MM:SS[.fff]`. Empty cells and `NaT` are absent values.
pub fn parse_duration(column: &str, value: Option<&str>) -> Result<Option<Duration>, AnalystError> {
    let invalid = || AnalystError::InvalidDuration {
        column: column.to_string(),
        value: value.unwrap_or_default().to_string(),
    };

    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty() && *v != "NaT") else {
        return Ok(None);
    };

    if let Ok(seconds) = raw.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0. {
            return Err(invalid());
        }
        return Duration::try_from_secs_f64(seconds)
            .map(Some)
            .map_err(|_| invalid());
    }

    let (days, clock) = match raw.split_once(" days ").or_else(|| raw.split_once(" day ")) {
        Some((days, clock)) => (days.trim().parse::<u64>().map_err(|_| invalid())?, clock),
        None => (0, raw),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (
            h.parse::<u64>().map_err(|_| invalid())?,
            m.parse::<u64>().map_err(|_| invalid())?,
            s.parse::<f64>().map_err(|_| invalid())?,
        ),
        [m, s] => (
            0,
            m.parse::<u64>().map_err(|_| invalid())?,
            s.parse::<f64>().map_err(|_| invalid())?,
        ),
        _ => return Err(invalid()),
    };
    if !(0. ..60.).contains(&seconds) || minutes >= 60 {
        return Err(invalid());
    }

    let whole = days
        .checked_mul(86_400)
        .and_then(|d| hours.checked_mul(3_600).and_then(|h| d.checked_add(h)))
        .and_then(|s| s.checked_add(minutes * 60))
        .ok_or_else(invalid)?;
    Duration::from_secs(whole)
        .checked_add(Duration::from_secs_f64(seconds))
        .map(Some)
        .ok_or_else(invalid)
}
