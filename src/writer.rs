use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::Serialize;

use crate::AnalystError;

/// Writes one JSON document per item, replacing the file if it exists.
pub fn write_json_lines<T: Serialize>(file: &Path, items: &[T]) -> Result<(), AnalystError> {
    let output = File::create(file).map_err(|e| AnalystError::WriterError {
        path: file.to_path_buf(),
        source: e,
    })?;
    let mut output_writer = BufWriter::new(output);
    for item in items {
        let line =
            serde_json::to_string(item).map_err(|e| AnalystError::SerializeError { source: e })?;
        writeln!(output_writer, "{}", line).map_err(|e| AnalystError::WriterError {
            path: file.to_path_buf(),
            source: e,
        })?;
    }
    output_writer
        .flush()
        .map_err(|e| AnalystError::WriterError {
            path: file.to_path_buf(),
            source: e,
        })
}

/// Writes a single pretty-printed JSON document.
pub fn write_json<T: Serialize + ?Sized>(file: &Path, value: &T) -> Result<(), AnalystError> {
    let output = File::create(file).map_err(|e| AnalystError::WriterError {
        path: file.to_path_buf(),
        source: e,
    })?;
    let mut output_writer = BufWriter::new(output);
    serde_json::to_writer_pretty(&mut output_writer, value)
        .map_err(|e| AnalystError::SerializeError { source: e })?;
    output_writer
        .flush()
        .map_err(|e| AnalystError::WriterError {
            path: file.to_path_buf(),
            source: e,
        })
}
