//! Fixture export.
//!
//! Writes the resolved matches as a JSON array (4-space indent, UTF-8 kept
//! verbatim) or as CSV with the same columns:
//! `competition, date, home, away, venue`.
//!
//! Output goes to a sibling temporary file that is renamed into place once
//! complete, so a failed export never leaves a partial file behind.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Serialize;

use crate::error::Result;
use crate::models::ResolvedMatch;

const CSV_HEADER: [&str; 5] = ["competition", "date", "home", "away", "venue"];

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    /// Guesses the format from a file extension (JSON unless `.csv`).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

/// Serializes matches as a pretty JSON array with 4-space indentation.
pub fn to_json_string(matches: &[ResolvedMatch]) -> Result<String> {
    let mut buf = Vec::new();
    write_json(&mut buf, matches)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_json<W: Write>(writer: W, matches: &[ResolvedMatch]) -> Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
    matches.serialize(&mut ser)?;
    Ok(())
}

fn write_csv<W: Write>(writer: W, matches: &[ResolvedMatch]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for m in matches {
        csv_writer.serialize(m)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes `matches` to `path` in `format`, replacing any existing file.
pub fn write_fixture(path: &Path, matches: &[ResolvedMatch], format: ExportFormat) -> Result<()> {
    let tmp = temp_path(path);
    let result = write_to(&tmp, matches, format).and_then(|()| {
        fs::rename(&tmp, path)?;
        Ok(())
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result?;

    log::info!("{} matches exported to {}", matches.len(), path.display());
    Ok(())
}

fn write_to(tmp: &Path, matches: &[ResolvedMatch], format: ExportFormat) -> Result<()> {
    let mut writer = BufWriter::new(File::create(tmp)?);
    match format {
        ExportFormat::Json => {
            write_json(&mut writer, matches)?;
            writer.write_all(b"\n")?;
        }
        ExportFormat::Csv => write_csv(&mut writer, matches)?,
    }
    writer.flush()?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("fixture"));
    name.push(".tmp");
    path.with_file_name(name)
}
