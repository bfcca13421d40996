//! Attendance report export as a CSV spreadsheet.

use chrono::{Local, NaiveDate};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::db::{AttendanceRow, AttendanceStorage};
use crate::error::RollcallError;

pub const CSV_HEADER: [&str; 4] = ["Name", "District", "Event", "Date"];

/// A generated export, ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub rows: usize,
}

/// Uniquely named temp file that is removed when dropped.
/// Removal failures are logged, not raised.
struct ScratchFile {
    file: File,
    path: PathBuf,
}

impl ScratchFile {
    fn new() -> Result<Self, RollcallError> {
        let (file, path) = tempfile::Builder::new()
            .prefix("rollcall-attendance-")
            .suffix(".csv")
            .tempfile()?
            .keep()
            .map_err(|e| e.error)?;
        Ok(Self { file, path })
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove export temp file");
        }
    }
}

/// Build the attendance spreadsheet from the current joined listing.
pub async fn export_attendance(
    storage: &AttendanceStorage,
) -> Result<ExportArtifact, RollcallError> {
    let rows = storage.list_attendance().await?;
    let today = Local::now().date_naive();
    let artifact = tokio::task::spawn_blocking(move || build_artifact(&rows, today))
        .await
        .map_err(|e| RollcallError::Io(std::io::Error::other(e)))??;
    info!(rows = artifact.rows, bytes = artifact.bytes.len(), "attendance exported");
    Ok(artifact)
}

fn build_artifact(
    rows: &[AttendanceRow],
    today: NaiveDate,
) -> Result<ExportArtifact, RollcallError> {
    let mut scratch = ScratchFile::new()?;

    {
        let mut writer = csv::Writer::from_writer(&mut scratch.file);
        write_rows(&mut writer, rows)?;
        writer.flush()?;
    }

    let file = &mut scratch.file;
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    Ok(ExportArtifact {
        filename: format!("attendance_{}.csv", today.format("%Y-%m-%d")),
        content_type: "text/csv; charset=utf-8",
        bytes,
        rows: rows.len(),
    })
}

fn write_rows<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    rows: &[AttendanceRow],
) -> Result<(), RollcallError> {
    writer.write_record(CSV_HEADER)?;
    for row in rows {
        let date = row.date.format("%Y-%m-%d").to_string();
        writer.write_record([
            row.participant_name.as_str(),
            row.district.as_deref().unwrap_or(""),
            row.event_name.as_str(),
            date.as_str(),
        ])?;
    }
    Ok(())
}
