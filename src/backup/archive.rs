/// ZIP container for backups
///
/// A backup archive holds exactly three entries: `habits.csv`, `actions.csv`
/// and `metadata.txt`. Readers find them by name and skip anything else.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::backup::csv_codec::{ACTIONS_FILE, HABITS_FILE};
use crate::backup::{check_version, BackupContent, BackupError, BackupMetadata};

pub const METADATA_FILE: &str = "metadata.txt";

const BACKUP_VERSION_KEY: &str = "backup_version";

impl BackupMetadata {
    /// Text of `metadata.txt`
    pub fn render(&self) -> String {
        format!("{}={}\n", BACKUP_VERSION_KEY, self.backup_version)
    }

    /// Parse `metadata.txt`, lines other than `backup_version=<n>` are ignored
    pub fn parse(text: &str) -> Result<Self, BackupError> {
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if key.trim() != BACKUP_VERSION_KEY {
                continue;
            }

            let backup_version = value.trim().parse().map_err(|_| {
                BackupError::MalformedMetadata(format!(
                    "{} '{}' is not a number",
                    BACKUP_VERSION_KEY,
                    value.trim()
                ))
            })?;
            return Ok(Self { backup_version });
        }

        Err(BackupError::MalformedMetadata(format!(
            "{} is missing",
            BACKUP_VERSION_KEY
        )))
    }
}

/// Write the three backup entries as a ZIP archive to `out`
pub fn write_archive<W: Write>(content: &BackupContent, out: &mut W) -> Result<(), BackupError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let metadata = content.metadata.render();
    let entries = [
        (HABITS_FILE, content.habits_csv.as_str()),
        (ACTIONS_FILE, content.actions_csv.as_str()),
        (METADATA_FILE, metadata.as_str()),
    ];

    for (name, body) in entries {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }

    let buffer = zip.finish()?.into_inner();
    out.write_all(&buffer)?;
    out.flush()?;

    tracing::debug!("Wrote backup archive of {} bytes", buffer.len());
    Ok(())
}

/// Read a backup archive from `reader`
///
/// The stream is read once to its end, then the entries are looked up by
/// name. Directories and unknown entries are skipped. Metadata is parsed and
/// checked against `supported` before the CSV entries are required, so a
/// newer format fails with `VersionTooHigh` whatever entries it carries. The
/// CSV files are returned as text.
pub fn read_archive<R: Read>(reader: &mut R, supported: i64) -> Result<BackupContent, BackupError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut habits_csv = None;
    let mut actions_csv = None;
    let mut metadata_txt = None;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }

        let slot = match entry.name() {
            HABITS_FILE => &mut habits_csv,
            ACTIONS_FILE => &mut actions_csv,
            METADATA_FILE => &mut metadata_txt,
            other => {
                tracing::debug!("Skipping unknown backup entry {}", other);
                continue;
            }
        };

        let mut raw = Vec::new();
        entry.read_to_end(&mut raw)?;
        let text = String::from_utf8(raw).map_err(|_| BackupError::Encoding {
            entry: entry.name().to_string(),
        })?;
        *slot = Some(text);
    }

    let metadata_txt = metadata_txt.ok_or(BackupError::MissingEntry(METADATA_FILE))?;
    let metadata = BackupMetadata::parse(&metadata_txt)?;
    check_version(&metadata, supported)?;

    Ok(BackupContent {
        habits_csv: habits_csv.ok_or(BackupError::MissingEntry(HABITS_FILE))?,
        actions_csv: actions_csv.ok_or(BackupError::MissingEntry(ACTIONS_FILE))?,
        metadata,
    })
}
