/// Backup export and import
///
/// A backup is a ZIP archive holding the habit table and the action table as
/// CSV, plus a `metadata.txt` carrying the format version. Imports are
/// parsed completely before anything in storage is replaced.

pub mod archive;
pub mod csv_codec;

pub use archive::{read_archive, write_archive, METADATA_FILE};
pub use csv_codec::{ACTIONS_FILE, HABITS_FILE};

use std::io::{Read, Write};

use serde::Serialize;
use thiserror::Error;
use crate::domain::{Action, Habit};
use crate::storage::{HabitStorage, StorageError};

/// Version written by this build, and the highest one it can read
pub const BACKUP_VERSION: i64 = 1;

/// Errors that can occur while exporting or importing a backup
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Backup I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backup archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Backup CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Backup is missing {0}")]
    MissingEntry(&'static str),

    #[error("Backup entry {entry} is not valid UTF-8")]
    Encoding { entry: String },

    #[error("Malformed backup metadata: {0}")]
    MalformedMetadata(String),

    #[error("{file} has no '{column}' column")]
    MissingColumn { file: &'static str, column: &'static str },

    #[error("Invalid {column} '{value}' in {file} line {line}")]
    InvalidField {
        file: &'static str,
        column: &'static str,
        line: u64,
        value: String,
    },

    #[error("Backup version {found} is newer than supported version {supported}")]
    VersionTooHigh { found: i64, supported: i64 },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl BackupError {
    /// The backup comes from a newer app version and was left alone
    pub fn is_version_too_high(&self) -> bool {
        matches!(self, BackupError::VersionTooHigh { .. })
    }

    /// The archive was readable but its contents are not a valid backup
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            BackupError::MissingEntry(_)
                | BackupError::Encoding { .. }
                | BackupError::MalformedMetadata(_)
                | BackupError::MissingColumn { .. }
                | BackupError::InvalidField { .. }
                | BackupError::Csv(_)
        )
    }
}

/// Contents of `metadata.txt`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupMetadata {
    pub backup_version: i64,
}

impl BackupMetadata {
    pub fn current() -> Self {
        Self {
            backup_version: BACKUP_VERSION,
        }
    }
}

/// The three backup entries, fully buffered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupContent {
    pub habits_csv: String,
    pub actions_csv: String,
    pub metadata: BackupMetadata,
}

impl BackupContent {
    /// Encode both tables with the current backup version
    pub fn encode(habits: &[Habit], actions: &[Action]) -> Result<Self, BackupError> {
        Ok(Self {
            habits_csv: csv_codec::encode_habits(habits)?,
            actions_csv: csv_codec::encode_actions(actions)?,
            metadata: BackupMetadata::current(),
        })
    }

    /// Parse both tables back into rows
    pub fn decode(&self) -> Result<(Vec<Habit>, Vec<Action>), BackupError> {
        let habits = csv_codec::decode_habits(&self.habits_csv)?;
        let actions = csv_codec::decode_actions(&self.actions_csv)?;
        Ok((habits, actions))
    }
}

/// Reject backups written by a newer format version
pub fn check_version(metadata: &BackupMetadata, supported: i64) -> Result<(), BackupError> {
    if metadata.backup_version > supported {
        return Err(BackupError::VersionTooHigh {
            found: metadata.backup_version,
            supported,
        });
    }
    Ok(())
}

/// What an export or import moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackupSummary {
    pub habits: usize,
    pub actions: usize,
    pub backup_version: i64,
}

/// Write every habit and action in `storage` to `out` as a backup archive
pub fn export_backup<S, W>(storage: &S, out: &mut W) -> Result<BackupSummary, BackupError>
where
    S: HabitStorage + ?Sized,
    W: Write,
{
    let result = (|| -> Result<BackupSummary, BackupError> {
        let habits = storage.get_habits()?;
        let actions = storage.get_all_actions()?;

        let content = BackupContent::encode(&habits, &actions)?;
        write_archive(&content, out)?;

        Ok(BackupSummary {
            habits: habits.len(),
            actions: actions.len(),
            backup_version: content.metadata.backup_version,
        })
    })();

    match &result {
        Ok(summary) => tracing::info!(
            "Exported backup with {} habits and {} actions",
            summary.habits,
            summary.actions
        ),
        Err(e) => tracing::error!("Backup export failed: {}", e),
    }

    result
}

/// Replace everything in `storage` with the backup read from `reader`
///
/// The version is checked before the CSV entries are looked at, so a backup
/// from a newer format is always reported as too new. Both CSV files are
/// parsed before storage is touched, so on any error the existing data stays
/// as it was.
pub fn import_backup<S, R>(storage: &S, reader: &mut R) -> Result<BackupSummary, BackupError>
where
    S: HabitStorage + ?Sized,
    R: Read,
{
    let result = (|| -> Result<BackupSummary, BackupError> {
        let content = read_archive(reader, BACKUP_VERSION)?;

        let (habits, actions) = content.decode()?;
        storage.restore_backup(&habits, &actions)?;

        Ok(BackupSummary {
            habits: habits.len(),
            actions: actions.len(),
            backup_version: content.metadata.backup_version,
        })
    })();

    match &result {
        Ok(summary) => tracing::info!(
            "Imported backup v{} with {} habits and {} actions",
            summary.backup_version,
            summary.habits,
            summary.actions
        ),
        Err(e) if e.is_version_too_high() => tracing::warn!("Backup rejected: {}", e),
        Err(e) => tracing::error!("Backup import failed: {}", e),
    }

    result
}
