/// Backup export and import against real SQLite databases
use std::io::{Cursor, Write};

use chrono::{DateTime, TimeZone, Utc};
use habit_stats::backup::{self, write_archive, BackupContent, BackupMetadata};
use habit_stats::*;
use tempfile::NamedTempFile;

fn open() -> (NamedTempFile, SqliteStorage) {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let storage = SqliteStorage::new(temp_file.path().to_path_buf()).expect("Failed to create storage");
    (temp_file, storage)
}

fn seed(storage: &SqliteStorage) {
    let ids = storage
        .insert_habits(&[
            Habit::new(
                "Read, then write".to_string(),
                HabitColor::Green,
                "first line\nsecond line with \"quotes\"".to_string(),
            )
            .unwrap(),
            Habit::new("Never done".to_string(), HabitColor::Cyan, String::new()).unwrap(),
        ])
        .unwrap();

    storage
        .insert_actions(&[
            Action::new(ids[0], Utc.timestamp_millis_opt(1_634_380_000_123).unwrap()),
            Action::new(ids[0], Utc.timestamp_millis_opt(1_634_466_400_000).unwrap()),
        ])
        .unwrap();
}

fn snapshot(storage: &SqliteStorage) -> (Vec<Habit>, Vec<Action>) {
    (storage.get_habits().unwrap(), storage.get_all_actions().unwrap())
}

#[cfg(test)]
mod backup_tests {
    use super::*;

    #[test]
    fn test_round_trip_between_databases() {
        let (_source_file, source) = open();
        seed(&source);

        let mut archive = Vec::new();
        let summary = backup::export_backup(&source, &mut archive).unwrap();
        assert_eq!(summary.habits, 2);
        assert_eq!(summary.actions, 2);
        assert_eq!(summary.backup_version, BACKUP_VERSION);

        let (_target_file, target) = open();
        backup::import_backup(&target, &mut archive.as_slice()).unwrap();
        assert_eq!(snapshot(&target), snapshot(&source));

        // A habit without actions survives the trip
        let (habits, _) = snapshot(&target);
        let idle = habits.iter().find(|habit| habit.name == "Never done").unwrap();
        assert!(target.get_actions_for_habit(idle.id).unwrap().is_empty());
    }

    #[test]
    fn test_empty_database_round_trip() {
        let (_source_file, source) = open();
        let mut archive = Vec::new();
        backup::export_backup(&source, &mut archive).unwrap();

        let (_target_file, target) = open();
        seed(&target);
        backup::import_backup(&target, &mut archive.as_slice()).unwrap();
        assert_eq!(snapshot(&target), (Vec::new(), Vec::new()));
    }

    #[test]
    fn test_newer_backup_is_rejected_without_changes() {
        let (_file, storage) = open();
        seed(&storage);
        let before = snapshot(&storage);

        let content = BackupContent {
            habits_csv: "id,name,color,order,archived,notes\n".to_string(),
            actions_csv: "id,habit_id,timestamp\n".to_string(),
            metadata: BackupMetadata {
                backup_version: BACKUP_VERSION + 1,
            },
        };
        let mut archive = Vec::new();
        write_archive(&content, &mut archive).unwrap();

        let err = backup::import_backup(&storage, &mut archive.as_slice()).unwrap_err();
        assert!(err.is_version_too_high());
        assert!(!err.is_malformed());
        assert_eq!(snapshot(&storage), before);
    }

    #[test]
    fn test_newer_backup_with_other_entries_is_too_new() {
        let (_file, storage) = open();
        seed(&storage);
        let before = snapshot(&storage);

        // Later formats may rename or drop the CSV entries
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, body) in [
            ("metadata.txt", "backup_version=2\n"),
            ("habits.csv", "id,name,color,order,archived,notes\n"),
            ("events.csv", "id,habit_id,timestamp\n"),
        ] {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        let archive = zip.finish().unwrap().into_inner();

        let err = backup::import_backup(&storage, &mut archive.as_slice()).unwrap_err();
        assert!(err.is_version_too_high());
        assert_eq!(snapshot(&storage), before);
    }

    #[test]
    fn test_sub_millisecond_precision_is_dropped() {
        let (_source_file, source) = open();
        let habit_id = source
            .insert_habits(&[Habit::new("Precise".to_string(), HabitColor::Blue, String::new()).unwrap()])
            .unwrap()[0];
        let precise = DateTime::from_timestamp(1_634_380_000, 123_456_789).unwrap();
        source.insert_actions(&[Action::new(habit_id, precise)]).unwrap();

        let mut archive = Vec::new();
        backup::export_backup(&source, &mut archive).unwrap();

        let (_target_file, target) = open();
        backup::import_backup(&target, &mut archive.as_slice()).unwrap();

        let truncated = DateTime::from_timestamp_millis(1_634_380_000_123).unwrap();
        let actions = target.get_all_actions().unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].timestamp, Some(truncated));
    }

    #[test]
    fn test_broken_csv_is_rejected_without_changes() {
        let (_file, storage) = open();
        seed(&storage);
        let before = snapshot(&storage);

        let content = BackupContent {
            habits_csv: "id,name,color,order,archived,notes\n1,Run,Red,1,false,\n".to_string(),
            actions_csv: "id,habit_id,timestamp\n1,1,yesterday\n".to_string(),
            metadata: BackupMetadata::current(),
        };
        let mut archive = Vec::new();
        write_archive(&content, &mut archive).unwrap();

        let err = backup::import_backup(&storage, &mut archive.as_slice()).unwrap_err();
        assert!(err.is_malformed());
        assert_eq!(snapshot(&storage), before);
    }

    #[test]
    fn test_dangling_action_rolls_back() {
        let (_file, storage) = open();
        seed(&storage);
        let before = snapshot(&storage);

        // Action points at a habit that is not in the backup
        let content = BackupContent {
            habits_csv: "id,name,color,order,archived,notes\n1,Run,Red,1,false,\n".to_string(),
            actions_csv: "id,habit_id,timestamp\n1,99,1634380000000\n".to_string(),
            metadata: BackupMetadata::current(),
        };
        let mut archive = Vec::new();
        write_archive(&content, &mut archive).unwrap();

        let err = backup::import_backup(&storage, &mut archive.as_slice()).unwrap_err();
        assert!(matches!(err, BackupError::Storage(_)));
        assert_eq!(snapshot(&storage), before);
    }

    #[test]
    fn test_garbage_file_is_not_a_backup() {
        let (_file, storage) = open();
        let err = backup::import_backup(&storage, &mut "not a zip".as_bytes()).unwrap_err();
        assert!(matches!(err, BackupError::Zip(_)));
    }
}
