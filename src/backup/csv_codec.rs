/// CSV encoding of the habit and action tables
///
/// Records end with `\n` on every platform and fields are quoted only when
/// they contain a comma, a quote or a line break. Reading looks columns up by
/// header name, so column order in a backup does not matter.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::DateTime;
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};

use crate::backup::BackupError;
use crate::domain::{Action, ActionId, Habit, HabitColor, HabitId};

pub const HABITS_FILE: &str = "habits.csv";
pub const ACTIONS_FILE: &str = "actions.csv";

pub const HABITS_HEADER: [&str; 6] = ["id", "name", "color", "order", "archived", "notes"];
pub const ACTIONS_HEADER: [&str; 3] = ["id", "habit_id", "timestamp"];

pub fn encode_habits(habits: &[Habit]) -> Result<String, BackupError> {
    let mut wtr = new_writer();
    wtr.write_record(HABITS_HEADER)?;

    for habit in habits {
        wtr.write_record([
            habit.id.to_string(),
            habit.name.clone(),
            habit.color.name().to_string(),
            habit.order.to_string(),
            habit.archived.to_string(),
            habit.notes.clone(),
        ])?;
    }

    finish(wtr)
}

/// Timestamps are written as epoch milliseconds, phantoms as an empty field
pub fn encode_actions(actions: &[Action]) -> Result<String, BackupError> {
    let mut wtr = new_writer();
    wtr.write_record(ACTIONS_HEADER)?;

    for action in actions {
        wtr.write_record([
            action.id.to_string(),
            action.habit_id.to_string(),
            action
                .timestamp_millis()
                .map(|millis| millis.to_string())
                .unwrap_or_default(),
        ])?;
    }

    finish(wtr)
}

pub fn decode_habits(text: &str) -> Result<Vec<Habit>, BackupError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    let columns = Columns::locate(HABITS_FILE, rdr.headers()?, &HABITS_HEADER)?;

    let mut habits = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let color: HabitColor = columns.parse(&record, "color")?;

        habits.push(Habit::from_existing(
            HabitId(columns.parse(&record, "id")?),
            columns.text(&record, "name").to_string(),
            color,
            columns.parse(&record, "order")?,
            columns.parse(&record, "archived")?,
            columns.text(&record, "notes").to_string(),
        ));
    }

    Ok(habits)
}

pub fn decode_actions(text: &str) -> Result<Vec<Action>, BackupError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    let columns = Columns::locate(ACTIONS_FILE, rdr.headers()?, &ACTIONS_HEADER)?;

    let mut actions = Vec::new();
    for record in rdr.records() {
        let record = record?;

        let timestamp = match columns.text(&record, "timestamp").trim() {
            "" => None,
            _ => {
                let millis: i64 = columns.parse(&record, "timestamp")?;
                let ts = DateTime::from_timestamp_millis(millis)
                    .ok_or_else(|| columns.invalid(&record, "timestamp"))?;
                Some(ts)
            }
        };

        actions.push(Action::from_existing(
            ActionId(columns.parse(&record, "id")?),
            HabitId(columns.parse(&record, "habit_id")?),
            timestamp,
        ));
    }

    Ok(actions)
}

fn new_writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, BackupError> {
    let bytes = wtr.into_inner().map_err(|e| BackupError::Io(e.into_error()))?;
    // Only valid strings were written
    String::from_utf8(bytes).map_err(|_| BackupError::Encoding {
        entry: "generated csv".to_string(),
    })
}

/// Column positions of one CSV file, resolved from its header
struct Columns {
    file: &'static str,
    positions: HashMap<&'static str, usize>,
}

impl Columns {
    fn locate(
        file: &'static str,
        headers: &StringRecord,
        required: &[&'static str],
    ) -> Result<Self, BackupError> {
        let mut positions = HashMap::new();
        for &column in required {
            let position = headers
                .iter()
                .position(|header| header.trim() == column)
                .ok_or(BackupError::MissingColumn { file, column })?;
            positions.insert(column, position);
        }

        Ok(Self { file, positions })
    }

    fn text<'r>(&self, record: &'r StringRecord, column: &'static str) -> &'r str {
        self.positions
            .get(column)
            .and_then(|position| record.get(*position))
            .unwrap_or("")
    }

    fn parse<T: FromStr>(&self, record: &StringRecord, column: &'static str) -> Result<T, BackupError> {
        self.text(record, column)
            .trim()
            .parse()
            .map_err(|_| self.invalid(record, column))
    }

    fn invalid(&self, record: &StringRecord, column: &'static str) -> BackupError {
        BackupError::InvalidField {
            file: self.file,
            column,
            line: record.position().map_or(0, |position| position.line()),
            value: self.text(record, column).to_string(),
        }
    }
}
