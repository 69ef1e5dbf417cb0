//! `;`-delimited table encoding.
//!
//! One header line, then one line per task with eight fields:
//! id, title, description, status, priority, deadline, created, updated.
//! There is no quoting: a `;` inside the title or description is written as
//! `,` and a line break as a space, so those characters do not survive a
//! round trip.

use tracing::warn;

use super::{
    fold_line_breaks, format_date, format_datetime, parse_datetime, parse_id, parse_optional_date,
    Codec, Decoded, SkippedRecord,
};
use crate::error::DecodeRecordError;
use crate::fields::{Priority, Status};
use crate::task::Task;

pub const HEADER: &str = "ID;Название;Описание;Статус;Приоритет;Дедлайн;Создано;Обновлено";
pub const DELIMITER: char = ';';
const FIELD_COUNT: usize = 8;

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvCodec;

impl Codec for CsvCodec {
    fn encode(&self, tasks: &[Task]) -> String {
        let mut out = String::new();
        out.push_str(HEADER);
        out.push('\n');
        for task in tasks {
            out.push_str(&encode_record(task));
            out.push('\n');
        }
        out
    }

    fn decode(&self, text: &str) -> Decoded {
        let mut decoded = Decoded::default();

        // Skip header; line numbers are 1-based.
        for (idx, line) in text.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(DELIMITER).collect();
            match decode_record(&fields) {
                Ok(task) => decoded.tasks.push(task),
                Err(error) => {
                    warn!(line = idx + 1, %error, content = line, "skipping malformed CSV record");
                    decoded.skipped.push(SkippedRecord {
                        position: idx + 1,
                        error,
                    });
                }
            }
        }
        decoded
    }
}

fn escape_field(s: &str) -> String {
    fold_line_breaks(s).replace(DELIMITER, ",")
}

fn encode_record(task: &Task) -> String {
    format!(
        "{};{};{};{};{};{};{};{}",
        task.id(),
        escape_field(task.title()),
        escape_field(task.description()),
        task.status().wire_name(),
        task.priority().wire_name(),
        task.deadline().map(format_date).unwrap_or_default(),
        format_datetime(task.created_at()),
        format_datetime(task.updated_at()),
    )
}

fn decode_record(fields: &[&str]) -> Result<Task, DecodeRecordError> {
    if fields.len() < FIELD_COUNT {
        return Err(DecodeRecordError::TooFewFields(fields.len()));
    }
    let id = parse_id(fields[0])?;
    let status: Status = fields[3]
        .parse()
        .map_err(DecodeRecordError::UnknownStatus)?;
    let priority: Priority = fields[4]
        .parse()
        .map_err(DecodeRecordError::UnknownPriority)?;
    let deadline = parse_optional_date(fields[5])?;
    let created_at = parse_datetime(fields[6])?;
    let updated_at = parse_datetime(fields[7])?;

    Ok(Task::new(
        id, fields[1], fields[2], status, priority, deadline, created_at, updated_at,
    ))
}
