//! On-disk persistence for the task collection.
//!
//! The whole collection lives in one JSON file. Loading is deliberately
//! forgiving: a missing, unreadable or malformed file yields an empty
//! collection rather than an error, so a damaged database never blocks
//! the program from starting.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use crate::task::Task;

/// Load the task collection from `path`.
///
/// Returns an empty collection if the file does not exist, cannot be
/// read, or does not parse. Parse failures are never propagated.
pub fn load_tasks(path: &Path) -> Vec<Task> {
    if !path.exists() {
        return Vec::new();
    }
    let mut buf = String::new();
    match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
        Ok(_) => serde_json::from_str(&buf).unwrap_or_default(),
        Err(_) => Vec::new(),
    }
}

/// Save the task collection to `path`, replacing any previous contents.
///
/// Atomic-ish write via temp + rename.
pub fn save_tasks(path: &Path, tasks: &[Task]) -> io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    let mut f = File::create(&tmp)?;
    let data = serde_json::to_string_pretty(tasks).unwrap();
    f.write_all(data.as_bytes())?;
    f.flush()?;
    fs::rename(tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task {
                id: 1700000000000,
                number: 1,
                due_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                subject: "Math".into(),
                text: "HW1".into(),
                completed: false,
            },
            Task {
                id: 1700000000001,
                number: 2,
                due_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                subject: "History".into(),
                text: "Essay".into(),
                completed: true,
            },
        ]
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_tasks(&dir.path().join("tasks.json")).is_empty());
    }

    #[test]
    fn malformed_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_tasks(&path).is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let tasks = sample_tasks();
        save_tasks(&path, &tasks).unwrap();
        assert_eq!(load_tasks(&path), tasks);
    }

    #[test]
    fn stored_format_keeps_original_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        save_tasks(&path, &sample_tasks()).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"dueDate\""));
        assert!(raw.contains("\"completed\""));
    }
}
