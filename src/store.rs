//! The in-memory task collection and its mutation operations.
//!
//! `TaskStore` owns the canonical ordered sequence of tasks together with
//! the path of its backing file. The collection is hydrated once when the
//! store is opened and flushed back to disk after every mutation; there is
//! no batching and no dirty flag.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::ValueEnum;

use crate::storage;
use crate::task::Task;

/// Reasons task input is rejected before it reaches the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingDueDate,
    MissingSubjectOrText,
    InvalidDueDate,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingDueDate => write!(f, "missing due date"),
            ValidationError::MissingSubjectOrText => write!(f, "missing subject or text"),
            ValidationError::InvalidDueDate => write!(f, "invalid due date, use YYYY-MM-DD"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Ordering criteria for [`TaskStore::sort_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    /// Latest due date first.
    Newest,
    /// Earliest due date first.
    Oldest,
}

/// Owned task collection backed by a JSON file.
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Open the store at `path`, hydrating the collection from disk.
    ///
    /// A missing or damaged file starts the store empty.
    pub fn open(path: &Path) -> Self {
        TaskStore {
            path: path.to_path_buf(),
            tasks: storage::load_tasks(path),
        }
    }

    /// Validate and append a new task, returning it on success.
    ///
    /// The due date is checked first, then subject and text (both must be
    /// non-empty after trimming), then the date format itself. Nothing is
    /// committed when validation fails.
    pub fn create(
        &mut self,
        subject: &str,
        text: &str,
        due_date: &str,
    ) -> Result<Task, ValidationError> {
        let due_date = due_date.trim();
        if due_date.is_empty() {
            return Err(ValidationError::MissingDueDate);
        }
        let subject = subject.trim();
        let text = text.trim();
        if subject.is_empty() || text.is_empty() {
            return Err(ValidationError::MissingSubjectOrText);
        }
        let due = NaiveDate::parse_from_str(due_date, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDueDate)?;

        let task = Task {
            id: self.next_id(),
            number: self.tasks.len() as u32 + 1,
            due_date: due,
            subject: subject.to_string(),
            text: text.to_string(),
            completed: false,
        };
        self.tasks.push(task.clone());
        self.persist();
        Ok(task)
    }

    /// Flip the completion flag on the task with the given id.
    ///
    /// Unknown ids are a silent no-op: the surfaces only ever hand out ids
    /// they just rendered, so this path is defensive only.
    pub fn toggle_complete(&mut self, id: i64) {
        if let Some(t) = self.tasks.iter_mut().find(|t| t.id == id) {
            t.completed = !t.completed;
            self.persist();
        }
    }

    /// Overwrite the mutable fields of the task with the given id.
    ///
    /// `id` and `number` never change. Unknown ids are a silent no-op.
    pub fn edit(&mut self, id: i64, subject: &str, text: &str, due_date: NaiveDate) {
        if let Some(t) = self.tasks.iter_mut().find(|t| t.id == id) {
            t.subject = subject.trim().to_string();
            t.text = text.trim().to_string();
            t.due_date = due_date;
            self.persist();
        }
    }

    /// Remove the task with the given id from the sequence.
    ///
    /// Confirmation is the caller's responsibility; remaining tasks keep
    /// their numbers.
    pub fn delete(&mut self, id: i64) {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() != before {
            self.persist();
        }
    }

    /// Reorder the whole sequence by due date and persist the new order.
    ///
    /// The sort is stable: tasks with equal due dates keep their current
    /// relative order.
    pub fn sort_by(&mut self, order: SortOrder) {
        match order {
            SortOrder::Newest => self.tasks.sort_by(|a, b| b.due_date.cmp(&a.due_date)),
            SortOrder::Oldest => self.tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date)),
        }
        self.persist();
    }

    /// Read-only view of the collection in its stored order.
    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    /// Get a task by id.
    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Next task id: current time in epoch milliseconds, forced past the
    /// largest id already in use so rapid creations never collide.
    fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let max = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        now.max(max + 1)
    }

    /// Flush the collection to disk. Storage is treated as effectively
    /// infallible at this scale; a failed write is reported on stderr and
    /// execution continues.
    fn persist(&self) {
        if let Err(e) = storage::save_tasks(&self.path, &self.tasks) {
            eprintln!("Failed to save tasks to {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (TaskStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::open(&dir.path().join("tasks.json"));
        (store, dir)
    }

    #[test]
    fn create_appends_numbers_and_persists() {
        let (mut store, dir) = open_store();
        let a = store.create("Math", "HW1", "2024-01-10").unwrap();
        let b = store.create("History", "Essay", "2024-02-01").unwrap();
        assert_eq!(a.number, 1);
        assert_eq!(b.number, 2);
        assert!(!a.completed);
        assert!(b.id > a.id);

        let reopened = TaskStore::open(&dir.path().join("tasks.json"));
        assert_eq!(reopened.all(), store.all());
        assert_eq!(reopened.all().len(), 2);
    }

    #[test]
    fn create_checks_due_date_before_subject_and_text() {
        let (mut store, _dir) = open_store();
        assert_eq!(
            store.create("", "", ""),
            Err(ValidationError::MissingDueDate)
        );
        assert!(store.all().is_empty());
    }

    #[test]
    fn create_rejects_blank_subject_or_text() {
        let (mut store, _dir) = open_store();
        assert_eq!(
            store.create("   ", "HW1", "2024-01-10"),
            Err(ValidationError::MissingSubjectOrText)
        );
        assert_eq!(
            store.create("Math", "\t", "2024-01-10"),
            Err(ValidationError::MissingSubjectOrText)
        );
        assert!(store.all().is_empty());
    }

    #[test]
    fn create_rejects_malformed_due_date() {
        let (mut store, _dir) = open_store();
        assert_eq!(
            store.create("Math", "HW1", "next tuesday"),
            Err(ValidationError::InvalidDueDate)
        );
        assert!(store.all().is_empty());
    }

    #[test]
    fn create_trims_subject_and_text() {
        let (mut store, _dir) = open_store();
        let t = store.create("  Math ", " HW1  ", "2024-01-10").unwrap();
        assert_eq!(t.subject, "Math");
        assert_eq!(t.text, "HW1");
    }

    #[test]
    fn toggle_twice_restores_original_state() {
        let (mut store, _dir) = open_store();
        let id = store.create("Math", "HW1", "2024-01-10").unwrap().id;
        store.toggle_complete(id);
        assert!(store.get(id).unwrap().completed);
        store.toggle_complete(id);
        assert!(!store.get(id).unwrap().completed);
    }

    #[test]
    fn toggle_unknown_id_is_a_noop() {
        let (mut store, _dir) = open_store();
        store.create("Math", "HW1", "2024-01-10").unwrap();
        let before = store.all().to_vec();
        store.toggle_complete(42);
        assert_eq!(store.all(), before);
    }

    #[test]
    fn edit_overwrites_fields_but_not_identity() {
        let (mut store, _dir) = open_store();
        let task = store.create("Math", "HW1", "2024-01-10").unwrap();
        store.edit(
            task.id,
            "Science",
            "Lab report",
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        );
        let edited = store.get(task.id).unwrap();
        assert_eq!(edited.subject, "Science");
        assert_eq!(edited.text, "Lab report");
        assert_eq!(edited.due_date.to_string(), "2024-03-15");
        assert_eq!(edited.id, task.id);
        assert_eq!(edited.number, task.number);
    }

    #[test]
    fn edit_unknown_id_is_a_noop() {
        let (mut store, _dir) = open_store();
        store.create("Math", "HW1", "2024-01-10").unwrap();
        let before = store.all().to_vec();
        store.edit(42, "X", "Y", NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(store.all(), before);
    }

    #[test]
    fn numbers_are_never_recomputed() {
        let (mut store, _dir) = open_store();
        let a = store.create("Math", "HW1", "2024-01-10").unwrap();
        store.create("History", "Essay", "2024-02-01").unwrap();
        store.create("Art", "Sketch", "2024-03-01").unwrap();
        store.delete(a.id);
        // The new task gets len + 1, which now collides with a survivor.
        let d = store.create("Music", "Scales", "2024-04-01").unwrap();
        let numbers: Vec<u32> = store.all().iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![2, 3, 3]);
        assert_eq!(d.number, 3);
    }

    #[test]
    fn sort_newest_then_oldest_reverses_order() {
        let (mut store, _dir) = open_store();
        store.create("A", "a", "2024-01-10").unwrap();
        store.create("B", "b", "2024-03-01").unwrap();
        store.create("C", "c", "2024-02-01").unwrap();

        store.sort_by(SortOrder::Newest);
        let newest: Vec<&str> = store.all().iter().map(|t| t.subject.as_str()).collect();
        assert_eq!(newest, vec!["B", "C", "A"]);

        store.sort_by(SortOrder::Oldest);
        let oldest: Vec<&str> = store.all().iter().map(|t| t.subject.as_str()).collect();
        assert_eq!(oldest, vec!["A", "C", "B"]);
    }

    #[test]
    fn sort_keeps_relative_order_for_equal_dates() {
        let (mut store, _dir) = open_store();
        store.create("First", "a", "2024-01-10").unwrap();
        store.create("Second", "b", "2024-01-10").unwrap();
        store.create("Third", "c", "2024-01-10").unwrap();
        store.sort_by(SortOrder::Newest);
        let order: Vec<&str> = store.all().iter().map(|t| t.subject.as_str()).collect();
        assert_eq!(order, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn sorted_order_survives_a_reload() {
        let (mut store, dir) = open_store();
        store.create("A", "a", "2024-01-10").unwrap();
        store.create("B", "b", "2024-03-01").unwrap();
        store.sort_by(SortOrder::Newest);

        let reopened = TaskStore::open(&dir.path().join("tasks.json"));
        let order: Vec<&str> = reopened.all().iter().map(|t| t.subject.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);
    }

    #[test]
    fn full_lifecycle_create_toggle_delete() {
        let (mut store, _dir) = open_store();
        let task = store.create("Math", "HW1", "2024-01-10").unwrap();
        assert_eq!(store.all().len(), 1);
        assert_eq!(store.all()[0].number, 1);
        assert!(!store.all()[0].completed);

        store.toggle_complete(task.id);
        assert!(store.get(task.id).unwrap().completed);

        store.delete(task.id);
        assert!(store.all().is_empty());
    }
}
