//! Task data structure.
//!
//! This module defines the `Task` struct that represents a single to-do
//! item with its due date, subject, descriptive text and completion flag.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single to-do item.
///
/// The serialized field names (`dueDate` and friends) are part of the
/// stored format; renaming one requires a storage migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Creation timestamp in Unix-epoch milliseconds, unique per task.
    pub id: i64,
    /// Display number, assigned as collection size + 1 at creation.
    /// Never recomputed after deletes or reorders.
    pub number: u32,
    pub due_date: NaiveDate,
    pub subject: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}
