//! Form state for the add and edit dialogs.
//!
//! The same three-field form backs both dialogs; the edit dialog starts
//! from a populated copy of the task being edited.

use crate::task::Task;

/// Focus index of the subject field.
pub const SUBJECT_FIELD: usize = 0;
/// Focus index of the task text field.
pub const TEXT_FIELD: usize = 1;
/// Focus index of the due date field.
pub const DUE_FIELD: usize = 2;

const FIELD_COUNT: usize = 3;

/// The values read out of the form when it is submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct FormValues {
    pub subject: String,
    pub text: String,
    pub due_date: String,
}

/// A single-line text field with a cursor, counted in characters.
#[derive(Default, Clone)]
pub struct TextField {
    pub value: String,
    cursor: usize,
}

impl TextField {
    fn with_value(value: &str) -> Self {
        TextField {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    fn byte_offset(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_offset();
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset();
            self.value.remove(at);
        }
    }

    fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    fn move_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }
}

/// Three-field task form with one focused field at a time.
pub struct TaskForm {
    pub subject: TextField,
    pub text: TextField,
    pub due_date: TextField,
    pub focus: usize,
}

impl TaskForm {
    /// A blank form, focused on the subject field.
    pub fn new() -> Self {
        TaskForm {
            subject: TextField::default(),
            text: TextField::default(),
            due_date: TextField::default(),
            focus: SUBJECT_FIELD,
        }
    }

    /// A form pre-populated with the current fields of an existing task.
    pub fn from_task(task: &Task) -> Self {
        TaskForm {
            subject: TextField::with_value(&task.subject),
            text: TextField::with_value(&task.text),
            due_date: TextField::with_value(&task.due_date.to_string()),
            focus: SUBJECT_FIELD,
        }
    }

    /// Read the current field values.
    pub fn values(&self) -> FormValues {
        FormValues {
            subject: self.subject.value.clone(),
            text: self.text.value.clone(),
            due_date: self.due_date.value.clone(),
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.focus = if self.focus == 0 {
            FIELD_COUNT - 1
        } else {
            self.focus - 1
        };
    }

    pub fn insert(&mut self, c: char) {
        self.focused_mut().insert(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().backspace();
    }

    pub fn move_cursor(&mut self, right: bool) {
        let field = self.focused_mut();
        if right {
            field.move_right();
        } else {
            field.move_left();
        }
    }

    fn focused_mut(&mut self) -> &mut TextField {
        match self.focus {
            TEXT_FIELD => &mut self.text,
            DUE_FIELD => &mut self.due_date,
            _ => &mut self.subject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn from_task_populates_all_fields() {
        let task = Task {
            id: 7,
            number: 1,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            subject: "Math".into(),
            text: "HW1".into(),
            completed: false,
        };
        let form = TaskForm::from_task(&task);
        assert_eq!(form.subject.value, "Math");
        assert_eq!(form.text.value, "HW1");
        assert_eq!(form.due_date.value, "2024-01-10");
        assert_eq!(form.focus, SUBJECT_FIELD);
    }

    #[test]
    fn focus_cycles_forward_and_backward() {
        let mut form = TaskForm::new();
        form.next_field();
        assert_eq!(form.focus, TEXT_FIELD);
        form.next_field();
        assert_eq!(form.focus, DUE_FIELD);
        form.next_field();
        assert_eq!(form.focus, SUBJECT_FIELD);
        form.prev_field();
        assert_eq!(form.focus, DUE_FIELD);
    }

    #[test]
    fn editing_inserts_at_the_cursor() {
        let mut form = TaskForm::new();
        for c in "Mth".chars() {
            form.insert(c);
        }
        form.move_cursor(false);
        form.move_cursor(false);
        form.insert('a');
        assert_eq!(form.subject.value, "Math");
        form.backspace();
        assert_eq!(form.subject.value, "Mth");
    }
}
