//! Projection of the task collection into what the user sees.
//!
//! `visible_tasks` is a pure function over the stored sequence: it applies
//! the completion filter and the search text and nothing else. Both the
//! CLI table and the TUI table feed from it, so the two surfaces always
//! agree on which tasks are shown.

use clap::ValueEnum;

use crate::task::Task;

/// Which tasks the completion filter lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterMode {
    All,
    Completed,
    NotCompleted,
}

impl FilterMode {
    /// The next mode in the selector cycle.
    pub fn next(self) -> Self {
        match self {
            FilterMode::All => FilterMode::Completed,
            FilterMode::Completed => FilterMode::NotCompleted,
            FilterMode::NotCompleted => FilterMode::All,
        }
    }

    /// Human label for the status bar.
    pub fn label(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Completed => "completed",
            FilterMode::NotCompleted => "not completed",
        }
    }
}

/// Select the tasks matching both the completion filter and the search
/// text, preserving the stored order.
///
/// The search is a case-insensitive substring match against subject OR
/// text; an empty search matches everything. Pure: recomputed on every
/// render request.
pub fn visible_tasks<'a>(tasks: &'a [Task], filter: FilterMode, search: &str) -> Vec<&'a Task> {
    let needle = search.to_lowercase();
    tasks
        .iter()
        .filter(|t| {
            let by_filter = match filter {
                FilterMode::All => true,
                FilterMode::Completed => t.completed,
                FilterMode::NotCompleted => !t.completed,
            };
            by_filter
                && (needle.is_empty()
                    || t.subject.to_lowercase().contains(&needle)
                    || t.text.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Human completion label for a task row.
pub fn format_completion(completed: bool) -> &'static str {
    if completed {
        "Done"
    } else {
        "Pending"
    }
}

/// Print tasks as a fixed-width table on stdout.
pub fn print_table(tasks: &[&Task]) {
    println!(
        "{:<5} {:<12} {:<22} {:<40} {}",
        "#", "Due", "Subject", "Task", "Status"
    );
    for t in tasks {
        println!(
            "{:<5} {:<12} {:<22} {:<40} {}",
            t.number,
            t.due_date.to_string(),
            truncate(&t.subject, 22),
            truncate(&t.text, 40),
            format_completion(t.completed)
        );
    }
}

/// Truncate a string to a maximum width, ending with an ellipsis.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(subject: &str, text: &str, completed: bool) -> Task {
        Task {
            id: 1,
            number: 1,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            subject: subject.into(),
            text: text.into(),
            completed,
        }
    }

    #[test]
    fn completed_filter_keeps_only_completed_tasks() {
        let tasks = vec![task("Math", "HW1", true), task("History", "Essay", false)];
        let visible = visible_tasks(&tasks, FilterMode::Completed, "");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].subject, "Math");
    }

    #[test]
    fn not_completed_filter_keeps_only_pending_tasks() {
        let tasks = vec![task("Math", "HW1", true), task("History", "Essay", false)];
        let visible = visible_tasks(&tasks, FilterMode::NotCompleted, "");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].subject, "History");
    }

    #[test]
    fn search_matches_subject_or_text_case_insensitively() {
        let tasks = vec![
            task("Math", "homework", false),
            task("History", "ESSAY on math", false),
            task("Art", "sketch", false),
        ];
        let visible = visible_tasks(&tasks, FilterMode::All, "MATH");
        assert_eq!(visible.len(), 2);
        let visible = visible_tasks(&tasks, FilterMode::All, "essay");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].subject, "History");
    }

    #[test]
    fn empty_search_matches_everything() {
        let tasks = vec![task("Math", "HW1", true), task("History", "Essay", false)];
        assert_eq!(visible_tasks(&tasks, FilterMode::All, "").len(), 2);
    }

    #[test]
    fn filter_and_search_combine() {
        let tasks = vec![
            task("Math", "HW1", true),
            task("Math", "HW2", false),
            task("History", "Essay", true),
        ];
        let visible = visible_tasks(&tasks, FilterMode::Completed, "math");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "HW1");
    }

    #[test]
    fn filter_mode_cycles_through_all_three() {
        let mut mode = FilterMode::All;
        mode = mode.next();
        assert_eq!(mode, FilterMode::Completed);
        mode = mode.next();
        assert_eq!(mode, FilterMode::NotCompleted);
        mode = mode.next();
        assert_eq!(mode, FilterMode::All);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer subject line", 8), "a longe…");
    }
}
