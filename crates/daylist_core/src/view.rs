//! Projection from store state to what the presentation layer draws.
//!
//! Rendering is a full rebuild on every call; nothing here is retained
//! between frames.

use crate::app::Action;
use crate::model::{Section, Statistics, Task};
use crate::storage::KeyValueStore;
use crate::store::TaskStore;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub sections: Vec<SectionView>,
    pub tracker: Tracker,
}

impl Board {
    pub fn section(&self, section: Section) -> Option<&SectionView> {
        self.sections.iter().find(|view| view.section == section)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionView {
    pub section: Section,
    pub content: SectionContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionContent {
    Empty { placeholder: &'static str },
    Rows { rows: Vec<TaskRow> },
}

/// One task as drawn, with the actions its controls fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    #[serde(skip)]
    pub toggle: Action,
    #[serde(skip)]
    pub delete: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tracker {
    pub total: usize,
    pub completed: usize,
    pub percent_label: String,
    pub fill_width: u8,
}

impl From<Statistics> for Tracker {
    fn from(stats: Statistics) -> Self {
        Self {
            total: stats.total,
            completed: stats.completed,
            percent_label: format!("{}%", stats.progress_percent),
            fill_width: stats.progress_percent,
        }
    }
}

pub fn placeholder(section: Section) -> &'static str {
    match section {
        Section::Today => "No tasks for today. Add one above!",
        Section::Tomorrow => "No tasks for tomorrow. Add one above!",
    }
}

pub fn render<S: KeyValueStore>(store: &TaskStore<S>) -> Board {
    render_tasks(store.tasks())
}

pub fn render_tasks(tasks: &[Task]) -> Board {
    let sections = Section::ALL
        .iter()
        .map(|&section| render_section(tasks, section))
        .collect();

    Board {
        sections,
        tracker: Statistics::from_tasks(tasks).into(),
    }
}

fn render_section(tasks: &[Task], section: Section) -> SectionView {
    let rows: Vec<TaskRow> = tasks
        .iter()
        .filter(|task| task.section == section)
        .map(|task| TaskRow {
            id: task.id,
            text: task.text.clone(),
            completed: task.completed,
            toggle: Action::Toggle(task.id),
            delete: Action::Delete(task.id),
        })
        .collect();

    let content = if rows.is_empty() {
        SectionContent::Empty {
            placeholder: placeholder(section),
        }
    } else {
        SectionContent::Rows { rows }
    };

    SectionView { section, content }
}

#[cfg(test)]
mod tests {
    use super::{SectionContent, Tracker, placeholder, render_tasks};
    use crate::app::Action;
    use crate::model::{Section, Task};
    use crate::store::seed_tasks;

    #[test]
    fn seed_board_has_rows_today_and_placeholder_tomorrow() {
        let board = render_tasks(&seed_tasks());

        match &board.section(Section::Today).unwrap().content {
            SectionContent::Rows { rows } => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].text, "read a book");
                assert_eq!(rows[0].toggle, Action::Toggle(1));
                assert_eq!(rows[1].delete, Action::Delete(2));
                assert!(rows[1].completed);
            }
            other => panic!("unexpected content: {other:?}"),
        }

        assert_eq!(
            board.section(Section::Tomorrow).unwrap().content,
            SectionContent::Empty {
                placeholder: placeholder(Section::Tomorrow)
            }
        );
    }

    #[test]
    fn empty_list_renders_both_placeholders_and_zero_tracker() {
        let board = render_tasks(&[]);

        for view in &board.sections {
            assert!(matches!(view.content, SectionContent::Empty { .. }));
        }
        assert_eq!(
            board.tracker,
            Tracker {
                total: 0,
                completed: 0,
                percent_label: "0%".to_string(),
                fill_width: 0,
            }
        );
    }

    #[test]
    fn rows_keep_insertion_order_within_section() {
        let tasks = vec![
            Task {
                id: 30,
                text: "c".into(),
                completed: false,
                section: Section::Tomorrow,
            },
            Task {
                id: 10,
                text: "a".into(),
                completed: false,
                section: Section::Today,
            },
            Task {
                id: 20,
                text: "b".into(),
                completed: false,
                section: Section::Tomorrow,
            },
        ];

        let board = render_tasks(&tasks);
        let SectionContent::Rows { rows } = &board.section(Section::Tomorrow).unwrap().content
        else {
            panic!("expected rows");
        };
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![30, 20]);
    }

    #[test]
    fn tracker_labels_percent() {
        let board = render_tasks(&seed_tasks());
        assert_eq!(board.tracker.percent_label, "50%");
        assert_eq!(board.tracker.fill_width, 50);
    }
}
