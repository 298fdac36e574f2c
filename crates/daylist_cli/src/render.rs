use daylist_core::app::{Frame, Outcome};
use daylist_core::config::Palette;
use daylist_core::effects::Effect;
use daylist_core::model::{Section, Statistics, Task};
use daylist_core::view::{Board, SectionContent, TaskRow, Tracker};
use tabled::settings::Style;
use tabled::{Table, Tabled};

const BAR_WIDTH: usize = 20;

#[derive(Tabled)]
struct RowLine {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Task")]
    text: String,
}

fn section_title(section: Section) -> &'static str {
    match section {
        Section::Today => "Today",
        Section::Tomorrow => "Tomorrow",
    }
}

fn rows_table(rows: &[TaskRow], palette: &Palette) -> String {
    let lines = rows.iter().map(|row| RowLine {
        id: row.id,
        done: if row.completed { "[x]" } else { "[ ]" },
        text: if row.completed {
            palette.doneize(&row.text)
        } else {
            row.text.clone()
        },
    });
    Table::new(lines).with(Style::rounded()).to_string()
}

pub fn progress_bar(tracker: &Tracker, pulsing: bool) -> String {
    let filled = usize::from(tracker.fill_width) * BAR_WIDTH / 100;
    let fill = if pulsing { "=" } else { "#" };
    format!("[{}{}]", fill.repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

pub fn tracker_line(tracker: &Tracker, palette: &Palette, pulsing: bool) -> String {
    format!(
        "Total: {} | Completed: {} | Progress: {} {}",
        tracker.total,
        tracker.completed,
        palette.accentize(&tracker.percent_label),
        progress_bar(tracker, pulsing),
    )
}

pub fn board_text(board: &Board, palette: &Palette, active: &[Effect]) -> String {
    let mut out = String::new();
    for view in &board.sections {
        out.push_str(&palette.accentize(section_title(view.section)));
        out.push('\n');
        match &view.content {
            SectionContent::Empty { placeholder } => {
                out.push_str(&palette.mutedize(placeholder));
            }
            SectionContent::Rows { rows } => out.push_str(&rows_table(rows, palette)),
        }
        out.push_str("\n\n");
    }

    let pulsing = active.contains(&Effect::ProgressPulse);
    out.push_str(&tracker_line(&board.tracker, palette, pulsing));
    out
}

pub fn notes_label(active: &[Effect]) -> &'static str {
    if active.contains(&Effect::NotesSaved) {
        "Saved!"
    } else {
        "Save Notes"
    }
}

pub fn statistics_text(stats: &Statistics) -> String {
    format!(
        "Total: {}\nCompleted: {}\nProgress: {}%",
        stats.total, stats.completed, stats.progress_percent
    )
}

/// Short confirmation for an outcome; `None` when there is nothing to say.
pub fn describe_outcome(outcome: &Outcome) -> Option<String> {
    match outcome {
        Outcome::Added(task) => Some(format!(
            "Added task: {} ({}) to {}",
            task.text, task.id, task.section
        )),
        Outcome::Toggled(task) if task.completed => {
            Some(format!("Completed task: {} ({})", task.text, task.id))
        }
        Outcome::Toggled(task) => Some(format!("Reopened task: {} ({})", task.text, task.id)),
        Outcome::Deleted(tasks) => Some(
            tasks
                .iter()
                .map(|task| format!("Deleted task: {} ({})", task.text, task.id))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Outcome::NotesSaved => Some("Notes saved.".to_string()),
        Outcome::Loaded(report) if report.dropped > 0 => Some(format!(
            "Skipped {} unreadable stored task(s).",
            report.dropped
        )),
        Outcome::Loaded(_) | Outcome::Unchanged | Outcome::Reverted(_) => None,
    }
}

pub fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "text": task.text,
        "completed": task.completed,
        "section": task.section,
    })
}

pub fn outcome_json(outcome: &Outcome) -> serde_json::Value {
    match outcome {
        Outcome::Added(task) | Outcome::Toggled(task) => task_json(task),
        Outcome::Deleted(tasks) => tasks.iter().map(task_json).collect(),
        Outcome::NotesSaved => serde_json::json!({ "saved": true }),
        Outcome::Loaded(_) | Outcome::Unchanged | Outcome::Reverted(_) => {
            serde_json::json!({ "changed": false })
        }
    }
}

pub fn board_json(board: &Board) -> serde_json::Value {
    serde_json::to_value(board).unwrap_or(serde_json::Value::Null)
}

/// Full redraw used by the interactive session after every change.
pub fn frame_text(frame: &Frame, palette: &Palette) -> String {
    let mut out = String::new();
    if let Some(message) = describe_outcome(&frame.outcome) {
        out.push_str(&message);
        out.push_str("\n\n");
    }
    out.push_str(&board_text(&frame.board, palette, &frame.active));
    out.push_str(&format!("\nNotes [{}]", notes_label(&frame.active)));
    out
}

/// Partial redraw once an effect has reverted: tracker and notes label only.
pub fn revert_text(frame: &Frame, palette: &Palette) -> String {
    let pulsing = frame.active.contains(&Effect::ProgressPulse);
    format!(
        "{}\nNotes [{}]",
        tracker_line(&frame.board.tracker, palette, pulsing),
        notes_label(&frame.active)
    )
}
