//! Board view model.
//!
//! [`render_board`] is a pure function of the task list and the current time.
//! It decides what each column shows; `ui` only decides where it goes.

use crate::task::{Status, Task, TaskId};
use chrono::{DateTime, Utc};

pub const EMPTY_PLACEHOLDER: &str = "No tasks yet";

#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub columns: [ColumnView; 3],
}

impl BoardView {
    pub fn column(&self, status: Status) -> &ColumnView {
        &self.columns[status.index()]
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(|c| c.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    pub status: Status,
    pub heading: &'static str,
    pub count: usize,
    pub body: ColumnBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnBody {
    Empty(&'static str),
    Cards(Vec<CardView>),
}

impl ColumnBody {
    pub fn cards(&self) -> &[CardView] {
        match self {
            ColumnBody::Empty(_) => &[],
            ColumnBody::Cards(cards) => cards,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: TaskId,
    pub title: String,
    /// One entry per display line; empty when the task has no description.
    pub description: Vec<String>,
    pub created: String,
    pub moves: Vec<MoveButton>,
}

/// A status transition offered on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveButton {
    pub label: &'static str,
    pub hotkey: char,
    pub target: Status,
}

/// Every interactive element a card exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardAction {
    Edit,
    Delete,
    Move(Status),
}

pub fn render_board(tasks: &[Task], now: DateTime<Utc>) -> BoardView {
    BoardView {
        columns: Status::ALL.map(|status| render_column(tasks, status, now)),
    }
}

fn render_column(tasks: &[Task], status: Status, now: DateTime<Utc>) -> ColumnView {
    let cards: Vec<CardView> = tasks
        .iter()
        .filter(|t| t.status == status)
        .map(|t| render_card(t, now))
        .collect();

    ColumnView {
        status,
        heading: status.heading(),
        count: cards.len(),
        body: if cards.is_empty() {
            ColumnBody::Empty(EMPTY_PLACEHOLDER)
        } else {
            ColumnBody::Cards(cards)
        },
    }
}

pub fn render_card(task: &Task, now: DateTime<Utc>) -> CardView {
    let description = task
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(|d| d.lines().map(escape_text).collect())
        .unwrap_or_default();

    CardView {
        id: task.id,
        title: escape_text(&task.title),
        description,
        created: relative_date(task.created_at, now),
        moves: move_buttons(task.status),
    }
}

pub fn move_buttons(status: Status) -> Vec<MoveButton> {
    const TO_DO: MoveButton = MoveButton {
        label: "← To Do",
        hotkey: 't',
        target: Status::Todo,
    };
    match status {
        Status::Todo => vec![MoveButton {
            label: "Start →",
            hotkey: 's',
            target: Status::InProgress,
        }],
        Status::InProgress => vec![
            TO_DO,
            MoveButton {
                label: "Complete →",
                hotkey: 'c',
                target: Status::Done,
            },
        ],
        Status::Done => vec![
            TO_DO,
            MoveButton {
                label: "← Resume",
                hotkey: 'u',
                target: Status::InProgress,
            },
        ],
    }
}

/// `Today`, `Yesterday`, `N days ago`, or the calendar date once a week has passed.
///
/// Days are whole 24h periods of elapsed time, not calendar boundaries.
pub fn relative_date(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - created).num_days().unsigned_abs();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        _ => created.format("%Y-%m-%d").to_string(),
    }
}

/// Makes user text safe to put on the terminal verbatim.
///
/// Printable characters, markup included, pass through untouched. Control
/// characters are replaced by their escaped spelling so they cannot move the
/// cursor or start an escape sequence.
pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kanban_board::tests::task;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_columns_show_placeholder() {
        let view = render_board(&[task(1, "only", Status::Todo)], now());

        assert_eq!(view.column(Status::Todo).count, 1);
        assert!(matches!(view.column(Status::Todo).body, ColumnBody::Cards(_)));
        for status in [Status::InProgress, Status::Done] {
            let column = view.column(status);
            assert_eq!(column.count, 0);
            assert_eq!(column.body, ColumnBody::Empty(EMPTY_PLACEHOLDER));
        }
    }

    #[test]
    fn cards_keep_list_order_within_column() {
        let tasks = vec![
            task(5, "b", Status::Done),
            task(2, "a", Status::Done),
            task(9, "c", Status::Todo),
        ];
        let view = render_board(&tasks, now());
        let ids: Vec<_> = view
            .column(Status::Done)
            .body
            .cards()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![5, 2]);
        assert_eq!(view.total(), 3);
    }

    #[test]
    fn headings_follow_status() {
        let view = render_board(&[], now());
        let headings: Vec<_> = view.columns.iter().map(|c| c.heading).collect();
        assert_eq!(headings, vec!["To Do", "In Progress", "Done"]);
    }

    #[test]
    fn markup_is_displayed_literally() {
        let mut t = task(1, "<script>alert('x')</script> & co", Status::Todo);
        t.description = Some("<b>bold</b>".into());
        let card = render_card(&t, now());
        assert_eq!(card.title, "<script>alert('x')</script> & co");
        assert_eq!(card.description, vec!["<b>bold</b>".to_string()]);
    }

    #[test]
    fn control_characters_are_escaped() {
        assert_eq!(escape_text("\u{1b}[31mred"), "\\u{1b}[31mred");
        assert_eq!(escape_text("a\rb\u{7}"), "a\\rb\\u{7}");
        assert_eq!(escape_text("tab\there"), "tab\\there");
    }

    #[test]
    fn description_lines_are_split_and_escaped() {
        let mut t = task(1, "t", Status::Todo);
        t.description = Some("first\nsecond \u{1b}".into());
        let card = render_card(&t, now());
        assert_eq!(card.description, vec!["first", "second \\u{1b}"]);
    }

    #[test]
    fn blank_description_renders_nothing() {
        let mut t = task(1, "t", Status::Todo);
        t.description = Some(String::new());
        assert!(render_card(&t, now()).description.is_empty());
    }

    #[test]
    fn relative_dates() {
        let now = now();
        assert_eq!(relative_date(now - Duration::hours(23), now), "Today");
        assert_eq!(relative_date(now - Duration::hours(25), now), "Yesterday");
        assert_eq!(relative_date(now - Duration::days(3), now), "3 days ago");
        assert_eq!(relative_date(now - Duration::days(6), now), "6 days ago");
        assert_eq!(relative_date(now - Duration::days(7), now), "2024-05-03");
    }

    #[test]
    fn future_timestamps_use_absolute_difference() {
        let now = now();
        assert_eq!(relative_date(now + Duration::hours(30), now), "Yesterday");
    }

    #[test]
    fn buttons_match_status() {
        let targets = |s| move_buttons(s).iter().map(|b| b.target).collect::<Vec<_>>();
        assert_eq!(targets(Status::Todo), vec![Status::InProgress]);
        assert_eq!(targets(Status::InProgress), vec![Status::Todo, Status::Done]);
        assert_eq!(targets(Status::Done), vec![Status::Todo, Status::InProgress]);

        let labels: Vec<_> = move_buttons(Status::Done).iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["← To Do", "← Resume"]);
    }
}
