//! Event-binding registry.
//!
//! Drawing registers every interactive region here, keyed by the task id (or
//! column status) it belongs to. Pointer handling resolves positions through
//! the registry, so input code never needs to know how a card was laid out.

use crate::render::CardAction;
use crate::task::{Status, TaskId};
use ratatui::layout::{Position, Rect};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTarget {
    /// Anywhere on the card; the drag handle.
    Card,
    Title,
    Action(CardAction),
}

impl CardTarget {
    /// Higher wins when regions overlap; buttons sit on top of the card.
    fn precedence(self) -> u8 {
        match self {
            CardTarget::Card => 0,
            CardTarget::Title => 1,
            CardTarget::Action(_) => 2,
        }
    }
}

#[derive(Debug, Default)]
pub struct Bindings {
    tasks: HashMap<TaskId, Vec<(Rect, CardTarget)>>,
    columns: Vec<(Rect, Status)>,
}

impl Bindings {
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.columns.clear();
    }

    pub fn bind_task(&mut self, id: TaskId, area: Rect, target: CardTarget) {
        if area.area() > 0 {
            self.tasks.entry(id).or_default().push((area, target));
        }
    }

    pub fn bind_column(&mut self, status: Status, area: Rect) {
        self.columns.push((area, status));
    }

    pub fn for_task(&self, id: TaskId) -> &[(Rect, CardTarget)] {
        self.tasks.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Finds the area bound to `target` on task `id`.
    pub fn area_of(&self, id: TaskId, target: CardTarget) -> Option<Rect> {
        self.for_task(id)
            .iter()
            .find(|(_, t)| *t == target)
            .map(|(area, _)| *area)
    }

    /// The most specific task target under the pointer.
    pub fn task_at(&self, column: u16, row: u16) -> Option<(TaskId, CardTarget)> {
        let position = Position::new(column, row);
        self.tasks
            .iter()
            .flat_map(|(id, regions)| regions.iter().map(move |(area, t)| (*id, *area, *t)))
            .filter(|(_, area, _)| area.contains(position))
            .max_by_key(|(_, _, target)| target.precedence())
            .map(|(id, _, target)| (id, target))
    }

    pub fn column_at(&self, column: u16, row: u16) -> Option<Status> {
        let position = Position::new(column, row);
        self.columns
            .iter()
            .find(|(area, _)| area.contains(position))
            .map(|(_, status)| *status)
    }
}
