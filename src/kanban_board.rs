use crate::task::{Status, Task, TaskId};

/// Client-side cache of every task on the board, plus the keyboard selection.
///
/// The list is replaced wholesale on load and patched in place afterwards, so
/// its order is the order the server returned plus appended creations.
#[derive(Debug, Default)]
pub struct KanbanBoard {
    tasks: Vec<Task>,
    selected_status: usize,
    selected_task: usize,
}

impl KanbanBoard {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            selected_status: 0,
            selected_task: 0,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.clamp_selection();
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Swaps in `task` for the cached entry with the same id, keeping its position.
    /// Returns false when the id is not cached.
    pub fn replace(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task;
                self.clamp_selection();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        let removed = self.tasks.remove(index);
        self.clamp_selection();
        Some(removed)
    }

    pub fn get_tasks_by_status(&self, status: Status) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn count(&self, status: Status) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }

    pub fn selected_status(&self) -> Status {
        Status::from_index(self.selected_status).unwrap_or(Status::Todo)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.get_tasks_by_status(self.selected_status())
            .get(self.selected_task)
            .copied()
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.selected_task().map(|t| t.id)
    }

    /// Points the selection at `id`, wherever it currently lives.
    pub fn select(&mut self, id: TaskId) {
        let Some(status) = self.get(id).map(|t| t.status) else {
            return;
        };
        if let Some(position) = self
            .get_tasks_by_status(status)
            .iter()
            .position(|t| t.id == id)
        {
            self.selected_status = status.index();
            self.selected_task = position;
        }
    }

    pub fn select_left(&mut self) {
        if self.selected_status > 0 {
            self.selected_status -= 1;
            self.clamp_selection();
        }
    }

    pub fn select_right(&mut self) {
        if self.selected_status < Status::ALL.len() - 1 {
            self.selected_status += 1;
            self.clamp_selection();
        }
    }

    pub fn select_up(&mut self) {
        if self.selected_task > 0 {
            self.selected_task -= 1;
        }
    }

    pub fn select_down(&mut self) {
        let max_tasks = self.count(self.selected_status());
        if self.selected_task + 1 < max_tasks {
            self.selected_task += 1;
        }
    }

    fn clamp_selection(&mut self) {
        let max_tasks = self.count(self.selected_status());
        self.selected_task = self.selected_task.min(max_tasks.saturating_sub(1));
    }
}
