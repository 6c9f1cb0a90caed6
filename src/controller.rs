//! Interaction controller.
//!
//! Owns the board cache and every piece of interaction state (forms, pending
//! confirmation, drag, notification). Input handlers call into it; it talks to
//! the [`TaskApi`] and patches the cache with whatever the server returns.
//! A failed call never touches the cache.

use crate::api::TaskApi;
use crate::error::{ClientError, Result};
use crate::kanban_board::KanbanBoard;
use crate::task::{Status, Task, TaskId, TaskPatch};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub const EMPTY_TITLE_MESSAGE: &str = "Please enter a task title";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormField {
    #[default]
    Title,
    Description,
}

/// Title and description inputs shared by the add form and the edit modal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub focus: FormField,
}

impl TaskForm {
    pub fn push_char(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Title,
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Trimmed title and description; a blank description becomes `None`.
    fn values(&self) -> Result<(String, Option<String>)> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ClientError::EmptyTitle);
        }
        let description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        Ok((title.to_string(), description))
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditForm {
    pub id: TaskId,
    pub form: TaskForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NoticeKind,
    pub shown_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    pub task_id: TaskId,
    /// Column currently under the pointer, if any.
    pub over: Option<Status>,
}

pub struct Controller<A> {
    api: A,
    board: KanbanBoard,
    add_form: TaskForm,
    edit: Option<EditForm>,
    pending_delete: Option<TaskId>,
    drag: Option<DragState>,
    notification: Option<Notification>,
    toast_duration: Duration,
}

impl<A: TaskApi> Controller<A> {
    pub fn new(api: A, toast_duration: Duration) -> Self {
        Self {
            api,
            board: KanbanBoard::new(),
            add_form: TaskForm::default(),
            edit: None,
            pending_delete: None,
            drag: None,
            notification: None,
            toast_duration,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn board(&self) -> &KanbanBoard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut KanbanBoard {
        &mut self.board
    }

    pub fn tasks(&self) -> &[Task] {
        self.board.tasks()
    }

    pub fn add_form(&self) -> &TaskForm {
        &self.add_form
    }

    pub fn add_form_mut(&mut self) -> &mut TaskForm {
        &mut self.add_form
    }

    pub fn edit_form(&self) -> Option<&EditForm> {
        self.edit.as_ref()
    }

    pub fn edit_form_mut(&mut self) -> Option<&mut EditForm> {
        self.edit.as_mut()
    }

    pub fn pending_delete(&self) -> Option<TaskId> {
        self.pending_delete
    }

    pub fn drag(&self) -> Option<DragState> {
        self.drag
    }

    /// The current notification, unless it has outlived the toast duration.
    pub fn notification(&self, now: Instant) -> Option<&Notification> {
        self.notification
            .as_ref()
            .filter(|n| now.duration_since(n.shown_at) < self.toast_duration)
    }

    pub fn expire_notification(&mut self, now: Instant) {
        if self.notification(now).is_none() {
            self.notification = None;
        }
    }

    pub async fn load(&mut self) {
        match self.api.list_tasks().await {
            Ok(tasks) => {
                info!(count = tasks.len(), "loaded tasks");
                self.board.replace_all(tasks);
            }
            Err(e) => self.fail("Failed to load tasks", &e),
        }
    }

    pub async fn submit_new_task(&mut self) {
        let (title, description) = match self.add_form.values() {
            Ok(values) => values,
            Err(_) => {
                self.notify(EMPTY_TITLE_MESSAGE, NoticeKind::Error);
                return;
            }
        };

        match self.api.create_task(&title, description.as_deref()).await {
            Ok(task) => {
                info!(task_id = task.id, "created task");
                self.board.push(task);
                self.add_form.clear();
                self.notify("Task added successfully!", NoticeKind::Success);
            }
            Err(e) => self.fail("Failed to create task", &e),
        }
    }

    pub async fn move_task(&mut self, id: TaskId, status: Status) {
        match self.api.update_task(id, &TaskPatch::status(status)).await {
            Ok(task) => {
                info!(task_id = id, %status, "moved task");
                if self.board.replace(task) {
                    self.board.select(id);
                }
                self.notify("Task moved successfully!", NoticeKind::Success);
            }
            Err(e) => self.fail("Failed to move task", &e),
        }
    }

    /// Asks for confirmation before deleting; nothing is sent yet.
    pub fn request_delete(&mut self, id: TaskId) {
        if self.board.get(id).is_some() {
            self.pending_delete = Some(id);
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub async fn confirm_delete(&mut self) {
        let Some(id) = self.pending_delete.take() else {
            return;
        };
        match self.api.delete_task(id).await {
            Ok(()) => {
                info!(task_id = id, "deleted task");
                self.board.remove(id);
                self.notify("Task deleted successfully!", NoticeKind::Success);
            }
            Err(e) => self.fail("Failed to delete task", &e),
        }
    }

    /// Opens the edit modal pre-filled from the cache. Unknown ids are ignored.
    pub fn open_edit(&mut self, id: TaskId) {
        let Some(task) = self.board.get(id) else {
            debug!(task_id = id, "edit requested for task not on the board");
            return;
        };
        self.edit = Some(EditForm {
            id,
            form: TaskForm {
                title: task.title.clone(),
                description: task.description.clone().unwrap_or_default(),
                focus: FormField::Title,
            },
        });
    }

    pub fn close_edit(&mut self) {
        self.edit = None;
    }

    /// Sends the edit modal. The modal stays open when validation or the request fails.
    pub async fn submit_edit(&mut self) {
        let Some(edit) = self.edit.as_ref() else {
            return;
        };
        let id = edit.id;
        let (title, description) = match edit.form.values() {
            Ok(values) => values,
            Err(_) => {
                self.notify(EMPTY_TITLE_MESSAGE, NoticeKind::Error);
                return;
            }
        };

        match self
            .api
            .update_task(id, &TaskPatch::content(title, description))
            .await
        {
            Ok(task) => {
                info!(task_id = id, "updated task");
                self.board.replace(task);
                self.edit = None;
                self.notify("Task updated successfully!", NoticeKind::Success);
            }
            Err(e) => self.fail("Failed to update task", &e),
        }
    }

    pub fn drag_start(&mut self, id: TaskId) {
        debug!(task_id = id, "drag started");
        self.drag = Some(DragState {
            task_id: id,
            over: None,
        });
    }

    pub fn drag_over(&mut self, column: Option<Status>) {
        if let Some(drag) = self.drag.as_mut() {
            drag.over = column;
        }
    }

    pub fn drag_end(&mut self) {
        self.drag = None;
    }

    /// Finishes a drag over `column`, moving the dragged task there.
    pub async fn drop_on(&mut self, column: Status) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        self.move_task(drag.task_id, column).await;
    }

    fn notify(&mut self, message: &str, kind: NoticeKind) {
        self.notification = Some(Notification {
            message: message.to_string(),
            kind,
            shown_at: Instant::now(),
        });
    }

    fn fail(&mut self, message: &str, err: &ClientError) {
        error!(error = %err, "{message}");
        self.notify(message, NoticeKind::Error);
    }
}
