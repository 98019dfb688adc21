use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono_tz::Tz;
use taskio_gui_shared::{TaskDto, TaskId, TaskStatus};
use tracing::{debug, info, warn};

use crate::api::TaskApi;
use crate::error::AppError;
use crate::modal::ModalController;
use crate::notify::{Notifier, Toast};
use crate::render::{self, ColumnMarkup};

/// Tasks grouped by status, in board order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardColumns {
    todo: Vec<TaskDto>,
    in_progress: Vec<TaskDto>,
    done: Vec<TaskDto>,
}

impl BoardColumns {
    pub fn group(tasks: &[TaskDto]) -> Self {
        let mut columns = Self::default();
        for task in tasks {
            columns.column_mut(task.status).push(task.clone());
        }
        columns
    }

    pub fn get(&self, status: TaskStatus) -> &[TaskDto] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }

    pub fn ids(&self, status: TaskStatus) -> Vec<TaskId> {
        self.get(status).iter().map(|task| task.id.clone()).collect()
    }

    fn column_mut(&mut self, status: TaskStatus) -> &mut Vec<TaskDto> {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Done => &mut self.done,
        }
    }
}

/// A local status change awaiting confirmation from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    pub id: TaskId,
    pub from: TaskStatus,
    pub to: TaskStatus,
}

/// Canonical board state for one render pass.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    tasks: Vec<TaskDto>,
    drag_over: Option<TaskStatus>,
}

impl BoardState {
    pub fn new(tasks: Vec<TaskDto>) -> Self {
        Self {
            tasks,
            drag_over: None,
        }
    }

    pub fn tasks(&self) -> &[TaskDto] {
        &self.tasks
    }

    pub fn columns(&self) -> BoardColumns {
        BoardColumns::group(&self.tasks)
    }

    pub fn task(&self, id: &TaskId) -> Option<&TaskDto> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn drag_over(&self) -> Option<TaskStatus> {
        self.drag_over
    }

    /// Returns true when the highlighted column changed.
    pub fn set_drag_over(&mut self, column: Option<TaskStatus>) -> bool {
        let changed = self.drag_over != column;
        self.drag_over = column;
        changed
    }

    /// Moves one task; `None` if it is unknown or already in `to`.
    pub fn move_task(&mut self, id: &TaskId, to: TaskStatus) -> Option<PendingMove> {
        let task = self.tasks.iter_mut().find(|task| &task.id == id)?;
        if task.status == to {
            return None;
        }
        let from = task.status;
        task.status = to;
        Some(PendingMove {
            id: id.clone(),
            from,
            to,
        })
    }

    /// Undoes `pending` unless the task has moved again since.
    pub fn revert(&mut self, pending: &PendingMove) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == pending.id) {
            Some(task) if task.status == pending.to => {
                task.status = pending.from;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: &TaskId) -> Option<TaskDto> {
        let index = self.tasks.iter().position(|task| &task.id == id)?;
        Some(self.tasks.remove(index))
    }
}

/// The three column containers of the board view.
pub trait BoardView {
    fn render_columns(&self, columns: &[ColumnMarkup]);
    fn highlight(&self, column: Option<TaskStatus>);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Moved(PendingMove),
    Unchanged,
    UnknownTask,
    RolledBack(AppError),
}

pub struct BoardController {
    state: RefCell<BoardState>,
    api: Rc<dyn TaskApi>,
    view: Rc<dyn BoardView>,
    notifier: Rc<dyn Notifier>,
    modal: Rc<ModalController>,
    pending_delete: RefCell<Option<TaskId>>,
    retired: Cell<bool>,
    tz: Tz,
}

impl BoardController {
    pub fn new(
        api: Rc<dyn TaskApi>,
        view: Rc<dyn BoardView>,
        notifier: Rc<dyn Notifier>,
        modal: Rc<ModalController>,
        tz: Tz,
    ) -> Self {
        Self {
            state: RefCell::new(BoardState::default()),
            api,
            view,
            notifier,
            modal,
            pending_delete: RefCell::new(None),
            retired: Cell::new(false),
            tz,
        }
    }

    pub fn columns(&self) -> BoardColumns {
        self.state.borrow().columns()
    }

    /// Detaches the controller from its view. Requests still in flight
    /// keep updating state but never draw again, so a board mounted later
    /// on the same containers is left alone.
    pub fn retire(&self) {
        if !self.retired.replace(true) {
            debug!("board retired");
        }
    }

    pub fn is_retired(&self) -> bool {
        self.retired.get()
    }

    fn paint_highlight(&self, column: Option<TaskStatus>) {
        if !self.is_retired() {
            self.view.highlight(column);
        }
    }

    pub fn task(&self, id: &TaskId) -> Option<TaskDto> {
        self.state.borrow().task(id).cloned()
    }

    pub fn pending_delete(&self) -> Option<TaskId> {
        self.pending_delete.borrow().clone()
    }

    /// Fetches the task set and rebuilds every column.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> Result<usize, AppError> {
        match self.api.list().await {
            Ok(tasks) => {
                let count = tasks.len();
                *self.state.borrow_mut() = BoardState::new(tasks);
                self.render();
                info!(count, "board loaded");
                Ok(count)
            }
            Err(err) => {
                let err = AppError::from(err);
                self.notifier.fail("Could not load tasks", &err);
                self.render();
                Err(err)
            }
        }
    }

    /// Full re-render of all columns from state.
    pub fn render(&self) {
        if self.is_retired() {
            debug!("skipping render of retired board");
            return;
        }
        let markup = {
            let state = self.state.borrow();
            render::board_columns(&state.columns(), state.drag_over(), self.tz)
        };
        self.view.render_columns(&markup);
    }

    pub fn drag_over(&self, column: TaskStatus) {
        if self.state.borrow_mut().set_drag_over(Some(column)) {
            self.paint_highlight(Some(column));
        }
    }

    pub fn drag_leave(&self, column: TaskStatus) {
        let mut state = self.state.borrow_mut();
        if state.drag_over() == Some(column) {
            state.set_drag_over(None);
            drop(state);
            self.paint_highlight(None);
        }
    }

    /// Two-phase status change: apply and render locally, persist, and
    /// revert with a second render if the API rejects it.
    #[tracing::instrument(skip(self))]
    pub async fn drop_task(&self, id: &TaskId, to: TaskStatus) -> DropOutcome {
        let pending = {
            let mut state = self.state.borrow_mut();
            state.set_drag_over(None);
            match state.task(id).map(|task| task.status) {
                None => None,
                Some(status) if status == to => Some(None),
                Some(_) => Some(state.move_task(id, to)),
            }
        };
        self.paint_highlight(None);

        let pending = match pending {
            None => {
                warn!(%id, "dropped unknown task");
                return DropOutcome::UnknownTask;
            }
            Some(None) => return DropOutcome::Unchanged,
            Some(Some(pending)) => pending,
        };
        self.render();

        match self.api.update_status(id, to).await {
            Ok(_) => {
                debug!(%id, from = %pending.from, %to, "status persisted");
                DropOutcome::Moved(pending)
            }
            Err(err) => {
                self.state.borrow_mut().revert(&pending);
                self.render();
                let err = AppError::from(err);
                self.notifier.fail("Could not move the task", &err);
                DropOutcome::RolledBack(err)
            }
        }
    }

    /// Opens the confirmation dialog for `id`, replacing any earlier
    /// pending request.
    pub fn request_delete(&self, id: &TaskId) -> bool {
        let Some(task) = self.task(id) else {
            warn!(%id, "delete requested for unknown task");
            return false;
        };
        *self.pending_delete.borrow_mut() = Some(id.clone());
        self.modal.open(&render::delete_confirm(&task));
        true
    }

    /// Deletes the pending task. The card disappears only once the API
    /// has accepted the request.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_delete(&self) -> Result<Option<TaskId>, AppError> {
        let Some(id) = self.pending_delete.borrow_mut().take() else {
            return Ok(None);
        };

        let result = self.api.delete(&id).await;
        self.modal.close();
        match result {
            Ok(()) => {
                self.state.borrow_mut().remove(&id);
                self.render();
                self.notifier.notify(Toast::success("Task deleted"));
                info!(%id, "task deleted");
                Ok(Some(id))
            }
            Err(err) => {
                let err = AppError::from(err);
                self.notifier.fail("Could not delete the task", &err);
                Err(err)
            }
        }
    }

    pub fn cancel_delete(&self) {
        self.pending_delete.borrow_mut().take();
        self.modal.close();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn task(id: &str, status: TaskStatus) -> TaskDto {
        TaskDto {
            id: TaskId::from(id),
            title: format!("task {id}"),
            detail: None,
            status,
            due_date: None,
        }
    }

    #[test]
    fn groups_tasks_by_status() {
        let columns = BoardColumns::group(&[
            task("1", TaskStatus::Todo),
            task("2", TaskStatus::Done),
        ]);
        assert_eq!(columns.ids(TaskStatus::Todo), vec![TaskId::from("1")]);
        assert_eq!(columns.ids(TaskStatus::Done), vec![TaskId::from("2")]);
        assert!(columns.get(TaskStatus::InProgress).is_empty());
    }

    #[test]
    fn move_to_same_status_is_not_a_move() {
        let mut state = BoardState::new(vec![task("1", TaskStatus::Todo)]);
        assert_eq!(state.move_task(&TaskId::from("1"), TaskStatus::Todo), None);
        assert_eq!(state.move_task(&TaskId::from("9"), TaskStatus::Done), None);
    }

    #[test]
    fn revert_skips_task_moved_again() {
        let mut state = BoardState::new(vec![task("1", TaskStatus::Todo)]);
        let id = TaskId::from("1");
        let first = state.move_task(&id, TaskStatus::Done).expect("first move");
        state.move_task(&id, TaskStatus::InProgress).expect("second move");
        assert!(!state.revert(&first));
        assert_eq!(state.task(&id).map(|t| t.status), Some(TaskStatus::InProgress));
    }
}
