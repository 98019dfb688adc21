use std::rc::Rc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use taskio_gui_shared::{TaskCreate, TaskDto, TaskId, TaskPatch, TaskStatus};
use tracing::{debug, info};

use crate::api::TaskApi;
use crate::board::BoardController;
use crate::error::{AppError, ValidationError};
use crate::modal::ModalController;
use crate::notify::{Notifier, Toast};
use crate::route::RouteName;
use crate::view::{TASK_FORM_FRAGMENT, ViewLoader};

pub const TITLE_MAX: usize = 50;
pub const DETAIL_MAX: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(TaskId),
}

/// Live feedback for one text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFeedback {
    pub counter: String,
    pub error: Option<ValidationError>,
}

impl FieldFeedback {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Text shown next to the field; empty when valid.
    pub fn message(&self) -> String {
        self.error.map(|err| err.to_string()).unwrap_or_default()
    }
}

/// Inline error slots of the form. Date and time share one.
pub const INLINE_FIELDS: [&str; 3] = ["title", "detail", "schedule"];

/// Inline slot a validation problem is shown in.
pub fn field_of(error: ValidationError) -> Option<&'static str> {
    match error {
        ValidationError::TitleLength => Some("title"),
        ValidationError::DetailLength => Some("detail"),
        ValidationError::Required("date" | "time") | ValidationError::InvalidDateTime => {
            Some("schedule")
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskSubmission {
    Create(TaskCreate),
    Update(TaskId, TaskPatch),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    mode: FormMode,
    pub title: String,
    pub detail: String,
    pub date: String,
    pub time: String,
    pub status: TaskStatus,
}

impl TaskForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            detail: String::new(),
            date: String::new(),
            time: String::new(),
            status: TaskStatus::Todo,
        }
    }

    /// Pre-fills every field from `task`, with the due date shown in `tz`.
    pub fn edit(task: &TaskDto, tz: Tz) -> Self {
        let local = task.due_date.map(|due| due.with_timezone(&tz));
        Self {
            mode: FormMode::Edit(task.id.clone()),
            title: task.title.clone(),
            detail: task.detail.clone().unwrap_or_default(),
            date: local
                .map(|due| due.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            time: local
                .map(|due| due.format("%H:%M").to_string())
                .unwrap_or_default(),
            status: task.status,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn set_title(&mut self, value: &str) -> FieldFeedback {
        self.title = value.to_string();
        self.title_feedback()
    }

    pub fn set_detail(&mut self, value: &str) -> FieldFeedback {
        self.detail = value.to_string();
        self.detail_feedback()
    }

    pub fn title_feedback(&self) -> FieldFeedback {
        let len = self.title.chars().count();
        let error = (self.title.trim().is_empty() || len > TITLE_MAX)
            .then_some(ValidationError::TitleLength);
        FieldFeedback {
            counter: format!("{len}/{TITLE_MAX}"),
            error,
        }
    }

    pub fn detail_feedback(&self) -> FieldFeedback {
        let len = self.detail.chars().count();
        FieldFeedback {
            counter: format!("{len}/{DETAIL_MAX}"),
            error: (len > DETAIL_MAX).then_some(ValidationError::DetailLength),
        }
    }

    pub fn errors(&self, tz: Tz) -> Vec<ValidationError> {
        let mut errors: Vec<ValidationError> = [self.title_feedback(), self.detail_feedback()]
            .into_iter()
            .filter_map(|feedback| feedback.error)
            .collect();
        if let Err(err) = self.due_date(tz) {
            errors.push(err);
        }
        errors
    }

    pub fn can_submit(&self, tz: Tz) -> bool {
        self.errors(tz).is_empty()
    }

    pub fn schedule_error(&self, tz: Tz) -> Option<ValidationError> {
        self.due_date(tz).err()
    }

    /// Every current problem paired with the slot it is shown in.
    pub fn inline_errors(&self, tz: Tz) -> Vec<(&'static str, ValidationError)> {
        self.errors(tz)
            .into_iter()
            .filter_map(|err| field_of(err).map(|field| (field, err)))
            .collect()
    }

    /// Combines the date and time fields into one instant in `tz`.
    pub fn due_date(&self, tz: Tz) -> Result<DateTime<Utc>, ValidationError> {
        let date = self.date.trim();
        let time = self.time.trim();
        if date.is_empty() {
            return Err(ValidationError::Required("date"));
        }
        if time.is_empty() {
            return Err(ValidationError::Required("time"));
        }

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDateTime)?;
        let time = NaiveTime::parse_from_str(time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
            .map_err(|_| ValidationError::InvalidDateTime)?;

        tz.from_local_datetime(&NaiveDateTime::new(date, time))
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or(ValidationError::InvalidDateTime)
    }

    pub fn submission(&self, tz: Tz) -> Result<TaskSubmission, AppError> {
        let errors = self.errors(tz);
        if !errors.is_empty() {
            return Err(AppError::ValidationFailure(errors));
        }
        let due_date = self.due_date(tz)?;
        let title = self.title.trim().to_string();
        let detail = Some(self.detail.trim().to_string()).filter(|detail| !detail.is_empty());

        Ok(match &self.mode {
            FormMode::Create => TaskSubmission::Create(TaskCreate {
                title,
                detail,
                status: self.status,
                due_date,
            }),
            FormMode::Edit(id) => TaskSubmission::Update(
                id.clone(),
                TaskPatch {
                    title: Some(title),
                    detail: Some(detail.unwrap_or_default()),
                    status: Some(self.status),
                    due_date: Some(due_date),
                },
            ),
        })
    }
}

/// Opens the task form inside the modal.
pub struct TaskEditor {
    loader: ViewLoader,
    modal: Rc<ModalController>,
    tz: Tz,
}

impl TaskEditor {
    pub fn new(loader: ViewLoader, modal: Rc<ModalController>, tz: Tz) -> Self {
        Self { loader, modal, tz }
    }

    /// Create mode without `task`, edit mode pre-filled from it otherwise.
    #[tracing::instrument(skip_all)]
    pub async fn open(&self, task: Option<&TaskDto>) -> Result<TaskForm, AppError> {
        let fragment = self
            .loader
            .load_fragment(TASK_FORM_FRAGMENT)
            .await
            .map_err(|source| AppError::FragmentLoadFailure {
                route: RouteName::TaskNew,
                source,
            })?;
        self.modal.open(&fragment);
        Ok(match task {
            Some(task) => TaskForm::edit(task, self.tz),
            None => TaskForm::create(),
        })
    }
}

pub struct TaskFormController {
    api: Rc<dyn TaskApi>,
    notifier: Rc<dyn Notifier>,
    modal: Rc<ModalController>,
    board: Option<Rc<BoardController>>,
    tz: Tz,
}

impl TaskFormController {
    pub fn new(
        api: Rc<dyn TaskApi>,
        notifier: Rc<dyn Notifier>,
        modal: Rc<ModalController>,
        tz: Tz,
    ) -> Self {
        Self {
            api,
            notifier,
            modal,
            board: None,
            tz,
        }
    }

    /// Board to refresh after a successful save.
    pub fn with_board(mut self, board: Rc<BoardController>) -> Self {
        self.board = Some(board);
        self
    }

    /// Validates and sends the form. Invalid forms never reach the API;
    /// failed requests keep the modal open with the user's input intact.
    #[tracing::instrument(skip_all)]
    pub async fn submit(&self, form: &TaskForm) -> Result<TaskDto, AppError> {
        let submission = form.submission(self.tz).inspect_err(|err| {
            debug!(error = %err, "task form rejected");
        })?;

        let (result, done) = match &submission {
            TaskSubmission::Create(create) => (self.api.create(create).await, "Task created"),
            TaskSubmission::Update(id, patch) => {
                (self.api.update(id, patch).await, "Task updated")
            }
        };

        match result {
            Ok(task) => {
                info!(id = %task.id, "task saved");
                self.notifier.notify(Toast::success(done));
                self.modal.close();
                if let Some(board) = &self.board {
                    // load() reports its own failure
                    let _ = board.load().await;
                }
                Ok(task)
            }
            Err(err) => {
                let err = AppError::from(err);
                self.notifier.fail("Could not save the task", &err);
                Err(err)
            }
        }
    }

    /// Submission from the standalone `taskNew` page: success leads back
    /// to the board.
    pub async fn submit_page(&self, form: &TaskForm) -> Result<RouteName, AppError> {
        self.submit(form).await?;
        Ok(RouteName::TaskList)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn filled() -> TaskForm {
        let mut form = TaskForm::create();
        form.set_title("Configure router");
        form.date = "2025-09-20".into();
        form.time = "08:30".into();
        form
    }

    #[test]
    fn counters_track_characters() {
        let mut form = TaskForm::create();
        assert_eq!(form.set_title("añadir").counter, "6/50");
        assert_eq!(form.set_detail("").counter, "0/500");
    }

    #[test]
    fn title_bounds() {
        let mut form = TaskForm::create();
        assert!(!form.set_title("").is_valid());
        assert!(!form.set_title("   ").is_valid());
        assert!(form.set_title(&"a".repeat(50)).is_valid());
        assert!(!form.set_title(&"a".repeat(51)).is_valid());
    }

    #[test]
    fn detail_limit() {
        let mut form = filled();
        assert!(form.set_detail(&"d".repeat(500)).is_valid());
        assert_eq!(
            form.set_detail(&"d".repeat(501)).error,
            Some(ValidationError::DetailLength)
        );
        assert!(!form.can_submit(chrono_tz::UTC));
    }

    #[test]
    fn inline_errors_track_each_field() {
        let mut form = TaskForm::create();
        assert!(!form.can_submit(chrono_tz::UTC));
        assert_eq!(
            form.inline_errors(chrono_tz::UTC),
            vec![
                ("title", ValidationError::TitleLength),
                ("schedule", ValidationError::Required("date")),
            ]
        );

        let mut form = filled();
        assert!(form.can_submit(chrono_tz::UTC));
        assert_eq!(form.title_feedback().message(), "");

        let cleared = form.set_title("");
        assert_eq!(cleared.message(), "title must be between 1 and 50 characters");
        let long = form.set_detail(&"d".repeat(501));
        assert_eq!(long.message(), "detail must be at most 500 characters");
        assert!(!form.can_submit(chrono_tz::UTC));
        assert_eq!(
            form.inline_errors(chrono_tz::UTC)
                .into_iter()
                .map(|(field, _)| field)
                .collect::<Vec<_>>(),
            vec!["title", "detail"]
        );

        form.set_title("back");
        form.set_detail("");
        form.time = "25:99".into();
        assert_eq!(
            form.schedule_error(chrono_tz::UTC),
            Some(ValidationError::InvalidDateTime)
        );
        assert!(!form.can_submit(chrono_tz::UTC));
    }

    #[test]
    fn missing_time_blocks_submission() {
        let mut form = filled();
        form.time.clear();
        assert_eq!(
            form.submission(chrono_tz::UTC),
            Err(AppError::ValidationFailure(vec![ValidationError::Required("time")]))
        );
    }

    #[test]
    fn due_date_is_interpreted_in_configured_zone() {
        let form = filled();
        let due = form
            .due_date(chrono_tz::America::Bogota)
            .expect("valid due date");
        assert_eq!(
            due,
            Utc.with_ymd_and_hms(2025, 9, 20, 13, 30, 0).single().expect("utc")
        );
    }

    #[test]
    fn edit_mode_prefills_and_targets_update() {
        let task = TaskDto {
            id: TaskId::from("t1"),
            title: "Write docs".into(),
            detail: Some("Use rustdoc".into()),
            status: TaskStatus::InProgress,
            due_date: Utc.with_ymd_and_hms(2025, 9, 21, 17, 0, 0).single(),
        };
        let form = TaskForm::edit(&task, chrono_tz::America::Bogota);
        assert_eq!(form.date, "2025-09-21");
        assert_eq!(form.time, "12:00");
        assert_eq!(form.detail, "Use rustdoc");

        match form.submission(chrono_tz::America::Bogota).expect("valid") {
            TaskSubmission::Update(id, patch) => {
                assert_eq!(id, TaskId::from("t1"));
                assert_eq!(patch.status, Some(TaskStatus::InProgress));
                assert_eq!(patch.due_date, task.due_date);
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn blank_detail_is_omitted_on_create() {
        let mut form = filled();
        form.set_detail("   ");
        match form.submission(chrono_tz::UTC).expect("valid") {
            TaskSubmission::Create(create) => assert_eq!(create.detail, None),
            other => panic!("expected create, got {other:?}"),
        }
    }
}
