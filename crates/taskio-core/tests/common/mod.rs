#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use taskio_core::api::{SessionProbe, SessionStatus, TaskApi};
use taskio_core::board::BoardView;
use taskio_core::error::{ApiError, AppError, FetchError};
use taskio_core::layout::Layout;
use taskio_core::modal::{ModalSurface, Subscription};
use taskio_core::notify::{Notifier, Toast, ToastKind};
use taskio_core::render::ColumnMarkup;
use taskio_core::route::{RouteDefinition, RouteName, RouteTable, ViewInit};
use taskio_core::router::{RootContainer, RouteContext, Router, RouterParts, ViewInitializer};
use taskio_core::view::{FragmentSource, ViewLoader};
use taskio_gui_shared::{
    TaskCreate, TaskDto, TaskId, TaskPatch, TaskStatsDto, TaskStatus,
};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn task(id: &str, status: TaskStatus) -> TaskDto {
    TaskDto {
        id: TaskId::from(id),
        title: format!("task {id}"),
        detail: None,
        status,
        due_date: None,
    }
}

pub struct FakeSession {
    pub status: Cell<SessionStatus>,
    pub calls: Cell<u32>,
}

impl FakeSession {
    pub fn new(status: SessionStatus) -> Self {
        Self {
            status: Cell::new(status),
            calls: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl SessionProbe for FakeSession {
    async fn probe(&self) -> Result<SessionStatus, ApiError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.status.get())
    }
}

/// Serves `<section data-view="name">` for every fragment except the
/// missing ones. A gated fragment waits until its sender fires.
#[derive(Default)]
pub struct FakeFragments {
    pub missing: RefCell<HashSet<String>>,
    pub gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
    pub fetched: RefCell<Vec<String>>,
}

impl FakeFragments {
    pub fn gate(&self, name: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(name.to_string(), rx);
        tx
    }
}

#[async_trait(?Send)]
impl FragmentSource for FakeFragments {
    async fn fetch(&self, name: &str) -> Result<String, FetchError> {
        self.fetched.borrow_mut().push(name.to_string());
        let gate = self.gates.borrow_mut().remove(name);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.missing.borrow().contains(name) {
            return Err(FetchError::NotFound {
                name: name.to_string(),
                status: 404,
            });
        }
        Ok(format!(r#"<section data-view="{name}"></section>"#))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootEvent {
    Mounted(RouteName, String),
    Error(String),
    Redirect(RouteName),
}

#[derive(Default)]
pub struct RecordingRoot {
    pub events: RefCell<Vec<RootEvent>>,
}

impl RecordingRoot {
    pub fn mounted(&self) -> Vec<RouteName> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                RootEvent::Mounted(route, _) => Some(*route),
                _ => None,
            })
            .collect()
    }
}

impl RootContainer for RecordingRoot {
    fn mount_view(&self, route: &RouteDefinition, markup: &str) {
        self.events
            .borrow_mut()
            .push(RootEvent::Mounted(route.name, markup.to_string()));
    }

    fn show_error(&self, markup: &str) {
        self.events
            .borrow_mut()
            .push(RootEvent::Error(markup.to_string()));
    }

    fn redirect(&self, to: RouteName) {
        self.events.borrow_mut().push(RootEvent::Redirect(to));
    }
}

#[derive(Default)]
pub struct RecordingInitializer {
    pub runs: RefCell<Vec<(ViewInit, RouteName)>>,
}

#[async_trait(?Send)]
impl ViewInitializer for RecordingInitializer {
    async fn initialize(&self, init: ViewInit, ctx: &RouteContext) -> Result<(), AppError> {
        self.runs.borrow_mut().push((init, ctx.route));
        Ok(())
    }
}

pub struct RouterHarness {
    pub router: Router,
    pub session: Rc<FakeSession>,
    pub fragments: Rc<FakeFragments>,
    pub root: Rc<RecordingRoot>,
    pub initializer: Rc<RecordingInitializer>,
}

impl RouterHarness {
    pub fn new(status: SessionStatus) -> Self {
        let session = Rc::new(FakeSession::new(status));
        let fragments = Rc::new(FakeFragments::default());
        let root = Rc::new(RecordingRoot::default());
        let initializer = Rc::new(RecordingInitializer::default());
        let router = Router::new(
            RouteTable::standard(),
            RouterParts {
                loader: ViewLoader::new(fragments.clone()),
                layout: Layout::new("Taskio", 2025),
                session: session.clone(),
                root: root.clone(),
                initializer: initializer.clone(),
            },
        );
        Self {
            router,
            session,
            fragments,
            root,
            initializer,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    List,
    Create(TaskCreate),
    Update(TaskId, TaskPatch),
    Delete(TaskId),
    Statistics,
}

/// In-memory task backend recording every request.
#[derive(Default)]
pub struct FakeTaskApi {
    pub tasks: RefCell<Vec<TaskDto>>,
    pub calls: RefCell<Vec<ApiCall>>,
    pub fail_updates: Cell<bool>,
    pub fail_deletes: Cell<bool>,
    /// Holds the next `list()` until the sender fires.
    pub list_gate: RefCell<Option<oneshot::Receiver<()>>>,
    next_id: Cell<u32>,
}

impl FakeTaskApi {
    pub fn with_tasks(tasks: Vec<TaskDto>) -> Self {
        let api = Self::default();
        *api.tasks.borrow_mut() = tasks;
        api
    }

    pub fn gate_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.list_gate.borrow_mut() = Some(rx);
        tx
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: ApiCall) {
        self.calls.borrow_mut().push(call);
    }

    fn server_error() -> ApiError {
        ApiError::Status {
            status: 500,
            message: "internal error".to_string(),
        }
    }
}

#[async_trait(?Send)]
impl TaskApi for FakeTaskApi {
    async fn list(&self) -> Result<Vec<TaskDto>, ApiError> {
        self.record(ApiCall::List);
        let gate = self.list_gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(self.tasks.borrow().clone())
    }

    async fn create(&self, create: &TaskCreate) -> Result<TaskDto, ApiError> {
        self.record(ApiCall::Create(create.clone()));
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        let created = TaskDto {
            id: TaskId::new(format!("new-{n}")),
            title: create.title.clone(),
            detail: create.detail.clone(),
            status: create.status,
            due_date: Some(create.due_date),
        };
        self.tasks.borrow_mut().push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<TaskDto, ApiError> {
        self.record(ApiCall::Update(id.clone(), patch.clone()));
        if self.fail_updates.get() {
            return Err(Self::server_error());
        }
        let mut tasks = self.tasks.borrow_mut();
        let Some(task) = tasks.iter_mut().find(|task| &task.id == id) else {
            return Err(ApiError::Status {
                status: 404,
                message: "task not found".to_string(),
            });
        };
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(detail) = &patch.detail {
            task.detail = Some(detail.clone());
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(due) = patch.due_date {
            task.due_date = Some(due);
        }
        Ok(task.clone())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), ApiError> {
        self.record(ApiCall::Delete(id.clone()));
        if self.fail_deletes.get() {
            return Err(Self::server_error());
        }
        self.tasks.borrow_mut().retain(|task| &task.id != id);
        Ok(())
    }

    async fn statistics(&self) -> Result<TaskStatsDto, ApiError> {
        self.record(ApiCall::Statistics);
        Ok(TaskStatsDto::default())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub toasts: RefCell<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn kinds(&self) -> Vec<ToastKind> {
        self.toasts.borrow().iter().map(|toast| toast.kind).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.borrow_mut().push(toast);
    }
}

#[derive(Default)]
pub struct FakeSurface {
    pub markup: RefCell<Option<String>>,
    pub listeners: Rc<Cell<u32>>,
}

impl ModalSurface for FakeSurface {
    fn has_mount_point(&self) -> bool {
        true
    }

    fn render(&self, markup: &str) {
        *self.markup.borrow_mut() = Some(markup.to_string());
    }

    fn clear(&self) {
        *self.markup.borrow_mut() = None;
    }

    fn listen_escape(&self, _on_escape: Rc<dyn Fn()>) -> Subscription {
        let listeners = Rc::clone(&self.listeners);
        listeners.set(listeners.get() + 1);
        Subscription::new(move || listeners.set(listeners.get() - 1))
    }
}

#[derive(Default)]
pub struct FakeBoardView {
    pub renders: RefCell<Vec<Vec<ColumnMarkup>>>,
    pub highlights: RefCell<Vec<Option<TaskStatus>>>,
}

impl FakeBoardView {
    pub fn last(&self) -> Vec<ColumnMarkup> {
        self.renders.borrow().last().cloned().unwrap_or_default()
    }

    /// Whether the latest render shows a card for `id` inside `status`.
    pub fn shows(&self, status: TaskStatus, id: &str) -> bool {
        let needle = format!(r#"data-task-id="{id}""#);
        self.last()
            .iter()
            .find(|column| column.status == status)
            .is_some_and(|column| column.body.contains(&needle))
    }
}

impl BoardView for FakeBoardView {
    fn render_columns(&self, columns: &[ColumnMarkup]) {
        self.renders.borrow_mut().push(columns.to_vec());
    }

    fn highlight(&self, column: Option<TaskStatus>) {
        self.highlights.borrow_mut().push(column);
    }
}
