use std::cell::RefCell;
use std::rc::Rc;

use chrono_tz::Tz;
use taskio_core::error::AppError;
use taskio_core::notify::Notifier;
use taskio_core::route::RouteName;
use taskio_core::task_form::{
  FieldFeedback,
  FormMode,
  INLINE_FIELDS,
  TaskEditor,
  TaskForm,
  TaskFormController
};
use taskio_gui_shared::{
  TaskDto,
  TaskStatus
};
use tracing::debug;

use crate::app::AppContext;
use crate::dom::{
  self,
  ListenerBag,
  listen
};

/// Where the form lives decides what
/// happens after a save or cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
  Modal,
  Page
}

/// Opens the task form in the modal, in
/// edit mode when `task` is given.
#[tracing::instrument(skip_all)]
pub async fn open_modal(
  ctx: Rc<AppContext>,
  task: Option<TaskDto>
) {
  let editor = TaskEditor::new(
    ctx.loader.clone(),
    ctx.modal.clone(),
    ctx.tz
  );
  match editor.open(task.as_ref()).await {
    | Ok(form) => {
      wire(
        &ctx,
        form,
        Placement::Modal,
        ctx.surface.listeners()
      );
    }
    | Err(error) => {
      ctx
        .notifier
        .fail("Could not open the task form", &error);
    }
  }
}

/// The standalone `taskNew` page.
pub fn init_page(ctx: &Rc<AppContext>) {
  wire(
    ctx,
    TaskForm::create(),
    Placement::Page,
    &ctx.view_listeners
  );
}

const SUBMIT_ID: &str = "task-form-submit";

fn show_feedback(
  field: &str,
  feedback: &FieldFeedback
) {
  dom::set_text(
    &format!("{field}-count"),
    &feedback.counter
  );
  let message = feedback.message();
  dom::set_validity(field, &message);
  dom::set_text(
    &format!("{field}-error"),
    &message
  );
}

fn show_schedule(form: &TaskForm, tz: Tz) {
  let message = form
    .schedule_error(tz)
    .map(|err| err.to_string())
    .unwrap_or_default();
  dom::set_validity("date", &message);
  dom::set_text("schedule-error", &message);
}

fn update_submit(form: &TaskForm, tz: Tz) {
  dom::set_disabled(
    SUBMIT_ID,
    !form.can_submit(tz)
  );
}

/// After a rejected submit every slot
/// shows its current problem.
fn show_all_errors(form: &TaskForm, tz: Tz) {
  for field in INLINE_FIELDS {
    dom::set_text(
      &format!("{field}-error"),
      ""
    );
  }
  for (field, error) in
    form.inline_errors(tz)
  {
    dom::set_text(
      &format!("{field}-error"),
      &error.to_string()
    );
  }
}

fn fill_fields(form: &TaskForm) {
  dom::set_field_value("title", &form.title);
  dom::set_field_value("detail", &form.detail);
  dom::set_field_value("date", &form.date);
  dom::set_field_value("time", &form.time);
  dom::set_field_value(
    "status",
    form.status.as_str()
  );
  if let FormMode::Edit(_) = form.mode() {
    dom::set_text(SUBMIT_ID, "Save changes");
  }
  dom::set_text(
    "title-count",
    &form.title_feedback().counter
  );
  dom::set_text(
    "detail-count",
    &form.detail_feedback().counter
  );
}

fn wire(
  ctx: &Rc<AppContext>,
  form: TaskForm,
  placement: Placement,
  bag: &ListenerBag
) {
  let tz = ctx.tz;
  fill_fields(&form);
  update_submit(&form, tz);
  let state = Rc::new(RefCell::new(form));

  if let Some(title) = dom::by_id("title") {
    let state = state.clone();
    bag.add(listen(&title, "input", move |_| {
      let mut form = state.borrow_mut();
      let feedback = form
        .set_title(&dom::field_value("title"));
      show_feedback("title", &feedback);
      update_submit(&form, tz);
    }));
  }

  if let Some(detail) = dom::by_id("detail") {
    let state = state.clone();
    bag.add(listen(&detail, "input", move |_| {
      let mut form = state.borrow_mut();
      let feedback = form
        .set_detail(&dom::field_value("detail"));
      show_feedback("detail", &feedback);
      update_submit(&form, tz);
    }));
  }

  for id in ["date", "time"] {
    let Some(input) = dom::by_id(id) else {
      continue;
    };
    let state = state.clone();
    bag.add(listen(&input, "input", move |_| {
      let mut form = state.borrow_mut();
      form.date = dom::field_value("date");
      form.time = dom::field_value("time");
      show_schedule(&form, tz);
      update_submit(&form, tz);
    }));
  }

  if let Some(element) = dom::by_id("task-form") {
    let ctx = ctx.clone();
    let state = state.clone();
    bag.add(listen(&element, "submit", move |event| {
      event.prevent_default();
      let form = {
        let mut form = state.borrow_mut();
        form.set_title(&dom::field_value("title"));
        form.set_detail(&dom::field_value("detail"));
        form.date = dom::field_value("date");
        form.time = dom::field_value("time");
        form.status = TaskStatus::parse(
          &dom::field_value("status")
        )
        .unwrap_or_default();
        form.clone()
      };
      let ctx = ctx.clone();
      wasm_bindgen_futures::spawn_local(async move {
        submit(&ctx, &form, placement).await;
      });
    }));
  }

  if let Some(cancel) = dom::by_id("cancel-btn") {
    let ctx = ctx.clone();
    bag.add(listen(&cancel, "click", move |event| {
      event.prevent_default();
      match placement {
        | Placement::Modal => {
          let modal = ctx.modal.clone();
          wasm_bindgen_futures::spawn_local(async move {
            modal.close()
          });
        }
        | Placement::Page => {
          ctx.go_to(RouteName::TaskList)
        }
      }
    }));
  }
}

async fn submit(
  ctx: &Rc<AppContext>,
  form: &TaskForm,
  placement: Placement
) {
  let mut controller = TaskFormController::new(
    ctx.http.clone(),
    ctx.notifier.clone(),
    ctx.modal.clone(),
    ctx.tz
  );
  let board = ctx.board.borrow().clone();
  if let Some(board) = board {
    controller = controller.with_board(board);
  }

  let result = match placement {
    | Placement::Modal => {
      controller.submit(form).await.map(|_| None)
    }
    | Placement::Page => {
      controller.submit_page(form).await.map(Some)
    }
  };

  match result {
    | Ok(Some(route)) => ctx.go_to(route),
    | Ok(None) => {}
    | Err(AppError::ValidationFailure(errors)) => {
      debug!(?errors, "task form rejected");
      show_all_errors(form, ctx.tz);
      update_submit(form, ctx.tz);
    }
    | Err(error) => {
      // the controller already reported it
      debug!(%error, "task not saved");
    }
  }
}
