use std::rc::Rc;

use taskio_core::board::BoardController;
use taskio_core::error::AppError;
use taskio_gui_shared::{
  TaskId,
  TaskStatus
};
use tracing::{
  debug,
  warn
};
use wasm_bindgen::JsCast;
use web_sys::{
  DragEvent,
  Event
};

use crate::app::AppContext;
use crate::dom::{
  self,
  DomBoardView,
  listen
};
use crate::views::task_form;

const DRAG_FORMAT: &str = "text/plain";

pub async fn init(
  ctx: &Rc<AppContext>
) -> Result<(), AppError> {
  let epoch = ctx.epoch();
  let board = Rc::new(BoardController::new(
    ctx.http.clone(),
    Rc::new(DomBoardView),
    ctx.notifier.clone(),
    ctx.modal.clone(),
    ctx.tz
  ));
  *ctx.board.borrow_mut() = Some(board.clone());

  for status in TaskStatus::ALL {
    wire_column(ctx, &board, status);
  }

  if let Some(button) = dom::by_id("btn-new-task") {
    let ctx_new = ctx.clone();
    ctx.view_listeners.add(listen(
      &button,
      "click",
      move |event| {
        event.prevent_default();
        let ctx = ctx_new.clone();
        wasm_bindgen_futures::spawn_local(
          async move {
            task_form::open_modal(ctx, None).await;
          }
        );
      }
    ));
  }

  let loaded = board.load().await;
  if ctx.is_current(epoch) {
    loaded.map(|count| {
      debug!(count, "board ready");
    })
  } else {
    Ok(())
  }
}

/// Drag and click handling is delegated
/// to the column wrapper, so cards can be
/// re-rendered without rebinding.
fn wire_column(
  ctx: &Rc<AppContext>,
  board: &Rc<BoardController>,
  status: TaskStatus
) {
  let Some(wrapper) = dom::by_id(status.as_str())
    .and_then(|column| column.parent_element())
  else {
    warn!(%status, "board column missing from view");
    return;
  };

  ctx.view_listeners.add(listen(
    &wrapper,
    "dragstart",
    |event| {
      let Some((_, id)) =
        dom::closest_with(event, "data-task-id")
      else {
        return;
      };
      if let Some(transfer) = drag_data(event) {
        let _ = transfer.set_data(DRAG_FORMAT, &id);
        transfer.set_drop_effect("move");
      }
    }
  ));

  let over = board.clone();
  ctx.view_listeners.add(listen(
    &wrapper,
    "dragover",
    move |event| {
      event.prevent_default();
      over.drag_over(status);
    }
  ));

  let leave = board.clone();
  ctx.view_listeners.add(listen(
    &wrapper,
    "dragleave",
    move |_| leave.drag_leave(status)
  ));

  let drop_board = board.clone();
  ctx.view_listeners.add(listen(
    &wrapper,
    "drop",
    move |event| {
      event.prevent_default();
      let id = drag_data(event)
        .and_then(|transfer| {
          transfer.get_data(DRAG_FORMAT).ok()
        })
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty());
      let Some(id) = id else {
        warn!(%status, "drop without a task id");
        drop_board.drag_leave(status);
        return;
      };
      let board = drop_board.clone();
      wasm_bindgen_futures::spawn_local(
        async move {
          let outcome = board
            .drop_task(&TaskId::new(id), status)
            .await;
          debug!(?outcome, "drop handled");
        }
      );
    }
  ));

  let click_ctx = ctx.clone();
  let click_board = board.clone();
  ctx.view_listeners.add(listen(
    &wrapper,
    "click",
    move |event| {
      let Some((button, action)) =
        dom::closest_with(event, "data-action")
      else {
        return;
      };
      let Some(id) = button
        .get_attribute("data-task-id")
        .map(TaskId::new)
      else {
        return;
      };
      match action.as_str() {
        | "edit" => {
          let Some(task) = click_board.task(&id)
          else {
            return;
          };
          let ctx = click_ctx.clone();
          wasm_bindgen_futures::spawn_local(
            async move {
              task_form::open_modal(
                ctx,
                Some(task)
              )
              .await;
            }
          );
        }
        | "delete" => {
          if click_board.request_delete(&id) {
            wire_delete_confirm(
              &click_ctx,
              &click_board
            );
          }
        }
        | other => {
          debug!(action = other, "ignoring card action");
        }
      }
    }
  ));
}

fn drag_data(
  event: &Event
) -> Option<web_sys::DataTransfer> {
  event
    .dyn_ref::<DragEvent>()
    .and_then(|drag| drag.data_transfer())
}

/// Binds the confirm and cancel buttons
/// of the open delete dialog.
fn wire_delete_confirm(
  ctx: &Rc<AppContext>,
  board: &Rc<BoardController>
) {
  let bag = ctx.surface.listeners();

  if let Some(confirm) = dom::query(
    "[data-action=\"confirm-delete\"]"
  ) {
    let board = board.clone();
    bag.add(listen(
      &confirm,
      "click",
      move |_| {
        let board = board.clone();
        wasm_bindgen_futures::spawn_local(
          async move {
            if let Err(error) =
              board.confirm_delete().await
            {
              debug!(%error, "delete not applied");
            }
          }
        );
      }
    ));
  }

  if let Some(cancel) = dom::query(
    "[data-action=\"cancel-delete\"]"
  ) {
    let board = board.clone();
    bag.add(listen(
      &cancel,
      "click",
      move |_| {
        let board = board.clone();
        wasm_bindgen_futures::spawn_local(
          async move { board.cancel_delete() }
        );
      }
    ));
  }
}
