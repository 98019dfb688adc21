use std::rc::Rc;

use taskio_core::error::AppError;
use taskio_core::home::load_summary;

use crate::app::AppContext;
use crate::dom;

pub async fn init(
  ctx: &Rc<AppContext>
) -> Result<(), AppError> {
  let epoch = ctx.epoch();
  let summary = load_summary(
    ctx.http.as_ref(),
    ctx.notifier.as_ref()
  )
  .await?;
  if !ctx.is_current(epoch) {
    return Ok(());
  }

  dom::set_text(
    "total-tasks",
    &summary.total.to_string()
  );
  dom::set_text(
    "completed-tasks",
    &summary.completed.to_string()
  );
  dom::set_text(
    "pending-tasks",
    &summary.pending.to_string()
  );
  Ok(())
}
