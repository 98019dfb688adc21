use std::rc::Rc;

use taskio_core::error::AppError;
use taskio_core::profile::{
  ProfileFlows,
  ProfileForm,
  ProfileView
};
use taskio_gui_shared::UserProfileDto;
use tracing::debug;

use crate::app::AppContext;
use crate::dom::{
  self,
  listen
};

fn flows(ctx: &AppContext) -> ProfileFlows {
  ProfileFlows::new(
    ctx.http.clone(),
    ctx.notifier.clone()
  )
}

fn show_profile(
  ctx: &AppContext,
  profile: &UserProfileDto
) {
  let view = ProfileView::new(profile, ctx.tz);
  dom::set_text("profile-name", &view.full_name);
  dom::set_text("profile-email", &view.email);
  dom::set_text("profile-age", &view.age);
  dom::set_text(
    "profile-created",
    &view.member_since
  );
  dom::set_hidden("profile-loader", true);
  dom::set_hidden("profile-info", false);
}

fn fill_edit_form(form: &ProfileForm) {
  dom::set_field_value("first-name", &form.first_name);
  dom::set_field_value("last-name", &form.last_name);
  dom::set_field_value("age", &form.age);
  dom::set_field_value("profile-email-input", &form.email);
}

pub async fn init(
  ctx: &Rc<AppContext>
) -> Result<(), AppError> {
  let epoch = ctx.epoch();
  let profile = flows(ctx).load().await?;
  if !ctx.is_current(epoch) {
    return Ok(());
  }
  show_profile(ctx, &profile);
  fill_edit_form(&ProfileForm::from_profile(&profile));

  for (button, section, hidden) in [
    ("edit-profile-btn", "profile-edit", false),
    ("cancel-edit-profile", "profile-edit", true),
    ("delete-account-btn", "delete-account", false),
    ("cancel-delete-account", "delete-account", true)
  ] {
    if let Some(listener) =
      bind_toggle(button, section, hidden)
    {
      ctx.view_listeners.add(listener);
    }
  }

  if let Some(edit) = dom::by_id("edit-profile-form") {
    let ctx_edit = ctx.clone();
    ctx.view_listeners.add(listen(&edit, "submit", move |event| {
      event.prevent_default();
      let form = ProfileForm {
        first_name: dom::field_value("first-name"),
        last_name:  dom::field_value("last-name"),
        age:        dom::field_value("age"),
        email:      dom::field_value("profile-email-input")
      };
      let ctx = ctx_edit.clone();
      wasm_bindgen_futures::spawn_local(async move {
        match flows(&ctx).update(&form).await {
          | Ok(profile) => {
            show_profile(&ctx, &profile);
            dom::set_hidden("profile-edit", true);
          }
          | Err(error) => {
            dom::set_text("profile-msg", &error.user_message());
          }
        }
      });
    }));
  }

  if let Some(delete) = dom::by_id("delete-account-form") {
    let ctx_delete = ctx.clone();
    ctx.view_listeners.add(listen(&delete, "submit", move |event| {
      event.prevent_default();
      let password = dom::field_value("delete-password");
      let ctx = ctx_delete.clone();
      wasm_bindgen_futures::spawn_local(async move {
        match flows(&ctx).delete_account(&password).await {
          | Ok(route) => ctx.go_to(route),
          | Err(error) => {
            debug!(%error, "account not deleted");
            dom::set_text("delete-msg", &error.user_message());
          }
        }
      });
    }));
  }

  Ok(())
}

fn bind_toggle(
  button: &str,
  section: &'static str,
  hidden: bool
) -> Option<gloo::events::EventListener> {
  let element = dom::by_id(button)?;
  Some(listen(&element, "click", move |event| {
    event.prevent_default();
    dom::set_hidden(section, hidden);
  }))
}
