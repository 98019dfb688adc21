use std::rc::Rc;

use taskio_core::auth::{
  AuthFlows,
  LoginForm,
  ResetFlow,
  SignupForm
};
use taskio_core::error::AppError;
use taskio_core::route::{
  Location,
  RouteName
};

use crate::app::AppContext;
use crate::dom::{
  self,
  listen
};

fn flows(ctx: &AppContext) -> AuthFlows {
  AuthFlows::new(
    ctx.http.clone(),
    ctx.notifier.clone()
  )
}

/// Inline message under the form.
fn show_message(error: &AppError) {
  dom::set_text("msg", &error.user_message());
}

fn follow(
  ctx: &AppContext,
  result: Result<RouteName, AppError>
) {
  match result {
    | Ok(route) => ctx.go_to(route),
    | Err(error) => show_message(&error)
  }
}

/// Binds a form's submit to `handler`,
/// which runs outside the event callback.
fn on_submit<F, Fut>(
  ctx: &Rc<AppContext>,
  form_id: &str,
  handler: F
) where
  F: Fn(Rc<AppContext>) -> Fut + 'static,
  Fut: Future<Output = ()> + 'static
{
  let Some(form) = dom::by_id(form_id) else {
    tracing::warn!(form_id, "form missing from view");
    return;
  };
  let ctx_submit = ctx.clone();
  ctx.view_listeners.add(listen(
    &form,
    "submit",
    move |event| {
      event.prevent_default();
      dom::set_text("msg", "");
      wasm_bindgen_futures::spawn_local(
        handler(ctx_submit.clone())
      );
    }
  ));
}

pub fn init_login(ctx: &Rc<AppContext>) {
  on_submit(ctx, "login-form", |ctx| async move {
    let form = LoginForm {
      email:    dom::field_value("email"),
      password: dom::field_value("password")
    };
    follow(&ctx, flows(&ctx).login(&form).await);
  });
}

pub fn init_register(ctx: &Rc<AppContext>) {
  on_submit(ctx, "register-form", |ctx| async move {
    let form = SignupForm {
      first_name:       dom::field_value("first-name"),
      last_name:        dom::field_value("last-name"),
      age:              dom::field_value("age"),
      email:            dom::field_value("email"),
      password:         dom::field_value("password"),
      confirm_password: dom::field_value(
        "confirm-password"
      )
    };
    follow(&ctx, flows(&ctx).register(&form).await);
  });
}

/// Shows the e-mail request form, or the
/// new-password form when the location
/// carries a reset token.
pub fn init_reset(
  ctx: &Rc<AppContext>,
  location: &Location
) {
  match ResetFlow::from_location(location) {
    | ResetFlow::RequestEmail => {
      dom::set_hidden("reset-request", false);
      dom::set_hidden("reset-confirm", true);
      on_submit(ctx, "reset-request-form", |ctx| async move {
        let email = dom::field_value("email");
        follow(
          &ctx,
          flows(&ctx).request_reset(&email).await
        );
      });
    }
    | ResetFlow::NewPassword { token } => {
      dom::set_hidden("reset-request", true);
      dom::set_hidden("reset-confirm", false);
      on_submit(ctx, "reset-confirm-form", move |ctx| {
        let token = token.clone();
        async move {
          let password =
            dom::field_value("password");
          let confirm = dom::field_value(
            "confirm-password"
          );
          follow(
            &ctx,
            flows(&ctx)
              .confirm_reset(
                &token, &password, &confirm
              )
              .await
          );
        }
      });
    }
  }
}
