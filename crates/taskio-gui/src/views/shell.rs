use std::rc::Rc;

use taskio_core::auth::AuthFlows;
use taskio_core::route::RouteName;

use crate::app::AppContext;
use crate::dom::{
  self,
  listen
};
use crate::views::task_form;

/// Binds the app shell header: logout,
/// the new-task shortcut and the mobile
/// menu toggle.
pub fn wire(ctx: &Rc<AppContext>) {
  if let Some(logout) =
    dom::query("[data-action=\"logout\"]")
  {
    let ctx_logout = ctx.clone();
    ctx.view_listeners.add(listen(
      &logout,
      "click",
      move |event| {
        event.prevent_default();
        let ctx = ctx_logout.clone();
        wasm_bindgen_futures::spawn_local(
          async move {
            let flows = AuthFlows::new(
              ctx.http.clone(),
              ctx.notifier.clone()
            );
            ctx.go_to(flows.logout().await);
          }
        );
      }
    ));
  }

  if let Some(new_task) = dom::query(
    "[data-action=\"new-task\"]"
  ) {
    let ctx_new = ctx.clone();
    ctx.view_listeners.add(listen(
      &new_task,
      "click",
      move |event| {
        event.prevent_default();
        // the page already shows the form
        if dom::current_hash()
          == RouteName::TaskNew.href()
        {
          return;
        }
        let ctx = ctx_new.clone();
        wasm_bindgen_futures::spawn_local(
          async move {
            task_form::open_modal(ctx, None)
              .await;
          }
        );
      }
    ));
  }

  if let Some(toggle) =
    dom::by_id("menu-toggle")
  {
    ctx.view_listeners.add(listen(
      &toggle,
      "click",
      |_| {
        if let Some(menu) =
          dom::by_id("nav-menu")
        {
          let _ = menu
            .class_list()
            .toggle("open");
        }
      }
    ));
  }
}
