use std::cell::RefCell;
use std::rc::{
  Rc,
  Weak
};

use gloo::events::{
  EventListener,
  EventListenerOptions
};
use gloo::timers::callback::Timeout;
use taskio_core::board::BoardView;
use taskio_core::modal::{
  ModalClick,
  ModalController,
  ModalSurface,
  Subscription
};
use taskio_core::notify::{
  Notifier,
  Toast
};
use taskio_core::render::{
  self,
  ColumnMarkup
};
use taskio_core::route::RouteName;
use taskio_gui_shared::TaskStatus;
use wasm_bindgen::JsCast;
use web_sys::{
  Document,
  Element,
  Event,
  EventTarget,
  HtmlInputElement,
  HtmlSelectElement,
  HtmlTextAreaElement,
  KeyboardEvent
};

pub const APP_ROOT_ID: &str = "app";
const MODAL_ROOT_ID: &str = "modal-root";
const TOAST_ROOT_ID: &str = "toast-root";
const META_PREFIX: &str = "taskio:";

pub fn document() -> Option<Document> {
  web_sys::window()
    .and_then(|window| window.document())
}

pub fn by_id(id: &str) -> Option<Element> {
  document().and_then(|document| {
    document.get_element_by_id(id)
  })
}

pub fn query(
  selector: &str
) -> Option<Element> {
  document().and_then(|document| {
    document
      .query_selector(selector)
      .ok()
      .flatten()
  })
}

/// Value of an input, textarea or
/// select; empty when the element is
/// missing.
pub fn field_value(id: &str) -> String {
  let Some(element) = by_id(id) else {
    return String::new();
  };
  if let Some(input) =
    element.dyn_ref::<HtmlInputElement>()
  {
    return input.value();
  }
  if let Some(area) = element
    .dyn_ref::<HtmlTextAreaElement>()
  {
    return area.value();
  }
  if let Some(select) = element
    .dyn_ref::<HtmlSelectElement>()
  {
    return select.value();
  }
  String::new()
}

pub fn set_field_value(
  id: &str,
  value: &str
) {
  let Some(element) = by_id(id) else {
    return;
  };
  if let Some(input) =
    element.dyn_ref::<HtmlInputElement>()
  {
    input.set_value(value);
  } else if let Some(area) = element
    .dyn_ref::<HtmlTextAreaElement>()
  {
    area.set_value(value);
  } else if let Some(select) = element
    .dyn_ref::<HtmlSelectElement>()
  {
    select.set_value(value);
  }
}

/// Custom validity message of an input
/// or textarea; empty clears it.
pub fn set_validity(
  id: &str,
  message: &str
) {
  let Some(element) = by_id(id) else {
    return;
  };
  if let Some(input) =
    element.dyn_ref::<HtmlInputElement>()
  {
    input.set_custom_validity(message);
  } else if let Some(area) = element
    .dyn_ref::<HtmlTextAreaElement>()
  {
    area.set_custom_validity(message);
  }
}

pub fn set_disabled(
  id: &str,
  disabled: bool
) {
  let Some(element) = by_id(id) else {
    return;
  };
  let result = if disabled {
    element.set_attribute("disabled", "")
  } else {
    element.remove_attribute("disabled")
  };
  if let Err(error) = result {
    tracing::warn!(?error, id, "failed to toggle disabled");
  }
}

pub fn set_text(id: &str, text: &str) {
  if let Some(element) = by_id(id) {
    element.set_text_content(Some(text));
  }
}

pub fn set_hidden(
  id: &str,
  hidden: bool
) {
  if let Some(element) = by_id(id) {
    let _ = element
      .class_list()
      .toggle_with_force("hidden", hidden);
  }
}

pub fn current_hash() -> String {
  web_sys::window()
    .and_then(|window| {
      window.location().hash().ok()
    })
    .unwrap_or_default()
}

/// Points the location fragment at
/// `route`; the `hashchange` listener
/// picks it up.
pub fn set_hash(route: RouteName) {
  let Some(window) = web_sys::window()
  else {
    return;
  };
  if let Err(error) = window
    .location()
    .set_hash(&route.href())
  {
    tracing::warn!(?error, %route, "failed to set location hash");
  }
}

/// `<meta name="taskio:section.key">`
/// tags as configuration overrides.
pub fn meta_overrides()
-> Vec<(String, String)> {
  let Some(nodes) =
    document().and_then(|document| {
      document
        .query_selector_all(
          "meta[name^=\"taskio:\"]"
        )
        .ok()
    })
  else {
    return Vec::new();
  };

  (0..nodes.length())
    .filter_map(|idx| nodes.item(idx))
    .filter_map(|node| {
      node.dyn_into::<Element>().ok()
    })
    .filter_map(|meta| {
      let name =
        meta.get_attribute("name")?;
      let key = name
        .strip_prefix(META_PREFIX)?
        .to_string();
      let value = meta
        .get_attribute("content")
        .unwrap_or_default();
      Some((key, value))
    })
    .collect()
}

/// Listener that may call
/// `prevent_default`.
pub fn listen<F>(
  target: &EventTarget,
  event: &'static str,
  callback: F
) -> EventListener
where
  F: FnMut(&Event) + 'static
{
  EventListener::new_with_options(
    target,
    event,
    EventListenerOptions::enable_prevent_default(),
    callback
  )
}

/// Nearest `[attr]` ancestor of the
/// event target, with the attribute
/// value.
pub fn closest_with(
  event: &Event,
  attr: &str
) -> Option<(Element, String)> {
  let target = event
    .target()?
    .dyn_into::<Element>()
    .ok()?;
  let found = target
    .closest(&format!("[{attr}]"))
    .ok()
    .flatten()?;
  let value = found.get_attribute(attr)?;
  Some((found, value))
}

/// Listeners owned by one view or one
/// dialog; clearing detaches them all.
#[derive(Default)]
pub struct ListenerBag {
  listeners: RefCell<Vec<EventListener>>
}

impl ListenerBag {
  pub fn add(
    &self,
    listener: EventListener
  ) {
    self.listeners.borrow_mut().push(listener);
  }

  pub fn clear(&self) {
    let detached = self
      .listeners
      .replace(Vec::new());
    tracing::trace!(
      count = detached.len(),
      "detaching listeners"
    );
    drop(detached);
  }
}

/// `#modal-root` inside the app shell.
#[derive(Default)]
pub struct DomModalSurface {
  listeners:  ListenerBag,
  controller: RefCell<Weak<ModalController>>
}

impl DomModalSurface {
  pub fn attach(
    &self,
    modal: &Rc<ModalController>
  ) {
    *self.controller.borrow_mut() =
      Rc::downgrade(modal);
  }

  /// Listeners bound to the open
  /// dialog's content.
  pub fn listeners(&self) -> &ListenerBag {
    &self.listeners
  }

  fn bind_backdrop(&self, root: &Element) {
    let Some(backdrop) = root
      .query_selector(
        "[data-modal=\"backdrop\"]"
      )
      .ok()
      .flatten()
    else {
      return;
    };
    let controller =
      self.controller.borrow().clone();
    self.listeners.add(listen(
      &backdrop,
      "click",
      move |_| {
        let controller = controller.clone();
        wasm_bindgen_futures::spawn_local(
          async move {
            if let Some(modal) =
              controller.upgrade()
            {
              modal.click(ModalClick::Backdrop);
            }
          }
        );
      }
    ));
  }
}

impl ModalSurface for DomModalSurface {
  fn has_mount_point(&self) -> bool {
    by_id(MODAL_ROOT_ID).is_some()
  }

  fn render(&self, markup: &str) {
    self.listeners.clear();
    let Some(root) = by_id(MODAL_ROOT_ID)
    else {
      tracing::warn!("no modal mount point in the current view");
      return;
    };
    root.set_inner_html(markup);
    self.bind_backdrop(&root);
  }

  fn clear(&self) {
    self.listeners.clear();
    if let Some(root) = by_id(MODAL_ROOT_ID)
    {
      root.set_inner_html("");
    }
  }

  fn listen_escape(
    &self,
    on_escape: Rc<dyn Fn()>
  ) -> Subscription {
    let Some(document) = document() else {
      return Subscription::new(|| {});
    };
    let listener = EventListener::new(
      &document,
      "keydown",
      move |event| {
        let is_escape = event
          .dyn_ref::<KeyboardEvent>()
          .is_some_and(|key| {
            key.key() == "Escape"
          });
        if is_escape {
          // run after this callback
          // returns; closing drops it
          let on_escape = on_escape.clone();
          wasm_bindgen_futures::spawn_local(
            async move { on_escape() }
          );
        }
      }
    );
    Subscription::new(move || drop(listener))
  }
}

/// Toasts appended to `#toast-root`, or
/// the body when the view has none.
pub struct ToastNotifier {
  duration_ms: u32
}

impl ToastNotifier {
  pub fn new(duration_ms: u32) -> Self {
    Self {
      duration_ms
    }
  }
}

impl Notifier for ToastNotifier {
  fn notify(&self, toast: Toast) {
    tracing::debug!(kind = toast.kind.as_str(), message = %toast.message, "toast");
    let Some(document) = document() else {
      return;
    };
    let host = by_id(TOAST_ROOT_ID)
      .or_else(|| {
        document
          .body()
          .map(|body| body.into())
      });
    let (Some(host), Ok(container)) =
      (host, document.create_element("div"))
    else {
      return;
    };
    container
      .set_inner_html(&render::toast(&toast));
    if host.append_child(&container).is_err()
    {
      return;
    }
    Timeout::new(self.duration_ms, move || {
      container.remove()
    })
    .forget();
  }
}

/// The three `#todo`, `#in-progress`,
/// `#done` column bodies.
pub struct DomBoardView;

impl BoardView for DomBoardView {
  fn render_columns(
    &self,
    columns: &[ColumnMarkup]
  ) {
    for column in columns {
      let id = column.status.as_str();
      if let Some(body) = by_id(id) {
        body.set_inner_html(&column.body);
        let _ = body
          .class_list()
          .toggle_with_force(
            "highlight",
            column.highlighted
          );
      }
      set_text(
        &format!("count-{id}"),
        &column.count.to_string()
      );
    }
  }

  fn highlight(
    &self,
    column: Option<TaskStatus>
  ) {
    for status in TaskStatus::ALL {
      if let Some(body) =
        by_id(status.as_str())
      {
        let _ = body
          .class_list()
          .toggle_with_force(
            "highlight",
            column == Some(status)
          );
      }
    }
  }
}
