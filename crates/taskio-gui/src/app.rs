use std::cell::{
  Cell,
  RefCell
};
use std::rc::{
  Rc,
  Weak
};

use chrono::{
  Datelike,
  Utc
};
use chrono_tz::Tz;
use gloo::events::EventListener;
use taskio_core::AppConfig;
use taskio_core::board::BoardController;
use taskio_core::layout::Layout;
use taskio_core::modal::ModalController;
use taskio_core::route::{
  LayoutKind,
  RouteDefinition,
  RouteName,
  RouteTable
};
use taskio_core::router::{
  RootContainer,
  Router,
  RouterParts
};
use taskio_core::view::ViewLoader;
use tracing::{
  debug,
  info
};

use crate::dom::{
  self,
  DomModalSurface,
  ListenerBag,
  ToastNotifier
};
use crate::http::HttpClient;
use crate::views::{
  self,
  AppInitializer
};

/// Services shared by the root
/// container and the view initializers.
pub struct AppContext {
  pub tz:       Tz,
  pub http:     Rc<HttpClient>,
  pub notifier: Rc<ToastNotifier>,
  pub modal:    Rc<ModalController>,
  pub surface:  Rc<DomModalSurface>,
  pub loader:   ViewLoader,
  /// Listeners of the mounted view.
  pub view_listeners: ListenerBag,
  pub board: RefCell<Option<Rc<BoardController>>>,
  router:    RefCell<Weak<Router>>,
  epoch:     Cell<u64>
}

impl AppContext {
  fn new(config: &AppConfig) -> Self {
    let http =
      Rc::new(HttpClient::new(config.clone()));
    let surface =
      Rc::new(DomModalSurface::default());
    let modal =
      ModalController::new(surface.clone());
    surface.attach(&modal);

    Self {
      tz: config.timezone(),
      loader: ViewLoader::new(http.clone()),
      http,
      notifier: Rc::new(ToastNotifier::new(
        config.ui.toast_ms
      )),
      modal,
      surface,
      view_listeners: ListenerBag::default(),
      board: RefCell::new(None),
      router: RefCell::new(Weak::new()),
      epoch: Cell::new(0)
    }
  }

  /// Bumped on every mount; async view
  /// work compares against it before
  /// touching the DOM.
  pub fn epoch(&self) -> u64 {
    self.epoch.get()
  }

  pub fn is_current(
    &self,
    epoch: u64
  ) -> bool {
    self.epoch.get() == epoch
  }

  /// Moves to `route`. When the location
  /// already points there no `hashchange`
  /// fires, so the router re-resolves it
  /// directly.
  pub fn go_to(&self, route: RouteName) {
    if dom::current_hash() != route.href() {
      dom::set_hash(route);
      return;
    }
    let Some(router) =
      self.router.borrow().upgrade()
    else {
      return;
    };
    wasm_bindgen_futures::spawn_local(
      async move {
        let outcome = router.refresh().await;
        debug!(?outcome, "location refreshed");
      }
    );
  }

  fn teardown(&self) {
    self.modal.close();
    self.view_listeners.clear();
    if let Some(board) =
      self.board.borrow_mut().take()
    {
      board.retire();
    }
    self.epoch.set(self.epoch.get() + 1);
  }
}

/// `#app`, replaced wholesale on every
/// navigation.
struct DomRoot {
  ctx: Rc<AppContext>
}

impl RootContainer for DomRoot {
  fn mount_view(
    &self,
    route: &RouteDefinition,
    markup: &str
  ) {
    self.ctx.teardown();
    let Some(root) = dom::by_id(dom::APP_ROOT_ID)
    else {
      return;
    };
    root.set_inner_html(markup);
    if route.layout == LayoutKind::AppShell {
      views::shell::wire(&self.ctx);
    }
    debug!(route = %route.name, epoch = self.ctx.epoch(), "view mounted");
  }

  fn show_error(&self, markup: &str) {
    self.ctx.teardown();
    if let Some(root) =
      dom::by_id(dom::APP_ROOT_ID)
    {
      root.set_inner_html(markup);
    }
  }

  fn redirect(&self, to: RouteName) {
    self.ctx.go_to(to);
  }
}

#[tracing::instrument(skip_all)]
pub fn start(config: AppConfig) {
  let year = Utc::now().year();
  let ctx = Rc::new(AppContext::new(&config));
  let router = Rc::new(Router::new(
    RouteTable::standard(),
    RouterParts {
      loader:      ctx.loader.clone(),
      layout:      Layout::new(
        config.ui.app_name.clone(),
        year
      ),
      session:     ctx.http.clone(),
      root:        Rc::new(DomRoot {
        ctx: ctx.clone()
      }),
      initializer: Rc::new(
        AppInitializer::new(ctx.clone())
      )
    }
  ));
  *ctx.router.borrow_mut() =
    Rc::downgrade(&router);

  if let Some(window) = web_sys::window() {
    let on_hash = router.clone();
    EventListener::new(
      &window,
      "hashchange",
      move |_| {
        let router = on_hash.clone();
        wasm_bindgen_futures::spawn_local(
          async move {
            let hash = dom::current_hash();
            let outcome =
              router.navigate(&hash).await;
            debug!(?outcome, "navigation finished");
          }
        );
      }
    )
    .forget();
  }

  info!(
    app = %config.ui.app_name,
    api = %config.api.base_url,
    "taskio frontend started"
  );

  wasm_bindgen_futures::spawn_local(
    async move {
      let outcome = router
        .navigate(&dom::current_hash())
        .await;
      debug!(?outcome, "initial navigation finished");
    }
  );
}
