use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::api::SessionProbe;
use crate::error::AppError;
use crate::layout::{self, Gate, Layout};
use crate::render;
use crate::route::{Location, RouteDefinition, RouteName, RouteTable, ViewInit};
use crate::view::ViewLoader;

/// The single root container the router writes views into.
pub trait RootContainer {
    /// Replaces the whole content with a composed view. Anything bound to
    /// the previous view is torn down first.
    fn mount_view(&self, route: &RouteDefinition, markup: &str);
    /// Replaces the whole content with an inline error block.
    fn show_error(&self, markup: &str);
    /// Moves the location fragment to `to`; the resulting navigation event
    /// drives the next resolution.
    fn redirect(&self, to: RouteName);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteContext {
    pub route: RouteName,
    pub location: Location,
    pub sequence: u64,
}

#[async_trait(?Send)]
pub trait ViewInitializer {
    async fn initialize(&self, init: ViewInit, ctx: &RouteContext) -> Result<(), AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Rendered {
        route: RouteName,
    },
    Redirected {
        from: RouteName,
        to: RouteName,
        reason: AppError,
    },
    Failed {
        route: RouteName,
        error: AppError,
    },
    /// A newer navigation started before this one finished; its result
    /// was dropped.
    Superseded {
        route: RouteName,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRoute {
    pub name: RouteName,
    pub location: Location,
}

pub struct RouterParts {
    pub loader: ViewLoader,
    pub layout: Layout,
    pub session: Rc<dyn SessionProbe>,
    pub root: Rc<dyn RootContainer>,
    pub initializer: Rc<dyn ViewInitializer>,
}

/// Hash router owning the route table and the root container.
pub struct Router {
    table: RouteTable,
    loader: ViewLoader,
    layout: Layout,
    session: Rc<dyn SessionProbe>,
    root: Rc<dyn RootContainer>,
    initializer: Rc<dyn ViewInitializer>,
    sequence: Cell<u64>,
    last_hash: RefCell<String>,
    active: RefCell<Option<ActiveRoute>>,
}

impl Router {
    pub fn new(table: RouteTable, parts: RouterParts) -> Self {
        Self {
            table,
            loader: parts.loader,
            layout: parts.layout,
            session: parts.session,
            root: parts.root,
            initializer: parts.initializer,
            sequence: Cell::new(0),
            last_hash: RefCell::new(String::new()),
            active: RefCell::new(None),
        }
    }

    pub fn current(&self) -> Option<ActiveRoute> {
        self.active.borrow().clone()
    }

    fn is_current(&self, sequence: u64) -> bool {
        self.sequence.get() == sequence
    }

    /// Resolves `hash` into a rendered view. Never panics or returns an
    /// error; every failure is folded into the returned outcome.
    #[tracing::instrument(skip(self))]
    pub async fn navigate(&self, hash: &str) -> Navigation {
        let sequence = self.sequence.get() + 1;
        self.sequence.set(sequence);
        *self.last_hash.borrow_mut() = hash.to_string();

        let location = Location::parse(hash);
        let (route, unknown) = self.table.resolve(&location.path);
        let route = route.clone();
        if let Some(err) = unknown {
            debug!(error = %err, "rendering fallback route");
        }
        info!(route = %route.name, sequence, "routing");

        let gate = layout::authorize(route.layout, route.name, self.session.as_ref()).await;
        if !self.is_current(sequence) {
            return self.superseded(route.name, sequence);
        }
        if let Gate::Redirect { to, reason } = gate {
            info!(from = %route.name, to = %to, reason = %reason, "redirecting");
            self.root.redirect(to);
            return Navigation::Redirected {
                from: route.name,
                to,
                reason,
            };
        }

        let fragment = self.loader.load_fragment(route.fragment).await;
        if !self.is_current(sequence) {
            return self.superseded(route.name, sequence);
        }
        let fragment = match fragment {
            Ok(fragment) => fragment,
            Err(source) => {
                let error = AppError::FragmentLoadFailure {
                    route: route.name,
                    source,
                };
                warn!(%error, "view failed to load");
                self.root.show_error(&render::load_error(route.name));
                *self.active.borrow_mut() = None;
                return Navigation::Failed {
                    route: route.name,
                    error,
                };
            }
        };

        let markup = self.layout.compose(route.layout, &fragment);
        self.root.mount_view(&route, &markup);
        *self.active.borrow_mut() = Some(ActiveRoute {
            name: route.name,
            location: location.clone(),
        });

        if let Some(init) = route.init {
            let ctx = RouteContext {
                route: route.name,
                location,
                sequence,
            };
            if let Err(error) = self.initializer.initialize(init, &ctx).await {
                warn!(%error, ?init, "view initializer failed");
            }
        }

        Navigation::Rendered { route: route.name }
    }

    /// Re-resolves the most recent location.
    pub async fn refresh(&self) -> Navigation {
        let hash = self.last_hash.borrow().clone();
        self.navigate(&hash).await
    }

    fn superseded(&self, route: RouteName, sequence: u64) -> Navigation {
        debug!(
            %route,
            sequence,
            current = self.sequence.get(),
            "discarding stale navigation"
        );
        Navigation::Superseded { route }
    }
}
