use tracing::{debug, warn};

use crate::api::{SessionProbe, SessionStatus};
use crate::error::AppError;
use crate::route::{LayoutKind, RouteName};

/// Result of the per-layout session check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Render,
    Redirect { to: RouteName, reason: AppError },
}

/// Decides whether `route` may render under `layout`.
///
/// A failing probe counts as "no session" for both shells: app routes
/// redirect to login, auth screens still render their form.
#[tracing::instrument(skip(probe))]
pub async fn authorize(layout: LayoutKind, route: RouteName, probe: &dyn SessionProbe) -> Gate {
    if layout == LayoutKind::Public {
        return Gate::Render;
    }

    let status = match probe.probe().await {
        Ok(status) => status,
        Err(error) => {
            warn!(%error, "session probe failed; treating as anonymous");
            SessionStatus::Anonymous
        }
    };
    debug!(?status, "session probe resolved");

    match (layout, status) {
        (LayoutKind::AppShell, SessionStatus::Anonymous) => Gate::Redirect {
            to: RouteName::Login,
            reason: AppError::AuthRequired(route),
        },
        (LayoutKind::AuthShell, SessionStatus::Authenticated) => Gate::Redirect {
            to: RouteName::Home,
            reason: AppError::AuthForbidden(route),
        },
        _ => Gate::Render,
    }
}

/// Composes the chrome around view fragments.
#[derive(Debug, Clone)]
pub struct Layout {
    app_name: String,
    year: i32,
}

impl Layout {
    pub fn new(app_name: impl Into<String>, year: i32) -> Self {
        Self {
            app_name: app_name.into(),
            year,
        }
    }

    pub fn compose(&self, kind: LayoutKind, inner: &str) -> String {
        match kind {
            LayoutKind::AppShell => self.app_shell(inner),
            LayoutKind::AuthShell => self.auth_shell(inner),
            LayoutKind::Public => self.public_shell(inner),
        }
    }

    fn app_shell(&self, inner: &str) -> String {
        let name = crate::render::escape_html(&self.app_name);
        format!(
            r##"<div class="layout">
  <header class="app-header">
    <a class="brand" href="{home}">{name}</a>
    <button type="button" id="menu-toggle" class="menu-toggle" aria-label="Menu">&#9776;</button>
    <nav id="nav-menu">
      <a href="{home}">Home</a>
      <a href="{tasks}">Tasks</a>
      <a href="{new}" class="btn-new-task" data-action="new-task">+ New task</a>
      <a href="{profile}">Profile</a>
      <button type="button" class="btn-logout" data-action="logout">Log out</button>
    </nav>
  </header>
  <main id="content">
{inner}
  </main>
  <div id="modal-root"></div>
  <div id="toast-root" aria-live="polite"></div>
  <footer>&copy; {year} {name}</footer>
</div>"##,
            home = RouteName::Home.href(),
            tasks = RouteName::TaskList.href(),
            new = RouteName::TaskNew.href(),
            profile = RouteName::Profile.href(),
            year = self.year,
        )
    }

    fn auth_shell(&self, inner: &str) -> String {
        let name = crate::render::escape_html(&self.app_name);
        format!(
            r#"<section class="auth-container">
  <section class="auth-card">
    <div class="logo"><img src="logo.png" alt="{name} logo" width="180" height="40"></div>
    <main>
{inner}
    </main>
  </section>
  <section class="image-box"><img src="login_photo.png" alt=""></section>
  <div id="toast-root" aria-live="polite"></div>
</section>"#
        )
    }

    fn public_shell(&self, inner: &str) -> String {
        let name = crate::render::escape_html(&self.app_name);
        format!(
            r#"<div class="about-layout">
  <header class="about-header">
    <div class="about-logo"><h1>{name}</h1></div>
    <nav class="about-nav">
      <a href="{login}" class="btn-login">Log in</a>
      <a href="{register}" class="btn-register">Sign up</a>
    </nav>
  </header>
  <main class="about-main">
{inner}
  </main>
  <div id="toast-root" aria-live="polite"></div>
  <footer class="about-footer">&copy; {year} {name}</footer>
</div>"#,
            login = RouteName::Login.href(),
            register = RouteName::Register.href(),
            year = self.year,
        )
    }
}
