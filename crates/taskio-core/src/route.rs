use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteName {
    Home,
    About,
    TaskList,
    Login,
    Register,
    ResetPassword,
    TaskNew,
    Profile,
}

impl RouteName {
    pub const ALL: [RouteName; 8] = [
        RouteName::Home,
        RouteName::About,
        RouteName::TaskList,
        RouteName::Login,
        RouteName::Register,
        RouteName::ResetPassword,
        RouteName::TaskNew,
        RouteName::Profile,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RouteName::Home => "home",
            RouteName::About => "about",
            RouteName::TaskList => "taskList",
            RouteName::Login => "login",
            RouteName::Register => "register",
            RouteName::ResetPassword => "reset-password",
            RouteName::TaskNew => "taskNew",
            RouteName::Profile => "profile",
        }
    }

    /// Location fragment for this route, e.g. `#/taskList`.
    pub fn href(self) -> String {
        format!("#/{}", self.as_str())
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RouteName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| AppError::RouteNotFound(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    /// Requires a valid session.
    AppShell,
    /// Requires the absence of a session.
    AuthShell,
    /// No session check.
    Public,
}

/// Post-render work attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewInit {
    Home,
    Board,
    TaskForm,
    Login,
    Register,
    ResetPassword,
    Profile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub name: RouteName,
    pub fragment: &'static str,
    pub layout: LayoutKind,
    pub init: Option<ViewInit>,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
}

impl RouteTable {
    pub const FALLBACK: RouteName = RouteName::Login;

    /// The application's fixed route set.
    pub fn standard() -> Self {
        let route = |name: RouteName, layout, init| RouteDefinition {
            name,
            fragment: name.as_str(),
            layout,
            init,
        };

        Self {
            routes: vec![
                route(RouteName::Home, LayoutKind::AppShell, Some(ViewInit::Home)),
                route(RouteName::About, LayoutKind::Public, None),
                route(RouteName::TaskList, LayoutKind::AppShell, Some(ViewInit::Board)),
                route(RouteName::Login, LayoutKind::AuthShell, Some(ViewInit::Login)),
                route(RouteName::Register, LayoutKind::AuthShell, Some(ViewInit::Register)),
                route(
                    RouteName::ResetPassword,
                    LayoutKind::AuthShell,
                    Some(ViewInit::ResetPassword),
                ),
                route(RouteName::TaskNew, LayoutKind::AppShell, Some(ViewInit::TaskForm)),
                route(RouteName::Profile, LayoutKind::AppShell, Some(ViewInit::Profile)),
            ],
        }
    }

    pub fn get(&self, name: RouteName) -> Option<&RouteDefinition> {
        self.routes.iter().find(|route| route.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter()
    }

    /// Resolves a location path, substituting the fallback route for
    /// anything unknown. The error is returned alongside for logging.
    pub fn resolve(&self, path: &str) -> (&RouteDefinition, Option<AppError>) {
        let lookup = path
            .parse::<RouteName>()
            .and_then(|name| {
                self.get(name)
                    .ok_or_else(|| AppError::RouteNotFound(path.to_string()))
            });

        match lookup {
            Ok(route) => (route, None),
            Err(err) => {
                debug!(path, fallback = %Self::FALLBACK, "unknown route, falling back");
                (self.fallback(), Some(err))
            }
        }
    }

    fn fallback(&self) -> &RouteDefinition {
        self.get(Self::FALLBACK)
            .or_else(|| self.routes.first())
            .unwrap_or(&FALLBACK_DEFINITION)
    }
}

static FALLBACK_DEFINITION: RouteDefinition = RouteDefinition {
    name: RouteName::Login,
    fragment: "login",
    layout: LayoutKind::AuthShell,
    init: Some(ViewInit::Login),
};

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// A parsed location fragment of the form `#/<route>?<query>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    pub query: BTreeMap<String, String>,
}

impl Location {
    pub fn parse(hash: &str) -> Self {
        let Some(rest) = hash.strip_prefix("#/") else {
            return Self::default();
        };

        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (rest, BTreeMap::new()),
        };

        Self {
            path: path.trim_end_matches('/').to_string(),
            query,
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

fn parse_query(raw: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        // first occurrence wins, like URLSearchParams::get
        out.entry(decode_component(key))
            .or_insert_with(|| decode_component(value));
    }
    out
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_route_and_token_query() {
        let loc = Location::parse("#/reset-password?token=abc%2F12&next=a+b");
        assert_eq!(loc.path, "reset-password");
        assert_eq!(loc.param("token"), Some("abc/12"));
        assert_eq!(loc.param("next"), Some("a b"));
    }

    #[test]
    fn hash_without_slash_prefix_is_empty() {
        assert_eq!(Location::parse("#taskList").path, "");
        assert_eq!(Location::parse("").path, "");
        assert_eq!(Location::parse("#/").path, "");
    }

    #[test]
    fn duplicate_query_keys_keep_first_value() {
        let loc = Location::parse("#/login?x=1&x=2&flag");
        assert_eq!(loc.param("x"), Some("1"));
        assert_eq!(loc.param("flag"), Some(""));
    }

    #[test]
    fn unknown_paths_resolve_to_login() {
        let table = RouteTable::standard();
        for path in ["", "nope", "TASKLIST", "sitemap", "home/extra"] {
            let (route, err) = table.resolve(path);
            assert_eq!(route.name, RouteName::Login, "path {path:?}");
            assert!(matches!(err, Some(AppError::RouteNotFound(_))));
        }
    }

    #[test]
    fn every_route_name_is_in_the_table() {
        let table = RouteTable::standard();
        for name in RouteName::ALL {
            let (route, err) = table.resolve(name.as_str());
            assert_eq!(route.name, name);
            assert!(err.is_none());
        }
    }

    #[test]
    fn layouts_match_access_rules() {
        let table = RouteTable::standard();
        let layout = |name| table.get(name).map(|route| route.layout);
        assert_eq!(layout(RouteName::TaskList), Some(LayoutKind::AppShell));
        assert_eq!(layout(RouteName::Login), Some(LayoutKind::AuthShell));
        assert_eq!(layout(RouteName::Register), Some(LayoutKind::AuthShell));
        assert_eq!(layout(RouteName::About), Some(LayoutKind::Public));
    }
}
