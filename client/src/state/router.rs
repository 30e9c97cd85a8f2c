//! Route table, auth guard, and the navigator.
//!
//! SYSTEM CONTEXT
//! ==============
//! `/login` is public. `/` and its children require a session; signed-out
//! visits redirect to `/login`. Unknown paths redirect to `/`. The navigator
//! is also the request client's [`LoginRedirect`] sink: a forced redirect
//! clears the session before moving to `/login`.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use super::session::SessionStore;
use crate::net::auth_layer::LoginRedirect;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Samples,
    Storage,
    Transfers,
    Reports,
    Users,
    Settings,
}

impl Route {
    pub const ALL: [Self; 8] = [
        Self::Login,
        Self::Dashboard,
        Self::Samples,
        Self::Storage,
        Self::Transfers,
        Self::Reports,
        Self::Users,
        Self::Settings,
    ];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => LOGIN_PATH,
            Self::Dashboard => HOME_PATH,
            Self::Samples => "/samples",
            Self::Storage => "/storage",
            Self::Transfers => "/transfers",
            Self::Reports => "/reports",
            Self::Users => "/users",
            Self::Settings => "/settings",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Dashboard => "Dashboard",
            Self::Samples => "Samples",
            Self::Storage => "Storage",
            Self::Transfers => "Transfers",
            Self::Reports => "Reports",
            Self::Users => "Users",
            Self::Settings => "Settings",
        }
    }

    #[must_use]
    pub fn requires_auth(self) -> bool {
        self != Self::Login
    }

    fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|route| route.path() == path)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteResolution {
    Render(Route),
    Redirect(&'static str),
}

/// Strip query, fragment and trailing slashes; `""` becomes `/`.
fn normalize(path: &str) -> &str {
    let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { HOME_PATH } else { trimmed }
}

/// Decide what a visit to `path` shows.
#[must_use]
pub fn resolve_route(path: &str, is_authenticated: bool) -> RouteResolution {
    match Route::from_path(normalize(path)) {
        None => RouteResolution::Redirect(HOME_PATH),
        Some(route) if route.requires_auth() && !is_authenticated => RouteResolution::Redirect(LOGIN_PATH),
        Some(route) => RouteResolution::Render(route),
    }
}

/// Tracks the current location and applies the auth guard on every move.
pub struct Navigator {
    session: Arc<SessionStore>,
    location: Mutex<Route>,
}

impl Navigator {
    #[must_use]
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session, location: Mutex::new(Route::Login) }
    }

    #[must_use]
    pub fn current(&self) -> Route {
        *self.location.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move to `path`, following redirects, and return where we landed.
    pub fn navigate(&self, path: &str) -> Route {
        let is_authenticated = self.session.is_authenticated();
        let mut target = path;
        // Redirect chains are at most two hops: unknown -> `/` -> `/login`.
        let route = loop {
            match resolve_route(target, is_authenticated) {
                RouteResolution::Render(route) => break route,
                RouteResolution::Redirect(next) => {
                    tracing::debug!(from = target, to = next, "route redirect");
                    target = next;
                }
            }
        };
        *self.location.lock().unwrap_or_else(PoisonError::into_inner) = route;
        route
    }
}

impl LoginRedirect for Navigator {
    fn redirect_to_login(&self) {
        self.session.clear_auth();
        *self.location.lock().unwrap_or_else(PoisonError::into_inner) = Route::Login;
        tracing::info!("session ended; redirected to login");
    }
}
