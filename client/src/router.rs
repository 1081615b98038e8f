//! Static path-to-page mapping and navigation.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Sign,
    User,
    User1,
}

impl Route {
    /// The root path shows the login page.
    pub const ROOT: Route = Route::Login;

    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Sign => "/sign",
            Self::User => "/user",
            Self::User1 => "/user1",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" => Some(Self::Login),
            "/sign" => Some(Self::Sign),
            "/user" => Some(Self::User),
            "/user1" => Some(Self::User1),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that records every visited route.
#[derive(Debug, Clone)]
pub struct History {
    entries: Arc<Mutex<Vec<Route>>>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Route::ROOT)
    }
}

impl History {
    pub fn new(start: Route) -> Self {
        Self {
            entries: Arc::new(Mutex::new(vec![start])),
        }
    }

    pub fn current(&self) -> Route {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
            .unwrap_or(Route::ROOT)
    }

    pub fn entries(&self) -> Vec<Route> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for History {
    fn navigate(&self, route: Route) {
        log::debug!("navigate to {route}");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }
}
