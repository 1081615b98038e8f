//! Page controllers: they compose the widgets, hold page state and navigate.

pub mod login;
pub mod sign;
pub mod user;
pub mod user1;

use std::sync::Arc;

use log::warn;

pub use login::{LoginPage, LOGIN_ENDPOINT};
pub use sign::{SignPage, REGISTER_ENDPOINT};
pub use user::UserPage;
pub use user1::User1Page;

use crate::error::Error;
use crate::http::ApiClient;
use crate::notify::Notifier;
use crate::object_url::ObjectUrlRegistry;
use crate::router::{Navigator, Route};
use crate::session::Session;

/// Everything a page needs from its host.
#[derive(Clone)]
pub struct AppContext {
    pub api: ApiClient,
    pub registry: ObjectUrlRegistry,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

impl AppContext {
    pub fn new(
        api: ApiClient,
        registry: ObjectUrlRegistry,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            registry,
            notifier,
            navigator,
        }
    }

    pub fn session(&self) -> &Session {
        self.api.session()
    }

    /// Log `err` and show it to the user, prefixed with what was attempted.
    pub(crate) fn report(&self, action: &str, err: &Error) {
        warn!("{action} failed: {err:?}");
        self.notifier.notify(&format!("{action} failed: {}", err.user_message()));
    }

    /// End the session and go back to the root page.
    pub fn logout(&self) -> crate::Result<()> {
        let result = self.session().end();
        if let Err(err) = &result {
            self.report("Logout", err);
        }
        self.navigator.navigate(Route::ROOT);
        result
    }
}

/// Result of mounting a page that may redirect.
#[derive(Debug)]
pub enum Mount<P> {
    Ready(P),
    Redirected(Route),
}

impl<P> Mount<P> {
    pub fn ready(self) -> Option<P> {
        match self {
            Self::Ready(page) => Some(page),
            Self::Redirected(_) => None,
        }
    }
}
