use log::info;

use super::AppContext;
use crate::error::{Result, ValidationError};
use crate::http::Auth;
use crate::models::{AuthResult, Credentials};
use crate::router::Route;

pub const REGISTER_ENDPOINT: &str = "/register";

/// Registration form.
pub struct SignPage {
    ctx: AppContext,
    username: String,
    password: String,
    confirm_password: String,
}

impl SignPage {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            username: String::new(),
            password: String::new(),
            confirm_password: String::new(),
        }
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn set_confirm_password(&mut self, confirm_password: impl Into<String>) {
        self.confirm_password = confirm_password.into();
    }

    /// Register, store the returned token and go back to the root page.
    pub async fn submit(&self) -> Result<()> {
        if let Err(err) = self.register().await {
            self.ctx.report("Registration", &err);
            return Err(err);
        }
        info!("registered {}", self.username);
        self.ctx.navigator.navigate(Route::ROOT);
        Ok(())
    }

    async fn register(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "username" }.into());
        }
        if self.password.is_empty() {
            return Err(ValidationError::EmptyField { field: "password" }.into());
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch.into());
        }

        let credentials = Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        };
        let value = self
            .ctx
            .api
            .post_json(REGISTER_ENDPOINT, &credentials, Auth::Anonymous)
            .await?;
        let auth = AuthResult::from_register(value)?;
        self.ctx.session().begin(&auth)
    }
}
