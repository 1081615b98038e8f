use log::info;

use super::AppContext;
use crate::error::{Result, ValidationError};
use crate::http::Auth;
use crate::models::{AuthResult, Credentials};
use crate::router::Route;

pub const LOGIN_ENDPOINT: &str = "/api/login";

pub struct LoginPage {
    ctx: AppContext,
    username: String,
    password: String,
}

impl LoginPage {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            username: String::new(),
            password: String::new(),
        }
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// Log in, store the token and move on to the upload page.
    pub async fn submit(&self) -> Result<()> {
        if let Err(err) = self.login().await {
            self.ctx.report("Login", &err);
            return Err(err);
        }
        info!("logged in as {}", self.username);
        self.ctx.navigator.navigate(Route::User1);
        Ok(())
    }

    async fn login(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "username" }.into());
        }
        if self.password.is_empty() {
            return Err(ValidationError::EmptyField { field: "password" }.into());
        }
        let credentials = Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        };
        let value = self
            .ctx
            .api
            .post_json(LOGIN_ENDPOINT, &credentials, Auth::Anonymous)
            .await?;
        let auth = AuthResult::from_login(value)?;
        self.ctx.session().begin(&auth)
    }
}
