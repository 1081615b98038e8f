use log::debug;

use super::{AppContext, Mount};
use crate::blob::SelectedFile;
use crate::error::{Error, Result, ValidationError};
use crate::object_url::ObjectUrl;
use crate::router::Route;
use crate::widgets::{DisplayView, SharedDisplay, StagedSink, SubmitOutcome, UploadWidget};

pub const INVALID_PICK_MESSAGE: &str = "Please choose a valid image file";

/// Authenticated upload page: preview in a modal, result in its own panel.
pub struct User1Page {
    ctx: AppContext,
    upload: UploadWidget<StagedSink>,
}

impl User1Page {
    /// Build the page, or send the user to the login page when no token is stored.
    pub fn mount(ctx: AppContext) -> Mount<Self> {
        if !ctx.session().is_authenticated() {
            debug!("no session, redirecting to {}", Route::Login);
            ctx.navigator.navigate(Route::Login);
            return Mount::Redirected(Route::Login);
        }

        let upload = UploadWidget::new(
            ctx.api.clone(),
            ctx.registry.clone(),
            ctx.notifier.clone(),
            StagedSink::new(),
        );
        Mount::Ready(Self { ctx, upload })
    }

    pub fn upload(&self) -> &UploadWidget<StagedSink> {
        &self.upload
    }

    fn sink(&self) -> &StagedSink {
        self.upload.sink()
    }

    /// The result panel, for hosts that report image load events.
    pub fn result(&self) -> &SharedDisplay {
        &self.sink().result
    }

    pub fn select_file(&self, picked: Option<SelectedFile>) -> bool {
        self.upload.select_file(picked)
    }

    pub fn open_preview(&self) -> bool {
        self.upload.open_preview()
    }

    pub fn is_preview_visible(&self) -> bool {
        self.sink().is_preview_visible()
    }

    pub fn preview_url(&self) -> Option<ObjectUrl> {
        self.sink().preview.url()
    }

    pub fn result_url(&self) -> Option<ObjectUrl> {
        self.sink().result.url()
    }

    /// Pick another file from inside the preview modal.
    pub fn reselect_file(&self, picked: Option<SelectedFile>) -> bool {
        if picked.is_none() {
            self.ctx.notifier.notify(INVALID_PICK_MESSAGE);
            return false;
        }
        self.upload.select_file(picked)
    }

    /// Accept the previewed file and close the modal.
    pub fn confirm_preview(&self) -> Result<()> {
        if self.sink().preview.is_empty() {
            let err = Error::from(ValidationError::NoPreview);
            self.ctx.notifier.notify(&err.user_message());
            return Err(err);
        }
        self.sink().set_preview_visible(false);
        Ok(())
    }

    pub fn close_preview(&self) {
        self.sink().set_preview_visible(false);
    }

    pub async fn submit(&self) -> SubmitOutcome {
        self.upload.submit().await
    }

    /// The modal's image, or `None` while the modal is closed.
    pub fn preview_view(&self) -> Option<DisplayView> {
        self.is_preview_visible()
            .then(|| self.sink().preview.render())
    }

    pub fn result_view(&self) -> DisplayView {
        self.sink().result.render()
    }

    pub fn logout(self) -> Result<()> {
        self.ctx.logout()
    }
}
