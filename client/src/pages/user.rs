use super::AppContext;
use crate::blob::SelectedFile;
use crate::error::Result;
use crate::widgets::{DisplayView, DisplayWidget, SharedDisplay, SubmitOutcome, UploadWidget};

/// Single-panel upload page: the preview and then the result share one image.
pub struct UserPage {
    ctx: AppContext,
    upload: UploadWidget<SharedDisplay>,
}

impl UserPage {
    pub fn new(ctx: AppContext) -> Self {
        let display = SharedDisplay::new(DisplayWidget::new().with_class("preview-img"));
        let upload = UploadWidget::new(
            ctx.api.clone(),
            ctx.registry.clone(),
            ctx.notifier.clone(),
            display,
        );
        Self { ctx, upload }
    }

    pub fn upload(&self) -> &UploadWidget<SharedDisplay> {
        &self.upload
    }

    pub fn display(&self) -> &SharedDisplay {
        self.upload.sink()
    }

    pub fn select_file(&self, picked: Option<SelectedFile>) -> bool {
        self.upload.select_file(picked)
    }

    pub async fn submit(&self) -> SubmitOutcome {
        self.upload.submit().await
    }

    pub fn view(&self) -> DisplayView {
        self.display().render()
    }

    pub fn logout(self) -> Result<()> {
        self.ctx.logout()
    }
}
