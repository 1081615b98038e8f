//! Image picker and uploader.
//!
//! ```text
//! NoFile -> FileSelected -> Uploading -> Done | Failed
//!              ^______________ any new pick ______|
//! ```
//!
//! At most one upload is in flight per widget. A second `submit` while one
//! is outstanding is dropped, not queued, and sends nothing.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use crate::blob::{FormData, SelectedFile};
use crate::error::{Error, Result, ValidationError};
use crate::http::ApiClient;
use crate::notify::Notifier;
use crate::object_url::{ImageSource, ObjectUrl, ObjectUrlRegistry};
use crate::widgets::display::{DisplayWidget, SharedDisplay};

pub const IMAGE_ENDPOINT: &str = "/api/image";
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    NoFile,
    FileSelected,
    Uploading,
    Done,
    Failed,
}

/// Where the widget reports preview and result handles.
pub trait UploadSink: Send + Sync {
    fn preview_ready(&self, url: ObjectUrl);
    fn result_ready(&self, url: ObjectUrl);
    /// The user asked to see the selected file.
    fn preview_requested(&self) {}
}

/// Preview and result share one display; the latest wins.
impl UploadSink for SharedDisplay {
    fn preview_ready(&self, url: ObjectUrl) {
        self.show(Some(ImageSource::Local(url)));
    }

    fn result_ready(&self, url: ObjectUrl) {
        self.show(Some(ImageSource::Local(url)));
    }
}

/// Preview visibility, preview display and result display kept separately.
#[derive(Debug, Clone)]
pub struct StagedSink {
    pub show_preview: Arc<AtomicBool>,
    pub preview: SharedDisplay,
    pub result: SharedDisplay,
}

impl Default for StagedSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StagedSink {
    pub fn new() -> Self {
        Self {
            show_preview: Arc::new(AtomicBool::new(false)),
            preview: SharedDisplay::new(DisplayWidget::new().with_class("preview-img")),
            result: SharedDisplay::new(DisplayWidget::new().with_class("result-img")),
        }
    }

    pub fn is_preview_visible(&self) -> bool {
        self.show_preview.load(Ordering::SeqCst)
    }

    pub fn set_preview_visible(&self, visible: bool) {
        self.show_preview.store(visible, Ordering::SeqCst);
    }
}

impl UploadSink for StagedSink {
    fn preview_ready(&self, url: ObjectUrl) {
        self.preview.show(Some(ImageSource::Local(url)));
    }

    fn result_ready(&self, url: ObjectUrl) {
        self.result.show(Some(ImageSource::Local(url)));
    }

    fn preview_requested(&self) {
        self.set_preview_visible(true);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoFile,
    InFlight,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Completed(ObjectUrl),
    Skipped(SkipReason),
    Failed(Error),
}

struct Selection {
    state: UploadState,
    file: Option<SelectedFile>,
}

pub struct UploadWidget<S> {
    api: ApiClient,
    registry: ObjectUrlRegistry,
    notifier: Arc<dyn Notifier>,
    sink: S,
    selection: Mutex<Selection>,
    picks: AtomicU64,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag on every exit path.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<S: UploadSink> UploadWidget<S> {
    pub fn new(
        api: ApiClient,
        registry: ObjectUrlRegistry,
        notifier: Arc<dyn Notifier>,
        sink: S,
    ) -> Self {
        Self {
            api,
            registry,
            notifier,
            sink,
            selection: Mutex::new(Selection {
                state: UploadState::NoFile,
                file: None,
            }),
            picks: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
        }
    }

    fn selection(&self) -> MutexGuard<'_, Selection> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn state(&self) -> UploadState {
        self.selection().state
    }

    pub fn is_uploading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn selected_file_name(&self) -> Option<String> {
        self.selection().file.as_ref().map(|file| file.name().to_string())
    }

    /// Handle a file-picker result. An empty pick changes nothing.
    ///
    /// The preview handle is owned by the sink, which releases the previous
    /// one as soon as it takes the new one.
    pub fn select_file(&self, picked: Option<SelectedFile>) -> bool {
        let Some(file) = picked else {
            debug!("file picker returned nothing");
            return false;
        };

        let preview = self.registry.create(file.blob().clone());
        {
            let mut selection = self.selection();
            selection.state = UploadState::FileSelected;
            selection.file = Some(file);
        }
        self.picks.fetch_add(1, Ordering::SeqCst);
        self.sink.preview_ready(preview);
        true
    }

    /// Ask the sink to show the selected file.
    pub fn open_preview(&self) -> bool {
        if self.selection().file.is_none() {
            self.notifier
                .notify("Please select an image before previewing it");
            return false;
        }
        self.sink.preview_requested();
        true
    }

    /// Upload the selected file under [`FILE_FIELD`] and report the result image.
    pub async fn submit(&self) -> SubmitOutcome {
        let Some(file) = self.selection().file.clone() else {
            self.notifier
                .notify(&Error::from(ValidationError::NoFileSelected).user_message());
            return SubmitOutcome::Skipped(SkipReason::NoFile);
        };
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            debug!("upload already in flight, submit dropped");
            return SubmitOutcome::Skipped(SkipReason::InFlight);
        };

        let pick = self.picks.load(Ordering::SeqCst);
        self.selection().state = UploadState::Uploading;

        match self.upload(&file).await {
            Ok(result) => {
                info!("classification result received for {}", file.name());
                self.finish(pick, UploadState::Done);
                self.sink.result_ready(result.clone());
                SubmitOutcome::Completed(result)
            }
            Err(err) => {
                warn!("upload of {} failed: {err:?}", file.name());
                self.notifier.notify(&err.user_message());
                self.finish(pick, UploadState::Failed);
                SubmitOutcome::Failed(err)
            }
        }
    }

    async fn upload(&self, file: &SelectedFile) -> Result<ObjectUrl> {
        let form = FormData::new().with_file(FILE_FIELD, file);
        let blob = self.api.post_form(IMAGE_ENDPOINT, form).await?;
        if !blob.is_image() {
            return Err(Error::NonImageResponse);
        }
        Ok(self.registry.create(blob))
    }

    /// A pick made while uploading keeps the widget in `FileSelected`.
    fn finish(&self, pick: u64, state: UploadState) {
        let mut selection = self.selection();
        if self.picks.load(Ordering::SeqCst) == pick {
            selection.state = state;
        }
    }
}
