//! Image display with load status and a fallback placeholder.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use crate::object_url::{ImageSource, ObjectUrl};

pub const FALLBACK_IMAGE_URL: &str = "https://via.placeholder.com/400x300?text=Image+failed+to+load";
pub const EMPTY_MESSAGE: &str = "No classification result yet, please upload an image first";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayView {
    Placeholder {
        message: &'static str,
    },
    Image {
        /// What to draw: the requested URL, or the fallback after an error.
        src: String,
        /// The URL originally asked for, kept for retry and diagnostics.
        requested: String,
        status: LoadStatus,
        class_name: Option<String>,
    },
}

#[derive(Debug, Default)]
pub struct DisplayWidget {
    source: Option<ImageSource>,
    status: LoadStatus,
    class_name: Option<String>,
}

impl DisplayWidget {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// The local handle being shown, if any.
    pub fn local_url(&self) -> Option<ObjectUrl> {
        match &self.source {
            Some(ImageSource::Local(url)) => Some(url.clone()),
            _ => None,
        }
    }

    /// Show `source` and hand back the source it replaced. A different
    /// handle resets the status to loading; the same handle leaves it alone.
    pub fn set_source(&mut self, source: Option<ImageSource>) -> Option<ImageSource> {
        if self.source == source {
            return None;
        }
        self.status = LoadStatus::Loading;
        std::mem::replace(&mut self.source, source)
    }

    pub fn mark_loaded(&mut self) {
        self.status = LoadStatus::Success;
    }

    pub fn mark_failed(&mut self) {
        self.status = LoadStatus::Error;
    }

    /// Decode a local image that is still loading to settle its status.
    /// External sources and settled statuses are left alone.
    pub fn load(&mut self) -> LoadStatus {
        if self.status != LoadStatus::Loading {
            return self.status;
        }
        let url = match &self.source {
            Some(ImageSource::Local(url)) => url.clone(),
            _ => return self.status,
        };
        let decoded = url
            .resolve()
            .ok_or_else(|| "handle already released".to_string())
            .and_then(|blob| image::load_from_memory(blob.bytes()).map_err(|e| e.to_string()));
        match decoded {
            Ok(image) => {
                debug!("{url} decoded ({}x{})", image.width(), image.height());
                self.mark_loaded();
            }
            Err(reason) => {
                warn!("{url} failed to load: {reason}");
                self.mark_failed();
            }
        }
        self.status
    }

    pub fn view(&self) -> DisplayView {
        match &self.source {
            None => DisplayView::Placeholder {
                message: EMPTY_MESSAGE,
            },
            Some(source) => {
                let requested = source.url().to_string();
                let src = match self.status {
                    LoadStatus::Error => FALLBACK_IMAGE_URL.to_string(),
                    _ => requested.clone(),
                };
                DisplayView::Image {
                    src,
                    requested,
                    status: self.status,
                    class_name: self.class_name.clone(),
                }
            }
        }
    }

    /// Drop the widget; a local handle it held is released if nobody else holds it.
    pub fn unmount(self) {}
}

/// A display that an upload sink feeds and a page renders.
///
/// The wrapped widget is the only owner of the handle it shows, so replacing
/// the source releases the old handle right away.
#[derive(Debug, Clone, Default)]
pub struct SharedDisplay {
    inner: Arc<Mutex<DisplayWidget>>,
}

impl SharedDisplay {
    pub fn new(display: DisplayWidget) -> Self {
        Self {
            inner: Arc::new(Mutex::new(display)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DisplayWidget> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn show(&self, source: Option<ImageSource>) {
        let superseded = self.lock().set_source(source);
        drop(superseded);
    }

    pub fn url(&self) -> Option<ObjectUrl> {
        self.lock().local_url()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().source().is_none()
    }

    pub fn status(&self) -> LoadStatus {
        self.lock().status()
    }

    pub fn mark_loaded(&self) {
        self.lock().mark_loaded();
    }

    pub fn mark_failed(&self) {
        self.lock().mark_failed();
    }

    /// Settle a fresh source and describe what to draw.
    pub fn render(&self) -> DisplayView {
        let mut display = self.lock();
        display.load();
        display.view()
    }
}
