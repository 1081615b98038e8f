pub mod display;
pub mod upload;

pub use display::{
    DisplayView, DisplayWidget, LoadStatus, SharedDisplay, EMPTY_MESSAGE, FALLBACK_IMAGE_URL,
};
pub use upload::{
    SkipReason, StagedSink, SubmitOutcome, UploadSink, UploadState, UploadWidget, FILE_FIELD,
    IMAGE_ENDPOINT,
};
