//! In-memory binary payloads: picked files, server images and form bodies.

use std::path::Path;

use bytes::Bytes;
use image::ImageFormat;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Bytes,
    content_type: Option<String>,
}

impl Blob {
    pub fn new(bytes: impl Into<Bytes>, content_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// An `image/*` content type, or bytes the `image` crate recognizes.
    pub fn is_image(&self) -> bool {
        match self.content_type() {
            Some(content_type) if content_type.starts_with("image/") => true,
            _ => image::guess_format(&self.bytes).is_ok(),
        }
    }
}

/// A user-chosen local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    blob: Blob,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, blob: Blob) -> Self {
        Self {
            name: name.into(),
            blob,
        }
    }

    /// Read a file from disk; the MIME type comes from its extension.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let content_type = ImageFormat::from_path(path)
            .ok()
            .map(|format| format.to_mime_type().to_string());
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, Blob::new(bytes, content_type)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blob(&self) -> &Blob {
        &self.blob
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub file_name: String,
    pub blob: Blob,
}

/// Multipart form payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    parts: Vec<FormPart>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, file: &SelectedFile) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            file_name: file.name().to_string(),
            blob: file.blob().clone(),
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|part| part.name == name)
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }
}
