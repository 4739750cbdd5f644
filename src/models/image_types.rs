use serde::Serialize;
use std::sync::Arc;

/// A file offered by the user, before any validation.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.trim().to_ascii_lowercase().starts_with("image/")
    }
}

/// The bytes actually posted to the inference service.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl From<&SelectedFile> for FileUpload {
    fn from(file: &SelectedFile) -> Self {
        Self {
            file_name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            bytes: file.bytes.clone(),
        }
    }
}

/// A finalized image: encoded bytes plus a display-ready data URI.
/// Never mutated; a newer selection replaces it wholesale.
#[derive(Debug, Clone, Serialize)]
pub struct ImagePayload {
    /// Submission sequence number this payload belongs to.
    pub generation: u64,
    pub file_name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Arc<[u8]>,
    pub data_uri: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// One RGB8 frame grabbed from a live camera stream.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl VideoFrame {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
