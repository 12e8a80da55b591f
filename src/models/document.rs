use super::enums::FileKind;

/// An uploaded file as handed to the pipeline.
///
/// Immutable once built. The pipeline borrows it and never persists it.
#[derive(Debug, Clone)]
pub struct RawDocument {
    bytes: Vec<u8>,
    content_type: Option<String>,
    filename: String,
}

impl RawDocument {
    pub fn new(bytes: Vec<u8>, content_type: Option<&str>, filename: &str) -> Self {
        Self {
            bytes,
            content_type: content_type.map(str::to_string),
            filename: filename.to_string(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn file_kind(&self) -> FileKind {
        FileKind::from_content_type(self.content_type())
    }
}
