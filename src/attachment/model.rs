use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::util;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Document,
}

/// Client-local, ephemeral handle to a file picked for sending. Exists only
/// until uploaded or removed; nothing about it is persisted here.
#[derive(Clone, Debug)]
pub struct Attachment {
    id: Uuid,
    path: PathBuf,
    mime_type: String,
    size_bytes: u64,
    kind: FileKind,
}

impl Attachment {
    pub fn new(
        path: impl Into<PathBuf>,
        mime_type: impl Into<String>,
        size_bytes: u64,
    ) -> super::Result<Self> {
        let mime_type = mime_type.into();

        if !util::is_supported_file_type(&mime_type) {
            return Err(super::Error::UnsupportedType(mime_type));
        }

        if size_bytes > super::MAX_SIZE_BYTES {
            return Err(super::Error::TooLarge(size_bytes));
        }

        let kind = if util::is_image(&mime_type) {
            FileKind::Image
        } else {
            FileKind::Document
        };

        Ok(Self {
            id: Uuid::new_v4(),
            path: path.into(),
            mime_type,
            size_bytes,
            kind,
        })
    }

    pub const fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub const fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|ext| ext.to_str())
    }
}
