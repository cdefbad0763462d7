//! Selected files and the folders they are destined for
//!
//! Every file gets a [`FileId`] when it is selected. Display names are keyed
//! by that id, so removing a file never shifts the names of the others.

mod path;
mod policy;

pub use path::{FolderPath, validate_file_name};
pub use policy::{FilePolicy, Rejection, extension, format_size};

use crate::error::Result;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Stable identifier assigned to a file at selection time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(Uuid);

impl FileId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One selected file; the payload is shared and never mutated
#[derive(Debug, Clone)]
pub struct FileEntry {
    id: FileId,
    file_name: String,
    media_type: &'static str,
    payload: Arc<[u8]>,
}

impl FileEntry {
    /// Wrap an in-memory payload
    pub fn new(file_name: impl Into<String>, payload: impl Into<Arc<[u8]>>) -> Self {
        let file_name = file_name.into();
        Self {
            id: FileId::generate(),
            media_type: media_type_for(&file_name),
            file_name,
            payload: payload.into(),
        }
    }

    /// Read a file from disk
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(name, bytes))
    }

    /// Stable identifier
    pub const fn id(&self) -> FileId {
        self.id
    }

    /// Name the file had when selected
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declared media type
    pub const fn media_type(&self) -> &'static str {
        self.media_type
    }

    /// Raw byte length
    pub fn len(&self) -> u64 {
        self.payload.len() as u64
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Shared handle to the raw payload
    pub fn payload(&self) -> Arc<[u8]> {
        Arc::clone(&self.payload)
    }
}

fn media_type_for(name: &str) -> &'static str {
    match extension(name).as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "zip" => "application/zip",
        "txt" => "text/plain",
        "ipynb" => "application/x-ipynb+json",
        "py" => "text/x-python",
        _ => "application/octet-stream",
    }
}

/// A destination folder and the files headed there
#[derive(Debug, Clone, Default)]
pub struct UploadGroup {
    folder: String,
    files: Vec<FileEntry>,
    display_names: HashMap<FileId, String>,
}

impl UploadGroup {
    /// Create an empty group for a (not yet validated) folder path
    pub fn new(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            ..Self::default()
        }
    }

    /// Raw folder path as entered
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Replace the folder path
    pub fn set_folder(&mut self, folder: impl Into<String>) {
        self.folder = folder.into();
    }

    /// Files in selection order
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Whether the group has no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Add files that pass `policy`; refused files are returned, not fatal
    pub fn add_files(
        &mut self,
        candidates: impl IntoIterator<Item = FileEntry>,
        policy: &FilePolicy,
    ) -> Vec<Rejection> {
        let mut rejected = Vec::new();
        for file in candidates {
            match policy.check(file.file_name(), file.len()) {
                Ok(()) => self.files.push(file),
                Err(r) => rejected.push(r),
            }
        }
        rejected
    }

    /// Remove a file; other files keep their names
    pub fn remove(&mut self, id: FileId) -> Option<FileEntry> {
        let idx = self.files.iter().position(|f| f.id() == id)?;
        self.display_names.remove(&id);
        Some(self.files.remove(idx))
    }

    /// Give a file a display name different from its file name
    ///
    /// Returns false when the id is not in this group.
    pub fn rename(&mut self, id: FileId, name: impl Into<String>) -> bool {
        if !self.files.iter().any(|f| f.id() == id) {
            return false;
        }
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            self.display_names.remove(&id);
        } else {
            self.display_names.insert(id, trimmed.to_string());
        }
        true
    }

    /// Display name for a file, falling back to its file name
    pub fn display_name<'a>(&'a self, file: &'a FileEntry) -> &'a str {
        self.display_names
            .get(&file.id())
            .map_or_else(|| file.file_name(), String::as_str)
    }
}
