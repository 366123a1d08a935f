use std::borrow::Cow;

use amp_types::DocumentId;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A document snapshot as observed in the store.
///
/// Folders carry a `docs` list; files carry `content`. Any other field in
/// the stored representation is ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Document {
    Folder(FolderDocument),
    File(FileDocument),
}

impl Document {
    /// Human-readable kind name.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Folder(_) => "folder",
            Self::File(_) => "file",
        }
    }
}

impl From<FolderDocument> for Document {
    fn from(folder: FolderDocument) -> Self {
        Self::Folder(folder)
    }
}

impl From<FileDocument> for Document {
    fn from(file: FileDocument) -> Self {
        Self::File(file)
    }
}

// ---------------------------------------------------------------------------
// Folder
// ---------------------------------------------------------------------------

/// Kind tag of a folder entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Folder => write!(f, "folder"),
        }
    }
}

/// A named child reference inside a folder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub url: DocumentId,
}

impl DirEntry {
    pub fn file(name: impl Into<String>, url: DocumentId) -> Self {
        Self { name: name.into(), kind: EntryKind::File, url }
    }

    pub fn folder(name: impl Into<String>, url: DocumentId) -> Self {
        Self { name: name.into(), kind: EntryKind::Folder, url }
    }
}

/// Directory document: entries in authored order.
///
/// Names are unique by convention only. Lookups return the first match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub docs: Vec<DirEntry>,
}

impl FolderDocument {
    /// Create a folder with the given name and entries.
    pub fn new(name: impl Into<String>, docs: Vec<DirEntry>) -> Self {
        let name = name.into();
        Self { title: name.clone(), name, docs }
    }

    /// First entry with this name and kind.
    pub fn find(&self, name: &str, kind: EntryKind) -> Option<&DirEntry> {
        self.docs.iter().find(|e| e.name == name && e.kind == kind)
    }

    /// Number of direct entries.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Returns `true` if the folder has no entries.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// File content as stored: either text or raw bytes.
///
/// This is the only place the text/binary ambiguity exists; everything
/// downstream works with [`Bytes`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl FileContent {
    /// Normalize to bytes (UTF-8 for text, pass-through for binary).
    pub fn into_bytes(self) -> Bytes {
        match self {
            Self::Text(s) => Bytes::from(s.into_bytes()),
            Self::Bytes(b) => Bytes::from(b),
        }
    }

    /// Normalize to text, replacing invalid UTF-8 sequences.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Bytes(b) => String::from_utf8_lossy(b),
        }
    }

    /// Content length in bytes.
    pub fn len(&self) -> usize {
        match self {
            Self::Text(s) => s.len(),
            Self::Bytes(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for FileContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FileContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

/// File metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<u32>,
}

/// File document snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub content: FileContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FileMetadata>,
}

impl FileDocument {
    /// Create a file document with no explicit permissions.
    pub fn new(name: impl Into<String>, content: impl Into<FileContent>) -> Self {
        let name = name.into();
        let extension = name.rfind('.').map(|i| name[i..].to_string());
        Self {
            name,
            extension,
            mime_type: None,
            content: content.into(),
            metadata: None,
        }
    }

    /// Set the permission bits.
    #[must_use]
    pub fn with_permissions(mut self, mode: u32) -> Self {
        self.metadata = Some(FileMetadata { permissions: Some(mode) });
        self
    }

    /// Permission bits, if the document records any.
    pub fn permissions(&self) -> Option<u32> {
        self.metadata.as_ref().and_then(|m| m.permissions)
    }
}
