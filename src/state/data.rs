/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the item store, the processing layer and the UI layer.
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt;

use super::suggestion::Suggestion;
use crate::error::CollaboratorError;

/// Store-assigned item identity, never reused while the store lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// Opaque reference to image bytes
///
/// Clones share the same buffer, so in-flight requests can hold the
/// source without borrowing the store.
#[derive(Clone, PartialEq, Eq)]
pub struct ContentHandle(Bytes);

impl ContentHandle {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn bytes(&self) -> &Bytes {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ContentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHandle({} bytes)", self.0.len())
    }
}

/// The two operations an item can go through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Enhance,
    Validate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Enhance => f.write_str("enhance"),
            Operation::Validate => f.write_str("validate"),
        }
    }
}

/// Processing status of one operation on one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    NotStarted,
    InProgress,
    Done,
    Failed,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::NotStarted => "not started",
            Status::InProgress => "in progress",
            Status::Done => "done",
            Status::Failed => "failed",
        }
    }
}

/// Status plus the diagnostic detail of the most recent failure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progress {
    pub status: Status,
    /// Cleared on the next success
    pub last_failure: Option<CollaboratorError>,
}

/// Represents a single image under management
#[derive(Debug, Clone)]
pub struct Item {
    pub(crate) id: ItemId,
    /// Filename only (e.g., "kurti_front.jpg")
    pub(crate) name: String,
    /// Sniffed MIME type (e.g., "image/png")
    pub(crate) mime: &'static str,
    /// Bytes as uploaded
    pub(crate) source: ContentHandle,
    /// Latest successful enhancement, if any
    pub(crate) derived: Option<ContentHandle>,
    pub(crate) enhancement: Progress,
    pub(crate) validation: Progress,
    pub(crate) suggestions: Vec<Suggestion>,
    pub(crate) accepted_at: DateTime<Utc>,
}

impl Item {
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn source(&self) -> &ContentHandle {
        &self.source
    }

    pub fn derived(&self) -> Option<&ContentHandle> {
        self.derived.as_ref()
    }

    /// The enhanced view when there is one, otherwise the original
    pub fn display_content(&self) -> &ContentHandle {
        self.derived.as_ref().unwrap_or(&self.source)
    }

    pub fn progress(&self, operation: Operation) -> &Progress {
        match operation {
            Operation::Enhance => &self.enhancement,
            Operation::Validate => &self.validation,
        }
    }

    pub(crate) fn progress_mut(&mut self, operation: Operation) -> &mut Progress {
        match operation {
            Operation::Enhance => &mut self.enhancement,
            Operation::Validate => &mut self.validation,
        }
    }

    pub fn status(&self, operation: Operation) -> Status {
        self.progress(operation).status
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn accepted_at(&self) -> DateTime<Utc> {
        self.accepted_at
    }
}
