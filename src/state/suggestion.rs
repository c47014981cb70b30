/// Advisory records attached to an item
///
/// A suggestion is created by a settled operation and never edited
/// afterwards, except for the implemented flag which only moves from
/// false to true.
use serde::Serialize;
use std::fmt;

/// Store-wide suggestion identity, assigned once at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SuggestionId(pub(crate) u64);

impl fmt::Display for SuggestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "suggestion-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Improvement,
    Warning,
    Success,
    Enhancement,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Improvement => "Improvement",
            Category::Warning => "Warning",
            Category::Success => "Success",
            Category::Enhancement => "Enhancement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Everything a suggestion carries before the ledger gives it an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionDraft {
    pub category: Category,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl SuggestionDraft {
    pub fn new(
        category: Category,
        priority: Priority,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            title: title.into(),
            description: description.into(),
            priority,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    id: SuggestionId,
    category: Category,
    title: String,
    description: String,
    priority: Priority,
    implemented: bool,
}

impl Suggestion {
    pub(crate) fn from_draft(id: SuggestionId, draft: SuggestionDraft) -> Self {
        Self {
            id,
            category: draft.category,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            implemented: false,
        }
    }

    pub fn id(&self) -> SuggestionId {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn is_implemented(&self) -> bool {
        self.implemented
    }

    /// Returns true if the flag changed
    pub(crate) fn mark_implemented(&mut self) -> bool {
        let changed = !self.implemented;
        self.implemented = true;
        changed
    }
}

/// Counts shown in the footer of an item's suggestion panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SuggestionSummary {
    pub total: usize,
    pub implemented: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SuggestionSummary {
    pub fn from_suggestions(suggestions: &[Suggestion]) -> Self {
        suggestions.iter().fold(Self::default(), |mut acc, s| {
            acc.total += 1;
            if s.implemented {
                acc.implemented += 1;
            }
            match s.priority {
                Priority::High => acc.high += 1,
                Priority::Medium => acc.medium += 1,
                Priority::Low => acc.low += 1,
            }
            acc
        })
    }
}
