/// Failure taxonomy for the external collaborators.
///
/// Every variant folds into the same item-level `Failed` status; the kind
/// and detail only travel along for logs and the status line.
use thiserror::Error;

/// Coarse classification of a collaborator failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaboratorErrorKind {
    Unavailable,
    Rejected,
    Unparseable,
}

/// A failed call to background removal, vision inference or the local
/// adjustment step.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    /// Missing credential or the service could not be reached.
    #[error("{service} unavailable: {detail}")]
    Unavailable {
        service: &'static str,
        detail: String,
    },
    /// The service answered with a non-success status.
    #[error("{service} rejected the request ({status}): {detail}")]
    Rejected {
        service: &'static str,
        status: u16,
        detail: String,
    },
    /// The response did not have the expected shape.
    #[error("{service} response could not be interpreted: {detail}")]
    Unparseable {
        service: &'static str,
        detail: String,
    },
}

impl CollaboratorError {
    pub fn unavailable(service: &'static str, detail: impl Into<String>) -> Self {
        Self::Unavailable {
            service,
            detail: detail.into(),
        }
    }

    pub fn rejected(service: &'static str, status: u16, detail: impl Into<String>) -> Self {
        Self::Rejected {
            service,
            status,
            detail: detail.into(),
        }
    }

    pub fn unparseable(service: &'static str, detail: impl Into<String>) -> Self {
        Self::Unparseable {
            service,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> CollaboratorErrorKind {
        match self {
            Self::Unavailable { .. } => CollaboratorErrorKind::Unavailable,
            Self::Rejected { .. } => CollaboratorErrorKind::Rejected,
            Self::Unparseable { .. } => CollaboratorErrorKind::Unparseable,
        }
    }

    pub fn service(&self) -> &'static str {
        match self {
            Self::Unavailable { service, .. }
            | Self::Rejected { service, .. }
            | Self::Unparseable { service, .. } => service,
        }
    }
}
