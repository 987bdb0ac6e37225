//! Error types for the engine seam and the public document API

/// Failure reported by a rendering engine.
///
/// Carries whatever detail the engine offers; it is logged at the public API
/// boundary and then collapsed into a [`ViewerError`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine ran out of memory")]
    OutOfMemory,

    #[error("cannot open document: {detail}")]
    Open { detail: String },

    #[error("page {page}: {detail}")]
    Page { page: i32, detail: String },

    #[error("render: {detail}")]
    Render { detail: String },

    #[error("text extraction: {detail}")]
    Text { detail: String },

    #[error("outline: {detail}")]
    Outline { detail: String },

    #[cfg(feature = "mupdf")]
    #[error("PDF engine: {0}")]
    Pdf(#[from] mupdf::error::Error),
}

impl EngineError {
    pub fn open(msg: impl Into<String>) -> Self {
        Self::Open { detail: msg.into() }
    }

    pub fn page(page: i32, msg: impl Into<String>) -> Self {
        Self::Page {
            page,
            detail: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render { detail: msg.into() }
    }

    pub fn text(msg: impl Into<String>) -> Self {
        Self::Text { detail: msg.into() }
    }

    pub fn outline(msg: impl Into<String>) -> Self {
        Self::Outline { detail: msg.into() }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::OutOfMemory {
            Self::OutOfMemory
        } else {
            Self::open(e.to_string())
        }
    }
}

/// Coarse status returned by every public document operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ViewerError {
    #[error("out of memory")]
    OutOfMemory,

    #[error("invalid argument")]
    InvalidArgument,

    #[error("operation failed")]
    GenericFailure,
}

impl ViewerError {
    /// Collapse an engine failure during document setup.
    ///
    /// Anything but an allocation failure means the input was unusable.
    pub(crate) fn from_open(e: &EngineError) -> Self {
        match e {
            EngineError::OutOfMemory => Self::OutOfMemory,
            _ => Self::InvalidArgument,
        }
    }
}

impl From<EngineError> for ViewerError {
    fn from(e: EngineError) -> Self {
        log::warn!("engine failure: {e}");
        Self::GenericFailure
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_collapse_to_generic_failure() {
        let err: ViewerError = EngineError::page(3, "broken xref").into();
        assert_eq!(err, ViewerError::GenericFailure);
    }

    #[test]
    fn open_failures_map_to_invalid_argument_or_oom() {
        assert_eq!(
            ViewerError::from_open(&EngineError::open("not a pdf")),
            ViewerError::InvalidArgument
        );
        assert_eq!(
            ViewerError::from_open(&EngineError::OutOfMemory),
            ViewerError::OutOfMemory
        );
    }
}
