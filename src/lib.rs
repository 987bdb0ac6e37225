pub mod document;
pub mod settings;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use document::{Document, DocumentOptions, DocumentSource, Engine, ViewerError};
pub use settings::Settings;
