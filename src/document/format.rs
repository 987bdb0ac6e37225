//! Document format detection from MIME-type hints

use std::path::Path;

/// Container formats the viewer knows how to ask the engine for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    #[default]
    Pdf,
    Xps,
    Cbz,
    Epub,
}

impl DocumentFormat {
    /// Map a MIME-type hint to a format, guessing PDF when nothing matches.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        Self::recognize_mime(mime).unwrap_or_default()
    }

    /// Resolve the format for a file, preferring the MIME hint and then the
    /// extension before the PDF fallback.
    #[must_use]
    pub fn for_path(path: &Path, mime: &str) -> Self {
        Self::recognize_mime(mime)
            .or_else(|| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(Self::recognize_extension)
            })
            .unwrap_or_default()
    }

    fn recognize_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" | "application/x-pdf" => Some(Self::Pdf),
            "application/vnd.ms-xpsdocument" | "application/oxps" => Some(Self::Xps),
            "application/x-cbz" | "application/vnd.comicbook+zip" => Some(Self::Cbz),
            "application/epub+zip" => Some(Self::Epub),
            _ => None,
        }
    }

    fn recognize_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "xps" | "oxps" => Some(Self::Xps),
            "cbz" | "zip" => Some(Self::Cbz),
            "epub" => Some(Self::Epub),
            _ => None,
        }
    }

    /// Canonical MIME type, also used as the engine's format magic
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Xps => "application/vnd.ms-xpsdocument",
            Self::Cbz => "application/x-cbz",
            Self::Epub => "application/epub+zip",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_mime_types() {
        assert_eq!(DocumentFormat::from_mime("application/x-cbz"), DocumentFormat::Cbz);
        assert_eq!(
            DocumentFormat::from_mime("application/vnd.ms-xpsdocument"),
            DocumentFormat::Xps
        );
        assert_eq!(
            DocumentFormat::from_mime("Application/PDF; charset=binary"),
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn unknown_mime_falls_back_to_pdf() {
        assert_eq!(DocumentFormat::from_mime("text/plain"), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_mime(""), DocumentFormat::Pdf);
    }

    #[test]
    fn extension_used_when_hint_is_missing() {
        let path = Path::new("/tmp/comic.CBZ");
        assert_eq!(DocumentFormat::for_path(path, ""), DocumentFormat::Cbz);
        assert_eq!(
            DocumentFormat::for_path(path, "application/pdf"),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::for_path(Path::new("notes.txt"), ""),
            DocumentFormat::Pdf
        );
    }
}
