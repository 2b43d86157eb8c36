//! # File Classification Module
//!
//! Questo modulo decide quale politica di sostituzione si applica a un file,
//! in base alla sua estensione (case-insensitive).
//!
//! ## Ordine di classificazione (la prima regola vince):
//! 1. `Image`: estensioni configurate (default: jpg, png)
//! 2. `Pdf`: estensione esattamente `pdf`
//! 3. `PlaceholderMedia`: mp4, mpeg, avi
//! 4. `Generic`: tutto il resto, incluse le path senza estensione
//!
//! La classificazione è totale: ogni file riceve esattamente una politica,
//! non esiste un caso "non gestito".

use std::path::Path;

/// Media extensions whose content is replaced by the empty placeholder asset.
pub const PLACEHOLDER_MEDIA_EXTENSIONS: [&str; 3] = ["mp4", "mpeg", "avi"];

/// Extension handled by the PDF placeholder strategy.
pub const PDF_EXTENSION: &str = "pdf";

/// Substitution policy applied to a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilePolicy {
    /// Recompress through the external converter binary
    Image,
    /// Replace with the canned minimal PDF asset
    Pdf,
    /// Replace with the canned empty placeholder asset
    PlaceholderMedia,
    /// Duplicate as-is: hard link, falling back to a full copy
    Generic,
}

impl FilePolicy {
    /// Label used in progress lines for the converting policies.
    ///
    /// `Generic` files are copied, not converted, so they have no label here.
    pub fn conversion_label(&self) -> Option<&'static str> {
        match self {
            Self::Image => Some("Image"),
            Self::Pdf => Some("PDF"),
            Self::PlaceholderMedia => Some("Media"),
            Self::Generic => None,
        }
    }
}

/// Maps file names onto substitution policies.
pub struct Classifier {
    image_extensions: Vec<String>,
}

impl Classifier {
    /// Create a classifier; `image_extensions` are compared case-insensitively.
    pub fn new(image_extensions: &[String]) -> Self {
        Self {
            image_extensions: image_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Classify a path. Total: always returns exactly one policy.
    pub fn classify(&self, path: &Path) -> FilePolicy {
        let extension = match path.extension() {
            Some(ext) => ext.to_string_lossy().to_ascii_lowercase(),
            None => return FilePolicy::Generic,
        };

        if self.image_extensions.iter().any(|image| *image == extension) {
            return FilePolicy::Image;
        }

        if extension == PDF_EXTENSION {
            return FilePolicy::Pdf;
        }

        if PLACEHOLDER_MEDIA_EXTENSIONS.contains(&extension.as_str()) {
            return FilePolicy::PlaceholderMedia;
        }

        FilePolicy::Generic
    }
}
