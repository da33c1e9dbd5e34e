//! Synopsis document model.
//!
//! The types here carry everything the package writer needs and nothing else: an ordered
//! list of heading/body pairs plus an optional raster figure. They are built fresh for
//! every export and never persisted.

use bioeq_types::NonEmptyText;

/// One textual section of the synopsis: a heading followed by body paragraphs.
///
/// The body is opaque free text; blank-line-separated blocks become separate paragraphs
/// in the rendered document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocSection {
    pub heading: NonEmptyText,
    pub body: String,
}

/// A raster figure appended after the textual body, on its own page.
///
/// The image is embedded at fixed display dimensions regardless of the pixel size of the
/// buffer, so captures from different surfaces lay out identically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Figure {
    /// PNG-encoded image bytes.
    pub png: Vec<u8>,
    /// Caption paragraph placed under the image.
    pub caption: Option<String>,
}

/// An assembled protocol synopsis ready for serialisation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SynopsisDocument {
    /// Document title, rendered as the title block's first line.
    pub title: NonEmptyText,
    /// Subtitle lines under the title (study metadata, generated-on stamp).
    pub subtitle_lines: Vec<String>,
    /// Ordered textual sections.
    pub sections: Vec<DocSection>,
    /// Optional figure, rendered after a page break.
    pub figure: Option<Figure>,
}

impl SynopsisDocument {
    /// Creates a document with the given title and no content.
    pub fn new(title: NonEmptyText) -> Self {
        Self {
            title,
            subtitle_lines: Vec::new(),
            sections: Vec::new(),
            figure: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_is_empty() {
        let doc = SynopsisDocument::new(NonEmptyText::new("Synopsis").unwrap());
        assert!(doc.sections.is_empty());
        assert!(doc.subtitle_lines.is_empty());
        assert!(doc.figure.is_none());
    }
}
