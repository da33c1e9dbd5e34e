//! OOXML (DOCX) boundary support.
//!
//! This crate is responsible for serialising an assembled protocol synopsis into a
//! Microsoft Word DOCX package. DOCX files are ZIP archives containing XML; the package
//! is written with `zip` and the document part is written event-by-event with `quick-xml`
//! so all text content is escaped by the library.
//!
//! Protocol meaning lives in `bioeq-core`. This crate handles file formats only.

pub mod document;
mod package;
mod xml;

pub use document::{DocSection, Figure, SynopsisDocument};

use thiserror::Error;

/// Errors returned by the `bioeq-docx` boundary crate.
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("failed to start package entry {name}: {source}")]
    Package {
        name: &'static str,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to write package entry {name}: {source}")]
    Io {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write document XML: {0}")]
    Xml(String),

    #[error("failed to finalise package: {0}")]
    Finish(#[source] zip::result::ZipError),
}

/// Serialise a synopsis document to DOCX bytes.
///
/// The returned buffer is a complete, self-contained package ready to be delivered as a
/// file download or written to disk by the embedder.
///
/// # Errors
///
/// Returns [`DocxError`] if any package entry or the document XML cannot be written.
pub fn render_docx(doc: &SynopsisDocument) -> Result<Vec<u8>, DocxError> {
    package::write_package(doc)
}
