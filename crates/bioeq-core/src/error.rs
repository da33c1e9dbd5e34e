//! Error taxonomy for the protocol editor core.
//!
//! Every failure class here is recoverable: the editor stays interactive after each of
//! them. Import failures mutate nothing; capture failures downgrade an export to
//! text-only; serialisation failures abort the single export attempt.

use thiserror::Error;

/// Failures while ingesting an external JSON artifact.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("unrecognised artifact: expected a power-analysis or concentration-curve result")]
    UnrecognisedShape,

    #[error("artifact schema mismatch at {path}: {source}")]
    SchemaMismatch {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures while validating or loading study templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("study '{study}' has no sections")]
    NoSections { study: String },

    #[error("study '{study}' declares section id '{id}' more than once")]
    DuplicateSectionId { study: String, id: String },

    #[error("study id '{study}' is declared more than once")]
    DuplicateStudyId { study: String },

    #[error("study '{study}' names unknown {role} section '{id}'")]
    UnknownRoleSection {
        study: String,
        role: &'static str,
        id: String,
    },

    #[error("study '{study}' assigns the statistics and chart roles to the same section '{id}'")]
    OverlappingRoles { study: String, id: String },

    #[error("template document schema mismatch at {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failure to produce a raster image of the current chart render.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no chart data to capture")]
    NoData,

    #[error("failed to encode chart image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("rendering surface failed: {0}")]
    Surface(String),
}

/// Failures while exporting the assembled protocol document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no export is in flight")]
    NotInFlight,

    #[error("document serialisation failed: {0}")]
    Serialisation(#[from] bioeq_docx::DocxError),
}
