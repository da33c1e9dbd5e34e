//! Export synthesis.
//!
//! Builds the synopsis document handed to the `bioeq-docx` boundary crate: a title
//! block, every non-chart section in registry order as heading plus justified body,
//! and the optional chart figure on its own page. Assembly is pure; gating and the
//! in-flight flag live on the editor.

use crate::capture::CapturedImage;
use crate::section::Section;
use bioeq_docx::{DocSection, Figure, SynopsisDocument};
use bioeq_types::NonEmptyText;
use chrono::{DateTime, Utc};

/// The finished export: deterministic filename plus the serialised document bytes.
///
/// Delivery (browser download, disk write) is the embedder's concern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Deterministic artifact name for a study.
pub(crate) fn export_filename(study_id: &str) -> String {
    format!("Synopsis_{study_id}.docx")
}

/// Study metadata shown in the document's title block.
pub(crate) struct TitleBlock<'a> {
    pub title: &'a NonEmptyText,
    pub drug: Option<&'a str>,
    pub sponsor: Option<&'a str>,
    pub phase: Option<&'a str>,
    pub generated_on: DateTime<Utc>,
}

/// Assemble the document body from the registry's sections.
///
/// The chart section (identified by id) is visual, not textual, and is excluded from
/// the body; its content reaches the document only as the captured figure.
pub(crate) fn assemble_document(
    title_block: &TitleBlock<'_>,
    sections: &[Section],
    chart_section_id: Option<&str>,
    image: Option<CapturedImage>,
) -> SynopsisDocument {
    let mut doc = SynopsisDocument::new(title_block.title.clone());

    if let Some(drug) = title_block.drug {
        doc.subtitle_lines.push(drug.to_string());
    }
    match (title_block.sponsor, title_block.phase) {
        (Some(sponsor), Some(phase)) => doc.subtitle_lines.push(format!("{sponsor} - {phase}")),
        (Some(sponsor), None) => doc.subtitle_lines.push(sponsor.to_string()),
        (None, Some(phase)) => doc.subtitle_lines.push(phase.to_string()),
        (None, None) => {}
    }
    doc.subtitle_lines.push(format!(
        "Generated on {}",
        title_block.generated_on.format("%Y-%m-%d")
    ));

    for section in sections {
        if chart_section_id == Some(section.id.as_str()) {
            continue;
        }
        doc.sections.push(DocSection {
            heading: section.label.clone(),
            body: section.content.clone(),
        });
    }

    doc.figure = image.map(|captured| Figure {
        png: captured.png,
        caption: Some("Figure 1. Pharmacokinetic concentration-time profile".to_string()),
    });

    doc
}
