//! Section completion status and its transition rules.
//!
//! A section's status moves through `empty -> draft -> done`. There are exactly two ways
//! to write content into a section and they carry different authority: a manual edit
//! (human keystroke) and an ingest (generated narrative from an imported artifact). Both
//! feed the same transition function via their own entry point, so each rule can be
//! tested independently.

use serde::{Deserialize, Serialize};

/// How far a section's content has progressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    /// Content is blank (whitespace-only).
    Empty,
    /// Content exists but has not been confirmed.
    Draft,
    /// Confirmed complete; the only status that satisfies the export gate.
    Done,
}

/// Origin of a content write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WriteOrigin {
    /// A human edit. Always demotes `Done` so a finished section can be reopened.
    Edit,
    /// Generated narrative. Authoritative: always lands on `Done`.
    Ingest,
}

impl SectionStatus {
    /// Status implied by content alone: `Empty` iff the trimmed text is empty.
    pub fn for_content(content: &str) -> Self {
        if content.trim().is_empty() {
            SectionStatus::Empty
        } else {
            SectionStatus::Draft
        }
    }

    /// Status after a manual edit replacing the content with `new_content`.
    pub fn after_edit(self, new_content: &str) -> Self {
        transition(self, WriteOrigin::Edit, new_content)
    }

    /// Status after generated narrative replaces the content.
    pub fn after_ingest(self, generated: &str) -> Self {
        transition(self, WriteOrigin::Ingest, generated)
    }
}

/// The single transition function behind both entry points.
fn transition(prev: SectionStatus, origin: WriteOrigin, content: &str) -> SectionStatus {
    match origin {
        // Generated content is authoritative regardless of prior status or content.
        WriteOrigin::Ingest => SectionStatus::Done,
        WriteOrigin::Edit => match (prev, content.trim().is_empty()) {
            (_, true) => SectionStatus::Empty,
            (SectionStatus::Done, false) => SectionStatus::Draft,
            (_, false) => SectionStatus::Draft,
        },
    }
}
