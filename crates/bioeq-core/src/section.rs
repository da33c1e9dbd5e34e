//! Section registry: the ordered narrative sections of one open study.
//!
//! The registry is the single owner of section state. Identity is the stable section id;
//! insertion order is significant and drives the document body order at export time.

use crate::status::SectionStatus;
use bioeq_types::NonEmptyText;
use serde::Serialize;

/// One named block of protocol narrative with independent completion status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Stable, ordering-significant identifier (e.g. `5.Stats`).
    pub id: NonEmptyText,
    /// Display title.
    pub label: NonEmptyText,
    /// Free narrative text.
    pub content: String,
    /// Completion status; kept consistent with `content` by the transition rules.
    pub status: SectionStatus,
}

/// Insertion-ordered collection of the open study's sections.
///
/// Mutations take effect immediately; dependent queries (`all_done`, section lookup for
/// the chart panel) observe them on the next call.
#[derive(Clone, Debug, Default)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl SectionRegistry {
    /// Creates a registry from already-seeded sections.
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// All sections, in insertion order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Looks up a section by id.
    pub fn get(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id.as_str() == id)
    }

    /// Replaces a section's content via the manual-edit path.
    ///
    /// Unknown ids are a silent no-op towards the caller; the miss is only logged.
    pub fn set_content(&mut self, id: &str, text: impl Into<String>) {
        let Some(section) = self.get_mut(id) else {
            tracing::warn!(section = id, "edit targeted an unknown section; ignored");
            return;
        };
        let text = text.into();
        section.status = section.status.after_edit(&text);
        section.content = text;
    }

    /// Forces a section to `Done` regardless of content. Idempotent.
    pub fn mark_done(&mut self, id: &str) {
        let Some(section) = self.get_mut(id) else {
            tracing::warn!(section = id, "mark-done targeted an unknown section; ignored");
            return;
        };
        section.status = SectionStatus::Done;
    }

    /// Replaces a section's content via the ingest path (generated narrative).
    ///
    /// Generated content is authoritative: the section always lands on `Done`.
    pub fn apply_generated(&mut self, id: &str, text: impl Into<String>) {
        let Some(section) = self.get_mut(id) else {
            tracing::warn!(
                section = id,
                "generated narrative targeted an unknown section; ignored"
            );
            return;
        };
        let text = text.into();
        section.status = section.status.after_ingest(&text);
        section.content = text;
    }

    /// The export gate: true iff every section is `Done`.
    pub fn all_done(&self) -> bool {
        self.sections
            .iter()
            .all(|s| s.status == SectionStatus::Done)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id.as_str() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SectionRegistry {
        SectionRegistry::new(vec![
            Section {
                id: NonEmptyText::new("1.1.Synopsis").unwrap(),
                label: NonEmptyText::new("1.1. Synopsis").unwrap(),
                content: "Seeded synopsis text.".to_string(),
                status: SectionStatus::Done,
            },
            Section {
                id: NonEmptyText::new("5.Stats").unwrap(),
                label: NonEmptyText::new("5. Statistics & Sample Size").unwrap(),
                content: String::new(),
                status: SectionStatus::Empty,
            },
        ])
    }

    #[test]
    fn preserves_insertion_order() {
        let reg = registry();
        let ids: Vec<&str> = reg.sections().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1.1.Synopsis", "5.Stats"]);
    }

    #[test]
    fn set_content_updates_status_through_edit_path() {
        let mut reg = registry();
        reg.set_content("5.Stats", "Draft wording.");
        let section = reg.get("5.Stats").unwrap();
        assert_eq!(section.content, "Draft wording.");
        assert_eq!(section.status, SectionStatus::Draft);
    }

    #[test]
    fn editing_a_done_section_demotes_it() {
        let mut reg = registry();
        reg.set_content("1.1.Synopsis", "Rewritten.");
        assert_eq!(
            reg.get("1.1.Synopsis").unwrap().status,
            SectionStatus::Draft
        );
    }

    #[test]
    fn blanking_content_yields_empty() {
        let mut reg = registry();
        reg.set_content("1.1.Synopsis", "   ");
        assert_eq!(reg.get("1.1.Synopsis").unwrap().status, SectionStatus::Empty);
    }

    #[test]
    fn set_content_on_unknown_id_is_a_no_op() {
        let mut reg = registry();
        let before = reg.sections().to_vec();
        reg.set_content("9.Missing", "text");
        assert_eq!(reg.sections(), before.as_slice());
    }

    #[test]
    fn mark_done_is_idempotent_and_unconditional() {
        let mut reg = registry();
        reg.mark_done("5.Stats");
        reg.mark_done("5.Stats");
        let section = reg.get("5.Stats").unwrap();
        assert_eq!(section.status, SectionStatus::Done);
        assert!(section.content.is_empty());
    }

    #[test]
    fn apply_generated_forces_done() {
        let mut reg = registry();
        reg.apply_generated("5.Stats", "Generated narrative.");
        let section = reg.get("5.Stats").unwrap();
        assert_eq!(section.status, SectionStatus::Done);
        assert_eq!(section.content, "Generated narrative.");
    }

    #[test]
    fn all_done_flips_with_any_section() {
        let mut reg = registry();
        assert!(!reg.all_done());
        reg.mark_done("5.Stats");
        assert!(reg.all_done());
        reg.set_content("1.1.Synopsis", "Reopened.");
        assert!(!reg.all_done());
    }
}
