//! Study templates and the template registry.
//!
//! A template is the static description of one study's protocol scaffold: ordered
//! section seeds plus the two role assignments the importer and exporter need (which
//! section receives generated statistics narrative, and which section is the visual
//! chart panel). Supplying the mapping at registry-creation time keeps the section state
//! machine study-agnostic.
//!
//! Templates can be declared in YAML. Parsing is strict: unknown fields are rejected and
//! schema mismatches carry the path to the failing field.

use crate::error::TemplateError;
use crate::section::{Section, SectionRegistry};
use crate::status::SectionStatus;
use bioeq_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Initial state of one section within a study template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionSeed {
    pub id: NonEmptyText,
    pub label: NonEmptyText,
    #[serde(default)]
    pub content: String,
    /// Seed status; defaults to whatever the content implies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SectionStatus>,
}

impl SectionSeed {
    /// Resolves the effective seed status.
    ///
    /// A blank-content seed is always `Empty`, whatever the template declared, so the
    /// `Empty` iff blank invariant holds from the first render.
    fn effective_status(&self) -> SectionStatus {
        match (self.status, SectionStatus::for_content(&self.content)) {
            (_, SectionStatus::Empty) => SectionStatus::Empty,
            (Some(declared), _) => declared,
            (None, implied) => implied,
        }
    }
}

/// Static description of one study's protocol scaffold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyTemplate {
    pub id: NonEmptyText,
    pub title: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    pub sections: Vec<SectionSeed>,
    /// Section that receives generated power-analysis narrative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics_section: Option<NonEmptyText>,
    /// Visual chart panel; excluded from the exported document body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_section: Option<NonEmptyText>,
}

impl StudyTemplate {
    /// Seeds a fresh section registry for this study.
    pub fn seed_registry(&self) -> SectionRegistry {
        let sections = self
            .sections
            .iter()
            .map(|seed| Section {
                id: seed.id.clone(),
                label: seed.label.clone(),
                content: seed.content.clone(),
                status: seed.effective_status(),
            })
            .collect();
        SectionRegistry::new(sections)
    }

    fn validate(&self) -> Result<(), TemplateError> {
        if self.sections.is_empty() {
            return Err(TemplateError::NoSections {
                study: self.id.to_string(),
            });
        }

        let mut seen = HashSet::new();
        for seed in &self.sections {
            if !seen.insert(seed.id.as_str()) {
                return Err(TemplateError::DuplicateSectionId {
                    study: self.id.to_string(),
                    id: seed.id.to_string(),
                });
            }
        }

        for (role, id) in [
            ("statistics", &self.statistics_section),
            ("chart", &self.chart_section),
        ] {
            if let Some(id) = id {
                if !seen.contains(id.as_str()) {
                    return Err(TemplateError::UnknownRoleSection {
                        study: self.id.to_string(),
                        role,
                        id: id.to_string(),
                    });
                }
            }
        }

        if let (Some(stats), Some(chart)) = (&self.statistics_section, &self.chart_section) {
            if stats == chart {
                return Err(TemplateError::OverlappingRoles {
                    study: self.id.to_string(),
                    id: stats.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Ordered, id-keyed collection of study templates.
#[derive(Clone, Debug)]
pub struct TemplateRegistry {
    templates: Vec<StudyTemplate>,
}

impl TemplateRegistry {
    /// Creates a registry after validating every template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] on an invalid template or a duplicate study id.
    pub fn new(templates: Vec<StudyTemplate>) -> Result<Self, TemplateError> {
        let mut seen = HashSet::new();
        for template in &templates {
            template.validate()?;
            if !seen.insert(template.id.as_str().to_string()) {
                return Err(TemplateError::DuplicateStudyId {
                    study: template.id.to_string(),
                });
            }
        }
        Ok(Self { templates })
    }

    /// The built-in study catalogue.
    pub fn builtin() -> Self {
        Self::new(vec![paracetamol_template()]).expect("built-in templates are valid")
    }

    /// Parses templates from a YAML document (a sequence of studies).
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Yaml`] with the path to the failing field when the
    /// document does not match the template schema, or any validation error from
    /// [`TemplateRegistry::new`].
    pub fn from_yaml(yaml_text: &str) -> Result<Self, TemplateError> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        match serde_path_to_error::deserialize::<_, Vec<StudyTemplate>>(deserializer) {
            Ok(templates) => Self::new(templates),
            Err(err) => {
                let path = err.path().to_string();
                let path = if path.is_empty() {
                    "<root>".to_string()
                } else {
                    path
                };
                Err(TemplateError::Yaml {
                    path,
                    source: err.into_inner(),
                })
            }
        }
    }

    /// Looks up a study template by id.
    pub fn get(&self, study_id: &str) -> Option<&StudyTemplate> {
        self.templates.iter().find(|t| t.id.as_str() == study_id)
    }

    /// All studies, in declaration order (for a study picker).
    pub fn studies(&self) -> impl Iterator<Item = &StudyTemplate> {
        self.templates.iter()
    }
}

fn text(value: &str) -> NonEmptyText {
    NonEmptyText::new(value).expect("built-in template text is non-empty")
}

/// The paracetamol suspension bioequivalence study.
fn paracetamol_template() -> StudyTemplate {
    StudyTemplate {
        id: text("paracetamol"),
        title: text("Bioequivalence of a New Pediatric Paracetamol"),
        drug: Some("Paracetamol (suspension 24 mg/mL)".to_string()),
        sponsor: Some("Haleon".to_string()),
        phase: Some("Phase I, Bioequivalence".to_string()),
        sections: vec![
            SectionSeed {
                id: text("1.1.Synopsis"),
                label: text("1.1. Synopsis"),
                content: "Title: Bioequivalence of a new paediatric oral paracetamol \
                          suspension compared with the commercial product in healthy \
                          adults.\n\nRationale: A new oral paracetamol formulation has \
                          been developed with the same amount of paracetamol (24 mg/mL) \
                          as the commercial product but with less maltitol and sorbitol."
                    .to_string(),
                status: Some(SectionStatus::Done),
            },
            SectionSeed {
                id: text("3.Objectives"),
                label: text("3. Objectives & Endpoints"),
                content: "The primary objective is to establish bioequivalence of the \
                          new paediatric formulation (test product) against the \
                          commercial product (reference product).\n\nThe primary \
                          endpoints were AUC0-tlast, Cmax and tmax."
                    .to_string(),
                status: Some(SectionStatus::Draft),
            },
            SectionSeed {
                id: text("4.Design"),
                label: text("4. Study Design"),
                content: "This is an open-label phase I study in which healthy adult \
                          volunteers received a single 42 mL dose (1 g paracetamol) of \
                          the test or reference product.\n\nParticipants received both \
                          products in randomised order with a 72-hour washout period."
                    .to_string(),
                status: Some(SectionStatus::Done),
            },
            SectionSeed {
                id: text("5.Stats"),
                label: text("5. Statistics & Sample Size"),
                content: String::new(),
                status: None,
            },
            SectionSeed {
                id: text("6.Charts"),
                label: text("6. PK Charts"),
                content: "35 participants were randomised. Bioequivalence was concluded \
                          if the 90% CIs for the ratio of the primary PK parameter means \
                          fell within 80.00% to 125.00%."
                    .to_string(),
                status: Some(SectionStatus::Draft),
            },
        ],
        statistics_section: Some(text("5.Stats")),
        chart_section: Some(text("6.Charts")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalogue_contains_paracetamol() {
        let registry = TemplateRegistry::builtin();
        let template = registry.get("paracetamol").expect("study present");
        assert_eq!(template.sections.len(), 5);
        assert_eq!(
            template.statistics_section.as_ref().unwrap().as_str(),
            "5.Stats"
        );
        assert_eq!(template.chart_section.as_ref().unwrap().as_str(), "6.Charts");
    }

    #[test]
    fn seeded_registry_matches_template_order_and_status() {
        let registry = TemplateRegistry::builtin();
        let sections = registry.get("paracetamol").unwrap().seed_registry();
        let ids: Vec<&str> = sections.sections().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["1.1.Synopsis", "3.Objectives", "4.Design", "5.Stats", "6.Charts"]
        );
        assert_eq!(
            sections.get("1.1.Synopsis").unwrap().status,
            SectionStatus::Done
        );
        assert_eq!(sections.get("5.Stats").unwrap().status, SectionStatus::Empty);
    }

    #[test]
    fn blank_seed_declared_done_is_normalised_to_empty() {
        let seed = SectionSeed {
            id: text("x"),
            label: text("X"),
            content: "  ".to_string(),
            status: Some(SectionStatus::Done),
        };
        assert_eq!(seed.effective_status(), SectionStatus::Empty);
    }

    #[test]
    fn rejects_duplicate_section_ids() {
        let mut template = paracetamol_template();
        template.sections[1].id = text("1.1.Synopsis");
        let err = TemplateRegistry::new(vec![template]).unwrap_err();
        assert!(matches!(err, TemplateError::DuplicateSectionId { .. }));
    }

    #[test]
    fn rejects_dangling_role_reference() {
        let mut template = paracetamol_template();
        template.chart_section = Some(text("7.Missing"));
        let err = TemplateRegistry::new(vec![template]).unwrap_err();
        match err {
            TemplateError::UnknownRoleSection { role, id, .. } => {
                assert_eq!(role, "chart");
                assert_eq!(id, "7.Missing");
            }
            other => panic!("expected UnknownRoleSection, got {other:?}"),
        }
    }

    #[test]
    fn rejects_overlapping_roles() {
        let mut template = paracetamol_template();
        template.chart_section = Some(text("5.Stats"));
        let err = TemplateRegistry::new(vec![template]).unwrap_err();
        assert!(matches!(err, TemplateError::OverlappingRoles { .. }));
    }

    #[test]
    fn parses_templates_from_yaml() {
        let yaml = r#"
- id: amoxicillin
  title: Bioequivalence of a Generic Amoxicillin Capsule
  sponsor: Example Pharma
  sections:
    - id: "1.Synopsis"
      label: "1. Synopsis"
      content: "Seeded."
    - id: "5.Stats"
      label: "5. Statistics"
  statistics_section: "5.Stats"
"#;
        let registry = TemplateRegistry::from_yaml(yaml).expect("parse");
        let template = registry.get("amoxicillin").expect("study present");
        assert_eq!(template.sections.len(), 2);
        let sections = template.seed_registry();
        assert_eq!(
            sections.get("1.Synopsis").unwrap().status,
            SectionStatus::Draft
        );
        assert_eq!(sections.get("5.Stats").unwrap().status, SectionStatus::Empty);
    }

    #[test]
    fn yaml_error_carries_field_path() {
        let yaml = r#"
- id: amoxicillin
  title: Example
  sections:
    - id: "1.Synopsis"
      label: "1. Synopsis"
      unexpected: true
"#;
        let err = TemplateRegistry::from_yaml(yaml).unwrap_err();
        match err {
            TemplateError::Yaml { path, .. } => {
                assert!(path.contains("sections"), "path was {path}");
            }
            other => panic!("expected Yaml error, got {other:?}"),
        }
    }
}
