//! The study editor aggregate.
//!
//! One editor instance per open study. It exclusively owns the section registry, the
//! last imported curve and its projection, and the export in-flight flag; every
//! mutation happens synchronously in response to one user or import event, so no
//! locking is needed. The editor is discarded when the study closes; nothing here
//! persists.

use crate::capture::{CapturedImage, ChartCapture};
use crate::chart::{project, ChartSeries};
use crate::error::{ExportError, ImportError};
use crate::export::{assemble_document, export_filename, ExportArtifact, TitleBlock};
use crate::import::{classify, power_narrative, ArtifactBundle, CurveResult, ImportedResult};
use crate::section::{Section, SectionRegistry};
use crate::template::StudyTemplate;
use bioeq_types::NonEmptyText;
use chrono::Utc;

/// What an accepted import turned out to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportKind {
    PowerAnalysis,
    Curve,
}

/// Editor state for one open study.
#[derive(Clone, Debug)]
pub struct StudyEditor {
    study_id: NonEmptyText,
    title: NonEmptyText,
    drug: Option<String>,
    sponsor: Option<String>,
    phase: Option<String>,
    statistics_section: Option<NonEmptyText>,
    chart_section: Option<NonEmptyText>,
    registry: SectionRegistry,
    curve: Option<CurveResult>,
    series: ChartSeries,
    exporting: bool,
}

impl StudyEditor {
    /// Opens a study, seeding the section registry from its template.
    pub fn open(template: &StudyTemplate) -> Self {
        Self {
            study_id: template.id.clone(),
            title: template.title.clone(),
            drug: template.drug.clone(),
            sponsor: template.sponsor.clone(),
            phase: template.phase.clone(),
            statistics_section: template.statistics_section.clone(),
            chart_section: template.chart_section.clone(),
            registry: template.seed_registry(),
            curve: None,
            series: ChartSeries::default(),
            exporting: false,
        }
    }

    /// Opens a study and auto-imports any artifacts the bundle holds for it.
    ///
    /// Failed artifacts are recovered locally (logged and skipped) exactly like a
    /// failed manual import; the study still opens.
    pub fn open_with_bundle(template: &StudyTemplate, bundle: &ArtifactBundle) -> Self {
        let mut editor = Self::open(template);
        for raw in bundle.artifacts_for(editor.study_id.as_str()) {
            if let Err(error) = editor.import_json(raw) {
                tracing::warn!(
                    study = editor.study_id.as_str(),
                    %error,
                    "skipping preloaded artifact"
                );
            }
        }
        editor
    }

    pub fn study_id(&self) -> &str {
        self.study_id.as_str()
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// All sections, in template order.
    pub fn sections(&self) -> &[Section] {
        self.registry.sections()
    }

    /// Looks up one section by id.
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.registry.get(id)
    }

    /// The projected chart series (empty until a curve artifact arrives).
    pub fn chart_series(&self) -> &ChartSeries {
        &self.series
    }

    /// The last imported curve result, exactly as received.
    pub fn imported_curve(&self) -> Option<&CurveResult> {
        self.curve.as_ref()
    }

    /// The chart panel's section id, if this study has one.
    pub fn chart_section(&self) -> Option<&str> {
        self.chart_section.as_ref().map(NonEmptyText::as_str)
    }

    /// Replaces a section's content via the manual-edit path.
    pub fn edit_section(&mut self, id: &str, text: impl Into<String>) {
        self.registry.set_content(id, text);
    }

    /// Confirms a section as complete.
    pub fn approve_section(&mut self, id: &str) {
        self.registry.mark_done(id);
    }

    /// Ingests one raw JSON artifact.
    ///
    /// A power-analysis result renders the statistics narrative and applies it to the
    /// statistics section (pre-marked done); a curve result replaces the stored curve
    /// and its projection without touching any section's status.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] on malformed or unrecognised input; in that case no
    /// editor state changes.
    pub fn import_json(&mut self, raw: &str) -> Result<ImportKind, ImportError> {
        match classify(raw)? {
            ImportedResult::PowerAnalysis(power) => {
                let narrative = power_narrative(&power);
                match &self.statistics_section {
                    Some(id) => self.registry.apply_generated(id.as_str(), narrative),
                    None => tracing::warn!(
                        study = self.study_id.as_str(),
                        "power analysis imported but the study has no statistics section"
                    ),
                }
                Ok(ImportKind::PowerAnalysis)
            }
            ImportedResult::Curve(curve) => {
                self.series = project(&curve);
                self.curve = Some(curve);
                Ok(ImportKind::Curve)
            }
        }
    }

    /// True when the export affordance should be offered: every section done and no
    /// export already in flight.
    pub fn export_available(&self) -> bool {
        self.registry.all_done() && !self.exporting
    }

    /// True while a begun export has not yet completed.
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// First phase of an export: checks the gate and takes the in-flight flag.
    ///
    /// Returns `false` (and does nothing) when the gate is closed or an export is
    /// already in flight, so a second trigger has no additional effect.
    pub fn begin_export(&mut self) -> bool {
        if !self.export_available() {
            return false;
        }
        self.exporting = true;
        true
    }

    /// Second phase: assembles and serialises the document, then clears the flag.
    ///
    /// The flag is cleared on failure too, so the user may retry; section state is
    /// never touched by this path.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NotInFlight`] when called without a successful
    /// [`Self::begin_export`], or [`ExportError::Serialisation`] when the document
    /// cannot be encoded.
    pub fn complete_export(
        &mut self,
        image: Option<CapturedImage>,
    ) -> Result<ExportArtifact, ExportError> {
        if !self.exporting {
            return Err(ExportError::NotInFlight);
        }

        let title_block = TitleBlock {
            title: &self.title,
            drug: self.drug.as_deref(),
            sponsor: self.sponsor.as_deref(),
            phase: self.phase.as_deref(),
            generated_on: Utc::now(),
        };
        let doc = assemble_document(
            &title_block,
            self.registry.sections(),
            self.chart_section.as_ref().map(NonEmptyText::as_str),
            image,
        );

        let result = bioeq_docx::render_docx(&doc);
        self.exporting = false;

        let bytes = result?;
        Ok(ExportArtifact {
            filename: export_filename(self.study_id.as_str()),
            bytes,
        })
    }

    /// Drives a whole export: gate, capture, assemble, serialise.
    ///
    /// Returns `Ok(None)` when the export affordance is unavailable (a gate miss is a
    /// no-op, not an error). Capture failure is non-fatal: it is logged and the
    /// document is produced without the figure.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] only for serialisation failures.
    pub fn export_with(
        &mut self,
        capture: &dyn ChartCapture,
    ) -> Result<Option<ExportArtifact>, ExportError> {
        if !self.begin_export() {
            return Ok(None);
        }

        let image = if self.chart_section.is_some() && !self.series.awaiting_data() {
            match capture.capture(&self.series) {
                Ok(captured) => Some(captured),
                Err(error) => {
                    tracing::warn!(
                        study = self.study_id.as_str(),
                        %error,
                        "chart capture failed; exporting without the figure"
                    );
                    None
                }
            }
        } else {
            None
        };

        self.complete_export(image).map(Some)
    }
}
