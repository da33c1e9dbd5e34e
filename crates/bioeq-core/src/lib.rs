//! # BioEQ Core
//!
//! Core business logic for the bioequivalence protocol editor.
//!
//! This crate contains the editor's pure domain operations:
//! - Section registry and the `empty -> draft -> done` status machine
//! - Study templates (built-in catalogue plus strict YAML loading)
//! - External artifact ingestion (power-analysis and concentration-curve JSON)
//! - Chart projection and the capture capability
//! - Export gating and synopsis assembly
//!
//! **No presentation concerns**: rendering, routing and file delivery belong to the
//! embedding UI. Document serialisation lives in the `bioeq-docx` boundary crate.

pub mod capture;
pub mod chart;
pub mod editor;
mod error;
pub mod export;
pub mod import;
pub mod section;
pub mod status;
pub mod template;

pub use capture::{CapturedImage, ChartCapture, FailingCapture, FixedCapture, SeriesRasteriser};
pub use chart::{project, ChartPoint, ChartSeries};
pub use editor::{ImportKind, StudyEditor};
pub use error::{CaptureError, ExportError, ImportError, TemplateError};
pub use export::ExportArtifact;
pub use import::{classify, power_narrative, ArtifactBundle, CurveResult, ImportedResult};
pub use import::{PowerAnalysisFigures, PowerAnalysisInput, PowerAnalysisResult};
pub use section::{Section, SectionRegistry};
pub use status::SectionStatus;
pub use template::{SectionSeed, StudyTemplate, TemplateRegistry};
