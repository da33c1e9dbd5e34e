//! External data ingestion.
//!
//! Artifacts arrive as JSON blobs produced by the external computation service, either
//! from a user file selection or from a preloaded bundle keyed by study identifier.
//! There is no version field; classification is structural: an object carrying both
//! `results` and `input` is a power-analysis result, an object carrying `curve_t` is a
//! concentration-curve result, anything else is unrecognised.
//!
//! Classification and narrative rendering are pure; applying an artifact to the open
//! study is the editor's job, so a failure here can never leave partial mutations.

use crate::error::ImportError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Power-analysis inputs echoed back by the computation service.
#[derive(Clone, Debug, Deserialize)]
pub struct PowerAnalysisInput {
    pub design: String,
    /// Intra-subject coefficient of variation, as a fraction (0-1).
    #[serde(rename = "CV")]
    pub cv: f64,
    /// Target statistical power, as a fraction (0-1).
    pub targetpower: f64,
}

/// Sample-size figures computed by the service.
#[derive(Clone, Debug, Deserialize)]
pub struct PowerAnalysisFigures {
    pub base_sample_size: u32,
    /// Anticipated dropout rate, as a fraction (0-1).
    pub dropout_rate_used: f64,
    pub recommended_sample_size_with_dropout: u32,
    /// Power achieved with the recommended sample size, as a fraction (0-1).
    pub achieved_power: f64,
}

/// Externally computed sample-size estimation for the statistics section.
#[derive(Clone, Debug, Deserialize)]
pub struct PowerAnalysisResult {
    pub input: PowerAnalysisInput,
    pub results: PowerAnalysisFigures,
}

/// Externally computed pharmacokinetic curve data for the chart panel.
///
/// Three index-aligned pairs: the fitted model curve, optional reference observations
/// and an optional sampling schedule. Consumed read-only.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct CurveResult {
    pub curve_t: Vec<f64>,
    #[serde(rename = "curve_Cp")]
    pub curve_cp: Vec<f64>,
    #[serde(rename = "curve_ref_X", default)]
    pub curve_ref_x: Option<Vec<f64>>,
    #[serde(rename = "curve_ref_Y", default)]
    pub curve_ref_y: Option<Vec<f64>>,
    #[serde(default)]
    pub timepoints_h: Option<Vec<f64>>,
    #[serde(rename = "expected_Cp", default)]
    pub expected_cp: Option<Vec<f64>>,
}

/// A successfully classified artifact.
#[derive(Clone, Debug)]
pub enum ImportedResult {
    PowerAnalysis(PowerAnalysisResult),
    Curve(CurveResult),
}

/// Parse and classify a raw JSON artifact.
///
/// # Errors
///
/// Returns [`ImportError::Parse`] on malformed JSON, [`ImportError::UnrecognisedShape`]
/// when the object matches neither schema, and [`ImportError::SchemaMismatch`] (with the
/// path to the failing field) when a classified object fails typed deserialisation.
pub fn classify(raw: &str) -> Result<ImportedResult, ImportError> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(ImportError::Parse)?;

    let Some(object) = value.as_object() else {
        return Err(ImportError::UnrecognisedShape);
    };

    if object.contains_key("results") && object.contains_key("input") {
        typed::<PowerAnalysisResult>(value).map(ImportedResult::PowerAnalysis)
    } else if object.contains_key("curve_t") {
        typed::<CurveResult>(value).map(ImportedResult::Curve)
    } else {
        Err(ImportError::UnrecognisedShape)
    }
}

fn typed<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ImportError> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        let path = if path.is_empty() {
            "<root>".to_string()
        } else {
            path
        };
        ImportError::SchemaMismatch {
            path,
            source: err.into_inner(),
        }
    })
}

/// Render the deterministic statistics narrative for a power-analysis result.
///
/// Percentages carry at most one decimal with a trailing `.0` dropped (0.15 renders as
/// `15%`); sample sizes render as plain integers.
pub fn power_narrative(result: &PowerAnalysisResult) -> String {
    format!(
        "Sample size estimation was performed for a {design} design, assuming an \
         intra-subject CV of {cv} and a target power of {target}.\n\n\
         The base sample size is {base} subjects. Allowing for an anticipated dropout \
         rate of {dropout}, {recommended} subjects are to be enrolled, giving an \
         achieved power of {achieved}.",
        design = result.input.design,
        cv = percent(result.input.cv),
        target = percent(result.input.targetpower),
        base = result.results.base_sample_size,
        dropout = percent(result.results.dropout_rate_used),
        recommended = result.results.recommended_sample_size_with_dropout,
        achieved = percent(result.results.achieved_power),
    )
}

/// Format a fraction as a percentage with at most one decimal place.
fn percent(fraction: f64) -> String {
    let value = (fraction * 1000.0).round() / 10.0;
    if value.fract() == 0.0 {
        format!("{}%", value as i64)
    } else {
        format!("{value:.1}%")
    }
}

/// Preloaded artifacts keyed by study identifier, for auto-load when a study opens.
#[derive(Clone, Debug, Default)]
pub struct ArtifactBundle {
    artifacts: BTreeMap<String, Vec<String>>,
}

impl ArtifactBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a raw JSON artifact for a study. Order of registration is preserved.
    pub fn push(&mut self, study_id: impl Into<String>, raw_json: impl Into<String>) {
        self.artifacts
            .entry(study_id.into())
            .or_default()
            .push(raw_json.into());
    }

    /// Artifacts registered for a study, in registration order.
    pub fn artifacts_for(&self, study_id: &str) -> &[String] {
        self.artifacts
            .get(study_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POWER_JSON: &str = r#"{
        "input": {"design": "2x2 crossover", "CV": 0.25, "targetpower": 0.8},
        "results": {
            "base_sample_size": 20,
            "dropout_rate_used": 0.15,
            "recommended_sample_size_with_dropout": 24,
            "achieved_power": 0.82
        }
    }"#;

    #[test]
    fn classifies_power_analysis_by_results_and_input_keys() {
        let result = classify(POWER_JSON).expect("classify");
        match result {
            ImportedResult::PowerAnalysis(p) => {
                assert_eq!(p.input.design, "2x2 crossover");
                assert_eq!(p.results.base_sample_size, 20);
            }
            other => panic!("expected power analysis, got {other:?}"),
        }
    }

    #[test]
    fn classifies_curve_by_curve_t_key() {
        let raw = r#"{"curve_t": [0.0, 1.0, 2.0], "curve_Cp": [0.0, 5.0, 3.0]}"#;
        let result = classify(raw).expect("classify");
        match result {
            ImportedResult::Curve(c) => {
                assert_eq!(c.curve_t, vec![0.0, 1.0, 2.0]);
                assert_eq!(c.curve_cp, vec![0.0, 5.0, 3.0]);
                assert!(c.curve_ref_x.is_none());
                assert!(c.timepoints_h.is_none());
            }
            other => panic!("expected curve, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = classify("{not json").unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
    }

    #[test]
    fn unmatched_shape_is_a_classification_miss() {
        let err = classify(r#"{"something": "else"}"#).unwrap_err();
        assert!(matches!(err, ImportError::UnrecognisedShape));

        let err = classify("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ImportError::UnrecognisedShape));
    }

    #[test]
    fn type_mismatch_carries_field_path() {
        let raw = r#"{"curve_t": ["a", "b"], "curve_Cp": [1.0, 2.0]}"#;
        let err = classify(raw).unwrap_err();
        match err {
            ImportError::SchemaMismatch { path, .. } => {
                assert!(path.contains("curve_t"), "path was {path}");
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn narrative_substitutes_rounded_figures() {
        let ImportedResult::PowerAnalysis(power) = classify(POWER_JSON).unwrap() else {
            panic!("expected power analysis");
        };
        let narrative = power_narrative(&power);
        assert!(narrative.contains("2x2 crossover"));
        assert!(narrative.contains("25%"));
        assert!(narrative.contains("80%"));
        assert!(narrative.contains("20"));
        assert!(narrative.contains("15%"));
        assert!(narrative.contains("24"));
        assert!(narrative.contains("82"));
    }

    #[test]
    fn percent_drops_trailing_zero_decimal() {
        assert_eq!(percent(0.15), "15%");
        assert_eq!(percent(0.825), "82.5%");
        assert_eq!(percent(0.8), "80%");
        assert_eq!(percent(0.0), "0%");
        assert_eq!(percent(1.0), "100%");
    }

    #[test]
    fn bundle_preserves_registration_order_per_study() {
        let mut bundle = ArtifactBundle::new();
        bundle.push("paracetamol", "{\"a\": 1}");
        bundle.push("paracetamol", "{\"b\": 2}");
        bundle.push("other", "{\"c\": 3}");

        assert_eq!(
            bundle.artifacts_for("paracetamol"),
            &["{\"a\": 1}".to_string(), "{\"b\": 2}".to_string()]
        );
        assert!(bundle.artifacts_for("missing").is_empty());
    }
}
