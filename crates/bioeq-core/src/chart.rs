//! Chart projection.
//!
//! Turns an imported curve result into a single time-aligned series the rendering
//! surface can draw directly: one row per index, three independently-nullable channels
//! (fitted model, reference observations, sampling schedule). No resampling or
//! interpolation; values are rounded for display stability only, and the imported
//! result itself is never touched.

use crate::import::CurveResult;
use serde::Serialize;

/// Decimal places kept in projected display values.
const DISPLAY_DECIMALS: i32 = 2;

/// One row of the projected series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ChartPoint {
    pub time: f64,
    pub model_cp: Option<f64>,
    pub reference_y: Option<f64>,
    pub scheduled_cp: Option<f64>,
}

/// Time-aligned, independently-nullable display series.
///
/// Recomputed from scratch on every import; never persisted.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when there is nothing to draw and the consuming view should render its
    /// explicit "awaiting data" state instead of an empty chart.
    pub fn awaiting_data(&self) -> bool {
        self.points.is_empty()
    }
}

/// Project a curve result into a display series.
///
/// Rows are built by index across the three pairs; a row's time comes from the first
/// axis that has a value at that index (model, then reference, then schedule). Channel
/// values beyond their own axis length are dropped rather than guessed.
pub fn project(curve: &CurveResult) -> ChartSeries {
    let ref_x = curve.curve_ref_x.as_deref().unwrap_or_default();
    let ref_y = curve.curve_ref_y.as_deref().unwrap_or_default();
    let schedule_t = curve.timepoints_h.as_deref().unwrap_or_default();
    let schedule_cp = curve.expected_cp.as_deref().unwrap_or_default();

    let len = curve
        .curve_t
        .len()
        .max(ref_x.len())
        .max(schedule_t.len());

    let mut points = Vec::with_capacity(len);
    for i in 0..len {
        let time = curve
            .curve_t
            .get(i)
            .or_else(|| ref_x.get(i))
            .or_else(|| schedule_t.get(i));
        let Some(&time) = time else {
            continue;
        };

        points.push(ChartPoint {
            time: round(time),
            model_cp: channel_value(&curve.curve_t, &curve.curve_cp, i),
            reference_y: channel_value(ref_x, ref_y, i),
            scheduled_cp: channel_value(schedule_t, schedule_cp, i),
        });
    }

    ChartSeries { points }
}

/// Value of one paired channel at an index: present only while both halves cover it.
fn channel_value(axis: &[f64], values: &[f64], i: usize) -> Option<f64> {
    if i < axis.len() {
        values.get(i).copied().map(round)
    } else {
        None
    }
}

fn round(value: f64) -> f64 {
    let factor = 10f64.powi(DISPLAY_DECIMALS);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_only_curve_projects_with_null_channels() {
        let curve = CurveResult {
            curve_t: vec![0.0, 1.0, 2.0],
            curve_cp: vec![0.0, 5.0, 3.0],
            ..CurveResult::default()
        };
        let series = project(&curve);

        assert_eq!(series.len(), 3);
        for (point, expected) in series.points().iter().zip([0.0, 5.0, 3.0]) {
            assert_eq!(point.model_cp, Some(expected));
            assert_eq!(point.reference_y, None);
            assert_eq!(point.scheduled_cp, None);
        }
    }

    #[test]
    fn values_are_rounded_to_two_decimals() {
        let curve = CurveResult {
            curve_t: vec![0.333_333, 1.005],
            curve_cp: vec![4.996, 2.0049],
            ..CurveResult::default()
        };
        let series = project(&curve);

        assert_eq!(series.points()[0].time, 0.33);
        assert_eq!(series.points()[0].model_cp, Some(5.0));
        assert_eq!(series.points()[1].model_cp, Some(2.0));
    }

    #[test]
    fn reference_axis_extends_the_series() {
        let curve = CurveResult {
            curve_t: vec![0.0, 1.0],
            curve_cp: vec![1.0, 2.0],
            curve_ref_x: Some(vec![0.0, 1.0, 2.0, 3.0]),
            curve_ref_y: Some(vec![1.1, 2.1, 3.1, 4.1]),
            ..CurveResult::default()
        };
        let series = project(&curve);

        assert_eq!(series.len(), 4);
        // Beyond the model axis the model channel is null and time comes from the
        // reference axis.
        assert_eq!(series.points()[2].time, 2.0);
        assert_eq!(series.points()[2].model_cp, None);
        assert_eq!(series.points()[2].reference_y, Some(3.1));
    }

    #[test]
    fn schedule_channel_is_populated_from_its_own_pair() {
        let curve = CurveResult {
            curve_t: vec![0.0, 0.5, 1.0, 1.5],
            curve_cp: vec![0.0, 3.0, 5.0, 4.0],
            timepoints_h: Some(vec![0.0, 1.0]),
            expected_cp: Some(vec![0.0, 4.8]),
            ..CurveResult::default()
        };
        let series = project(&curve);

        assert_eq!(series.points()[1].scheduled_cp, Some(4.8));
        assert_eq!(series.points()[2].scheduled_cp, None);
    }

    #[test]
    fn empty_curve_projects_to_awaiting_data() {
        let series = project(&CurveResult::default());
        assert!(series.awaiting_data());
        assert_eq!(series.len(), 0);
    }

    #[test]
    fn projection_does_not_mutate_the_input() {
        let curve = CurveResult {
            curve_t: vec![0.123_456],
            curve_cp: vec![9.876_543],
            ..CurveResult::default()
        };
        let before = curve.clone();
        let _ = project(&curve);
        assert_eq!(curve, before);
    }
}
