//! Chart capture capability.
//!
//! The exporter needs "an image of the current chart render" without knowing anything
//! about rendering surfaces, so the capability is a trait. A UI embeds its own
//! implementation over whatever surface it draws on; [`SeriesRasteriser`] is the
//! built-in fallback that draws the projected series directly, and the stub
//! implementations let exporter ordering and gating be tested without any surface.

use crate::chart::ChartSeries;
use crate::error::CaptureError;
use image::{Rgba, RgbaImage};
use std::io::Cursor;

/// A captured raster of the chart, PNG-encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Capability: produce an image of the current chart render.
pub trait ChartCapture {
    /// Rasterises the chart for `series`.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError`] when the surface fails or there is nothing to draw.
    /// Capture failures are never fatal to an export; the caller downgrades to a
    /// text-only document.
    fn capture(&self, series: &ChartSeries) -> Result<CapturedImage, CaptureError>;
}

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const AXIS: Rgba<u8> = Rgba([60, 60, 60, 255]);
const MODEL: Rgba<u8> = Rgba([79, 124, 255, 255]);
const REFERENCE: Rgba<u8> = Rgba([42, 243, 192, 255]);
const SCHEDULE: Rgba<u8> = Rgba([255, 170, 60, 255]);

/// Surface-free capture: draws the projected series as a polyline plus point markers.
#[derive(Clone, Copy, Debug)]
pub struct SeriesRasteriser {
    width: u32,
    height: u32,
}

impl Default for SeriesRasteriser {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
        }
    }
}

impl SeriesRasteriser {
    /// Creates a rasteriser with an explicit canvas size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ChartCapture for SeriesRasteriser {
    fn capture(&self, series: &ChartSeries) -> Result<CapturedImage, CaptureError> {
        if series.awaiting_data() {
            return Err(CaptureError::NoData);
        }

        let mut canvas = RgbaImage::from_pixel(self.width, self.height, BACKGROUND);
        let plot = PlotArea::fit(self.width, self.height, series);

        plot.draw_axes(&mut canvas);

        let mut previous: Option<(u32, u32)> = None;
        for point in series.points() {
            if let Some(cp) = point.model_cp {
                let pixel = plot.to_pixel(point.time, cp);
                if let Some(last) = previous {
                    draw_line(&mut canvas, last, pixel, MODEL);
                }
                previous = Some(pixel);
            }
        }

        for point in series.points() {
            if let Some(y) = point.reference_y {
                draw_marker(&mut canvas, plot.to_pixel(point.time, y), REFERENCE);
            }
            if let Some(cp) = point.scheduled_cp {
                draw_marker(&mut canvas, plot.to_pixel(point.time, cp), SCHEDULE);
            }
        }

        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;

        Ok(CapturedImage {
            png,
            width: self.width,
            height: self.height,
        })
    }
}

/// Pixel mapping for the data region inside the canvas margins.
struct PlotArea {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
    t_min: f64,
    t_span: f64,
    v_min: f64,
    v_span: f64,
}

impl PlotArea {
    const MARGIN: u32 = 30;

    fn fit(width: u32, height: u32, series: &ChartSeries) -> Self {
        let mut t_min = f64::INFINITY;
        let mut t_max = f64::NEG_INFINITY;
        let mut v_min = f64::INFINITY;
        let mut v_max = f64::NEG_INFINITY;

        for point in series.points() {
            t_min = t_min.min(point.time);
            t_max = t_max.max(point.time);
            for value in [point.model_cp, point.reference_y, point.scheduled_cp]
                .into_iter()
                .flatten()
            {
                v_min = v_min.min(value);
                v_max = v_max.max(value);
            }
        }
        if !v_min.is_finite() {
            v_min = 0.0;
            v_max = 1.0;
        }

        let t_span = (t_max - t_min).max(f64::EPSILON);
        let v_span = (v_max - v_min).max(f64::EPSILON);

        Self {
            left: Self::MARGIN,
            top: Self::MARGIN,
            // Clamped so a tiny canvas degenerates to a point rather than underflowing.
            right: width.saturating_sub(Self::MARGIN + 1).max(Self::MARGIN),
            bottom: height.saturating_sub(Self::MARGIN + 1).max(Self::MARGIN),
            t_min,
            t_span,
            v_min,
            v_span,
        }
    }

    fn to_pixel(&self, time: f64, value: f64) -> (u32, u32) {
        let x_frac = (time - self.t_min) / self.t_span;
        let y_frac = (value - self.v_min) / self.v_span;
        let x = self.left as f64 + x_frac * (self.right - self.left) as f64;
        let y = self.bottom as f64 - y_frac * (self.bottom - self.top) as f64;
        (x.round() as u32, y.round() as u32)
    }

    fn draw_axes(&self, canvas: &mut RgbaImage) {
        for x in self.left..=self.right {
            canvas.put_pixel(x, self.bottom, AXIS);
        }
        for y in self.top..=self.bottom {
            canvas.put_pixel(self.left, y, AXIS);
        }
    }
}

/// Straight line between two pixels, stepped along the longer axis.
fn draw_line(canvas: &mut RgbaImage, from: (u32, u32), to: (u32, u32), colour: Rgba<u8>) {
    let (x0, y0) = (from.0 as i64, from.1 as i64);
    let (x1, y1) = (to.0 as i64, to.1 as i64);
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);

    for step in 0..=steps {
        let x = x0 + (x1 - x0) * step / steps;
        let y = y0 + (y1 - y0) * step / steps;
        if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
            canvas.put_pixel(x as u32, y as u32, colour);
        }
    }
}

/// 3x3 square marker centred on a pixel.
fn draw_marker(canvas: &mut RgbaImage, centre: (u32, u32), colour: Rgba<u8>) {
    let (cx, cy) = (centre.0 as i64, centre.1 as i64);
    for dx in -1..=1 {
        for dy in -1..=1 {
            let (x, y) = (cx + dx, cy + dy);
            if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
                canvas.put_pixel(x as u32, y as u32, colour);
            }
        }
    }
}

/// Capture stub returning a fixed buffer; for exporter tests and previews.
#[derive(Clone, Debug)]
pub struct FixedCapture {
    image: CapturedImage,
}

impl FixedCapture {
    pub fn new(png: Vec<u8>) -> Self {
        Self {
            image: CapturedImage {
                png,
                width: 600,
                height: 400,
            },
        }
    }
}

impl ChartCapture for FixedCapture {
    fn capture(&self, _series: &ChartSeries) -> Result<CapturedImage, CaptureError> {
        Ok(self.image.clone())
    }
}

/// Capture stub that always fails; for exercising the text-only export path.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingCapture;

impl ChartCapture for FailingCapture {
    fn capture(&self, _series: &ChartSeries) -> Result<CapturedImage, CaptureError> {
        Err(CaptureError::Surface("capture stub always fails".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::project;
    use crate::import::CurveResult;

    fn series() -> ChartSeries {
        project(&CurveResult {
            curve_t: vec![0.0, 1.0, 2.0, 4.0, 8.0],
            curve_cp: vec![0.0, 5.2, 4.1, 2.5, 0.8],
            curve_ref_x: Some(vec![0.0, 2.0, 8.0]),
            curve_ref_y: Some(vec![0.1, 4.0, 0.9]),
            ..CurveResult::default()
        })
    }

    #[test]
    fn rasteriser_produces_png_bytes() {
        let captured = SeriesRasteriser::default().capture(&series()).expect("capture");
        assert_eq!(captured.width, 600);
        assert_eq!(captured.height, 400);
        // PNG signature.
        assert_eq!(&captured.png[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn rasteriser_refuses_empty_series() {
        let err = SeriesRasteriser::default()
            .capture(&ChartSeries::default())
            .unwrap_err();
        assert!(matches!(err, CaptureError::NoData));
    }

    #[test]
    fn single_point_series_does_not_panic() {
        let series = project(&CurveResult {
            curve_t: vec![1.0],
            curve_cp: vec![3.0],
            ..CurveResult::default()
        });
        SeriesRasteriser::new(100, 80).capture(&series).expect("capture");
    }

    #[test]
    fn stubs_behave_as_documented() {
        let fixed = FixedCapture::new(vec![1, 2, 3]);
        assert_eq!(fixed.capture(&series()).unwrap().png, vec![1, 2, 3]);
        assert!(FailingCapture.capture(&series()).is_err());
    }
}
