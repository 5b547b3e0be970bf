//! Scale calibration from a user-drawn reference segment
//!
//! The user drags a line across an object of known size. Its pixel length
//! divided by the known real length gives the scale (pixels per real unit)
//! used by every later measurement.

use crate::error::{MeasureError, MeasureResult};
use crate::geometry::{distance, Point, Segment};
use serde::{Deserialize, Serialize};

/// Pixels per real-world unit. Zero means uncalibrated.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scale(f64);

impl Scale {
    /// Scale of an uncalibrated engine
    pub const UNSET: Scale = Scale(0.0);

    /// Wrap a pixels-per-unit ratio; non-positive or non-finite ratios become `UNSET`
    pub fn from_pixels_per_unit(ratio: f64) -> Self {
        if ratio.is_finite() && ratio > 0.0 {
            Self(ratio)
        } else {
            Self::UNSET
        }
    }

    pub fn pixels_per_unit(self) -> f64 {
        self.0
    }

    pub fn is_calibrated(self) -> bool {
        self.0 > 0.0
    }

    /// Convert a pixel length to real units
    pub fn to_real_length(self, pixels: f64) -> MeasureResult<f64> {
        if !self.is_calibrated() {
            return Err(MeasureError::Uncalibrated);
        }
        Ok(pixels / self.0)
    }

    /// Convert a pixel area to square real units
    pub fn to_real_area(self, square_pixels: f64) -> MeasureResult<f64> {
        if !self.is_calibrated() {
            return Err(MeasureError::Uncalibrated);
        }
        Ok(square_pixels / (self.0 * self.0))
    }
}

/// A successful calibration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Pixel length of the reference segment
    pub pixel_length: f64,
    /// Real length the user entered for it
    pub known_length: f64,
}

impl Calibration {
    pub fn scale(&self) -> Scale {
        Scale::from_pixels_per_unit(self.pixel_length / self.known_length)
    }
}

/// Owns the reference segment and the scale derived from it
#[derive(Debug, Clone, Default)]
pub struct ScaleCalibrator {
    /// Committed reference segment
    reference: Option<Segment>,
    /// Reference segment still being dragged
    draft: Option<Segment>,
    calibration: Option<Calibration>,
    last_error: Option<MeasureError>,
}

impl ScaleCalibrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a complete reference segment, replacing any previous one
    pub fn set_reference(&mut self, start: Point, end: Point) {
        self.draft = None;
        self.reference = Some(Segment::new(start, end));
    }

    /// Start dragging a new reference segment at `start`
    ///
    /// The committed segment and scale stay readable until the drag is committed.
    pub fn begin_reference(&mut self, start: Point) {
        self.draft = Some(Segment::anchored(start));
    }

    /// Move the open end of the dragged reference segment
    pub fn drag_reference(&mut self, to: Point) {
        if let Some(draft) = self.draft.as_mut() {
            draft.end = Some(to);
        }
    }

    /// Finish the drag at `end` and make it the reference segment
    pub fn commit_reference(&mut self, end: Point) -> Option<Segment> {
        let draft = self.draft.take()?;
        self.set_reference(draft.start, end);
        self.reference
    }

    /// Derive the scale from the reference segment and a known real length.
    ///
    /// On failure the scale is left unset and the error is remembered for
    /// status reporting.
    pub fn compute_scale(&mut self, known_real_length: f64) -> MeasureResult<Scale> {
        match self.try_calibrate(known_real_length) {
            Ok(calibration) => {
                let scale = calibration.scale();
                log::info!(
                    "calibrated: {:.1} px = {} units ({:.4} px/unit)",
                    calibration.pixel_length,
                    calibration.known_length,
                    scale.pixels_per_unit()
                );
                self.calibration = Some(calibration);
                self.last_error = None;
                Ok(scale)
            }
            Err(error) => {
                log::warn!("calibration failed: {error}");
                self.calibration = None;
                self.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    fn try_calibrate(&self, known_real_length: f64) -> MeasureResult<Calibration> {
        if !(known_real_length.is_finite() && known_real_length > 0.0) {
            return Err(MeasureError::InvalidReferenceLength(known_real_length));
        }

        let pixel_length = self
            .reference
            .and_then(|segment| segment.end.map(|end| distance(segment.start, end)))
            .ok_or(MeasureError::Uncalibrated)?;

        let calibration = Calibration { pixel_length, known_length: known_real_length };
        if !calibration.scale().is_calibrated() {
            return Err(MeasureError::Uncalibrated);
        }

        Ok(calibration)
    }

    /// Last computed scale, `Scale::UNSET` when uncalibrated
    pub fn scale(&self) -> Scale {
        self.calibration.map(|c| c.scale()).unwrap_or(Scale::UNSET)
    }

    pub fn calibration(&self) -> Option<Calibration> {
        self.calibration
    }

    /// Error from the most recent failed calibration attempt
    pub fn last_error(&self) -> Option<&MeasureError> {
        self.last_error.as_ref()
    }

    /// Reference line to draw: the segment being dragged, else the committed one
    pub fn reference_line(&self) -> Option<Segment> {
        self.draft.or(self.reference)
    }

    pub fn is_dragging(&self) -> bool {
        self.draft.is_some()
    }

    /// Drop an unfinished drag without touching the committed reference
    pub fn cancel_drag(&mut self) {
        self.draft = None;
    }

    /// Clear the reference segment and the scale
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hundred_pixels_over_ten_units() {
        let mut calibrator = ScaleCalibrator::new();
        calibrator.set_reference(Point::new(0.0, 0.0), Point::new(100.0, 0.0));

        let scale = calibrator.compute_scale(10.0).expect("calibration should succeed");
        assert_eq!(scale.pixels_per_unit(), 10.0);
        assert_eq!(calibrator.scale(), scale);
        assert_eq!(scale.to_real_length(100.0), Ok(10.0));
        assert_eq!(scale.to_real_area(100.0), Ok(1.0));
    }

    #[test]
    fn non_positive_known_length_leaves_scale_unset() {
        for known in [0.0, -5.0, f64::NAN] {
            let mut calibrator = ScaleCalibrator::new();
            calibrator.set_reference(Point::new(0.0, 0.0), Point::new(100.0, 0.0));

            let result = calibrator.compute_scale(known);
            assert!(matches!(result, Err(MeasureError::InvalidReferenceLength(_))));
            assert!(!calibrator.scale().is_calibrated());
            assert!(calibrator.last_error().is_some());
        }
    }

    #[test]
    fn missing_reference_is_reported() {
        let mut calibrator = ScaleCalibrator::new();
        assert_eq!(calibrator.compute_scale(10.0), Err(MeasureError::Uncalibrated));

        calibrator.set_reference(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        assert_eq!(calibrator.compute_scale(10.0), Err(MeasureError::Uncalibrated));
    }

    #[test]
    fn failed_recalibration_clears_previous_scale() {
        let mut calibrator = ScaleCalibrator::new();
        calibrator.set_reference(Point::new(0.0, 0.0), Point::new(50.0, 0.0));
        calibrator.compute_scale(5.0).expect("calibration should succeed");

        calibrator.set_reference(Point::new(0.0, 0.0), Point::new(80.0, 0.0));
        assert!(calibrator.compute_scale(0.0).is_err());
        assert_eq!(calibrator.scale(), Scale::UNSET);
    }

    #[test]
    fn drag_keeps_committed_reference_until_release() {
        let mut calibrator = ScaleCalibrator::new();
        calibrator.set_reference(Point::new(0.0, 0.0), Point::new(30.0, 40.0));
        calibrator.compute_scale(5.0).expect("calibration should succeed");

        calibrator.begin_reference(Point::new(10.0, 10.0));
        calibrator.drag_reference(Point::new(20.0, 10.0));
        assert!(calibrator.is_dragging());
        assert_eq!(
            calibrator.reference_line(),
            Some(Segment::new(Point::new(10.0, 10.0), Point::new(20.0, 10.0)))
        );
        assert_eq!(calibrator.scale().pixels_per_unit(), 10.0);

        let committed = calibrator.commit_reference(Point::new(110.0, 10.0));
        assert_eq!(committed.and_then(|s| s.length()), Some(100.0));
        assert!(!calibrator.is_dragging());
    }

    #[test]
    fn reset_clears_everything() {
        let mut calibrator = ScaleCalibrator::new();
        calibrator.set_reference(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        calibrator.compute_scale(10.0).expect("calibration should succeed");

        calibrator.reset();
        assert_eq!(calibrator.scale(), Scale::UNSET);
        assert_eq!(calibrator.reference_line(), None);
        assert_eq!(calibrator.calibration(), None);
    }

    #[test]
    fn uncalibrated_scale_rejects_conversions() {
        assert_eq!(Scale::UNSET.to_real_length(10.0), Err(MeasureError::Uncalibrated));
        assert_eq!(Scale::from_pixels_per_unit(-2.0), Scale::UNSET);
    }
}
