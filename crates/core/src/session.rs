//! Measurement session: collected points and derived results
//!
//! A session accumulates pixel-space points in click order for one
//! measurement type. Results are derived from the points and the active
//! scale on completion and are dropped whenever the points change.

use crate::calibration::Scale;
use crate::error::{MeasureError, MeasureResult};
use crate::geometry::{distance, polygon_area, Point, Segment};
use crate::units::Unit;
use serde::{Deserialize, Serialize};

/// Kind of measurement being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementType {
    /// Straight distance between two points
    #[default]
    Length,
    /// Area enclosed by a polygon
    Area,
    /// Polygon area times a depth
    Volume,
}

impl MeasurementType {
    /// Points required before the measurement can complete
    pub fn min_points(self) -> usize {
        match self {
            Self::Length => 2,
            Self::Area | Self::Volume => 3,
        }
    }

    /// Whether completion fires by itself once enough points are committed
    pub fn auto_completes(self) -> bool {
        matches!(self, Self::Length)
    }

    /// Area and volume are both collected as a polygon outline
    pub fn is_polygon(self) -> bool {
        !self.auto_completes()
    }
}

/// Approximate cross-section of the measured hole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeHint {
    #[default]
    Circular,
    Rectangular,
    Elliptical,
}

/// Inputs for turning an area into a volume
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VolumeParameters {
    /// Depth in real units, never negative
    pub depth: f64,
    pub shape_hint: ShapeHint,
}

impl VolumeParameters {
    /// Volume of a hole with the given real-unit surface area.
    ///
    /// The hint is carried for reporting; all shapes use surface area times depth.
    pub fn volume_for(&self, area: f64) -> f64 {
        match self.shape_hint {
            ShapeHint::Circular | ShapeHint::Rectangular | ShapeHint::Elliptical => {
                area * self.depth
            }
        }
    }
}

/// Real-world result of a completed measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeasurementResult {
    Length { length: f64 },
    Area { area: f64, volume: Option<f64> },
}

impl MeasurementResult {
    pub fn length(&self) -> Option<f64> {
        match self {
            Self::Length { length } => Some(*length),
            Self::Area { .. } => None,
        }
    }

    pub fn area(&self) -> Option<f64> {
        match self {
            Self::Area { area, .. } => Some(*area),
            Self::Length { .. } => None,
        }
    }

    pub fn volume(&self) -> Option<f64> {
        match self {
            Self::Area { volume, .. } => *volume,
            Self::Length { .. } => None,
        }
    }

    /// Display strings for each value present
    pub fn labels(&self, unit: Unit) -> ResultLabels {
        ResultLabels {
            length: self.length().map(|v| unit.format_length(v)),
            area: self.area().map(|v| unit.format_area(v)),
            volume: self.volume().map(|v| unit.format_volume(v)),
        }
    }
}

/// Formatted values of a result, ready for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLabels {
    pub length: Option<String>,
    pub area: Option<String>,
    pub volume: Option<String>,
}

/// What happened when a point was added
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointAdded {
    /// Point stored, more input expected
    Pending,
    /// Point completed a segment that finishes on its own
    ReadyToComplete,
}

/// Points and configuration of the measurement in progress
#[derive(Debug, Clone, Default)]
pub struct MeasurementSession {
    kind: MeasurementType,
    points: Vec<Point>,
    draft: Option<Segment>,
    volume: VolumeParameters,
    result: Option<MeasurementResult>,
}

impl MeasurementSession {
    pub fn new(kind: MeasurementType) -> Self {
        Self { kind, ..Self::default() }
    }

    pub fn kind(&self) -> MeasurementType {
        self.kind
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Segment being dragged, for feedback only
    pub fn draft(&self) -> Option<Segment> {
        self.draft
    }

    pub fn is_dragging(&self) -> bool {
        self.draft.is_some()
    }

    pub fn volume_parameters(&self) -> VolumeParameters {
        self.volume
    }

    /// Result of the last completion, if nothing changed since
    pub fn result(&self) -> Option<MeasurementResult> {
        self.result
    }

    /// Switch measurement type, discarding collected points
    pub fn set_type(&mut self, kind: MeasurementType) {
        self.kind = kind;
        self.clear();
    }

    /// Append a point following the active type's rules
    pub fn add_point(&mut self, point: Point) -> PointAdded {
        self.result = None;

        if self.kind == MeasurementType::Length && self.points.len() >= 2 {
            // A third click starts a fresh segment instead of extending the line.
            self.points.clear();
        }
        self.points.push(point);

        if self.kind.auto_completes() && self.points.len() == self.kind.min_points() {
            PointAdded::ReadyToComplete
        } else {
            PointAdded::Pending
        }
    }

    /// Anchor a new draft segment at `start`
    pub fn begin_draft(&mut self, start: Point) {
        self.draft = Some(Segment::anchored(start));
    }

    /// Follow the pointer with the draft's open end
    pub fn update_draft(&mut self, to: Point) {
        if let Some(draft) = self.draft.as_mut() {
            draft.end = Some(to);
        }
    }

    /// Drop the draft without recording a point
    pub fn cancel_draft(&mut self) {
        self.draft = None;
    }

    /// Commit the draft's start as the next point.
    ///
    /// The start, not the end, is recorded so consecutive drags form a chain.
    pub fn commit_draft(&mut self) -> Option<PointAdded> {
        let draft = self.draft.take()?;
        Some(self.add_point(draft.start))
    }

    /// Empty the point list and drop any result
    pub fn clear(&mut self) {
        self.points.clear();
        self.draft = None;
        self.result = None;
    }

    /// Forget the computed result but keep the points
    pub fn invalidate_result(&mut self) {
        self.result = None;
    }

    /// Set the depth used for volume, recomputing a finished volume in place
    pub fn set_volume_depth(&mut self, depth: f64) -> MeasureResult<()> {
        if !(depth.is_finite() && depth >= 0.0) {
            return Err(MeasureError::InvalidVolumeDepth(depth));
        }

        self.volume.depth = depth;
        self.refresh_volume();
        Ok(())
    }

    pub fn set_shape_hint(&mut self, shape_hint: ShapeHint) {
        self.volume.shape_hint = shape_hint;
        self.refresh_volume();
    }

    fn refresh_volume(&mut self) {
        if self.kind != MeasurementType::Volume {
            return;
        }
        if let Some(MeasurementResult::Area { area, .. }) = self.result {
            self.result =
                Some(MeasurementResult::Area { area, volume: Some(self.volume.volume_for(area)) });
        }
    }

    /// Compute the result from the collected points and `scale`
    pub fn complete(&mut self, scale: Scale) -> MeasureResult<MeasurementResult> {
        let required = self.kind.min_points();
        if self.points.len() < required {
            return Err(MeasureError::InsufficientPoints { required, actual: self.points.len() });
        }

        if !scale.is_calibrated() {
            self.result = None;
            return Err(MeasureError::Uncalibrated);
        }

        let result = match self.kind {
            MeasurementType::Length => {
                let pixels = distance(self.points[0], self.points[1]);
                MeasurementResult::Length { length: scale.to_real_length(pixels)? }
            }
            MeasurementType::Area => {
                let area = scale.to_real_area(polygon_area(&self.points))?;
                MeasurementResult::Area { area, volume: None }
            }
            MeasurementType::Volume => {
                let area = scale.to_real_area(polygon_area(&self.points))?;
                MeasurementResult::Area { area, volume: Some(self.volume.volume_for(area)) }
            }
        };

        log::info!("{:?} measurement completed: {:?}", self.kind, result);
        self.result = Some(result);
        Ok(result)
    }
}
