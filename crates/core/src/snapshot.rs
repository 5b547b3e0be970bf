//! Read-only views of a workspace for renderers and host UIs
//!
//! Nothing here mutates state. A renderer pulls a [`Snapshot`] after every
//! outcome other than `Ignored`; a host derives button enablement from
//! [`Availability`] instead of storing it.

use crate::calibration::Scale;
use crate::error::MeasureError;
use crate::geometry::{centroid, Point, Segment};
use crate::interaction::{Mode, Workspace};
use crate::session::{MeasurementResult, MeasurementType, ResultLabels, VolumeParameters};
use crate::units::Unit;
use serde::Serialize;

/// Everything needed to draw the current state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot<'a> {
    pub mode: Mode,
    pub scale: Scale,
    pub unit: Unit,
    pub known_length: f64,
    pub reference_line: Option<Segment>,
    /// Text drawn beside a finished reference line, e.g. `"10 cm"`
    pub reference_label: Option<String>,
    /// Where the reference label is drawn: the reference line's midpoint
    pub reference_label_anchor: Option<Point>,
    pub measurement_type: MeasurementType,
    pub points: &'a [Point],
    pub draft_segment: Option<Segment>,
    /// Whether the outline should be drawn closed back to the first point
    pub closed_outline: bool,
    pub pointer: Option<Point>,
    pub volume: VolumeParameters,
    pub result: Option<MeasurementResult>,
    pub labels: Option<ResultLabels>,
    /// Midpoint of a measured length, or the vertex centroid of an outline
    pub result_label_anchor: Option<Point>,
}

/// Which host commands currently make sense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Availability {
    pub begin_calibration: bool,
    pub clear_calibration: bool,
    pub begin_measuring: bool,
    pub clear_measurement: bool,
    pub finish_polygon: bool,
}

impl Workspace {
    pub fn snapshot(&self) -> Snapshot<'_> {
        let session = self.session();
        let calibrator = self.calibrator();
        let reference_line = calibrator.reference_line();
        let settled_reference =
            reference_line.filter(|line| line.is_complete() && !calibrator.is_dragging());
        let result = session.result();
        let result_label_anchor = result.and_then(|result| match result {
            MeasurementResult::Length { .. } => match session.points() {
                [start, end] => Some(start.midpoint(end)),
                _ => None,
            },
            MeasurementResult::Area { .. } => centroid(session.points()),
        });

        Snapshot {
            mode: self.mode(),
            scale: self.scale(),
            unit: self.unit(),
            known_length: self.known_length(),
            reference_line,
            reference_label: settled_reference
                .map(|_| format!("{} {}", self.known_length(), self.unit())),
            reference_label_anchor: settled_reference.and_then(|line| line.midpoint()),
            measurement_type: session.kind(),
            points: session.points(),
            draft_segment: session.draft(),
            closed_outline: session.kind().is_polygon() && session.points().len() > 2,
            pointer: self.pointer(),
            volume: session.volume_parameters(),
            result,
            labels: result.map(|r| r.labels(self.unit())),
            result_label_anchor,
        }
    }

    pub fn availability(&self) -> Availability {
        let session = self.session();
        let calibrator = self.calibrator();
        let idle_with_image = self.mode() == Mode::Idle && self.has_image();

        Availability {
            begin_calibration: idle_with_image,
            clear_calibration: calibrator.reference_line().is_some()
                || calibrator.calibration().is_some(),
            begin_measuring: idle_with_image && self.scale().is_calibrated(),
            clear_measurement: !session.points().is_empty() || session.result().is_some(),
            finish_polygon: self.mode() == Mode::MeasuringPolygon
                && session.points().len() >= session.kind().min_points(),
        }
    }

    /// Guidance text for the current step
    pub fn instructions(&self) -> String {
        let session = self.session();
        let calibrator = self.calibrator();

        match self.mode() {
            Mode::Calibrating => {
                "Click and drag to draw a line on the reference object.".to_owned()
            }
            Mode::MeasuringLength | Mode::MeasuringPolygon => {
                measuring_instructions(session.kind()).to_owned()
            }
            Mode::Idle if !self.has_image() => {
                "Upload an image or capture a photo to begin.".to_owned()
            }
            Mode::Idle => {
                if let Some(error) = calibrator.last_error() {
                    return match error {
                        MeasureError::InvalidReferenceLength(_) => {
                            "Please enter a valid known length for the reference object.".to_owned()
                        }
                        _ => "Draw a longer line on the reference object.".to_owned(),
                    };
                }

                let Some(calibration) = calibrator.calibration() else {
                    return "Draw a reference line across an object of known length.".to_owned();
                };

                if session.points().is_empty() && session.result().is_none() {
                    format!(
                        "Scale set. {:.1} pixels = {} {}. Now measure the pothole.",
                        calibration.pixel_length,
                        calibration.known_length,
                        self.unit()
                    )
                } else {
                    measuring_instructions(session.kind()).to_owned()
                }
            }
        }
    }
}

fn measuring_instructions(kind: MeasurementType) -> &'static str {
    match kind {
        MeasurementType::Length => "Draw a line across the pothole to measure its length.",
        MeasurementType::Area => {
            "Click around the edges of the pothole to measure its area. \
             Finish the polygon when done."
        }
        MeasurementType::Volume => {
            "Click around the edges of the pothole to measure its area first. \
             Then enter water depth."
        }
    }
}
