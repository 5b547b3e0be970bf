//! Interaction state machine and the owned measuring workspace
//!
//! A [`Workspace`] owns one calibrator and one measurement session. Host
//! commands and pointer events are applied synchronously, in arrival order,
//! and each returns what changed. Commands that the current mode does not
//! accept are silent no-ops reported as [`Outcome::Ignored`].

use crate::calibration::{Scale, ScaleCalibrator};
use crate::error::{MeasureError, MeasureResult};
use crate::frame::DisplaySize;
use crate::geometry::Point;
use crate::session::{MeasurementResult, MeasurementSession, MeasurementType, PointAdded, ShapeHint};
use crate::units::Unit;
use serde::{Deserialize, Serialize};

/// Which kind of input the canvas is collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Idle,
    Calibrating,
    MeasuringLength,
    MeasuringPolygon,
}

impl Mode {
    /// Measuring sub-mode for a measurement type
    pub fn measuring(kind: MeasurementType) -> Self {
        if kind.is_polygon() {
            Self::MeasuringPolygon
        } else {
            Self::MeasuringLength
        }
    }

    pub fn is_measuring(self) -> bool {
        matches!(self, Self::MeasuringLength | Self::MeasuringPolygon)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Calibrating => "calibrating",
            Self::MeasuringLength => "measuring length",
            Self::MeasuringPolygon => "measuring polygon",
        }
    }
}

/// Commands issued by the host UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// A new image or frame is shown at this size; resets everything
    LoadImage(DisplaySize),
    BeginCalibration,
    ClearCalibration,
    BeginMeasuring,
    ClearMeasurement,
    FinishPolygon,
    SetMeasurementType(MeasurementType),
    SetKnownReferenceLength(f64),
    SetUnit(Unit),
    SetVolumeDepth(f64),
    SetShapeHint(ShapeHint),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadImage(_) => "load image",
            Self::BeginCalibration => "begin calibration",
            Self::ClearCalibration => "clear calibration",
            Self::BeginMeasuring => "begin measuring",
            Self::ClearMeasurement => "clear measurement",
            Self::FinishPolygon => "finish polygon",
            Self::SetMeasurementType(_) => "set measurement type",
            Self::SetKnownReferenceLength(_) => "set known reference length",
            Self::SetUnit(_) => "set unit",
            Self::SetVolumeDepth(_) => "set volume depth",
            Self::SetShapeHint(_) => "set shape hint",
        }
    }
}

/// Pointer input in display pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    DoubleClick(Point),
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            Self::Down(p) | Self::Move(p) | Self::Up(p) | Self::DoubleClick(p) => p,
        }
    }
}

/// Effect of a command or pointer event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Not accepted in the current mode; nothing changed
    Ignored,
    /// State changed and should be redrawn
    Updated,
    /// A reference segment was committed and produced this scale
    Calibrated(Scale),
    /// A measurement completed with this result
    Completed(MeasurementResult),
}

/// Which owner a drag in progress belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragTarget {
    Reference,
    Session,
}

/// Owned measuring context: calibration, session and interaction state
#[derive(Debug, Clone)]
pub struct Workspace {
    mode: Mode,
    display: Option<DisplaySize>,
    calibrator: ScaleCalibrator,
    session: MeasurementSession,
    known_length: f64,
    unit: Unit,
    pointer: Option<Point>,
    drag: Option<DragTarget>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            mode: Mode::Idle,
            display: None,
            calibrator: ScaleCalibrator::new(),
            session: MeasurementSession::default(),
            known_length: 0.0,
            unit: Unit::default(),
            pointer: None,
            drag: None,
        }
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn scale(&self) -> Scale {
        self.calibrator.scale()
    }

    pub fn calibrator(&self) -> &ScaleCalibrator {
        &self.calibrator
    }

    pub fn session(&self) -> &MeasurementSession {
        &self.session
    }

    pub fn display(&self) -> Option<DisplaySize> {
        self.display
    }

    pub fn has_image(&self) -> bool {
        self.display.is_some()
    }

    pub fn known_length(&self) -> f64 {
        self.known_length
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Last pointer position seen while an image is shown
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// Apply a host command
    pub fn apply(&mut self, command: Command) -> MeasureResult<Outcome> {
        match command {
            Command::LoadImage(size) => {
                if !size.is_valid() {
                    return self.ignore(command.name());
                }
                self.calibrator.reset();
                self.session.clear();
                self.mode = Mode::Idle;
                self.drag = None;
                self.pointer = None;
                self.display = Some(size);
                log::debug!("image loaded at {}x{}", size.width, size.height);
                Ok(Outcome::Updated)
            }
            Command::BeginCalibration => {
                if self.mode != Mode::Idle || !self.has_image() {
                    return self.ignore(command.name());
                }
                self.transition(Mode::Calibrating);
                Ok(Outcome::Updated)
            }
            Command::ClearCalibration => {
                self.calibrator.reset();
                self.session.invalidate_result();
                if self.mode == Mode::Calibrating {
                    self.drag = None;
                    self.transition(Mode::Idle);
                }
                Ok(Outcome::Updated)
            }
            Command::BeginMeasuring => {
                if self.mode != Mode::Idle || !self.has_image() {
                    return self.ignore(command.name());
                }
                self.session.clear();
                self.transition(Mode::measuring(self.session.kind()));
                Ok(Outcome::Updated)
            }
            Command::ClearMeasurement => {
                self.session.clear();
                self.calibrator.cancel_drag();
                self.drag = None;
                self.transition(Mode::Idle);
                Ok(Outcome::Updated)
            }
            Command::FinishPolygon => {
                if self.mode != Mode::MeasuringPolygon {
                    return self.ignore(command.name());
                }
                self.finish_polygon()
            }
            Command::SetMeasurementType(kind) => {
                self.session.set_type(kind);
                if self.drag == Some(DragTarget::Session) {
                    self.drag = None;
                }
                if self.mode.is_measuring() {
                    self.transition(Mode::measuring(kind));
                }
                Ok(Outcome::Updated)
            }
            Command::SetKnownReferenceLength(length) => {
                self.known_length = length;
                Ok(Outcome::Updated)
            }
            Command::SetUnit(unit) => {
                self.unit = unit;
                Ok(Outcome::Updated)
            }
            Command::SetVolumeDepth(depth) => {
                self.session.set_volume_depth(depth).inspect_err(|error| {
                    log::warn!("{error}");
                })?;
                Ok(Outcome::Updated)
            }
            Command::SetShapeHint(hint) => {
                self.session.set_shape_hint(hint);
                Ok(Outcome::Updated)
            }
        }
    }

    /// Route a pointer event according to the current mode
    pub fn handle_pointer(&mut self, event: PointerEvent) -> MeasureResult<Outcome> {
        if !self.has_image() {
            return Ok(Outcome::Ignored);
        }

        let position = event.position();
        match event {
            PointerEvent::Down(_) => {
                let target = match self.mode {
                    Mode::Calibrating => {
                        self.calibrator.begin_reference(position);
                        DragTarget::Reference
                    }
                    Mode::MeasuringLength | Mode::MeasuringPolygon => {
                        self.session.begin_draft(position);
                        DragTarget::Session
                    }
                    Mode::Idle => return Ok(Outcome::Ignored),
                };
                self.pointer = Some(position);
                self.drag = Some(target);
                Ok(Outcome::Updated)
            }
            PointerEvent::Move(_) => {
                let Some(target) = self.drag else {
                    return Ok(Outcome::Ignored);
                };
                self.pointer = Some(position);
                match target {
                    DragTarget::Reference => self.calibrator.drag_reference(position),
                    DragTarget::Session => self.session.update_draft(position),
                }
                Ok(Outcome::Updated)
            }
            PointerEvent::Up(_) => {
                let Some(target) = self.drag.take() else {
                    return Ok(Outcome::Ignored);
                };
                self.pointer = Some(position);
                match target {
                    DragTarget::Reference => self.commit_reference(position),
                    DragTarget::Session => self.commit_point(position),
                }
            }
            PointerEvent::DoubleClick(_) => {
                let gate = self.mode == Mode::MeasuringPolygon
                    && self.session.points().len() >= self.session.kind().min_points();
                if !gate {
                    return Ok(Outcome::Ignored);
                }
                self.finish_polygon()
            }
        }
    }

    fn commit_reference(&mut self, end: Point) -> MeasureResult<Outcome> {
        if self.calibrator.commit_reference(end).is_none() {
            return Ok(Outcome::Ignored);
        }

        // Calibration ends with the drag whether or not the scale is usable.
        self.transition(Mode::Idle);
        self.session.invalidate_result();
        let scale = self.calibrator.compute_scale(self.known_length)?;
        Ok(Outcome::Calibrated(scale))
    }

    fn commit_point(&mut self, end: Point) -> MeasureResult<Outcome> {
        self.session.update_draft(end);
        // The draft's start is what gets recorded; its end only drove feedback.
        match self.session.commit_draft() {
            Some(PointAdded::ReadyToComplete) => {
                self.transition(Mode::Idle);
                self.complete()
            }
            Some(PointAdded::Pending) => Ok(Outcome::Updated),
            None => Ok(Outcome::Ignored),
        }
    }

    fn finish_polygon(&mut self) -> MeasureResult<Outcome> {
        let required = self.session.kind().min_points();
        let actual = self.session.points().len();
        if actual < required {
            return Err(MeasureError::InsufficientPoints { required, actual });
        }

        if self.drag == Some(DragTarget::Session) {
            self.drag = None;
        }
        self.session.cancel_draft();
        self.transition(Mode::Idle);
        self.complete()
    }

    fn complete(&mut self) -> MeasureResult<Outcome> {
        let scale = self.calibrator.scale();
        let result = self.session.complete(scale).inspect_err(|error| {
            log::warn!("measurement not computed: {error}");
        })?;
        Ok(Outcome::Completed(result))
    }

    fn transition(&mut self, mode: Mode) {
        if self.mode != mode {
            log::debug!("mode {} -> {}", self.mode.name(), mode.name());
            self.mode = mode;
        }
    }

    fn ignore(&self, command: &'static str) -> MeasureResult<Outcome> {
        let error = MeasureError::IllegalTransition { command, mode: self.mode.name() };
        log::debug!("ignored: {error}");
        Ok(Outcome::Ignored)
    }
}
