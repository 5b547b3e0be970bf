//! Measurement Core Library
//!
//! Calibrates real-world scale from a reference segment drawn on a photo and
//! turns clicked pixel points into lengths, areas and volumes.

pub mod calibration;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod interaction;
pub mod session;
pub mod snapshot;
pub mod units;

pub use calibration::{Calibration, Scale, ScaleCalibrator};
pub use error::{MeasureError, MeasureResult};
pub use frame::{fit_to_canvas, DisplaySize, ImageSize};
pub use geometry::{centroid, distance, polygon_area, Point, Segment};
pub use interaction::{Command, Mode, Outcome, PointerEvent, Workspace};
pub use session::{
    MeasurementResult, MeasurementSession, MeasurementType, PointAdded, ResultLabels, ShapeHint,
    VolumeParameters,
};
pub use snapshot::{Availability, Snapshot};
pub use units::{ParseUnitError, Unit, UNITS};
