//! Farm overlap detection
//!
//! Finds farms whose footprints intersect, scores each pair by
//! intersection over union and flags empty or invalid geometries. The
//! result is an [`InconsistencyReport`] giving every farm a `VALID` or
//! `NOT_VALID` status.

mod detector;
mod types;

pub use detector::{detect_geometry_issues, overlap_ratio, OverlapDetector, IDENTICAL_AREA_EPSILON};
pub use types::{
    Criticality, FarmInput, FarmReport, FarmStatus, Inconsistency, InconsistencyReport,
    OverlapRecord, HIGH_CRITICALITY_RATIO,
};
