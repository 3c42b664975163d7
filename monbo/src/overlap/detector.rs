//! Pairwise overlap discovery.

use std::collections::HashSet;

use geo::{BooleanOps, Intersects, MultiPolygon};
use rstar::{RTree, RTreeObject, AABB};
use tracing::{debug, warn};

use super::types::{FarmInput, FarmReport, FarmStatus, Inconsistency, InconsistencyReport, OverlapRecord};
use crate::geometry::{geometry_area, polygon_area, polygon_bounds, validate_geometry, AreaOptions, Validity};

/// Area difference under which intersection and union count as identical.
pub const IDENTICAL_AREA_EPSILON: f64 = 1e-10;

/// Intersection-over-union of two areas.
///
/// Identical footprints score exactly 1.0; the result is clamped into
/// `[0, 1]` and a vanishing union scores 0.
pub fn overlap_ratio(intersection_area: f64, area_a: f64, area_b: f64) -> f64 {
    let union = area_a + area_b - intersection_area;
    if (intersection_area - union).abs() < IDENTICAL_AREA_EPSILON {
        return 1.0;
    }
    if union <= 0.0 {
        return 0.0;
    }
    (intersection_area / union).clamp(0.0, 1.0)
}

/// R-tree entry: one farm's bounding box.
struct FarmEnvelope {
    index: usize,
    env: AABB<[f64; 2]>,
}

impl RTreeObject for FarmEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.env
    }
}

/// Finds overlapping farms and reports data-quality findings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapDetector {
    threshold_percentage: f64,
    area_options: AreaOptions,
}

impl OverlapDetector {
    /// Creates a detector reporting overlaps whose ratio, in percent,
    /// exceeds `threshold_percentage` (clamped into 0–100).
    pub fn new(threshold_percentage: f64) -> Self {
        Self {
            threshold_percentage: threshold_percentage.clamp(0.0, 100.0),
            area_options: AreaOptions::default(),
        }
    }

    pub fn with_area_options(mut self, options: AreaOptions) -> Self {
        self.area_options = options;
        self
    }

    pub fn threshold_percentage(&self) -> f64 {
        self.threshold_percentage
    }

    /// Finds every pair of valid farms that overlap above the threshold.
    ///
    /// Candidates come from an R-tree over the farms' bounding boxes; each
    /// unordered pair is tested once. Empty and invalid farms are skipped;
    /// see [`detect_geometry_issues`]. Records are ordered by `(first, second)`.
    pub fn detect_overlaps(&self, farms: &[FarmInput]) -> Vec<OverlapRecord> {
        let areas: Vec<Option<f64>> = farms.iter().map(|farm| self.farm_area(farm)).collect();

        let entries: Vec<FarmEnvelope> = farms
            .iter()
            .enumerate()
            .filter(|(i, _)| areas[*i].is_some())
            .filter_map(|(index, farm)| {
                polygon_bounds(farm.geometry.footprint()).map(|b| FarmEnvelope {
                    index,
                    env: AABB::from_corners([b.min_lon, b.min_lat], [b.max_lon, b.max_lat]),
                })
            })
            .collect();
        let tree = RTree::bulk_load(entries);

        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut records = Vec::new();

        for entry in tree.iter() {
            for candidate in tree.locate_in_envelope_intersecting(&entry.env) {
                if candidate.index == entry.index {
                    continue;
                }
                let key = (
                    entry.index.min(candidate.index),
                    entry.index.max(candidate.index),
                );
                if !seen.insert(key) {
                    continue;
                }

                if let Some(record) = self.evaluate_pair(farms, &areas, key) {
                    records.push(record);
                }
            }
        }

        records.sort_by_key(|r| (r.first, r.second));
        debug!(
            farms = farms.len(),
            candidates = seen.len(),
            overlaps = records.len(),
            "Detected overlaps"
        );
        records
    }

    /// Runs geometry checks and overlap detection and derives farm status.
    ///
    /// A farm is `NOT_VALID` when any finding names its id.
    pub fn analyze(&self, farms: &[FarmInput]) -> InconsistencyReport {
        let mut inconsistencies = detect_geometry_issues(farms);
        inconsistencies.extend(
            self.detect_overlaps(farms)
                .iter()
                .map(|record| Inconsistency::from_overlap(record, farms)),
        );

        let flagged: HashSet<&str> = inconsistencies
            .iter()
            .flat_map(|finding| finding.farm_ids())
            .collect();
        let farm_reports = farms
            .iter()
            .map(|farm| FarmReport {
                id: farm.id.clone(),
                status: if flagged.contains(farm.id.as_str()) {
                    FarmStatus::NotValid
                } else {
                    FarmStatus::Valid
                },
            })
            .collect();

        InconsistencyReport {
            farms: farm_reports,
            inconsistencies,
        }
    }

    /// Area of a farm eligible for overlap testing.
    fn farm_area(&self, farm: &FarmInput) -> Option<f64> {
        if validate_geometry(&farm.geometry) != Validity::Valid {
            return None;
        }
        match geometry_area(&farm.geometry, self.area_options) {
            Ok(area) => Some(area),
            Err(e) => {
                warn!(farm = %farm.id, error = %e, "Farm excluded from overlap detection");
                None
            }
        }
    }

    fn evaluate_pair(
        &self,
        farms: &[FarmInput],
        areas: &[Option<f64>],
        (first, second): (usize, usize),
    ) -> Option<OverlapRecord> {
        let a = farms[first].geometry.footprint();
        let b = farms[second].geometry.footprint();
        if !a.intersects(b) {
            return None;
        }

        let intersection: MultiPolygon<f64> = a.intersection(b);
        let mut area = 0.0;
        for piece in intersection.iter() {
            match polygon_area(piece, self.area_options) {
                Ok(piece_area) => area += piece_area,
                Err(e) => {
                    warn!(
                        first = %farms[first].id,
                        second = %farms[second].id,
                        error = %e,
                        "Skipping overlap with unmeasurable intersection"
                    );
                    return None;
                }
            }
        }
        if area <= 0.0 {
            return None;
        }

        let ratio = overlap_ratio(area, areas[first]?, areas[second]?);
        if ratio * 100.0 <= self.threshold_percentage {
            return None;
        }

        Some(OverlapRecord {
            first,
            second,
            intersection,
            area,
            ratio,
        })
    }
}

impl Default for OverlapDetector {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Flags empty and invalid farms, in input order.
pub fn detect_geometry_issues(farms: &[FarmInput]) -> Vec<Inconsistency> {
    farms
        .iter()
        .filter_map(|farm| match validate_geometry(&farm.geometry) {
            Validity::Valid => None,
            Validity::Empty => Some(Inconsistency::EmptyGeometry {
                farm_id: farm.id.clone(),
            }),
            Validity::Invalid(reason) => Some(Inconsistency::InvalidGeometry {
                farm_id: farm.id.clone(),
                reason: reason.to_string(),
            }),
        })
        .collect()
}
