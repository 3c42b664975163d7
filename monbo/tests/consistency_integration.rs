//! Integration tests for farm geometry and consistency checks.
//!
//! These tests cover:
//! - The three-farm overlap scenario and farm status
//! - Area of point farms against the circle formula
//! - Small-polygon area against the closed-form approximation
//! - Invalid and empty farms as data-quality findings
//! - Report serialization

mod common;

use common::square_farm;
use monbo::geometry::{
    build_geometry, calculate_polygon_area, geometry_area, point_area, AreaOptions, LngLat,
    INVALID_AREA,
};
use monbo::overlap::{FarmInput, FarmStatus, Inconsistency, OverlapDetector};

// =============================================================================
// Overlap detection
// =============================================================================

#[test]
fn test_three_farm_scenario_reports_one_overlap() {
    let farms = vec![
        square_farm("A", 0.0, 0.0, 1.0),
        square_farm("B", 0.5, 0.5, 1.0),
        square_farm("C", 2.0, 0.0, 1.0),
    ];

    let report = OverlapDetector::new(0.0).analyze(&farms);

    let overlaps: Vec<&Inconsistency> = report
        .inconsistencies
        .iter()
        .filter(|i| matches!(i, Inconsistency::Overlap { .. }))
        .collect();
    assert_eq!(overlaps.len(), 1, "Only A and B overlap");
    match overlaps[0] {
        Inconsistency::Overlap {
            farm_ids, ratio, ..
        } => {
            assert_eq!(farm_ids, &["A".to_string(), "B".to_string()]);
            assert!((0.0..=1.0).contains(ratio));
        }
        _ => unreachable!(),
    }

    assert_eq!(report.status_of("A"), Some(FarmStatus::NotValid));
    assert_eq!(report.status_of("B"), Some(FarmStatus::NotValid));
    assert_eq!(report.status_of("C"), Some(FarmStatus::Valid));
}

#[test]
fn test_overlap_ratio_is_symmetric() {
    let forward = vec![square_farm("A", 0.0, 0.0, 0.05), square_farm("B", 0.02, 0.01, 0.05)];
    let backward = vec![forward[1].clone(), forward[0].clone()];

    let a = OverlapDetector::default().detect_overlaps(&forward);
    let b = OverlapDetector::default().detect_overlaps(&backward);
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
    assert!((a[0].ratio - b[0].ratio).abs() < 1e-9);
}

#[test]
fn test_threshold_filters_small_overlaps() {
    let farms = vec![square_farm("A", 0.0, 0.0, 1.0), square_farm("B", 0.9, 0.0, 1.0)];

    assert_eq!(OverlapDetector::new(0.0).detect_overlaps(&farms).len(), 1);
    assert!(
        OverlapDetector::new(50.0).detect_overlaps(&farms).is_empty(),
        "A 10% sliver stays below a 50% threshold"
    );
}

#[test]
fn test_invalid_farms_are_findings_not_failures() {
    let bow_tie = [
        LngLat::new(0.0, 0.0),
        LngLat::new(1.0, 1.0),
        LngLat::new(1.0, 0.0),
        LngLat::new(0.0, 1.0),
    ];
    let two_points = [LngLat::new(5.0, 5.0), LngLat::new(6.0, 6.0)];
    let farms = vec![
        FarmInput::from_coordinates("bow", &bow_tie, None).unwrap(),
        FarmInput::from_coordinates("line", &two_points, None).unwrap(),
        FarmInput::new("empty", build_geometry(&[], None).unwrap()),
        square_farm("ok", 0.0, 0.0, 1.0),
    ];

    let report = OverlapDetector::default().analyze(&farms);
    assert_eq!(report.inconsistencies.len(), 3);
    assert_eq!(report.status_of("bow"), Some(FarmStatus::NotValid));
    assert_eq!(report.status_of("line"), Some(FarmStatus::NotValid));
    assert_eq!(report.status_of("empty"), Some(FarmStatus::NotValid));
    assert_eq!(
        report.status_of("ok"),
        Some(FarmStatus::Valid),
        "The bow tie covers the square but is excluded from overlap testing"
    );
}

#[test]
fn test_report_json_shape() {
    let farms = vec![square_farm("A", 0.0, 0.0, 1.0), square_farm("B", 0.5, 0.5, 1.0)];
    let report = OverlapDetector::default().analyze(&farms);
    let json = serde_json::to_value(&report).unwrap();

    let overlap = &json["inconsistencies"][0];
    assert_eq!(overlap["type"], "overlap");
    assert_eq!(overlap["farmIds"], serde_json::json!(["A", "B"]));
    assert!(overlap["paths"][0].as_array().unwrap().len() >= 4);
    assert!(overlap["center"]["lng"].as_f64().is_some());
}

// =============================================================================
// Area
// =============================================================================

#[test]
fn test_point_area_matches_circle_formula() {
    let point = build_geometry(&[LngLat::new(-50.456, 10.123)], Some(100.0)).unwrap();
    let computed = geometry_area(&point, AreaOptions::default()).unwrap();
    let expected = point_area(100.0);

    let relative = (computed - expected).abs() / expected;
    assert!(relative < 0.01, "Relative error {} exceeds 1%", relative);
}

#[test]
fn test_small_rectangle_matches_closed_form() {
    let farm = square_farm("s", -50.46, 10.12, 0.01);
    let area = calculate_polygon_area(farm.geometry.footprint());

    let center_lat: f64 = 10.125;
    let width_m = 111_320.0 * center_lat.to_radians().cos() * 0.01;
    let height_m = 111_320.0 * 0.01;
    let expected = ((width_m * height_m) * 100.0).round() / 100.0;
    assert!(
        (area - expected).abs() <= 0.01 + expected * 1e-9,
        "area {} expected {}",
        area,
        expected
    );
}

#[test]
fn test_area_sentinels() {
    let bow_tie = [
        LngLat::new(0.0, 0.0),
        LngLat::new(1.0, 1.0),
        LngLat::new(1.0, 0.0),
        LngLat::new(0.0, 1.0),
    ];
    let invalid = FarmInput::from_coordinates("bow", &bow_tie, None).unwrap();
    assert_eq!(calculate_polygon_area(invalid.geometry.footprint()), INVALID_AREA);

    let empty = build_geometry(&[], None).unwrap();
    assert_eq!(calculate_polygon_area(empty.footprint()), 0.0);
}

#[test]
fn test_build_geometry_is_deterministic() {
    let coords = [LngLat::new(-50.456, 10.123)];
    let first = build_geometry(&coords, Some(250.0)).unwrap();
    let second = build_geometry(&coords, Some(250.0)).unwrap();
    assert_eq!(first, second);
}
