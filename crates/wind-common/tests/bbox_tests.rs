//! Tests for BoundingBox parsing, validation and snapping.

use wind_common::bbox::{BboxParseError, BoundingBox};

// ============================================================================
// Parsing tests
// ============================================================================

#[test]
fn test_parse_integer_bbox() {
    let bbox = BoundingBox::from_query_string("0,0,10,10").unwrap();
    assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 10.0, 10.0));
}

#[test]
fn test_parse_with_whitespace() {
    let bbox = BoundingBox::from_query_string(" 79.5, 5.9 ,82.0,10.0 ").unwrap();
    assert_eq!(bbox.min_lat, 5.9);
    assert_eq!(bbox.max_lon, 82.0);
}

#[test]
fn test_parse_wrong_arity() {
    let err = BoundingBox::from_query_string("1,2,3").unwrap_err();
    assert!(matches!(err, BboxParseError::InvalidFormat(_)));
}

#[test]
fn test_parse_bad_number() {
    let err = BoundingBox::from_query_string("1,2,east,4").unwrap_err();
    assert_eq!(err, BboxParseError::InvalidNumber("east".to_string()));
}

// ============================================================================
// Validation tests
// ============================================================================

#[test]
fn test_longitude_out_of_range() {
    let err = BoundingBox::from_query_string("-190,0,10,10").unwrap_err();
    assert!(matches!(err, BboxParseError::OutOfRange(_)));
}

#[test]
fn test_latitude_out_of_range() {
    let err = BoundingBox::from_query_string("0,-95,10,10").unwrap_err();
    assert!(matches!(err, BboxParseError::OutOfRange(_)));
}

#[test]
fn test_inverted_bbox() {
    assert_eq!(
        BoundingBox::from_query_string("10,0,0,10").unwrap_err(),
        BboxParseError::Inverted
    );
    assert_eq!(
        BoundingBox::from_query_string("0,5,10,5").unwrap_err(),
        BboxParseError::Inverted
    );
}

#[test]
fn test_non_finite() {
    assert_eq!(
        BoundingBox::try_new(f64::NAN, 0.0, 1.0, 1.0).unwrap_err(),
        BboxParseError::NonFinite
    );
}

#[test]
fn test_full_globe_is_valid() {
    assert!(BoundingBox::try_new(-180.0, -90.0, 180.0, 90.0).is_ok());
}

// ============================================================================
// Geometry tests
// ============================================================================

#[test]
fn test_contains_point_edges() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(bbox.contains_point(0.0, 10.0));
    assert!(!bbox.contains_point_strict(0.0, 5.0));
    assert!(bbox.contains_point_strict(0.1, 5.0));
    assert!(!bbox.contains_point(10.1, 5.0));
}

#[test]
fn test_center_and_size() {
    let bbox = BoundingBox::new(79.5, 5.9, 82.0, 10.0);
    let (lon, lat) = bbox.center();
    assert!((lon - 80.75).abs() < 1e-12);
    assert!((lat - 7.95).abs() < 1e-12);
    assert!((bbox.width() - 2.5).abs() < 1e-12);
    assert!((bbox.height() - 4.1).abs() < 1e-12);
}

#[test]
fn test_disjoint_intersection_is_none() {
    let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
    let b = BoundingBox::new(2.0, 2.0, 3.0, 3.0);
    assert!(a.intersection(&b).is_none());
}

// ============================================================================
// Snapping tests
// ============================================================================

#[test]
fn test_snap_same_cell_same_result() {
    let a = BoundingBox::new(79.51, 5.91, 81.99, 9.99);
    let b = BoundingBox::new(79.74, 5.62, 81.51, 9.51);
    assert_eq!(a.snap(0.5), b.snap(0.5));
}

#[test]
fn test_snap_clamps_to_globe() {
    let bbox = BoundingBox::new(-179.9, -89.9, 179.9, 89.9);
    assert_eq!(bbox.snap(1.0), BoundingBox::new(-180.0, -90.0, 180.0, 90.0));
}

#[test]
fn test_snap_aligned_bbox_unchanged() {
    let bbox = BoundingBox::new(79.5, 5.5, 82.0, 10.0);
    assert_eq!(bbox.snap(0.5), bbox);
}

#[test]
fn test_snap_non_positive_grid_is_identity() {
    let bbox = BoundingBox::new(1.23, 4.56, 7.89, 10.11);
    assert_eq!(bbox.snap(0.0), bbox);
}
