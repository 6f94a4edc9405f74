use figurekit_designer::spatial_index::{Bounds, SpatialIndex};
use std::collections::HashSet;

fn working_area() -> Bounds {
    Bounds::new(-100.0, -100.0, 100.0, 100.0)
}

#[test]
fn test_bounds_geometry() {
    let bounds = Bounds::from_rect(10.0, 20.0, 30.0, 40.0);
    assert_eq!(bounds, Bounds::new(10.0, 20.0, 40.0, 60.0));
    assert_eq!(bounds.width(), 30.0);
    assert_eq!(bounds.height(), 40.0);
    assert_eq!(bounds.center(), (25.0, 40.0));

    let flipped = Bounds::from_corners(40.0, 60.0, 10.0, 20.0);
    assert_eq!(flipped, bounds);
    assert!(bounds.is_valid());
    assert!(!Bounds::new(1.0, 0.0, 0.0, 1.0).is_valid());
}

#[test]
fn test_bounds_predicates_are_inclusive() {
    let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
    assert!(a.contains_point(0.0, 0.0));
    assert!(a.contains_point(10.0, 10.0));
    assert!(!a.contains_point(10.01, 5.0));

    let edge = Bounds::new(10.0, 0.0, 20.0, 10.0);
    assert!(a.intersects(&edge));
    assert!(edge.intersects(&a));
    assert!(!a.intersects(&Bounds::new(10.5, 0.0, 20.0, 10.0)));

    assert!(a.contains_bounds(&Bounds::new(0.0, 0.0, 10.0, 10.0)));
    assert!(!a.contains_bounds(&Bounds::new(-1.0, 0.0, 5.0, 5.0)));
}

#[test]
fn test_bounds_from_points() {
    assert_eq!(Bounds::from_points(Vec::new()), None);
    let b = Bounds::from_points(vec![(3.0, -1.0), (-2.0, 4.0), (0.0, 0.0)]);
    assert_eq!(b, Some(Bounds::new(-2.0, -1.0, 3.0, 4.0)));
}

#[test]
fn test_spatial_index_starts_empty() {
    let index = SpatialIndex::new(working_area(), 8, 16);
    let stats = index.stats();
    assert_eq!(stats.total_nodes, 1);
    assert_eq!(stats.total_items, 0);
    assert!(index.is_empty());
    assert_eq!(index.root_bounds(), working_area());
}

#[test]
fn test_spatial_index_insert_and_query() {
    let mut index = SpatialIndex::new(working_area(), 8, 16);
    index.insert(0, &Bounds::new(0.0, 0.0, 10.0, 10.0));
    index.insert(1, &Bounds::new(5.0, 5.0, 15.0, 15.0));
    index.insert(2, &Bounds::new(50.0, 50.0, 60.0, 60.0));

    let hits: HashSet<u64> = index
        .query(&Bounds::new(7.0, 7.0, 12.0, 12.0))
        .into_iter()
        .collect();
    assert_eq!(hits, HashSet::from([0, 1]));
}

#[test]
fn test_spatial_index_query_point() {
    let mut index = SpatialIndex::new(working_area(), 8, 16);
    index.insert(0, &Bounds::new(0.0, 0.0, 10.0, 10.0));

    assert_eq!(index.query_point(5.0, 5.0), vec![0]);
    assert!(index.query_point(150.0, 150.0).is_empty());
}

#[test]
fn test_spatial_index_clear() {
    let mut index = SpatialIndex::new(working_area(), 8, 16);
    index.insert(0, &Bounds::new(0.0, 0.0, 10.0, 10.0));
    assert!(!index.query_point(5.0, 5.0).is_empty());

    index.clear();
    assert!(index.query_point(5.0, 5.0).is_empty());
    assert_eq!(index.root_bounds(), working_area());
    assert_eq!(index.stats().total_nodes, 1);
}

#[test]
fn test_spatial_index_splits_when_full() {
    let mut index = SpatialIndex::new(working_area(), 8, 16);
    for i in 0..20 {
        let v = i as f64 * 5.0 - 50.0;
        index.insert(i, &Bounds::new(v, v, v + 2.0, v + 2.0));
    }

    let stats = index.stats();
    assert!(stats.total_nodes > 1);
    assert!(stats.total_items >= 20);
    assert_eq!(stats.distinct_items, 20);
    assert!(stats.max_depth >= 1);
}

#[test]
fn test_spatial_index_respects_max_depth() {
    let mut index = SpatialIndex::new(working_area(), 2, 1);
    for i in 0..50 {
        index.insert(i, &Bounds::new(1.0, 1.0, 2.0, 2.0));
    }
    assert!(index.stats().max_depth <= 2);
    assert_eq!(index.query_point(1.5, 1.5).len(), 50);
}

#[test]
fn test_spatial_index_remove() {
    let mut index = SpatialIndex::new(working_area(), 8, 4);
    for i in 0..10 {
        let x = i as f64 * 10.0 - 50.0;
        index.insert(i, &Bounds::new(x, 0.0, x + 5.0, 5.0));
    }

    assert!(index.remove(3));
    assert!(!index.remove(3));
    assert!(!index.contains(3));
    assert_eq!(index.len(), 9);
    assert!(index.query_point(-18.0, 2.0).is_empty());
}

#[test]
fn test_spatial_index_stress() {
    let mut index = SpatialIndex::new(Bounds::new(-10000.0, -10000.0, 10000.0, 10000.0), 8, 16);
    let mut all = Vec::new();
    for i in 0..1000 {
        let x = ((i as f64) % 50.0) * 10.0;
        let y = ((i / 50) as f64) * 10.0;
        let bounds = Bounds::new(x, y, x + 5.0, y + 5.0);
        index.insert(i, &bounds);
        all.push((i, bounds));
    }

    let area = Bounds::new(0.0, 0.0, 100.0, 100.0);
    let mut hits = index.query(&area);
    hits.sort_unstable();
    let mut expected: Vec<u64> = all
        .iter()
        .filter(|(_, b)| b.intersects(&area))
        .map(|(id, _)| *id)
        .collect();
    expected.sort_unstable();
    assert_eq!(hits, expected);
}

#[test]
fn test_spatial_index_default_covers_large_coordinates() {
    let mut index = SpatialIndex::default();

    index.insert(1, &Bounds::new(1000.0, 1000.0, 1010.0, 1010.0));
    assert!(index.query_point(1005.0, 1005.0).contains(&1));

    index.insert(2, &Bounds::new(50000.0, -50000.0, 50010.0, -49990.0));
    assert!(index.query_point(50005.0, -49995.0).contains(&2));
    assert_eq!(index.stats().outside_items, 0);
}

#[test]
fn test_spatial_index_outside_root() {
    let mut index = SpatialIndex::new(Bounds::new(0.0, 0.0, 10.0, 10.0), 8, 16);
    index.insert(1, &Bounds::new(-5.0, -5.0, -1.0, -1.0));
    index.insert(2, &Bounds::new(2.0, 2.0, 3.0, 3.0));

    assert_eq!(index.query_point(-3.0, -3.0), vec![1]);
    let hits: HashSet<u64> = index
        .query(&Bounds::new(-10.0, -10.0, 10.0, 10.0))
        .into_iter()
        .collect();
    assert_eq!(hits, HashSet::from([1, 2]));
}

#[test]
fn test_bounds_json_round_trip() {
    let bounds = Bounds::new(-12.5, 3.0, 40.25, 9.75);
    let json = serde_json::to_string(&bounds).unwrap();
    assert!(json.contains("\"min_x\":-12.5"));

    let restored: Bounds = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, bounds);
}
