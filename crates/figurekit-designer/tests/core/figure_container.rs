use crate::support::{ids, Shape};
use figurekit_designer::{Bounds, Figure, FigureContainer, SpatialIndex};
use std::thread;

fn abc() -> FigureContainer<Shape> {
    let mut container = FigureContainer::new();
    container.add(Shape::rect(1, 0.0, 0.0, 10.0, 10.0));
    container.add(Shape::rect(2, 5.0, 5.0, 10.0, 10.0));
    container.add(Shape::rect(3, 20.0, 20.0, 10.0, 10.0));
    container
}

fn z_values(container: &FigureContainer<Shape>) -> Vec<i64> {
    container
        .figure_ids()
        .into_iter()
        .filter_map(|id| container.z_value(id))
        .collect()
}

#[test]
fn test_add_assigns_increasing_z() {
    let container = abc();
    assert_eq!(container.len(), 3);
    assert_eq!(container.figure_ids(), vec![1, 2, 3]);
    assert_eq!(z_values(&container), vec![1, 2, 3]);
    assert_eq!(container.highest_z(), 3);
    assert_eq!(container.lowest_z(), 0);
}

#[test]
fn test_add_is_idempotent() {
    let mut container = abc();
    let stored = container.add(Shape::rect(2, 99.0, 99.0, 1.0, 1.0));
    assert_eq!(stored.rect, Bounds::from_rect(5.0, 5.0, 10.0, 10.0));

    assert_eq!(container.len(), 3);
    assert_eq!(container.figure_ids(), vec![1, 2, 3]);
    assert_eq!(container.highest_z(), 3);
}

#[test]
fn test_add_attaches_figure() {
    let container = abc();
    for figure in container.figures() {
        assert_eq!(figure.owner, Some(container.id()));
    }
}

#[test]
fn test_send_to_layer_forward() {
    let mut container = abc();
    assert!(container.send_to_layer(1, 2));

    assert_eq!(container.figure_ids(), vec![2, 3, 1]);
    assert_eq!(container.z_value(2), Some(1));
    assert_eq!(container.z_value(3), Some(2));
    assert_eq!(container.z_value(1), Some(3));
}

#[test]
fn test_send_to_layer_backward() {
    let mut container = abc();
    assert!(container.send_to_layer(3, 0));

    assert_eq!(container.figure_ids(), vec![3, 1, 2]);
    assert_eq!(z_values(&container), vec![1, 2, 3]);
}

#[test]
fn test_send_to_layer_clamps() {
    let mut container = abc();
    assert!(container.send_to_layer(1, 42));
    assert_eq!(container.figure_ids(), vec![2, 3, 1]);

    assert!(container.send_to_layer(1, -7));
    assert_eq!(container.figure_ids(), vec![1, 2, 3]);
    assert_eq!(z_values(&container), vec![1, 2, 3]);

    assert!(container.send_to_layer(2, 1));
    assert_eq!(container.figure_ids(), vec![1, 2, 3]);
    assert!(!container.send_to_layer(9, 0));
}

#[test]
fn test_send_to_back_and_bring_to_front() {
    let mut container = abc();

    assert!(container.send_to_back(3));
    assert_eq!(container.figure_ids(), vec![3, 1, 2]);
    assert_eq!(container.z_value(3), Some(-1));
    assert_eq!(container.lowest_z(), -1);

    assert!(container.bring_to_front(1));
    assert_eq!(container.figure_ids(), vec![3, 2, 1]);
    assert_eq!(container.z_value(1), Some(4));
    assert_eq!(container.highest_z(), 4);

    assert!(!container.send_to_back(42));
    assert!(!container.bring_to_front(42));
}

#[test]
fn test_layers() {
    let container = abc();
    assert_eq!(container.get_layer(1), Some(0));
    assert_eq!(container.get_layer(3), Some(2));
    assert_eq!(container.get_layer(7), None);
    assert_eq!(container.figure_from_layer(1).map(|f| f.id), Some(2));
    assert!(container.figure_from_layer(3).is_none());
}

#[test]
fn test_reverse_traversal() {
    let container = abc();
    assert_eq!(ids(container.figures()), vec![1, 2, 3]);
    assert_eq!(ids(container.figures_reverse()), vec![3, 2, 1]);
    assert_eq!(ids(container.iter().rev()), vec![3, 2, 1]);
}

#[test]
fn test_remove_detaches() {
    let mut container = abc();
    let removed = container.remove(2).unwrap();
    assert_eq!(removed.id, 2);
    assert_eq!(removed.owner, None);
    assert_eq!(container.figure_ids(), vec![1, 3]);
    assert!(container.remove(2).is_none());
}

#[test]
fn test_orphan_keeps_owner() {
    let mut container = abc();
    let owner = container.id();
    let orphan = container.orphan(1).unwrap();
    assert_eq!(orphan.owner, Some(owner));
    assert!(!container.contains(1));
    assert!(container.orphan(1).is_none());
}

#[test]
fn test_remove_all_resets_z() {
    let mut container = abc();
    container.send_to_back(2);

    let removed = container.remove_all();
    assert_eq!(ids(&removed), vec![2, 1, 3]);
    assert!(removed.iter().all(|f| f.owner.is_none()));
    assert!(container.is_empty());
    assert_eq!(container.lowest_z(), 0);
    assert_eq!(container.highest_z(), 0);

    container.add(Shape::rect(5, 0.0, 0.0, 1.0, 1.0));
    assert_eq!(container.z_value(5), Some(1));
}

#[test]
fn test_replace_keeps_slot_and_z() {
    let mut container = abc();
    container.init_index(Bounds::new(-100.0, -100.0, 100.0, 100.0));

    let old = container
        .replace(2, Shape::rect(20, 60.0, 60.0, 5.0, 5.0))
        .unwrap();
    assert_eq!(old.id, 2);
    assert_eq!(old.owner, None);

    assert_eq!(container.figure_ids(), vec![1, 20, 3]);
    assert_eq!(container.z_value(20), Some(2));
    assert_eq!(container.get(20).and_then(|f| f.owner), Some(container.id()));

    let near_old = container.figures_in_range(&Bounds::new(12.0, 12.0, 14.0, 14.0));
    assert!(near_old.is_empty());
    let near_new = container.figures_in_range(&Bounds::new(61.0, 61.0, 62.0, 62.0));
    assert_eq!(ids(near_new), vec![20]);
}

#[test]
fn test_replace_rejects_missing_or_colliding() {
    let mut container = abc();

    let rejected = container.replace(9, Shape::rect(10, 0.0, 0.0, 1.0, 1.0));
    assert_eq!(rejected.map_err(|f| f.id), Err(10));

    let rejected = container.replace(1, Shape::rect(3, 0.0, 0.0, 1.0, 1.0));
    assert_eq!(rejected.map_err(|f| f.id), Err(3));
    assert_eq!(container.figure_ids(), vec![1, 2, 3]);

    // Same id is a plain swap.
    let old = container.replace(1, Shape::rect(1, 40.0, 40.0, 1.0, 1.0));
    assert!(old.is_ok());
    assert_eq!(container.get(1).map(|f| f.rect.min_x), Some(40.0));
}

#[test]
fn test_figures_in_range_is_sorted_by_z() {
    let mut container = abc();
    container.init_index(Bounds::new(-100.0, -100.0, 100.0, 100.0));
    container.send_to_back(2);

    let hits = container.figures_in_range(&Bounds::new(6.0, 6.0, 8.0, 8.0));
    assert_eq!(ids(hits), vec![2, 1]);

    let all = container.figures_in_range(&Bounds::new(-100.0, -100.0, 100.0, 100.0));
    assert_eq!(ids(all), vec![2, 1, 3]);
}

#[test]
fn test_figures_in_range_without_index() {
    let container = abc();
    assert!(!container.has_index());

    let hits = container.figures_in_range(&Bounds::new(6.0, 6.0, 8.0, 8.0));
    assert_eq!(ids(hits), vec![1, 2]);
    assert!(container
        .figures_in_range(&Bounds::new(50.0, 50.0, 51.0, 51.0))
        .is_empty());
}

#[test]
fn test_init_index_picks_up_existing_figures() {
    let mut container = abc();
    container.init_index(Bounds::new(-100.0, -100.0, 100.0, 100.0));
    let stats = container.index_stats().unwrap();
    assert_eq!(stats.distinct_items, 3);

    let custom = FigureContainer::<Shape>::with_index(SpatialIndex::new(
        Bounds::new(0.0, 0.0, 10.0, 10.0),
        4,
        2,
    ));
    assert!(custom.has_index());
    assert_eq!(custom.index_stats().map(|s| s.distinct_items), Some(0));
}

#[test]
fn test_modify_reindexes() {
    let mut container = abc();
    container.init_index(Bounds::new(-100.0, -100.0, 100.0, 100.0));

    let moved = container.modify(3, |f| {
        f.rect = Bounds::from_rect(-50.0, -50.0, 5.0, 5.0);
        f.id()
    });
    assert_eq!(moved, Some(3));

    assert!(container
        .figures_in_range(&Bounds::new(21.0, 21.0, 22.0, 22.0))
        .is_empty());
    let hits = container.figures_in_range(&Bounds::new(-48.0, -48.0, -47.0, -47.0));
    assert_eq!(ids(hits), vec![3]);
    assert!(container.modify(42, |_| ()).is_none());
}

#[test]
fn test_drawing_bounds() {
    let container = abc();
    assert_eq!(
        container.drawing_bounds(),
        Some(Bounds::new(0.0, 0.0, 30.0, 30.0))
    );
    assert_eq!(FigureContainer::<Shape>::new().drawing_bounds(), None);
}

#[test]
fn test_shared_container_across_threads() {
    let shared = FigureContainer::<Shape>::new().into_shared();

    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..25u64 {
                    let id = t * 100 + i;
                    let mut container = shared.lock();
                    container.add(Shape::rect(id, i as f64, t as f64, 1.0, 1.0));
                    if i % 5 == 0 {
                        container.send_to_back(id);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let container = shared.lock();
    assert_eq!(container.len(), 100);
    let zs = z_values(&container);
    assert!(zs.windows(2).all(|w| w[0] < w[1]));
}
