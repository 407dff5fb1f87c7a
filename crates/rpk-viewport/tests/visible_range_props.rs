//! Property tests for visible range computation.

use proptest::prelude::*;
use rpk_viewport::{FixedSizeList, VisibleRange, visible_range};

fn inputs() -> impl Strategy<Value = (f64, f64, f64, usize, usize)> {
    (
        -1_000.0..2_000_000.0f64,
        0.0..5_000.0f64,
        1.0..500.0f64,
        1usize..20_000,
        0usize..8,
    )
}

fn intersects(index: usize, top: f64, height: f64, size: f64) -> bool {
    #[allow(clippy::cast_precision_loss)]
    let item_top = index as f64 * size;
    item_top < top + height && item_top + size > top
}

proptest! {
    #[test]
    fn range_stays_inside_list((top, height, size, count, overscan) in inputs()) {
        let range = visible_range(top, height, size, count, overscan).unwrap().unwrap();
        prop_assert!(range.start <= range.end);
        prop_assert!(range.end < count);
    }

    #[test]
    fn every_intersecting_item_is_in_range((top, height, size, count, overscan) in inputs()) {
        let range = visible_range(top, height, size, count, overscan).unwrap().unwrap();
        let top = top.max(0.0);
        let first = (top / size).floor() as usize;
        for index in first.saturating_sub(1)..(first + 64).min(count) {
            if intersects(index, top, height, size) {
                prop_assert!(range.contains(index), "{index} missing from {range}");
            }
        }
    }

    #[test]
    fn range_is_bounded_by_viewport_and_overscan((top, height, size, count, overscan) in inputs()) {
        let range = visible_range(top, height, size, count, overscan).unwrap().unwrap();
        // One partial row at each edge, plus a row of float rounding slack.
        let rows_on_screen = (height / size).ceil() as usize + 2;
        prop_assert!(range.count() <= rows_on_screen + 2 * overscan);
    }

    #[test]
    fn overscan_only_widens((top, height, size, count, overscan) in inputs()) {
        let tight = visible_range(top, height, size, count, 0).unwrap().unwrap();
        let wide = visible_range(top, height, size, count, overscan).unwrap().unwrap();
        prop_assert!(wide.start <= tight.start && tight.end <= wide.end);
        prop_assert!(tight.start - wide.start <= overscan);
        prop_assert!(wide.end - tight.end <= overscan);
    }

    #[test]
    fn list_matches_free_function(
        (top, height, size, count, overscan) in inputs(),
    ) {
        let mut list = FixedSizeList::new(count, size, height).unwrap().with_overscan(overscan);
        list.set_scroll_offset(top).unwrap();
        let expected = visible_range(list.scroll_offset(), height, size, count, overscan).unwrap();
        prop_assert_eq!(list.visible_range(), expected);
        prop_assert_eq!(list.items().count(), expected.map_or(0, |r: VisibleRange| r.count()));
    }
}

#[test]
fn feed_example_range() {
    let range = visible_range(3600.0, 600.0, 180.0, 10_000, 2).unwrap();
    assert_eq!(range, Some(VisibleRange::new(18, 25)));
}

#[test]
fn range_serializes_as_object() {
    let json = serde_json::to_value(VisibleRange::new(18, 25)).unwrap();
    assert_eq!(json, serde_json::json!({ "start": 18, "end": 25 }));
}
