//! Layout of decoded screens.

use rover_api::{
    Alignment, Block, HorizontalAlignment, Offset, Row, Screen, Unit, VerticalAlignment,
};
use rover_layout::{LayoutEngine, Rect, ScrollState, Size};
use serde_json::json;

#[test]
fn fill_fill_block_in_fixed_row() {
    let screen: Screen = serde_json::from_value(json!({
        "id": "home",
        "rows": [{
            "height": {"type": "points", "value": 100},
            "blocks": [{
                "type": "text-block",
                "text": "Hello",
                "alignment": {"horizontal": "fill", "vertical": "fill"}
            }]
        }]
    }))
    .unwrap();

    let layout = LayoutEngine::new(1.0)
        .with_provider(&screen)
        .layout(Size::new(300.0, 500.0))
        .unwrap();
    assert_eq!(layout.frames[0].rect, Rect::new(0.0, 0.0, 300.0, 100.0));
}

#[test]
fn fill_width_matches_offsets() {
    let widths = [120.0f32, 320.0, 411.0, 1024.0];
    let offsets = [
        (Unit::Points(0.0), Unit::Points(0.0)),
        (Unit::Points(16.0), Unit::Points(8.0)),
        (Unit::Percentage(10.0), Unit::Points(4.0)),
        (Unit::Percentage(5.0), Unit::Percentage(12.5)),
    ];
    let density = 2.0;

    for &parent in &widths {
        for &(left, right) in &offsets {
            let block = Block::text("x")
                .with_size(Some(Unit::Points(10.0)), Some(Unit::Points(10.0)))
                .with_alignment(Alignment::new(HorizontalAlignment::Fill, VerticalAlignment::Top))
                .with_offset(Offset {
                    left,
                    right,
                    ..Offset::default()
                });
            let rect = LayoutEngine::new(density).block_rect(&block, parent, 50.0);
            let expected =
                parent - left.resolve(parent, density) - right.resolve(parent, density);
            assert!((rect.width - expected).abs() < 1e-3, "{parent} {left:?} {right:?}");
        }
    }
}

#[test]
fn scroll_window_over_decoded_screen() {
    let rows: Vec<Row> = (0..4)
        .map(|i| {
            Row::new(vec![Block::text(format!("row {i}"))
                .with_size(None, Some(Unit::Points(150.0)))])
        })
        .collect();
    let layout = LayoutEngine::new(1.0)
        .with_provider(&rows)
        .layout(Size::new(360.0, 400.0))
        .unwrap();
    assert_eq!(layout.bottom_limit, 600.0);

    let mut scroll = ScrollState::for_layout(&layout);
    assert_eq!(scroll.scroll_by(500.0), 200.0);
    let (top, bottom) = scroll.window();
    let visible: Vec<_> = layout.visible(top, bottom).collect();
    assert_eq!(visible, vec![1, 2, 3]);
}
