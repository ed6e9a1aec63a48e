//! Virtualizer - attaches host views only for frames inside the scroll window.
//!
//! Frames that leave the window are detached into a recycle pool keyed by
//! block kind and reused for the next frame of the same kind. Geometry
//! comes from the [`ScreenLayout`] untouched.

use std::collections::{BTreeMap, HashMap};

use rover_api::BlockKindTag;
use tracing::trace;

use crate::engine::{BlockFrame, ScreenLayout};
use crate::scroll::ScrollState;

/// Host hooks for creating and binding views.
pub trait ViewFactory {
    type View;

    fn create(&mut self, kind: BlockKindTag) -> Self::View;

    /// Point a view at a frame. Called on every attach, fresh or recycled.
    fn bind(&mut self, view: &mut Self::View, index: usize, frame: &BlockFrame);

    /// Called when a view goes back to the pool.
    fn unbind(&mut self, _view: &mut Self::View) {}
}

/// Counters from one [`Virtualizer::update`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    pub attached: usize,
    pub detached: usize,
    pub created: usize,
    pub reused: usize,
}

pub struct Virtualizer<F: ViewFactory> {
    factory: F,
    /// Frame index -> (kind, view).
    attached: BTreeMap<usize, (BlockKindTag, F::View)>,
    pool: HashMap<BlockKindTag, Vec<F::View>>,
}

impl<F: ViewFactory> Virtualizer<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            attached: BTreeMap::new(),
            pool: HashMap::new(),
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Attached frame indices, ascending.
    pub fn attached(&self) -> impl Iterator<Item = usize> + '_ {
        self.attached.keys().copied()
    }

    pub fn view(&self, index: usize) -> Option<&F::View> {
        self.attached.get(&index).map(|(_, view)| view)
    }

    pub fn pooled(&self, kind: BlockKindTag) -> usize {
        self.pool.get(&kind).map_or(0, Vec::len)
    }

    /// Reconcile attached views with the current scroll window.
    pub fn update(&mut self, layout: &ScreenLayout, scroll: &ScrollState) -> UpdateStats {
        let (top, bottom) = scroll.window();
        let visible: Vec<usize> = layout.visible(top, bottom).collect();
        let mut stats = UpdateStats::default();

        let gone: Vec<usize> = self
            .attached
            .keys()
            .copied()
            .filter(|index| visible.binary_search(index).is_err())
            .collect();
        for index in gone {
            if let Some((kind, mut view)) = self.attached.remove(&index) {
                self.factory.unbind(&mut view);
                self.pool.entry(kind).or_default().push(view);
                stats.detached += 1;
            }
        }

        for index in visible {
            if self.attached.contains_key(&index) {
                continue;
            }
            let frame = &layout.frames[index];
            let mut view = match self.pool.get_mut(&frame.kind).and_then(Vec::pop) {
                Some(view) => {
                    stats.reused += 1;
                    view
                }
                None => {
                    stats.created += 1;
                    self.factory.create(frame.kind)
                }
            };
            self.factory.bind(&mut view, index, frame);
            self.attached.insert(index, (frame.kind, view));
            stats.attached += 1;
        }

        trace!(?stats, top, bottom, "virtualizer pass");
        stats
    }

    /// Detach everything, e.g. before switching to a new layout.
    pub fn detach_all(&mut self) {
        let attached = std::mem::take(&mut self.attached);
        for (_, (kind, mut view)) in attached {
            self.factory.unbind(&mut view);
            self.pool.entry(kind).or_default().push(view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LayoutEngine;
    use crate::primitives::Size;
    use rover_api::{Block, Image, Row, Unit};

    #[derive(Default)]
    struct Recorder {
        next_id: usize,
        bound: Vec<(usize, usize)>,
    }

    impl ViewFactory for Recorder {
        type View = usize;

        fn create(&mut self, _kind: BlockKindTag) -> usize {
            self.next_id += 1;
            self.next_id
        }

        fn bind(&mut self, view: &mut usize, index: usize, _frame: &BlockFrame) {
            self.bound.push((*view, index));
        }
    }

    fn tall_screen() -> Vec<Row> {
        (0..10)
            .map(|_| {
                Row::new(vec![Block::text("t").with_size(None, Some(Unit::Points(100.0)))])
            })
            .collect()
    }

    #[test]
    fn attaches_only_visible_frames() {
        let rows = tall_screen();
        let layout = LayoutEngine::new(1.0)
            .with_provider(&rows)
            .layout(Size::new(100.0, 250.0))
            .unwrap();
        let mut scroll = ScrollState::for_layout(&layout);
        let mut virt = Virtualizer::new(Recorder::default());

        let stats = virt.update(&layout, &scroll);
        assert_eq!(virt.attached().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(stats.created, 3);

        scroll.scroll_by(300.0);
        let stats = virt.update(&layout, &scroll);
        assert_eq!(virt.attached().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(stats.detached, 3);
        assert_eq!(stats.reused, 3);
        assert_eq!(stats.created, 0);
        assert_eq!(virt.pooled(BlockKindTag::Text), 0);
    }

    #[test]
    fn pool_is_keyed_by_kind() {
        let rows = vec![
            Row::new(vec![Block::text("t").with_size(None, Some(Unit::Points(100.0)))]),
            Row::new(vec![Block::image(Image {
                url: "https://cdn.rover.io/a.png".into(),
                width: 1.0,
                height: 1.0,
            })
            .with_size(None, Some(Unit::Points(100.0)))]),
        ];
        let layout = LayoutEngine::new(1.0)
            .with_provider(&rows)
            .layout(Size::new(100.0, 100.0))
            .unwrap();
        let mut scroll = ScrollState::for_layout(&layout);
        let mut virt = Virtualizer::new(Recorder::default());

        virt.update(&layout, &scroll);
        scroll.scroll_by(100.0);
        let stats = virt.update(&layout, &scroll);

        // The text view is pooled but cannot serve an image frame.
        assert_eq!(stats.created, 1);
        assert_eq!(stats.reused, 0);
        assert_eq!(virt.pooled(BlockKindTag::Text), 1);
        assert_eq!(virt.view(1), Some(&2));
    }

    #[test]
    fn zero_height_frame_at_window_top_is_attached() {
        // No height under the default measure collapses text to 0.
        let rows = vec![Row::new(vec![Block::text("empty")])];
        let layout = LayoutEngine::new(1.0)
            .with_provider(&rows)
            .layout(Size::new(100.0, 100.0))
            .unwrap();
        assert_eq!(layout.frames[0].rect.height, 0.0);

        let scroll = ScrollState::for_layout(&layout);
        let mut virt = Virtualizer::new(Recorder::default());
        let stats = virt.update(&layout, &scroll);
        assert_eq!(stats.attached, 1);
        assert_eq!(virt.attached().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn virtualization_does_not_touch_geometry() {
        let rows = tall_screen();
        let layout = LayoutEngine::new(1.0)
            .with_provider(&rows)
            .layout(Size::new(100.0, 250.0))
            .unwrap();
        let before = layout.clone();
        let mut scroll = ScrollState::for_layout(&layout);
        let mut virt = Virtualizer::new(Recorder::default());
        for _ in 0..5 {
            virt.update(&layout, &scroll);
            scroll.scroll_by(170.0);
        }
        virt.detach_all();
        assert_eq!(layout, before);
        assert_eq!(virt.attached().count(), 0);
        assert!(virt.factory().bound.len() >= 3);
    }
}
