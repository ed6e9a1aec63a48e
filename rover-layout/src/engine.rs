//! Declarative Layout Engine.
//!
//! Pulls rows from a [`BlockProvider`] and computes one absolute rectangle
//! per block, top to bottom:
//!
//! 1. Row height: an explicit `height` resolves against the viewport height.
//!    Otherwise it is the sum of `offset.top + height + offset.bottom` over
//!    the stacked blocks, each resolved against a parent extent of 0.
//! 2. Block rectangle: the horizontal rule runs against the viewport width,
//!    the vertical rule against the row height.
//! 3. Stacking: stacked blocks move down by the row top plus everything
//!    stacked before them in the row. Floating blocks sit at the row top.
//! 4. `bottom_limit` is the lowest block edge on the screen.

use rover_api::{
    Block, BlockKind, BlockKindTag, HorizontalAlignment, Position, Row, Screen, Unit,
    VerticalAlignment,
};
use tracing::debug;

use crate::error::LayoutError;
use crate::primitives::{Point, Rect, Size};

/// Source of rows, pulled on demand.
pub trait BlockProvider {
    fn row_count(&self) -> usize;
    fn row(&self, index: usize) -> Option<&Row>;
}

impl BlockProvider for Screen {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }
}

impl BlockProvider for [Row] {
    fn row_count(&self) -> usize {
        self.len()
    }

    fn row(&self, index: usize) -> Option<&Row> {
        self.get(index)
    }
}

impl BlockProvider for Vec<Row> {
    fn row_count(&self) -> usize {
        self.len()
    }

    fn row(&self, index: usize) -> Option<&Row> {
        self.get(index)
    }
}

/// Height of a block that declares none (text runs, images).
pub trait IntrinsicMeasure {
    /// `width` is the block's resolved width in pixels.
    fn height(&self, block: &Block, width: f32, density: f32) -> f32;
}

/// Images keep their aspect ratio; everything else collapses to 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMeasure;

impl IntrinsicMeasure for DefaultMeasure {
    fn height(&self, block: &Block, width: f32, _density: f32) -> f32 {
        match &block.kind {
            BlockKind::Image(image) => image
                .image
                .as_ref()
                .and_then(|img| img.aspect_ratio())
                .map_or(0.0, |ratio| width * ratio),
            BlockKind::Text(_)
            | BlockKind::Button(_)
            | BlockKind::Web(_)
            | BlockKind::Barcode(_) => 0.0,
        }
    }
}

static DEFAULT_MEASURE: DefaultMeasure = DefaultMeasure;

/// One laid-out block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockFrame {
    pub row: usize,
    pub block: usize,
    pub kind: BlockKindTag,
    pub position: Position,
    pub rect: Rect,
}

/// Result of laying out a whole screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLayout {
    pub viewport: Size,
    /// One rect per row, in row order.
    pub rows: Vec<Rect>,
    /// Blocks in row order, then block order.
    pub frames: Vec<BlockFrame>,
    /// Scrollable content height.
    pub bottom_limit: f32,
}

impl ScreenLayout {
    /// Largest valid scroll offset.
    pub fn max_scroll(&self) -> f32 {
        (self.bottom_limit - self.viewport.height).max(0.0)
    }

    /// Indices of frames overlapping the vertical window `[top, bottom)`.
    pub fn visible(&self, top: f32, bottom: f32) -> impl Iterator<Item = usize> + '_ {
        self.frames
            .iter()
            .enumerate()
            .filter(move |(_, frame)| frame.rect.intersects_y(top, bottom))
            .map(|(index, _)| index)
    }

    pub fn frames_in_row(&self, row: usize) -> impl Iterator<Item = &BlockFrame> + '_ {
        self.frames.iter().filter(move |frame| frame.row == row)
    }
}

/// Computes block rectangles for a provider's rows.
///
/// Not meant to be shared across threads; drive it from the thread that owns
/// the viewport.
pub struct LayoutEngine<'a> {
    provider: Option<&'a dyn BlockProvider>,
    measure: &'a dyn IntrinsicMeasure,
    density: f32,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(density: f32) -> Self {
        Self {
            provider: None,
            measure: &DEFAULT_MEASURE,
            density,
        }
    }

    pub fn with_provider(mut self, provider: &'a dyn BlockProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_measure(mut self, measure: &'a dyn IntrinsicMeasure) -> Self {
        self.measure = measure;
        self
    }

    pub fn set_provider(&mut self, provider: &'a dyn BlockProvider) {
        self.provider = Some(provider);
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn layout(&self, viewport: Size) -> Result<ScreenLayout, LayoutError> {
        let provider = self.provider.ok_or(LayoutError::MissingProvider)?;
        let count = provider.row_count();

        let mut rows = Vec::with_capacity(count);
        let mut frames = Vec::new();
        let mut row_top = 0.0f32;
        let mut bottom_limit = 0.0f32;

        for index in 0..count {
            let row = provider
                .row(index)
                .ok_or(LayoutError::RowOutOfRange { index, count })?;
            let row_height = self.row_height(row, viewport);

            let mut stacked = 0.0f32;
            for (block_index, block) in row.blocks.iter().enumerate() {
                let local = self.block_rect(block, viewport.width, row_height);
                let rect = match block.position {
                    Position::Floating => local.translate(Point::new(0.0, row_top)),
                    Position::Stacked => {
                        let rect = local.translate(Point::new(0.0, row_top + stacked));
                        stacked += self.resolve_y(block.offset.top, row_height)
                            + local.height
                            + self.resolve_y(block.offset.bottom, row_height);
                        rect
                    }
                };

                bottom_limit = bottom_limit.max(rect.bottom());
                frames.push(BlockFrame {
                    row: index,
                    block: block_index,
                    kind: block.kind.tag(),
                    position: block.position,
                    rect,
                });
            }

            rows.push(Rect::new(0.0, row_top, viewport.width, row_height));
            row_top += row_height;
        }

        debug!(
            rows = rows.len(),
            blocks = frames.len(),
            bottom_limit,
            "laid out screen"
        );
        Ok(ScreenLayout {
            viewport,
            rows,
            frames,
            bottom_limit,
        })
    }

    /// Explicit heights resolve against the viewport; auto rows add up their
    /// stacked blocks with every unit resolved against 0.
    pub fn row_height(&self, row: &Row, viewport: Size) -> f32 {
        if let Some(height) = row.height {
            return height.resolve(viewport.height, self.density);
        }
        row.blocks
            .iter()
            .filter(|block| !block.is_floating())
            .map(|block| {
                let width = self.block_width(block, viewport.width);
                self.resolve_y(block.offset.top, 0.0)
                    + self.block_height(block, width, 0.0)
                    + self.resolve_y(block.offset.bottom, 0.0)
            })
            .sum()
    }

    /// Rectangle relative to the row's top-left corner.
    pub fn block_rect(&self, block: &Block, parent_width: f32, row_height: f32) -> Rect {
        let offset = &block.offset;
        let width = self.block_width(block, parent_width);
        let (left, right) = match block.alignment.horizontal {
            HorizontalAlignment::Fill => (
                self.resolve_x(offset.left, parent_width),
                parent_width - self.resolve_x(offset.right, parent_width),
            ),
            HorizontalAlignment::Left => {
                let left = self.resolve_x(offset.left, parent_width);
                (left, left + width)
            }
            HorizontalAlignment::Right => {
                let right = parent_width - self.resolve_x(offset.right, parent_width);
                (right - width, right)
            }
            HorizontalAlignment::Center => {
                let left =
                    (parent_width - width) / 2.0 + self.resolve_x(offset.center, parent_width);
                (left, left + width)
            }
        };

        let height = self.block_height(block, right - left, row_height);
        let (top, bottom) = match block.alignment.vertical {
            VerticalAlignment::Fill => (
                self.resolve_y(offset.top, row_height),
                row_height - self.resolve_y(offset.bottom, row_height),
            ),
            VerticalAlignment::Top => {
                let top = self.resolve_y(offset.top, row_height);
                (top, top + height)
            }
            VerticalAlignment::Bottom => {
                let bottom = row_height - self.resolve_y(offset.bottom, row_height);
                (bottom - height, bottom)
            }
            VerticalAlignment::Middle => {
                let top = (row_height - height) / 2.0 + self.resolve_y(offset.middle, row_height);
                (top, top + height)
            }
        };

        Rect::from_edges(left, top, right, bottom)
    }

    /// A missing width stretches between the horizontal offsets.
    fn block_width(&self, block: &Block, parent_width: f32) -> f32 {
        match block.width {
            Some(width) => width.resolve(parent_width, self.density),
            None => {
                parent_width
                    - self.resolve_x(block.offset.left, parent_width)
                    - self.resolve_x(block.offset.right, parent_width)
            }
        }
    }

    fn block_height(&self, block: &Block, width: f32, row_height: f32) -> f32 {
        match block.height {
            Some(height) => height.resolve(row_height, self.density),
            None => self.measure.height(block, width, self.density),
        }
    }

    #[inline]
    fn resolve_x(&self, unit: Unit, parent_width: f32) -> f32 {
        unit.resolve(parent_width, self.density)
    }

    #[inline]
    fn resolve_y(&self, unit: Unit, row_height: f32) -> f32 {
        unit.resolve(row_height, self.density)
    }
}
