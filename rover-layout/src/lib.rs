//! Rover Layout - Row/block geometry, scroll clamping and view virtualization
//! for server-defined screens.

pub mod engine;
pub mod error;
pub mod primitives;
pub mod scroll;
pub mod virtualize;

pub use engine::{
    BlockFrame, BlockProvider, DefaultMeasure, IntrinsicMeasure, LayoutEngine, ScreenLayout,
};
pub use error::LayoutError;
pub use primitives::{Point, Rect, Size};
pub use scroll::{ScrollAction, ScrollState};
pub use virtualize::{UpdateStats, ViewFactory, Virtualizer};
