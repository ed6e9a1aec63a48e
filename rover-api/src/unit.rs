//! Lengths, alignment and offsets for server-defined layouts.

use serde::{Deserialize, Serialize};

/// A length expressed either in device-independent points or as a
/// percentage of the immediate parent extent.
///
/// Wire shape: `{"type": "points", "value": 12}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Unit {
    Points(f64),
    Percentage(f64),
}

impl Unit {
    pub const ZERO: Self = Unit::Points(0.0);

    /// Resolve to a pixel length.
    ///
    /// Points scale with `density`; percentages are density-independent and
    /// always relative to `parent_extent`. The stored value keeps full
    /// precision; only the resolved pixel length is narrowed.
    #[inline]
    pub fn resolve(&self, parent_extent: f32, density: f32) -> f32 {
        let pixels = match *self {
            Unit::Points(value) => value * f64::from(density),
            Unit::Percentage(value) => value * f64::from(parent_extent) / 100.0,
        };
        pixels as f32
    }

    pub fn value(&self) -> f64 {
        match *self {
            Unit::Points(value) | Unit::Percentage(value) => value,
        }
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::ZERO
    }
}

/// Horizontal anchoring of a block within its row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
    Fill,
}

/// Vertical anchoring of a block within its row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlignment {
    #[default]
    Top,
    Middle,
    Bottom,
    Fill,
}

/// Which edges of a block are anchored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alignment {
    #[serde(default)]
    pub horizontal: HorizontalAlignment,
    #[serde(default)]
    pub vertical: VerticalAlignment,
}

impl Alignment {
    pub const fn new(horizontal: HorizontalAlignment, vertical: VerticalAlignment) -> Self {
        Self { horizontal, vertical }
    }

    /// Fill on both axes.
    pub const fn fill() -> Self {
        Self::new(HorizontalAlignment::Fill, VerticalAlignment::Fill)
    }
}

/// Insets and adjustments applied relative to the alignment anchors.
///
/// `center` shifts a horizontally centered block, `middle` a vertically
/// centered one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    #[serde(default)]
    pub top: Unit,
    #[serde(default)]
    pub right: Unit,
    #[serde(default)]
    pub bottom: Unit,
    #[serde(default)]
    pub left: Unit,
    #[serde(default)]
    pub center: Unit,
    #[serde(default)]
    pub middle: Unit,
}

impl Offset {
    /// Uniform points inset on the four edges.
    pub fn all(points: f64) -> Self {
        let unit = Unit::Points(points);
        Self {
            top: unit,
            right: unit,
            bottom: unit,
            left: unit,
            ..Self::default()
        }
    }
}
