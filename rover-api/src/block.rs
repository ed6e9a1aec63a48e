//! Blocks: the smallest positionable unit inside a screen.
//!
//! Every block shares the same placement fields (position, size,
//! alignment, offset, appearance) and carries a closed [`BlockKind`]
//! payload for the variant-specific content.

use serde::{Deserialize, Serialize};

use crate::screen::Action;
use crate::unit::{Alignment, Offset, Unit};

/// Flow vs. absolute positioning within a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Contributes to the row's cumulative height.
    #[default]
    Stacked,
    /// Overlays the row, no height contribution.
    Floating,
}

/// RGBA color. Channels are 0-255, alpha is 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    #[serde(default = "opaque")]
    pub alpha: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0.0);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 1.0);
    pub const WHITE: Self = Self::rgba(255, 255, 255, 1.0);

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: f32) -> Self {
        Self { red, green, blue, alpha }
    }

    /// Pack as `0xAARRGGBB`.
    pub fn to_argb(&self) -> u32 {
        let a = (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u32;
        (a << 24) | ((self.red as u32) << 16) | ((self.green as u32) << 8) | self.blue as u32
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::TRANSPARENT
    }
}

/// Background and border styling shared by every block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Appearance {
    #[serde(default)]
    pub background_color: Color,
    #[serde(default)]
    pub border_color: Color,
    #[serde(default)]
    pub border_radius: f32,
    #[serde(default)]
    pub border_width: f32,
}

/// Font size in points plus a CSS-style weight (100-900).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub size: f32,
    #[serde(default = "regular_weight")]
    pub weight: u16,
}

fn regular_weight() -> u16 {
    400
}

impl Default for Font {
    fn default() -> Self {
        Self { size: 14.0, weight: regular_weight() }
    }
}

/// Remote image reference with its natural pixel size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

impl Image {
    /// Height over width, if both are known.
    pub fn aspect_ratio(&self) -> Option<f32> {
        (self.width > 0.0 && self.height > 0.0).then(|| self.height / self.width)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TextBlock {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub font: Font,
    #[serde(default = "black")]
    pub text_color: Color,
    #[serde(default)]
    pub text_alignment: Alignment,
    #[serde(default)]
    pub text_offset: Offset,
}

fn black() -> Color {
    Color::BLACK
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
}

/// Styling of a button in one interaction state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ButtonAppearance {
    #[serde(default)]
    pub title: String,
    #[serde(default = "black")]
    pub title_color: Color,
    #[serde(default)]
    pub title_alignment: Alignment,
    #[serde(default)]
    pub title_offset: Offset,
    #[serde(default)]
    pub title_font: Font,
    #[serde(flatten)]
    pub appearance: Appearance,
}

/// Interaction state of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Normal,
    Highlighted,
    Selected,
    Disabled,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonStates {
    #[serde(default)]
    pub normal: ButtonAppearance,
    #[serde(default)]
    pub highlighted: ButtonAppearance,
    #[serde(default)]
    pub selected: ButtonAppearance,
    #[serde(default)]
    pub disabled: ButtonAppearance,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonBlock {
    #[serde(default)]
    pub states: ButtonStates,
}

impl ButtonBlock {
    pub fn appearance(&self, state: ButtonState) -> &ButtonAppearance {
        match state {
            ButtonState::Normal => &self.states.normal,
            ButtonState::Highlighted => &self.states.highlighted,
            ButtonState::Selected => &self.states.selected,
            ButtonState::Disabled => &self.states.disabled,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebBlock {
    pub url: String,
    #[serde(default)]
    pub scrollable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BarcodeFormat {
    #[default]
    QrCode,
    Aztec,
    Pdf417,
    Code128,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarcodeBlock {
    pub text: String,
    #[serde(default)]
    pub format: BarcodeFormat,
    #[serde(default = "unit_scale")]
    pub scale: f32,
}

fn unit_scale() -> f32 {
    1.0
}

/// Variant-specific block payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlockKind {
    #[serde(rename = "text-block")]
    Text(TextBlock),
    #[serde(rename = "image-block")]
    Image(ImageBlock),
    #[serde(rename = "button-block")]
    Button(ButtonBlock),
    #[serde(rename = "web-block")]
    Web(WebBlock),
    #[serde(rename = "barcode-block")]
    Barcode(BarcodeBlock),
}

/// Fieldless discriminant of [`BlockKind`], used to key view pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKindTag {
    Text,
    Image,
    Button,
    Web,
    Barcode,
}

impl BlockKind {
    pub fn tag(&self) -> BlockKindTag {
        match self {
            BlockKind::Text(_) => BlockKindTag::Text,
            BlockKind::Image(_) => BlockKindTag::Image,
            BlockKind::Button(_) => BlockKindTag::Button,
            BlockKind::Web(_) => BlockKindTag::Web,
            BlockKind::Barcode(_) => BlockKindTag::Barcode,
        }
    }
}

/// A positionable, paintable node of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub position: Position,
    /// `None` means intrinsic width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Unit>,
    /// `None` means intrinsic height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Unit>,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub offset: Offset,
    #[serde(flatten)]
    pub appearance: Appearance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(flatten)]
    pub kind: BlockKind,
}

impl Block {
    /// A stacked, top-left aligned block with intrinsic size.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: None,
            position: Position::Stacked,
            width: None,
            height: None,
            alignment: Alignment::default(),
            offset: Offset::default(),
            appearance: Appearance::default(),
            action: None,
            kind,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Text(TextBlock {
            text: text.into(),
            text_color: Color::BLACK,
            ..TextBlock::default()
        }))
    }

    pub fn image(image: Image) -> Self {
        Self::new(BlockKind::Image(ImageBlock { image: Some(image) }))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, width: Option<Unit>, height: Option<Unit>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_offset(mut self, offset: Offset) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn is_floating(&self) -> bool {
        self.position == Position::Floating
    }
}
