//! Rows, screens, experiences and screen-to-screen navigation.

use serde::{Deserialize, Serialize};

use crate::block::{Block, Color, Image};
use crate::unit::Unit;

/// Something a block tap can trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    GoToScreen {
        #[serde(rename = "screen-id")]
        screen_id: String,
    },
    OpenUrl { url: String },
}

/// An ordered run of blocks with an optional fixed height.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// `None` means the height is derived from the stacked blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Unit>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Row {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { id: None, height: None, blocks }
    }

    pub fn with_height(mut self, height: Unit) -> Self {
        self.height = Some(height);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBarStyle {
    #[default]
    Dark,
    Light,
}

/// Screen-level decoration consumed by the host renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScreenChrome {
    #[serde(default)]
    pub background_color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_bar_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_text_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_bar_color: Option<Color>,
    #[serde(default)]
    pub status_bar_style: StatusBarStyle,
}

/// Root container consumed by the layout engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    /// Empty for landing pages embedded in a message.
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub chrome: ScreenChrome,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Screen {
    pub fn new(id: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            id: id.into(),
            title: None,
            chrome: ScreenChrome::default(),
            rows,
        }
    }
}

/// A named, versioned set of screens with a designated home screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Experience {
    pub id: String,
    pub name: String,
    pub version: Option<String>,
    pub home_screen_id: String,
    pub screens: Vec<Screen>,
}

impl Experience {
    pub fn screen(&self, id: &str) -> Option<&Screen> {
        self.screens.iter().find(|s| s.id == id)
    }

    pub fn home_screen(&self) -> Option<&Screen> {
        self.screen(&self.home_screen_id)
    }

    /// The screen a `go-to-screen` action lands on, if any.
    pub fn resolve(&self, action: &Action) -> Option<&Screen> {
        match action {
            Action::GoToScreen { screen_id } => self.screen(screen_id),
            Action::OpenUrl { .. } => None,
        }
    }
}

/// What the host should do after [`ExperienceNavigator::perform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new screen was pushed; render it.
    Navigated(String),
    /// The action leaves the experience.
    OpenUrl(String),
    /// The target screen does not exist; nothing changed.
    Ignored,
}

/// Back-stack navigation through an experience.
#[derive(Debug, Clone)]
pub struct ExperienceNavigator {
    experience: Experience,
    stack: Vec<String>,
}

impl ExperienceNavigator {
    pub fn new(experience: Experience) -> Self {
        let stack = vec![experience.home_screen_id.clone()];
        Self { experience, stack }
    }

    pub fn experience(&self) -> &Experience {
        &self.experience
    }

    pub fn current(&self) -> Option<&Screen> {
        self.stack.last().and_then(|id| self.experience.screen(id))
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn perform(&mut self, action: &Action) -> Outcome {
        match action {
            Action::GoToScreen { screen_id } => {
                if self.experience.screen(screen_id).is_some() {
                    self.stack.push(screen_id.clone());
                    Outcome::Navigated(screen_id.clone())
                } else {
                    Outcome::Ignored
                }
            }
            Action::OpenUrl { url } => Outcome::OpenUrl(url.clone()),
        }
    }

    /// Pop one screen. Returns `false` at the home screen.
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn experience() -> Experience {
        Experience {
            id: "exp".into(),
            name: "Launch".into(),
            version: Some("2".into()),
            home_screen_id: "home".into(),
            screens: vec![Screen::new("home", vec![]), Screen::new("details", vec![])],
        }
    }

    #[test]
    fn resolves_go_to_screen() {
        let exp = experience();
        let action = Action::GoToScreen { screen_id: "details".into() };
        assert_eq!(exp.resolve(&action).map(|s| s.id.as_str()), Some("details"));
        assert!(exp.resolve(&Action::OpenUrl { url: "https://x".into() }).is_none());
        assert_eq!(exp.home_screen().map(|s| s.id.as_str()), Some("home"));
    }

    #[test]
    fn navigator_push_and_back() {
        let mut nav = ExperienceNavigator::new(experience());
        assert_eq!(nav.current().map(|s| s.id.as_str()), Some("home"));

        let outcome = nav.perform(&Action::GoToScreen { screen_id: "details".into() });
        assert_eq!(outcome, Outcome::Navigated("details".into()));
        assert_eq!(nav.depth(), 2);

        assert_eq!(nav.perform(&Action::GoToScreen { screen_id: "nope".into() }), Outcome::Ignored);
        assert_eq!(nav.depth(), 2);

        assert!(nav.back());
        assert!(!nav.back());
        assert_eq!(nav.current().map(|s| s.id.as_str()), Some("home"));
    }

    #[test]
    fn screen_wire_shape() {
        let screen: Screen = serde_json::from_value(json!({
            "id": "s1",
            "title": "Welcome",
            "background-color": {"red": 1, "green": 2, "blue": 3},
            "status-bar-style": "light",
            "rows": [{"height": {"type": "percentage", "value": 50}, "blocks": []}]
        }))
        .unwrap();

        assert_eq!(screen.title.as_deref(), Some("Welcome"));
        assert_eq!(screen.chrome.background_color, Color::rgba(1, 2, 3, 1.0));
        assert_eq!(screen.chrome.status_bar_style, StatusBarStyle::Light);
        assert_eq!(screen.rows[0].height, Some(Unit::Percentage(50.0)));
    }
}
