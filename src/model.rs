// ABOUTME: Data model for presentations, slides and bullet points
// ABOUTME: Serializable with serde in the persisted camelCase shape

use crate::catalog::{DEFAULT_TEMPLATE, DEFAULT_THEME, NO_TRANSITION};
use serde::{Deserialize, Serialize};

pub const NEW_SLIDE_TITLE: &str = "New Slide Title";
pub const NEW_SLIDE_BULLET: &str = "Your content here.";
pub const NEW_BULLET_POINT: &str = "New bullet point";

fn default_transition() -> String {
    NO_TRANSITION.to_string()
}

/// Generate a fresh identifier for a slide or presentation.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// One titled unit of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub bullet_points: Vec<String>,
    /// Inline `data:` URL; empty when the slide has no image.
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_transition")]
    pub transition: String,
}

impl Slide {
    pub fn new(title: impl Into<String>, bullet_points: Vec<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            bullet_points,
            image_url: String::new(),
            transition: default_transition(),
        }
    }

    /// The slide appended by the editor's "add slide" action.
    pub fn placeholder(transition: &str) -> Self {
        let mut slide = Self::new(NEW_SLIDE_TITLE, vec![NEW_SLIDE_BULLET.to_string()]);
        slide.transition = transition.to_string();
        slide
    }

    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }

    pub fn has_transition(&self) -> bool {
        !self.transition.is_empty() && self.transition != NO_TRANSITION
    }
}

/// An ordered collection of slides plus the deck-wide design selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub id: String,
    pub title: String,
    pub template: String,
    pub theme: String,
    pub slides: Vec<Slide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,
}

impl Presentation {
    pub fn new(title: impl Into<String>, template: &str, theme: &str, slides: Vec<Slide>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            template: template.to_string(),
            theme: theme.to_string(),
            slides,
            transition: Some(default_transition()),
        }
    }

    /// Transition given to newly added slides.
    pub fn default_transition(&self) -> &str {
        match self.transition.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => NO_TRANSITION,
        }
    }

    pub fn slide_ids(&self) -> Vec<&str> {
        self.slides.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn position_of(&self, slide_id: &str) -> Option<usize> {
        self.slides.iter().position(|s| s.id == slide_id)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new(
            "Presentation",
            DEFAULT_TEMPLATE,
            DEFAULT_THEME,
            vec![Slide::placeholder(NO_TRANSITION)],
        )
    }
}
