// ABOUTME: Catalog of design templates, theme variants and slide transitions
// ABOUTME: Provides the fixed id lists and lookup helpers used for validation

use crate::errors::{ForgeError, Result};

/// A named visual style applied to every slide of a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// A colour variant layered on top of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeInfo {
    pub id: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionInfo {
    pub id: &'static str,
    pub name: &'static str,
}

pub const DEFAULT_TEMPLATE: &str = "classic-clean";
pub const DEFAULT_THEME: &str = "dark";
pub const NO_TRANSITION: &str = "none";

pub const TEMPLATES: &[TemplateInfo] = &[
    TemplateInfo {
        id: "classic-clean",
        name: "Classic Clean",
        description: "White background, serif fonts, professional.",
    },
    TemplateInfo {
        id: "dark-edge",
        name: "Dark Edge",
        description: "Dark background, neon text, modern fonts.",
    },
    TemplateInfo {
        id: "corporate-pitch",
        name: "Corporate Pitch",
        description: "Blue and gray tones, chart placeholders.",
    },
    TemplateInfo {
        id: "visual-focus",
        name: "Visual Focus",
        description: "Full-screen images with overlay text.",
    },
    TemplateInfo {
        id: "tech-minimal",
        name: "Tech Minimal",
        description: "Monospaced font, grid layout, code-like.",
    },
    TemplateInfo {
        id: "hologram-ui",
        name: "Hologram UI",
        description: "Glowing neon interface for tech talks.",
    },
    TemplateInfo {
        id: "academic-paper",
        name: "Academic Paper",
        description: "Clean and readable for research lectures.",
    },
    TemplateInfo {
        id: "astral-core",
        name: "Astral Core",
        description: "Sci-fi theme with deep space visuals.",
    },
    TemplateInfo {
        id: "minimal-whiteboard",
        name: "Minimal Whiteboard",
        description: "Hand-drawn style for explainer slides.",
    },
];

pub const THEMES: &[ThemeInfo] = &[
    ThemeInfo {
        id: "light",
        name: "Light",
    },
    ThemeInfo {
        id: "dark",
        name: "Dark",
    },
];

pub const TRANSITIONS: &[TransitionInfo] = &[
    TransitionInfo { id: "none", name: "None" },
    TransitionInfo { id: "fade", name: "Fade" },
    TransitionInfo { id: "slide", name: "Slide" },
    TransitionInfo { id: "push", name: "Push" },
    TransitionInfo { id: "cover", name: "Cover" },
    TransitionInfo { id: "uncover", name: "Uncover" },
    TransitionInfo { id: "wipe", name: "Wipe" },
    TransitionInfo { id: "zoom", name: "Zoom" },
    TransitionInfo { id: "vortex", name: "Vortex" },
    TransitionInfo { id: "windshield", name: "Windshield" },
    TransitionInfo { id: "doors", name: "Doors" },
    TransitionInfo { id: "window", name: "Window" },
];

pub fn find_template(id: &str) -> Option<&'static TemplateInfo> {
    TEMPLATES.iter().find(|t| t.id == id)
}

pub fn find_theme(id: &str) -> Option<&'static ThemeInfo> {
    THEMES.iter().find(|t| t.id == id)
}

pub fn find_transition(id: &str) -> Option<&'static TransitionInfo> {
    TRANSITIONS.iter().find(|t| t.id == id)
}

pub fn validate_template(id: &str) -> Result<()> {
    find_template(id).map(|_| ()).ok_or_else(|| {
        ForgeError::ValidationError(format!("Unknown design template: {}", id))
    })
}

pub fn validate_theme(id: &str) -> Result<()> {
    find_theme(id)
        .map(|_| ())
        .ok_or_else(|| ForgeError::ValidationError(format!("Unknown theme variant: {}", id)))
}

pub fn validate_transition(id: &str) -> Result<()> {
    find_transition(id)
        .map(|_| ())
        .ok_or_else(|| ForgeError::ValidationError(format!("Unknown transition: {}", id)))
}
