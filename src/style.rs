// ABOUTME: Style lookup table for slide templates
// ABOUTME: Maps (template, theme, element) to a style descriptor without per-template branching

use crate::catalog::DEFAULT_TEMPLATE;

/// An sRGB colour with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_css(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.2})",
                self.r,
                self.g,
                self.b,
                f32::from(self.a) / 255.0
            )
        }
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
const GRAY_100: Color = Color::rgb(0xf3, 0xf4, 0xf6);
const GRAY_200: Color = Color::rgb(0xe5, 0xe7, 0xeb);
const GRAY_300: Color = Color::rgb(0xd1, 0xd5, 0xdb);
const GRAY_600: Color = Color::rgb(0x4b, 0x55, 0x63);
const GRAY_700: Color = Color::rgb(0x37, 0x41, 0x51);
const GRAY_800: Color = Color::rgb(0x1f, 0x29, 0x37);
const GRAY_900: Color = Color::rgb(0x11, 0x18, 0x27);
const BLUE_50: Color = Color::rgb(0xef, 0xf6, 0xff);
const BLUE_100: Color = Color::rgb(0xdb, 0xea, 0xfe);
const BLUE_200: Color = Color::rgb(0xbf, 0xdb, 0xfe);
const BLUE_500: Color = Color::rgb(0x3b, 0x82, 0xf6);
const BLUE_600: Color = Color::rgb(0x25, 0x63, 0xeb);
const BLUE_800: Color = Color::rgb(0x1e, 0x40, 0xaf);
const BLUE_900: Color = Color::rgb(0x1e, 0x3a, 0x8a);
const CYAN_300: Color = Color::rgb(0x67, 0xe8, 0xf9);
const CYAN_400: Color = Color::rgb(0x22, 0xd3, 0xee);
const GREEN_400: Color = Color::rgb(0x4a, 0xde, 0x80);
const GREEN_500: Color = Color::rgb(0x22, 0xc5, 0x5e);
const RED_800: Color = Color::rgb(0x99, 0x1b, 0x1b);
const INDIGO_100: Color = Color::rgb(0xe0, 0xe7, 0xff);
const INDIGO_300: Color = Color::rgb(0xa5, 0xb4, 0xfc);
const HOLO_BG: Color = Color::rgb(0x0a, 0x0a, 0x1a);
const HOLO_TITLE: Color = Color::rgb(0x00, 0xf0, 0xff);
const HOLO_GLOW: Color = Color::rgba(0x00, 0xf0, 0xff, 204);
const PAPER: Color = Color::rgb(0xfd, 0xfb, 0xf6);
const INK: Color = Color::rgb(0x33, 0x33, 0x33);
const ASTRAL_FROM: Color = Color::rgb(0x1e, 0x1b, 0x4a);
const ASTRAL_TO: Color = Color::rgb(0x43, 0x38, 0xca);
const ASTRAL_GLOW: Color = Color::rgba(0xc7, 0xd2, 0xfe, 230);
const SHADOW: Color = Color::rgba(0x00, 0x00, 0x00, 160);
const SCRIM_50: Color = Color::rgba(0x00, 0x00, 0x00, 128);
const SCRIM_30: Color = Color::rgba(0x00, 0x00, 0x00, 77);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Solid(Color),
    /// Top-left to bottom-right.
    Gradient { from: Color, to: Color },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    Serif,
    Sans,
    Mono,
    Handwritten,
}

impl FontFamily {
    pub fn css_stack(self) -> &'static str {
        match self {
            FontFamily::Serif => "Georgia, 'Times New Roman', serif",
            FontFamily::Sans => "'Helvetica Neue', Arial, sans-serif",
            FontFamily::Mono => "'Fira Code', Menlo, monospace",
            FontFamily::Handwritten => "'Comic Neue', 'Comic Sans MS', cursive",
        }
    }

    /// Average glyph advance as a fraction of the font size.
    pub fn advance_ratio(self) -> f32 {
        match self {
            FontFamily::Mono => 0.6,
            FontFamily::Serif => 0.52,
            FontFamily::Sans | FontFamily::Handwritten => 0.55,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    CheckSquare,
    Check,
    Dot,
    BarChart,
    Chevron,
    Caret,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Canvas,
    Title,
    Body,
    Bullet,
    BulletMarker,
}

/// Partial style for one element; `None` fields inherit from the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleDescriptor {
    pub background: Option<Background>,
    pub color: Option<Color>,
    pub font: Option<FontFamily>,
    pub font_size: Option<u32>,
    pub align: Option<Align>,
    /// Title underline, body left border or canvas outline.
    pub rule: Option<Color>,
    /// Translucent backing behind the body.
    pub panel: Option<Color>,
    pub glow: Option<Color>,
    /// Vertical gap between bullets.
    pub spacing: Option<u32>,
    pub marker: Option<MarkerKind>,
}

impl StyleDescriptor {
    pub const EMPTY: StyleDescriptor = StyleDescriptor {
        background: None,
        color: None,
        font: None,
        font_size: None,
        align: None,
        rule: None,
        panel: None,
        glow: None,
        spacing: None,
        marker: None,
    };

    /// Fields set in `other` replace ours.
    pub fn merged(self, other: &StyleDescriptor) -> StyleDescriptor {
        StyleDescriptor {
            background: other.background.or(self.background),
            color: other.color.or(self.color),
            font: other.font.or(self.font),
            font_size: other.font_size.or(self.font_size),
            align: other.align.or(self.align),
            rule: other.rule.or(self.rule),
            panel: other.panel.or(self.panel),
            glow: other.glow.or(self.glow),
            spacing: other.spacing.or(self.spacing),
            marker: other.marker.or(self.marker),
        }
    }
}

const E: StyleDescriptor = StyleDescriptor::EMPTY;

type Entry = (&'static str, Element, StyleDescriptor);
type ThemeEntry = (&'static str, &'static str, Element, StyleDescriptor);

#[rustfmt::skip]
const BASE_STYLES: &[Entry] = &[
    // classic-clean
    ("classic-clean", Element::Canvas, StyleDescriptor { background: Some(Background::Solid(WHITE)), color: Some(GRAY_800), font: Some(FontFamily::Serif), align: Some(Align::Center), ..E }),
    ("classic-clean", Element::Title, StyleDescriptor { color: Some(BLACK), font_size: Some(48), ..E }),
    ("classic-clean", Element::Body, StyleDescriptor { spacing: Some(16), ..E }),
    ("classic-clean", Element::Bullet, StyleDescriptor { font_size: Some(24), ..E }),
    ("classic-clean", Element::BulletMarker, StyleDescriptor { marker: Some(MarkerKind::CheckSquare), color: Some(BLUE_600), ..E }),
    // dark-edge
    ("dark-edge", Element::Canvas, StyleDescriptor { background: Some(Background::Solid(GRAY_900)), color: Some(WHITE), font: Some(FontFamily::Sans), align: Some(Align::Center), ..E }),
    ("dark-edge", Element::Title, StyleDescriptor { color: Some(CYAN_400), font_size: Some(60), ..E }),
    ("dark-edge", Element::Body, StyleDescriptor { spacing: Some(12), ..E }),
    ("dark-edge", Element::Bullet, StyleDescriptor { font_size: Some(20), color: Some(GRAY_300), ..E }),
    ("dark-edge", Element::BulletMarker, StyleDescriptor { marker: Some(MarkerKind::Dot), color: Some(CYAN_400), ..E }),
    // corporate-pitch
    ("corporate-pitch", Element::Canvas, StyleDescriptor { background: Some(Background::Solid(BLUE_50)), color: Some(GRAY_800), font: Some(FontFamily::Sans), align: Some(Align::Center), ..E }),
    ("corporate-pitch", Element::Title, StyleDescriptor { color: Some(BLUE_800), font_size: Some(48), ..E }),
    ("corporate-pitch", Element::Body, StyleDescriptor { spacing: Some(16), ..E }),
    ("corporate-pitch", Element::Bullet, StyleDescriptor { font_size: Some(20), ..E }),
    ("corporate-pitch", Element::BulletMarker, StyleDescriptor { marker: Some(MarkerKind::BarChart), color: Some(BLUE_500), ..E }),
    // visual-focus
    ("visual-focus", Element::Canvas, StyleDescriptor { background: Some(Background::Solid(GRAY_800)), color: Some(WHITE), font: Some(FontFamily::Sans), align: Some(Align::Center), ..E }),
    ("visual-focus", Element::Title, StyleDescriptor { font_size: Some(60), glow: Some(SHADOW), ..E }),
    ("visual-focus", Element::Body, StyleDescriptor { spacing: Some(16), font_size: Some(24), panel: Some(SCRIM_50), ..E }),
    ("visual-focus", Element::Bullet, StyleDescriptor { font_size: Some(24), ..E }),
    ("visual-focus", Element::BulletMarker, StyleDescriptor { marker: Some(MarkerKind::CheckSquare), ..E }),
    // tech-minimal
    ("tech-minimal", Element::Canvas, StyleDescriptor { background: Some(Background::Solid(GRAY_900)), color: Some(GRAY_300), font: Some(FontFamily::Mono), align: Some(Align::Center), ..E }),
    ("tech-minimal", Element::Title, StyleDescriptor { color: Some(GREEN_400), font_size: Some(36), ..E }),
    ("tech-minimal", Element::Body, StyleDescriptor { spacing: Some(8), rule: Some(GREEN_400), ..E }),
    ("tech-minimal", Element::Bullet, StyleDescriptor { font_size: Some(18), ..E }),
    ("tech-minimal", Element::BulletMarker, StyleDescriptor { marker: Some(MarkerKind::Caret), color: Some(GREEN_400), ..E }),
    // hologram-ui
    ("hologram-ui", Element::Canvas, StyleDescriptor { background: Some(Background::Solid(HOLO_BG)), color: Some(CYAN_300), font: Some(FontFamily::Mono), align: Some(Align::Center), ..E }),
    ("hologram-ui", Element::Title, StyleDescriptor { color: Some(HOLO_TITLE), font_size: Some(48), glow: Some(HOLO_GLOW), ..E }),
    ("hologram-ui", Element::Body, StyleDescriptor { spacing: Some(12), font_size: Some(18), ..E }),
    ("hologram-ui", Element::Bullet, E),
    ("hologram-ui", Element::BulletMarker, StyleDescriptor { marker: Some(MarkerKind::Chevron), color: Some(CYAN_400), ..E }),
    // academic-paper
    ("academic-paper", Element::Canvas, StyleDescriptor { background: Some(Background::Solid(PAPER)), color: Some(INK), font: Some(FontFamily::Serif), align: Some(Align::Left), ..E }),
    ("academic-paper", Element::Title, StyleDescriptor { color: Some(GRAY_800), font_size: Some(36), rule: Some(RED_800), ..E }),
    ("academic-paper", Element::Body, StyleDescriptor { spacing: Some(12), font_size: Some(18), ..E }),
    ("academic-paper", Element::Bullet, E),
    ("academic-paper", Element::BulletMarker, StyleDescriptor { marker: Some(MarkerKind::Number), color: Some(RED_800), ..E }),
    // astral-core
    ("astral-core", Element::Canvas, StyleDescriptor { background: Some(Background::Gradient { from: ASTRAL_FROM, to: ASTRAL_TO }), color: Some(INDIGO_100), font: Some(FontFamily::Sans), align: Some(Align::Center), ..E }),
    ("astral-core", Element::Title, StyleDescriptor { color: Some(WHITE), font_size: Some(60), glow: Some(SHADOW), ..E }),
    ("astral-core", Element::Body, StyleDescriptor { spacing: Some(16), font_size: Some(20), panel: Some(SCRIM_30), ..E }),
    ("astral-core", Element::Bullet, E),
    ("astral-core", Element::BulletMarker, StyleDescriptor { marker: Some(MarkerKind::Dot), color: Some(INDIGO_300), glow: Some(ASTRAL_GLOW), ..E }),
    // minimal-whiteboard
    ("minimal-whiteboard", Element::Canvas, StyleDescriptor { background: Some(Background::Solid(WHITE)), color: Some(GRAY_700), font: Some(FontFamily::Sans), align: Some(Align::Left), rule: Some(GRAY_200), ..E }),
    ("minimal-whiteboard", Element::Title, StyleDescriptor { color: Some(GRAY_800), font_size: Some(36), font: Some(FontFamily::Handwritten), ..E }),
    ("minimal-whiteboard", Element::Body, StyleDescriptor { spacing: Some(12), font_size: Some(24), font: Some(FontFamily::Handwritten), ..E }),
    ("minimal-whiteboard", Element::Bullet, StyleDescriptor { color: Some(GRAY_600), ..E }),
    ("minimal-whiteboard", Element::BulletMarker, StyleDescriptor { marker: Some(MarkerKind::Check), color: Some(GREEN_500), ..E }),
];

#[rustfmt::skip]
const THEME_STYLES: &[ThemeEntry] = &[
    ("classic-clean", "dark", Element::Canvas, StyleDescriptor { background: Some(Background::Solid(GRAY_800)), color: Some(GRAY_100), ..E }),
    ("classic-clean", "dark", Element::Title, StyleDescriptor { color: Some(WHITE), ..E }),
    ("dark-edge", "light", Element::Canvas, StyleDescriptor { background: Some(Background::Solid(GRAY_200)), color: Some(GRAY_900), ..E }),
    ("corporate-pitch", "dark", Element::Canvas, StyleDescriptor { background: Some(Background::Solid(BLUE_900)), color: Some(BLUE_100), ..E }),
    ("corporate-pitch", "dark", Element::Title, StyleDescriptor { color: Some(BLUE_200), ..E }),
    ("visual-focus", "light", Element::Canvas, StyleDescriptor { background: Some(Background::Solid(GRAY_700)), ..E }),
    ("visual-focus", "dark", Element::Canvas, StyleDescriptor { background: Some(Background::Solid(GRAY_800)), ..E }),
];

fn base_entry(template: &str, element: Element) -> Option<&'static StyleDescriptor> {
    BASE_STYLES
        .iter()
        .find(|(t, e, _)| *t == template && *e == element)
        .map(|(_, _, style)| style)
}

/// Look up the style of one element of a slide.
///
/// Unknown templates fall back to `classic-clean`; unknown themes add no
/// overrides.
pub fn style_for(template: &str, theme: &str, element: Element) -> StyleDescriptor {
    let template = if base_entry(template, Element::Canvas).is_some() {
        template
    } else {
        DEFAULT_TEMPLATE
    };

    let base = base_entry(template, element).copied().unwrap_or(E);
    THEME_STYLES
        .iter()
        .filter(|(t, th, e, _)| *t == template && *th == theme && *e == element)
        .fold(base, |acc, (_, _, _, o)| acc.merged(o))
}

/// Fully resolved styles for every element of a slide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStyles {
    pub background: Background,
    pub text_color: Color,
    pub font: FontFamily,
    pub align: Align,
    pub outline: Option<Color>,
    pub title: StyleDescriptor,
    pub body: StyleDescriptor,
    pub bullet: StyleDescriptor,
    pub marker: StyleDescriptor,
}

impl ResolvedStyles {
    pub fn title_color(&self) -> Color {
        self.title.color.unwrap_or(self.text_color)
    }

    pub fn title_size(&self) -> u32 {
        self.title.font_size.unwrap_or(48)
    }

    pub fn title_font(&self) -> FontFamily {
        self.title.font.unwrap_or(self.font)
    }

    pub fn bullet_color(&self) -> Color {
        self.bullet.color.unwrap_or(self.text_color)
    }

    pub fn bullet_size(&self) -> u32 {
        self.bullet.font_size.or(self.body.font_size).unwrap_or(16)
    }

    pub fn bullet_font(&self) -> FontFamily {
        self.bullet.font.or(self.body.font).unwrap_or(self.font)
    }

    pub fn marker_kind(&self) -> MarkerKind {
        self.marker.marker.unwrap_or(MarkerKind::CheckSquare)
    }

    pub fn marker_color(&self) -> Color {
        self.marker.color.unwrap_or_else(|| self.bullet_color())
    }

    pub fn bullet_spacing(&self) -> u32 {
        self.body.spacing.unwrap_or(12)
    }
}

pub fn resolve(template: &str, theme: &str) -> ResolvedStyles {
    let canvas = style_for(template, theme, Element::Canvas);
    ResolvedStyles {
        background: canvas.background.unwrap_or(Background::Solid(WHITE)),
        text_color: canvas.color.unwrap_or(GRAY_800),
        font: canvas.font.unwrap_or(FontFamily::Sans),
        align: canvas.align.unwrap_or(Align::Center),
        outline: canvas.rule,
        title: style_for(template, theme, Element::Title),
        body: style_for(template, theme, Element::Body),
        bullet: style_for(template, theme, Element::Bullet),
        marker: style_for(template, theme, Element::BulletMarker),
    }
}
