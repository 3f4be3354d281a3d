// ABOUTME: Slide template renderer for the slideforge application
// ABOUTME: Lays out a slide under a template and theme as positioned boxes on a fixed canvas

use crate::model::Slide;
use crate::style::{self, Align, Background, Color, FontFamily, MarkerKind};

/// Reference canvas the template metrics are expressed in.
pub const BASE_WIDTH: u32 = 1280;
pub const BASE_HEIGHT: u32 = 720;

const PADDING: f32 = 64.0;
const CONTENT_MAX_WIDTH: f32 = 896.0;
const BODY_GAP: f32 = 32.0;
const PANEL_PADDING: f32 = 24.0;
const RULE_WIDTH: f32 = 2.0;
const INSET_IMAGE_WIDTH: f32 = 448.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    fn from_f32(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x: x.round() as i32,
            y: y.round() as i32,
            width: width.max(0.0).round() as u32,
            height: height.max(0.0).round() as u32,
        }
    }
}

/// A block of text wrapped into lines.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub rect: Rect,
    pub lines: Vec<String>,
    pub color: Color,
    pub font: FontFamily,
    pub font_size: u32,
    pub line_height: u32,
    pub align: Align,
    pub glow: Option<Color>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub rect: Rect,
    pub kind: MarkerKind,
    pub color: Color,
    /// Text of numbered markers, e.g. `"2."`.
    pub label: Option<String>,
    pub glow: Option<Color>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulletRow {
    pub marker: Marker,
    pub text: TextBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePlacement {
    pub rect: Rect,
    /// Cover the whole canvas behind the text.
    pub full_bleed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub rect: Rect,
    pub color: Color,
}

/// Everything needed to paint one slide.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideLayout {
    pub width: u32,
    pub height: u32,
    pub background: Background,
    pub outline: Option<Color>,
    pub image: Option<ImagePlacement>,
    pub title: TextBox,
    pub panel: Option<(Rect, Color)>,
    pub rules: Vec<Rule>,
    pub bullets: Vec<BulletRow>,
}

/// Greedy word wrap using the font's average advance.
pub fn wrap_text(text: &str, font: FontFamily, font_size: u32, max_width: f32) -> Vec<String> {
    let advance = font.advance_ratio() * font_size as f32;
    let max_chars = ((max_width / advance).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word = word.to_string();
        // Break words longer than a whole line.
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(max_chars).collect();
            word = word.chars().skip(max_chars).collect();
            lines.push(head);
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Whether a `width`×`height` canvas has the 16:9 shape slides are laid out for.
pub fn is_widescreen(width: u32, height: u32) -> bool {
    width > 0 && u64::from(width) * 9 == u64::from(height) * 16
}

/// Estimated rendered width of a single line.
pub fn text_width(text: &str, font: FontFamily, font_size: u32) -> f32 {
    text.chars().count() as f32 * font.advance_ratio() * font_size as f32
}

/// Lay out `slide` under `template`/`theme` on a `width`×`height` canvas.
pub fn layout_slide(
    slide: &Slide,
    template: &str,
    theme: &str,
    width: u32,
    height: u32,
) -> SlideLayout {
    let styles = style::resolve(template, theme);
    let scale = width as f32 / BASE_WIDTH as f32;
    let padding = PADDING * scale;
    let full_bleed_image = template == "visual-focus";

    let content_width = (CONTENT_MAX_WIDTH * scale).min(width as f32 - 2.0 * padding);
    let content_x = match styles.align {
        Align::Left => padding,
        Align::Center => (width as f32 - content_width) / 2.0,
    };

    // Title
    let title_size = (styles.title_size() as f32 * scale).round().max(1.0) as u32;
    let title_line_height = (title_size as f32 * 1.2).round() as u32;
    let title_lines = wrap_text(
        &slide.title,
        styles.title_font(),
        title_size,
        width as f32 - 2.0 * padding,
    );
    let title_height = title_lines.len() as f32 * title_line_height as f32;
    let title_rule_gap = if styles.title.rule.is_some() {
        8.0 * scale + RULE_WIDTH * scale
    } else {
        0.0
    };

    // Body rows
    let bullet_size = (styles.bullet_size() as f32 * scale).round().max(1.0) as u32;
    let bullet_line_height = (bullet_size as f32 * 1.5).round() as u32;
    let marker_size = (bullet_size as f32 * 0.8).round().max(4.0);
    let marker_gap = 16.0 * scale;
    let spacing = styles.bullet_spacing() as f32 * scale;
    let panel_padding = if styles.body.panel.is_some() {
        PANEL_PADDING * scale
    } else {
        0.0
    };
    let border_inset = if styles.body.rule.is_some() {
        16.0 * scale
    } else {
        0.0
    };
    let text_width_avail =
        content_width - 2.0 * panel_padding - border_inset - marker_size - marker_gap;

    let wrapped: Vec<Vec<String>> = slide
        .bullet_points
        .iter()
        .map(|point| wrap_text(point, styles.bullet_font(), bullet_size, text_width_avail))
        .collect();
    let rows_height: f32 = wrapped
        .iter()
        .map(|lines| lines.len() as f32 * bullet_line_height as f32)
        .sum::<f32>()
        + spacing * wrapped.len().saturating_sub(1) as f32;
    let body_height = if wrapped.is_empty() {
        0.0
    } else {
        BODY_GAP * scale + rows_height + 2.0 * panel_padding
    };

    // Inline image
    let inline_image = slide.has_image() && !full_bleed_image;
    let inset_width = (INSET_IMAGE_WIDTH * scale).min(content_width);
    let inset_height = inset_width * 9.0 / 16.0;
    let image_height = if inline_image {
        BODY_GAP * scale + inset_height
    } else {
        0.0
    };

    let total = title_height + title_rule_gap + body_height + image_height;
    let mut y = ((height as f32 - total) / 2.0).max(padding.min(height as f32 / 8.0));

    let title_x = padding;
    let title = TextBox {
        rect: Rect::from_f32(title_x, y, width as f32 - 2.0 * padding, title_height),
        lines: title_lines,
        color: styles.title_color(),
        font: styles.title_font(),
        font_size: title_size,
        line_height: title_line_height,
        align: styles.align,
        glow: styles.title.glow,
    };
    y += title_height;

    let mut rules = Vec::new();
    if let Some(color) = styles.title.rule {
        y += 8.0 * scale;
        let rule_width = title
            .lines
            .iter()
            .map(|l| text_width(l, title.font, title.font_size))
            .fold(0.0_f32, f32::max)
            .min(width as f32 - 2.0 * padding);
        rules.push(Rule {
            rect: Rect::from_f32(title_x, y, rule_width, RULE_WIDTH * scale),
            color,
        });
        y += RULE_WIDTH * scale;
    }

    let mut panel = None;
    let mut bullets = Vec::with_capacity(wrapped.len());
    if !wrapped.is_empty() {
        y += BODY_GAP * scale;
        let body_top = y;
        if let Some(color) = styles.body.panel {
            panel = Some((
                Rect::from_f32(
                    content_x,
                    body_top,
                    content_width,
                    rows_height + 2.0 * panel_padding,
                ),
                color,
            ));
        }
        if let Some(color) = styles.body.rule {
            rules.push(Rule {
                rect: Rect::from_f32(
                    content_x + panel_padding,
                    body_top + panel_padding,
                    RULE_WIDTH * scale,
                    rows_height,
                ),
                color,
            });
        }

        y += panel_padding;
        let row_x = content_x + panel_padding + border_inset;
        let marker_kind = styles.marker_kind();
        for (i, lines) in wrapped.into_iter().enumerate() {
            let row_height = lines.len() as f32 * bullet_line_height as f32;
            let marker_y = y + (bullet_line_height as f32 - marker_size) / 2.0;
            bullets.push(BulletRow {
                marker: Marker {
                    rect: Rect::from_f32(row_x, marker_y, marker_size, marker_size),
                    kind: marker_kind,
                    color: styles.marker_color(),
                    label: match marker_kind {
                        MarkerKind::Number => Some(format!("{}.", i + 1)),
                        _ => None,
                    },
                    glow: styles.marker.glow,
                },
                text: TextBox {
                    rect: Rect::from_f32(
                        row_x + marker_size + marker_gap,
                        y,
                        text_width_avail,
                        row_height,
                    ),
                    lines,
                    color: styles.bullet_color(),
                    font: styles.bullet_font(),
                    font_size: bullet_size,
                    line_height: bullet_line_height,
                    align: Align::Left,
                    glow: None,
                },
            });
            y += row_height + spacing;
        }
        y += panel_padding - spacing;
    }

    let image = if slide.has_image() {
        if full_bleed_image {
            Some(ImagePlacement {
                rect: Rect::from_f32(0.0, 0.0, width as f32, height as f32),
                full_bleed: true,
            })
        } else {
            y += BODY_GAP * scale;
            let x = match styles.align {
                Align::Left => content_x,
                Align::Center => (width as f32 - inset_width) / 2.0,
            };
            Some(ImagePlacement {
                rect: Rect::from_f32(x, y, inset_width, inset_height),
                full_bleed: false,
            })
        }
    } else {
        None
    };

    SlideLayout {
        width,
        height,
        background: styles.background,
        outline: styles.outline,
        image,
        title,
        panel,
        rules,
        bullets,
    }
}
