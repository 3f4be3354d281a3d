// ABOUTME: HTML rendering module for the slideforge application
// ABOUTME: Renders a laid-out slide as a standalone styled HTML document for browser capture

use crate::model::Slide;
use crate::style::{Align, Background, Color, MarkerKind};
use crate::template::{self, Rect, SlideLayout, TextBox};
use log::debug;
use quick_xml::escape::escape;

fn rect_css(rect: &Rect) -> String {
    format!(
        "position:absolute;left:{}px;top:{}px;width:{}px;height:{}px;",
        rect.x, rect.y, rect.width, rect.height
    )
}

fn background_css(background: &Background) -> String {
    match background {
        Background::Solid(color) => format!("background:{};", color.to_css()),
        Background::Gradient { from, to } => format!(
            "background:linear-gradient(to bottom right, {}, {});",
            from.to_css(),
            to.to_css()
        ),
    }
}

fn glow_css(glow: Option<Color>) -> String {
    glow.map(|c| format!("text-shadow:0 0 8px {};", c.to_css()))
        .unwrap_or_default()
}

fn text_box_html(tag: &str, text: &TextBox) -> String {
    let align = match text.align {
        Align::Left => "left",
        Align::Center => "center",
    };
    let lines: Vec<String> = text.lines.iter().map(|l| escape(l).into_owned()).collect();
    format!(
        r#"<{tag} style="{rect}margin:0;color:{color};font-family:{font};font-size:{size}px;line-height:{lh}px;text-align:{align};font-weight:{weight};{glow}">{body}</{tag}>"#,
        tag = tag,
        rect = rect_css(&text.rect),
        color = text.color.to_css(),
        font = text.font.css_stack(),
        size = text.font_size,
        lh = text.line_height,
        align = align,
        weight = if tag == "h2" { "700" } else { "400" },
        glow = glow_css(text.glow),
        body = lines.join("<br>"),
    )
}

fn marker_glyph(kind: MarkerKind) -> &'static str {
    match kind {
        MarkerKind::CheckSquare => "&#9745;",
        MarkerKind::Check => "&#10003;",
        MarkerKind::Dot => "",
        MarkerKind::BarChart => "&#9636;",
        MarkerKind::Chevron => "&#8250;",
        MarkerKind::Caret => "&gt;",
        MarkerKind::Number => "",
    }
}

/// Render an already computed layout.
pub fn layout_to_html(layout: &SlideLayout, title: &str, image_url: &str) -> String {
    let mut html_doc = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html_doc.push_str("<meta charset=\"UTF-8\">\n");
    html_doc.push_str(&format!("<title>{}</title>\n", escape(title)));
    html_doc.push_str("<style>html,body{margin:0;padding:0;overflow:hidden;}</style>\n");
    html_doc.push_str("</head>\n<body>\n");

    let outline = layout
        .outline
        .map(|c| format!("box-sizing:border-box;border:1px solid {};", c.to_css()))
        .unwrap_or_default();
    html_doc.push_str(&format!(
        r#"<div id="slide" style="position:relative;overflow:hidden;width:{}px;height:{}px;{}{}">"#,
        layout.width,
        layout.height,
        background_css(&layout.background),
        outline
    ));
    html_doc.push('\n');

    if let Some(image) = &layout.image {
        html_doc.push_str(&format!(
            r#"<img src="{}" alt="{}" style="{}object-fit:cover;{}">"#,
            escape(image_url),
            escape(title),
            rect_css(&image.rect),
            if image.full_bleed { "" } else { "border-radius:6px;" }
        ));
        html_doc.push('\n');
    }

    if let Some((rect, color)) = &layout.panel {
        html_doc.push_str(&format!(
            r#"<div style="{}background:{};border-radius:8px;"></div>"#,
            rect_css(rect),
            color.to_css()
        ));
        html_doc.push('\n');
    }

    for rule in &layout.rules {
        html_doc.push_str(&format!(
            r#"<div style="{}background:{};"></div>"#,
            rect_css(&rule.rect),
            rule.color.to_css()
        ));
        html_doc.push('\n');
    }

    html_doc.push_str(&text_box_html("h2", &layout.title));
    html_doc.push('\n');

    for row in &layout.bullets {
        let marker = &row.marker;
        let content = match (&marker.label, marker.kind) {
            (Some(label), _) => escape(label.as_str()).into_owned(),
            (None, kind) => marker_glyph(kind).to_string(),
        };
        let shape = if marker.kind == MarkerKind::Dot {
            format!("border-radius:50%;background:{};", marker.color.to_css())
        } else {
            String::new()
        };
        html_doc.push_str(&format!(
            r#"<span class="marker" style="{}color:{};font-size:{}px;line-height:{}px;font-weight:600;{}{}">{}</span>"#,
            rect_css(&marker.rect),
            marker.color.to_css(),
            row.text.font_size,
            marker.rect.height,
            shape,
            glow_css(marker.glow),
            content
        ));
        html_doc.push_str(&text_box_html("p", &row.text));
        html_doc.push('\n');
    }

    html_doc.push_str("</div>\n</body>\n</html>");
    html_doc
}

/// Render `slide` under `template`/`theme` as a full HTML document.
pub fn render_html(slide: &Slide, template: &str, theme: &str, width: u32, height: u32) -> String {
    debug!("Rendering HTML for slide {}", slide.id);
    let layout = template::layout_slide(slide, template, theme, width, height);
    layout_to_html(&layout, &slide.title, &slide.image_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escapes_user_text() {
        let slide = Slide::new("<script>", vec!["a & b".to_string()]);
        let html = render_html(&slide, "classic-clean", "light", 1280, 720);
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &amp; b"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn html_has_fixed_canvas_and_one_paragraph_per_bullet() {
        let slide = Slide::new(
            "Title",
            vec!["one".to_string(), "two".to_string(), "three".to_string()],
        );
        let html = render_html(&slide, "dark-edge", "dark", 1280, 720);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("width:1280px;height:720px;"));
        assert_eq!(html.matches("<p style=").count(), 3);
    }

    #[test]
    fn gradient_background_for_astral_core() {
        let slide = Slide::new("Space", vec![]);
        let html = render_html(&slide, "astral-core", "dark", 1280, 720);
        assert!(html.contains("linear-gradient"));
    }

    #[test]
    fn inline_image_is_embedded() {
        let mut slide = Slide::new("Pic", vec![]);
        slide.image_url = "data:image/png;base64,AAAA".to_string();
        let html = render_html(&slide, "classic-clean", "light", 1280, 720);
        assert!(html.contains(r#"<img src="data:image/png;base64,AAAA""#));
    }
}
