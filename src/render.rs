// ABOUTME: Slide rasterizers for the slideforge application
// ABOUTME: Paints laid-out slides directly to pixels, or captures them from a headless browser

use crate::errors::{ForgeError, Result};
use anyhow::Context as _;
use crate::html;
use crate::model::Slide;
use crate::resources;
use crate::style::{Align, Background, Color, MarkerKind};
use crate::template::{self, Rect, SlideLayout, TextBox};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use image::imageops::{self, FilterType};
use image::{Pixel, RgbaImage};
use log::{debug, info, warn};
use std::env;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for slide rasterization
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Pause between rendering a slide and capturing it.
    pub settle_delay_ms: u64,
    pub timeout_ms: u64,
    pub browser_path: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: template::BASE_WIDTH,
            height: template::BASE_HEIGHT,
            settle_delay_ms: 500,
            timeout_ms: 30000, // 30 seconds
            browser_path: None,
        }
    }
}

/// A reusable off-screen render target.
///
/// Slides go through it one at a time: `render`, then `capture`, then
/// `release` before the next slide.
pub trait Rasterizer {
    fn render(&mut self, slide: &Slide, template: &str, theme: &str) -> Result<()>;
    fn capture(&mut self) -> Result<RgbaImage>;
    fn release(&mut self);

    fn dimensions(&self) -> (u32, u32);

    /// Render and capture one slide without a settle pause, releasing the
    /// target either way.
    fn rasterize(&mut self, slide: &Slide, template: &str, theme: &str) -> Result<RgbaImage> {
        let captured = self
            .render(slide, template, theme)
            .and_then(|_| self.capture());
        self.release();
        captured
    }
}

/// Draws slides straight onto an RGBA buffer.
///
/// Text is painted as ink bars sized from the estimated glyph advance, so the
/// output preserves layout, colour and proportions without a font engine.
pub struct CanvasRasterizer {
    width: u32,
    height: u32,
    canvas: Option<RgbaImage>,
}

impl CanvasRasterizer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            canvas: None,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.width, config.height)
    }
}

impl Rasterizer for CanvasRasterizer {
    fn render(&mut self, slide: &Slide, template: &str, theme: &str) -> Result<()> {
        let layout = template::layout_slide(slide, template, theme, self.width, self.height);
        let image = if slide.has_image() {
            Some(resources::decode_image(&slide.image_url)?)
        } else {
            None
        };
        self.canvas = Some(paint_layout(&layout, image.as_ref()));
        Ok(())
    }

    fn capture(&mut self) -> Result<RgbaImage> {
        self.canvas
            .clone()
            .ok_or_else(|| ForgeError::ExportFailed("Nothing rendered to capture".to_string()))
    }

    fn release(&mut self) {
        self.canvas = None;
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, color: Color) {
    if x < 0 || y < 0 || x >= i64::from(canvas.width()) || y >= i64::from(canvas.height()) {
        return;
    }
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    if color.a == 255 {
        *pixel = color.to_rgba();
    } else {
        pixel.blend(&color.to_rgba());
    }
}

fn fill_rect(canvas: &mut RgbaImage, rect: &Rect, color: Color) {
    let x0 = i64::from(rect.x);
    let y0 = i64::from(rect.y);
    for y in y0..y0 + i64::from(rect.height) {
        for x in x0..x0 + i64::from(rect.width) {
            blend_pixel(canvas, x, y, color);
        }
    }
}

fn stroke_rect(canvas: &mut RgbaImage, rect: &Rect, color: Color) {
    let (x0, y0) = (i64::from(rect.x), i64::from(rect.y));
    let (x1, y1) = (
        x0 + i64::from(rect.width) - 1,
        y0 + i64::from(rect.height) - 1,
    );
    for x in x0..=x1 {
        blend_pixel(canvas, x, y0, color);
        blend_pixel(canvas, x, y1, color);
    }
    for y in y0 + 1..y1 {
        blend_pixel(canvas, x0, y, color);
        blend_pixel(canvas, x1, y, color);
    }
}

fn fill_circle(canvas: &mut RgbaImage, rect: &Rect, color: Color) {
    let r = rect.width.min(rect.height) as f32 / 2.0;
    let cx = rect.x as f32 + rect.width as f32 / 2.0;
    let cy = rect.y as f32 + rect.height as f32 / 2.0;
    for y in rect.y..rect.y + rect.height as i32 {
        for x in rect.x..rect.x + rect.width as i32 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r * r {
                blend_pixel(canvas, i64::from(x), i64::from(y), color);
            }
        }
    }
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8
}

fn paint_background(canvas: &mut RgbaImage, background: &Background) {
    match *background {
        Background::Solid(color) => {
            for pixel in canvas.pixels_mut() {
                *pixel = color.to_rgba();
            }
        }
        Background::Gradient { from, to } => {
            let span = (canvas.width() + canvas.height()).max(2) as f32 - 2.0;
            for (x, y, pixel) in canvas.enumerate_pixels_mut() {
                let t = if span > 0.0 { (x + y) as f32 / span } else { 0.0 };
                *pixel = image::Rgba([
                    lerp(from.r, to.r, t),
                    lerp(from.g, to.g, t),
                    lerp(from.b, to.b, t),
                    255,
                ]);
            }
        }
    }
}

fn paint_text(canvas: &mut RgbaImage, text: &TextBox) {
    let ink_height = (text.font_size as f32 * 0.6).round().max(1.0) as u32;
    for (i, line) in text.lines.iter().enumerate() {
        let width = template::text_width(line, text.font, text.font_size)
            .min(text.rect.width as f32)
            .round() as u32;
        if width == 0 {
            continue;
        }
        let x = match text.align {
            Align::Left => text.rect.x,
            Align::Center => text.rect.x + (text.rect.width.saturating_sub(width) / 2) as i32,
        };
        let line_top = text.rect.y + (i as u32 * text.line_height) as i32;
        let y = line_top + (text.line_height.saturating_sub(ink_height) / 2) as i32;
        let bar = Rect {
            x,
            y,
            width,
            height: ink_height,
        };
        if let Some(glow) = text.glow {
            let halo = Rect {
                x: bar.x - 4,
                y: bar.y - 4,
                width: bar.width + 8,
                height: bar.height + 8,
            };
            fill_rect(canvas, &halo, Color::rgba(glow.r, glow.g, glow.b, glow.a / 3));
        }
        fill_rect(canvas, &bar, text.color);
    }
}

/// Paint a layout onto a fresh buffer.
pub fn paint_layout(layout: &SlideLayout, image: Option<&image::DynamicImage>) -> RgbaImage {
    let mut canvas = RgbaImage::new(layout.width, layout.height);
    paint_background(&mut canvas, &layout.background);

    if let (Some(placement), Some(image)) = (&layout.image, image) {
        let rect = placement.rect;
        if rect.width > 0 && rect.height > 0 {
            let fitted = image
                .resize_to_fill(rect.width, rect.height, FilterType::Triangle)
                .to_rgba8();
            imageops::overlay(
                &mut canvas,
                &fitted,
                i64::from(rect.x),
                i64::from(rect.y),
            );
        }
    }

    if let Some((rect, color)) = &layout.panel {
        fill_rect(&mut canvas, rect, *color);
    }
    for rule in &layout.rules {
        fill_rect(&mut canvas, &rule.rect, rule.color);
    }

    paint_text(&mut canvas, &layout.title);

    for row in &layout.bullets {
        let marker = &row.marker;
        if let Some(glow) = marker.glow {
            let halo = Rect {
                x: marker.rect.x - 3,
                y: marker.rect.y - 3,
                width: marker.rect.width + 6,
                height: marker.rect.height + 6,
            };
            fill_circle(&mut canvas, &halo, Color::rgba(glow.r, glow.g, glow.b, glow.a / 3));
        }
        match marker.kind {
            MarkerKind::Dot => fill_circle(&mut canvas, &marker.rect, marker.color),
            MarkerKind::CheckSquare => {
                stroke_rect(&mut canvas, &marker.rect, marker.color)
            }
            _ => fill_rect(&mut canvas, &marker.rect, marker.color),
        }
        paint_text(&mut canvas, &row.text);
    }

    if let Some(color) = layout.outline {
        let border = Rect {
            x: 0,
            y: 0,
            width: layout.width,
            height: layout.height,
        };
        stroke_rect(&mut canvas, &border, color);
    }

    canvas
}

/// Renders each slide's HTML in a headless Chrome tab and screenshots it.
///
/// The browser and tab are launched on first use and reused for every slide.
pub struct ChromeRasterizer {
    config: RenderConfig,
    browser: Option<Browser>,
    tab: Option<Arc<Tab>>,
    rendered: bool,
}

impl ChromeRasterizer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            browser: None,
            tab: None,
            rendered: false,
        }
    }

    fn browser_error(message: String) -> ForgeError {
        warn!("{}", message);
        ForgeError::BrowserError {
            message,
            source: None,
        }
    }

    fn tab(&mut self) -> Result<Arc<Tab>> {
        if let Some(tab) = &self.tab {
            return Ok(tab.clone());
        }

        let mut launch_options_builder = LaunchOptionsBuilder::default();
        launch_options_builder.window_size(Some((self.config.width, self.config.height)));
        launch_options_builder.headless(true);

        // Use custom browser path if specified
        if let Some(browser_path) = &self.config.browser_path {
            launch_options_builder.path(Some(browser_path.into()));
        } else if let Ok(path) = env::var("BROWSER_PATH") {
            if !path.is_empty() {
                launch_options_builder.path(Some(path.into()));
            }
        }

        let launch_options = launch_options_builder.build().map_err(|e| {
            Self::browser_error(format!("Failed to build browser options: {:?}", e))
        })?;

        info!("Launching headless browser");
        let browser = Browser::new(launch_options).context("Failed to launch browser")?;
        let tab = browser.new_tab().context("Failed to create new tab")?;

        self.browser = Some(browser);
        self.tab = Some(tab.clone());
        Ok(tab)
    }
}

impl Rasterizer for ChromeRasterizer {
    fn render(&mut self, slide: &Slide, template: &str, theme: &str) -> Result<()> {
        let document = html::render_html(
            slide,
            template,
            theme,
            self.config.width,
            self.config.height,
        );
        let url = format!("data:text/html;base64,{}", STANDARD.encode(document));
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let tab = self.tab()?;

        debug!("Navigating to rendered slide {}", slide.id);
        tab.navigate_to(&url).context("Failed to navigate to slide")?;
        tab.wait_until_navigated().context("Navigation failed")?;
        tab.wait_for_element_with_custom_timeout("#slide", timeout)
            .context("Failed to wait for slide element")?;

        self.rendered = true;
        Ok(())
    }

    fn capture(&mut self) -> Result<RgbaImage> {
        if !self.rendered {
            return Err(ForgeError::ExportFailed(
                "Nothing rendered to capture".to_string(),
            ));
        }
        let tab = self.tab()?;
        let png = tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .context("Failed to capture screenshot")?;

        let shot = image::load_from_memory(&png)?.to_rgba8();
        if shot.dimensions() == (self.config.width, self.config.height) {
            Ok(shot)
        } else {
            debug!(
                "Resizing screenshot from {:?} to {}x{}",
                shot.dimensions(),
                self.config.width,
                self.config.height
            );
            Ok(imageops::resize(
                &shot,
                self.config.width,
                self.config.height,
                FilterType::Triangle,
            ))
        }
    }

    fn release(&mut self) {
        if self.rendered {
            if let Some(tab) = &self.tab {
                if let Err(e) = tab.navigate_to("about:blank") {
                    warn!("Failed to clear render tab: {}", e);
                }
            }
        }
        self.rendered = false;
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}
