// ABOUTME: Export pipeline for the slideforge application
// ABOUTME: Rasterizes every slide in order and assembles them into a PPTX or PDF document

use crate::errors::{ForgeError, Result};
use crate::model::Presentation;
use crate::pdf::PdfWriter;
use crate::pptx::{PptxConfig, PptxWriter};
use crate::render::Rasterizer;
use crate::template::is_widescreen;
use crate::utils;
use image::{ImageOutputFormat, RgbaImage};
use log::{debug, error, info};
use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread;
use std::time::Duration;

/// One captured slide, ready to be appended to a document.
#[derive(Debug, Clone)]
pub struct RenderedSlide {
    pub title: String,
    pub transition: String,
    pub image: RgbaImage,
}

impl RenderedSlide {
    pub fn has_transition(&self) -> bool {
        !self.transition.is_empty() && self.transition != crate::catalog::NO_TRANSITION
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut png = Cursor::new(Vec::new());
        self.image.write_to(&mut png, ImageOutputFormat::Png)?;
        Ok(png.into_inner())
    }
}

/// A document being built one slide at a time.
///
/// Nothing touches disk until `finish` returns the complete file.
pub trait DeckWriter {
    fn append(&mut self, slide: &RenderedSlide) -> Result<()>;
    fn finish(self: Box<Self>) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pptx,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pptx => "pptx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pptx" => Ok(ExportFormat::Pptx),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ForgeError::ValidationError(format!(
                "Unknown export format: {}",
                other
            ))),
        }
    }
}

/// Configuration for a single export run
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Pause between rendering a slide and capturing it.
    pub settle_delay_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 500,
        }
    }
}

fn writer_for(format: ExportFormat, presentation: &Presentation) -> Box<dyn DeckWriter> {
    match format {
        ExportFormat::Pptx => Box::new(PptxWriter::new(PptxConfig {
            title: presentation.title.clone(),
        })),
        ExportFormat::Pdf => Box::new(PdfWriter::new(&presentation.title)),
    }
}

fn export_error(err: ForgeError) -> ForgeError {
    match err {
        ForgeError::ExportFailed(message) => ForgeError::ExportFailed(message),
        other => ForgeError::ExportFailed(other.to_string()),
    }
}

fn capture_slide(
    rasterizer: &mut dyn Rasterizer,
    presentation: &Presentation,
    index: usize,
    settle: Duration,
) -> Result<RenderedSlide> {
    let slide = &presentation.slides[index];
    rasterizer.render(slide, &presentation.template, &presentation.theme)?;
    if !settle.is_zero() {
        thread::sleep(settle);
    }
    let image = rasterizer.capture()?;
    Ok(RenderedSlide {
        title: slide.title.clone(),
        transition: slide.transition.clone(),
        image,
    })
}

/// Render every slide of `presentation` in order and return the finished
/// document bytes.
///
/// Slides go through the rasterizer strictly one at a time. The render target
/// is released after each slide, including when that slide fails.
pub fn export_presentation(
    presentation: &Presentation,
    rasterizer: &mut dyn Rasterizer,
    format: ExportFormat,
    config: &ExportConfig,
) -> Result<Vec<u8>> {
    if presentation.is_empty() {
        return Err(ForgeError::ExportFailed(
            "Presentation has no slides to export".to_string(),
        ));
    }
    let (width, height) = rasterizer.dimensions();
    if !is_widescreen(width, height) {
        return Err(ForgeError::ExportFailed(format!(
            "Render target is {}x{}, slides need a 16:9 canvas",
            width, height
        )));
    }

    info!(
        "Exporting {} slides of {:?} as {}",
        presentation.len(),
        presentation.title,
        format
    );
    let settle = Duration::from_millis(config.settle_delay_ms);
    let mut writer = writer_for(format, presentation);

    for index in 0..presentation.len() {
        debug!("Rendering slide {}/{}", index + 1, presentation.len());
        let captured = capture_slide(rasterizer, presentation, index, settle);
        rasterizer.release();

        let appended = captured.and_then(|slide| writer.append(&slide));
        if let Err(e) = appended {
            error!("Export failed on slide {}: {}", index + 1, e);
            return Err(export_error(e));
        }
    }

    writer.finish().map_err(export_error)
}

/// Export to `output`, creating parent directories as needed.
///
/// The file is only written once the whole document has been built.
pub fn export_to_file(
    presentation: &Presentation,
    rasterizer: &mut dyn Rasterizer,
    format: ExportFormat,
    config: &ExportConfig,
    output: &Path,
) -> Result<PathBuf> {
    let bytes = export_presentation(presentation, rasterizer, format, config)?;

    utils::ensure_parent_directory_exists(output).map_err(export_error)?;
    fs::write(output, &bytes)
        .map_err(|e| ForgeError::ExportFailed(format!("{}: {}", output.display(), e)))?;

    info!("Wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(output.to_path_buf())
}

/// Sanitized deck title plus the format's extension, inside `dir`.
pub fn default_output_path(
    presentation: &Presentation,
    format: ExportFormat,
    dir: &Path,
) -> PathBuf {
    dir.join(format!(
        "{}.{}",
        utils::sanitize_file_stem(&presentation.title),
        format.extension()
    ))
}
