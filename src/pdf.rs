// ABOUTME: PDF generation module for the slideforge application
// ABOUTME: Writes one full-bleed JPEG page per rasterized slide, with native page transitions

use crate::errors::{ForgeError, Result};
use crate::export::{DeckWriter, RenderedSlide};
use chrono::{Datelike, Timelike};
use image::ColorType;
use image::codecs::jpeg::JpegEncoder;
use log::info;
use pdf_writer::{Content, Date, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};

const CATALOG_ID: i32 = 1;
const PAGE_TREE_ID: i32 = 2;
const INFO_ID: i32 = 3;
const FIRST_SLIDE_ID: i32 = 4;
const OBJECTS_PER_SLIDE: i32 = 3;

const IMAGE_NAME: Name<'static> = Name(b"Im0");

/// CSS pixels to PDF points.
const PX_TO_PT: f32 = 0.75;

/// A `/Trans` dictionary for one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTransition {
    pub style: &'static str,
    pub direction: Option<i32>,
    pub scale: Option<f32>,
}

impl PageTransition {
    fn new(style: &'static str) -> Self {
        Self {
            style,
            direction: None,
            scale: None,
        }
    }

    fn towards(mut self, direction: i32) -> Self {
        self.direction = Some(direction);
        self
    }

    fn scaled(mut self, scale: f32) -> Self {
        self.scale = Some(scale);
        self
    }
}

/// The page transition for a transition id, where PDF has an equivalent.
pub fn page_transition(id: &str) -> Option<PageTransition> {
    match id {
        "fade" => Some(PageTransition::new("Fade")),
        "slide" | "push" => Some(PageTransition::new("Push").towards(0)),
        "cover" => Some(PageTransition::new("Cover").towards(0)),
        "uncover" => Some(PageTransition::new("Uncover").towards(0)),
        "wipe" => Some(PageTransition::new("Wipe").towards(0)),
        "zoom" => Some(PageTransition::new("Fly").scaled(0.5)),
        _ => None,
    }
}

fn slide_refs(index: usize) -> (Ref, Ref, Ref) {
    let page = FIRST_SLIDE_ID + index as i32 * OBJECTS_PER_SLIDE;
    (Ref::new(page), Ref::new(page + 1), Ref::new(page + 2))
}

fn creation_date() -> Date {
    let now = chrono::Utc::now();
    Date::new(now.year() as u16)
        .month(now.month() as u8)
        .day(now.day() as u8)
        .hour(now.hour() as u8)
        .minute(now.minute() as u8)
        .second(now.second() as u8)
        .utc_offset_hour(0)
}

/// Streams slides into an in-memory PDF document.
pub struct PdfWriter {
    title: String,
    pdf: Pdf,
    page_ids: Vec<Ref>,
    jpeg_quality: u8,
}

impl PdfWriter {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            pdf: Pdf::new(),
            page_ids: Vec::new(),
            jpeg_quality: 90,
        }
    }

    fn encode_jpeg(&self, slide: &RenderedSlide) -> Result<Vec<u8>> {
        let rgb = image::DynamicImage::ImageRgba8(slide.image.clone()).to_rgb8();
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality).encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ColorType::Rgb8,
        )?;
        Ok(jpeg)
    }
}

impl DeckWriter for PdfWriter {
    fn append(&mut self, slide: &RenderedSlide) -> Result<()> {
        let index = self.page_ids.len();
        let (page_id, image_id, content_id) = slide_refs(index);
        info!("Adding page {} to PDF", index + 1);

        let (px_w, px_h) = slide.image.dimensions();
        let (pt_w, pt_h) = (px_w as f32 * PX_TO_PT, px_h as f32 * PX_TO_PT);

        let jpeg = self.encode_jpeg(slide)?;
        let mut xobject = self.pdf.image_xobject(image_id, &jpeg);
        xobject.filter(Filter::DctDecode);
        xobject.width(px_w as i32);
        xobject.height(px_h as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
        xobject.finish();

        let mut content = Content::new();
        content.save_state();
        content.transform([pt_w, 0.0, 0.0, pt_h, 0.0, 0.0]);
        content.x_object(IMAGE_NAME);
        content.restore_state();
        self.pdf.stream(content_id, &content.finish());

        let mut page = self.pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, pt_w, pt_h));
        page.parent(Ref::new(PAGE_TREE_ID));
        page.contents(content_id);
        page.resources().x_objects().pair(IMAGE_NAME, image_id);
        let transition = if slide.has_transition() {
            page_transition(&slide.transition)
        } else {
            None
        };
        if let Some(transition) = transition {
            let mut trans = page.insert(Name(b"Trans")).dict();
            trans.pair(Name(b"Type"), Name(b"Trans"));
            trans.pair(Name(b"S"), Name(transition.style.as_bytes()));
            trans.pair(Name(b"D"), 1.0_f32);
            if let Some(direction) = transition.direction {
                trans.pair(Name(b"Di"), direction);
            }
            if let Some(scale) = transition.scale {
                trans.pair(Name(b"SS"), scale);
            }
            trans.finish();
        }
        page.finish();

        self.page_ids.push(page_id);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        let PdfWriter {
            title,
            mut pdf,
            page_ids,
            ..
        } = *self;
        if page_ids.is_empty() {
            return Err(ForgeError::ExportFailed(
                "Cannot build a PDF without slides".to_string(),
            ));
        }

        let page_tree_id = Ref::new(PAGE_TREE_ID);
        pdf.catalog(Ref::new(CATALOG_ID)).pages(page_tree_id);
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().copied())
            .count(page_ids.len() as i32);
        pdf.document_info(Ref::new(INFO_ID))
            .title(TextStr(&title))
            .producer(TextStr("slideforge"))
            .creation_date(creation_date());

        info!("Finalizing PDF file");
        Ok(pdf.finish())
    }
}
