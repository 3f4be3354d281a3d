// ABOUTME: PPTX generation module for the slideforge application
// ABOUTME: Assembles rasterized slides into a PowerPoint package with transitions and notes

use crate::errors::{ForgeError, Result};
use crate::export::{DeckWriter, RenderedSlide};
use crate::template::is_widescreen;
use log::info;
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::{CompressionMethod, ZipWriter, write::FileOptions};

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

/// 16:9 slide size in EMU, matching the rasterized canvas.
pub const SLIDE_SIZE: (u64, u64) = (9144000, 5143500);

/// Configuration for PPTX generation
#[derive(Debug, Clone)]
pub struct PptxConfig {
    pub title: String,
}

impl Default for PptxConfig {
    fn default() -> Self {
        Self {
            title: "Presentation".to_string(),
        }
    }
}

/// The native `<p:transition>` child for a transition id, when base
/// PresentationML has one.
pub fn native_transition(id: &str) -> Option<&'static str> {
    match id {
        "fade" => Some(r#"<p:fade/>"#),
        "slide" => Some(r#"<p:push dir="l"/>"#),
        "push" => Some(r#"<p:push dir="u"/>"#),
        "cover" => Some(r#"<p:cover dir="l"/>"#),
        "uncover" => Some(r#"<p:pull dir="l"/>"#),
        "wipe" => Some(r#"<p:wipe dir="r"/>"#),
        "zoom" => Some(r#"<p:zoom dir="in"/>"#),
        _ => None,
    }
}

fn stored() -> FileOptions {
    FileOptions::default().compression_method(CompressionMethod::Stored)
}

/// Streams slides into an in-memory PPTX package.
pub struct PptxWriter {
    config: PptxConfig,
    cx: u64,
    cy: u64,
    zip: ZipWriter<Cursor<Vec<u8>>>,
    slide_count: usize,
    /// Slide numbers that received a notes slide.
    notes: Vec<usize>,
}

impl PptxWriter {
    pub fn new(config: PptxConfig) -> Self {
        let (cx, cy) = SLIDE_SIZE;
        Self {
            config,
            cx,
            cy,
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            slide_count: 0,
            notes: Vec::new(),
        }
    }

    fn write_part(&mut self, name: &str, content: &str) -> Result<()> {
        self.zip.start_file(name, FileOptions::default())?;
        self.zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn slide_xml(&self, slide: &RenderedSlide) -> String {
        let transition = if slide.has_transition() {
            match native_transition(&slide.transition) {
                Some(element) => format!(r#"<p:transition spd="med">{}</p:transition>"#, element),
                None => String::new(),
            }
        } else {
            String::new()
        };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="{ns_a}" xmlns:r="{ns_r}" xmlns:p="{ns_p}">
    <p:cSld>
        <p:spTree>
            <p:nvGrpSpPr>
                <p:cNvPr id="1" name=""/>
                <p:cNvGrpSpPr/>
                <p:nvPr/>
            </p:nvGrpSpPr>
            <p:grpSpPr>
                <a:xfrm>
                    <a:off x="0" y="0"/>
                    <a:ext cx="0" cy="0"/>
                    <a:chOff x="0" y="0"/>
                    <a:chExt cx="0" cy="0"/>
                </a:xfrm>
            </p:grpSpPr>
            <p:pic>
                <p:nvPicPr>
                    <p:cNvPr id="2" name="Slide Image" descr="{descr}"/>
                    <p:cNvPicPr>
                        <a:picLocks noChangeAspect="1"/>
                    </p:cNvPicPr>
                    <p:nvPr/>
                </p:nvPicPr>
                <p:blipFill>
                    <a:blip r:embed="rId1"/>
                    <a:stretch>
                        <a:fillRect/>
                    </a:stretch>
                </p:blipFill>
                <p:spPr>
                    <a:xfrm>
                        <a:off x="0" y="0"/>
                        <a:ext cx="{cx}" cy="{cy}"/>
                    </a:xfrm>
                    <a:prstGeom prst="rect">
                        <a:avLst/>
                    </a:prstGeom>
                </p:spPr>
            </p:pic>
        </p:spTree>
    </p:cSld>
    <p:clrMapOvr>
        <a:masterClrMapping/>
    </p:clrMapOvr>
    {transition}
</p:sld>"#,
            ns_a = NS_A,
            ns_r = NS_R,
            ns_p = NS_P,
            descr = escape(slide.title.as_str()),
            cx = self.cx,
            cy = self.cy,
            transition = transition,
        )
    }

    fn notes_xml(text: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:notes xmlns:a="{ns_a}" xmlns:r="{ns_r}" xmlns:p="{ns_p}">
    <p:cSld>
        <p:spTree>
            <p:nvGrpSpPr>
                <p:cNvPr id="1" name=""/>
                <p:cNvGrpSpPr/>
                <p:nvPr/>
            </p:nvGrpSpPr>
            <p:grpSpPr/>
            <p:sp>
                <p:nvSpPr>
                    <p:cNvPr id="2" name="Notes Placeholder"/>
                    <p:cNvSpPr>
                        <a:spLocks noGrp="1"/>
                    </p:cNvSpPr>
                    <p:nvPr>
                        <p:ph type="body" idx="1"/>
                    </p:nvPr>
                </p:nvSpPr>
                <p:spPr/>
                <p:txBody>
                    <a:bodyPr/>
                    <a:lstStyle/>
                    <a:p><a:r><a:rPr lang="en-US"/><a:t>{text}</a:t></a:r></a:p>
                </p:txBody>
            </p:sp>
        </p:spTree>
    </p:cSld>
    <p:clrMapOvr>
        <a:masterClrMapping/>
    </p:clrMapOvr>
</p:notes>"#,
            ns_a = NS_A,
            ns_r = NS_R,
            ns_p = NS_P,
            text = escape(text),
        )
    }

    fn notes_master_xml() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:notesMaster xmlns:a="{ns_a}" xmlns:r="{ns_r}" xmlns:p="{ns_p}">
    <p:cSld>
        <p:spTree>
            <p:nvGrpSpPr>
                <p:cNvPr id="1" name=""/>
                <p:cNvGrpSpPr/>
                <p:nvPr/>
            </p:nvGrpSpPr>
            <p:grpSpPr/>
        </p:spTree>
    </p:cSld>
    <p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
</p:notesMaster>"#,
            ns_a = NS_A,
            ns_r = NS_R,
            ns_p = NS_P,
        )
    }
}

impl DeckWriter for PptxWriter {
    fn append(&mut self, slide: &RenderedSlide) -> Result<()> {
        let slide_num = self.slide_count + 1;
        let (width, height) = slide.image.dimensions();
        if !is_widescreen(width, height) {
            return Err(ForgeError::ExportFailed(format!(
                "Slide {} image is {}x{}, expected a 16:9 canvas",
                slide_num, width, height
            )));
        }
        info!("Adding slide {} to PPTX", slide_num);

        let image_name = format!("image{}.png", slide_num);
        let png = slide.encode_png()?;
        self.zip
            .start_file(format!("ppt/media/{}", image_name), stored())?;
        self.zip.write_all(&png)?;

        let mut slide_rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/{}"/>
"#,
            image_name
        );

        // Every transition is also carried as a note, which is the only carrier
        // for ids without a native element.
        if slide.has_transition() {
            if native_transition(&slide.transition).is_none() {
                info!(
                    "Transition {:?} has no native PPTX element; keeping it as a note",
                    slide.transition
                );
            }
            slide_rels.push_str(&format!(
                r#"    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide" Target="../notesSlides/notesSlide{}.xml"/>
"#,
                slide_num
            ));

            let notes_rels = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesMaster" Target="../notesMasters/notesMaster1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="../slides/slide{}.xml"/>
</Relationships>"#,
                slide_num
            );
            self.write_part(
                &format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", slide_num),
                &notes_rels,
            )?;
            self.write_part(
                &format!("ppt/notesSlides/notesSlide{}.xml", slide_num),
                &Self::notes_xml(&slide.transition),
            )?;
            self.notes.push(slide_num);
        }
        slide_rels.push_str("</Relationships>");

        self.write_part(
            &format!("ppt/slides/_rels/slide{}.xml.rels", slide_num),
            &slide_rels,
        )?;
        let slide_xml = self.slide_xml(slide);
        self.write_part(&format!("ppt/slides/slide{}.xml", slide_num), &slide_xml)?;

        self.slide_count = slide_num;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<Vec<u8>> {
        if self.slide_count == 0 {
            return Err(ForgeError::ExportFailed(
                "Cannot build a PPTX without slides".to_string(),
            ));
        }
        let count = self.slide_count;
        let has_notes = !self.notes.is_empty();

        info!("Creating PPTX structure: [Content_Types].xml");
        let mut overrides: Vec<String> = (1..=count)
            .map(|i| format!(r#"    <Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#, i))
            .collect();
        overrides.extend(self.notes.iter().map(|i| format!(r#"    <Override PartName="/ppt/notesSlides/notesSlide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml"/>"#, i)));
        if has_notes {
            overrides.push(r#"    <Override PartName="/ppt/notesMasters/notesMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.notesMaster+xml"/>"#.to_string());
        }
        let content_types = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="xml" ContentType="application/xml"/>
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="png" ContentType="image/png"/>
    <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
    <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
    <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
{}
</Types>"#,
            overrides.join("\n")
        );
        self.write_part("[Content_Types].xml", &content_types)?;

        info!("Creating PPTX structure: _rels/.rels");
        self.write_part(
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#,
        )?;

        info!("Creating PPTX structure: docProps/app.xml");
        let app_xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
    <Application>slideforge</Application>
    <Slides>{}</Slides>
    <Notes>{}</Notes>
</Properties>"#,
            count,
            self.notes.len()
        );
        self.write_part("docProps/app.xml", &app_xml)?;

        info!("Creating PPTX structure: docProps/core.xml");
        let core_xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <dc:title>{}</dc:title>
    <dc:creator>slideforge</dc:creator>
    <dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>
    <cp:revision>1</cp:revision>
</cp:coreProperties>"#,
            escape(self.config.title.as_str()),
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
        );
        self.write_part("docProps/core.xml", &core_xml)?;

        info!("Creating PPTX structure: ppt/_rels/presentation.xml.rels");
        let mut pres_rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
        );
        for i in 1..=count {
            pres_rels.push_str(&format!(
                r#"    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
                i, i
            ));
            pres_rels.push('\n');
        }
        let notes_master_rid = count + 1;
        if has_notes {
            pres_rels.push_str(&format!(
                r#"    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesMaster" Target="notesMasters/notesMaster1.xml"/>"#,
                notes_master_rid
            ));
            pres_rels.push('\n');
        }
        pres_rels.push_str("</Relationships>");
        self.write_part("ppt/_rels/presentation.xml.rels", &pres_rels)?;

        if has_notes {
            self.write_part(
                "ppt/notesMasters/notesMaster1.xml",
                &Self::notes_master_xml(),
            )?;
        }

        info!("Creating PPTX structure: ppt/presentation.xml");
        let notes_master_list = if has_notes {
            format!(
                r#"
    <p:notesMasterIdLst>
        <p:notesMasterId r:id="rId{}"/>
    </p:notesMasterIdLst>"#,
                notes_master_rid
            )
        } else {
            String::new()
        };
        let presentation_xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="{ns_a}" xmlns:r="{ns_r}" xmlns:p="{ns_p}">{notes_master_list}
    <p:sldIdLst>
{slide_ids}
    </p:sldIdLst>
    <p:sldSz cx="{cx}" cy="{cy}"/>
    <p:notesSz cx="6858000" cy="9144000"/>
</p:presentation>"#,
            ns_a = NS_A,
            ns_r = NS_R,
            ns_p = NS_P,
            notes_master_list = notes_master_list,
            slide_ids = (1..=count)
                .map(|i| format!(r#"        <p:sldId id="{}" r:id="rId{}"/>"#, 255 + i, i))
                .collect::<Vec<String>>()
                .join("\n"),
            cx = self.cx,
            cy = self.cy
        );
        self.write_part("ppt/presentation.xml", &presentation_xml)?;

        info!("Finalizing PPTX file");
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_transitions_cover_base_ooxml_ids_only() {
        for id in ["fade", "slide", "push", "cover", "uncover", "wipe", "zoom"] {
            assert!(native_transition(id).is_some(), "{}", id);
        }
        for id in ["vortex", "windshield", "doors", "window", "none"] {
            assert!(native_transition(id).is_none(), "{}", id);
        }
    }

    #[test]
    fn slide_size_is_widescreen() {
        let (cx, cy) = SLIDE_SIZE;
        assert_eq!(cx * 9, cy * 16);
    }

    #[test]
    fn non_widescreen_images_are_rejected() {
        let mut writer = PptxWriter::new(PptxConfig::default());
        let slide = RenderedSlide {
            title: "Square".to_string(),
            transition: "none".to_string(),
            image: image::RgbaImage::new(40, 30),
        };
        assert!(matches!(
            writer.append(&slide),
            Err(ForgeError::ExportFailed(_))
        ));
    }

    #[test]
    fn empty_deck_cannot_finish() {
        let writer: Box<dyn DeckWriter> = Box::new(PptxWriter::new(PptxConfig::default()));
        assert!(writer.finish().is_err());
    }

    #[test]
    fn notes_text_is_escaped() {
        let xml = PptxWriter::notes_xml("a<b");
        assert!(xml.contains("<a:t>a&lt;b</a:t>"));
    }
}
