use slideforge::{
    CanvasRasterizer, ChromeRasterizer, ExportConfig, ExportFormat, FileStorage, Presentation,
    RenderConfig, SessionStore, Slide, default_output_path, export_to_file,
};
use std::fs;
use std::io::Read;
use tempfile::TempDir;
use zip::ZipArchive;

fn sample_presentation() -> Presentation {
    let transitions = ["none", "fade", "zoom", "doors"];
    let slides = transitions
        .iter()
        .enumerate()
        .map(|(i, transition)| {
            let mut slide = Slide::new(
                format!("Topic {}", i + 1),
                vec!["Short point".to_string(), "Another point".to_string()],
            );
            slide.transition = transition.to_string();
            slide
        })
        .collect();
    Presentation::new("Export: Test", "hologram-ui", "dark", slides)
}

fn no_settle() -> ExportConfig {
    ExportConfig { settle_delay_ms: 0 }
}

fn read_entry(archive: &mut ZipArchive<fs::File>, name: &str) -> String {
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("missing {}", name))
        .read_to_string(&mut content)
        .expect("Failed to read entry");
    content
}

#[test]
fn test_export_stored_presentation_to_pptx() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = SessionStore::new(
        FileStorage::open(&temp_dir.path().join("session.json")).expect("Failed to open storage"),
    );
    store.save_presentation(&sample_presentation()).unwrap();
    let presentation = store.load_presentation().unwrap().unwrap();

    let output = default_output_path(&presentation, ExportFormat::Pptx, temp_dir.path());
    assert_eq!(output.file_name().unwrap(), "Export_ Test.pptx");

    let mut rasterizer = CanvasRasterizer::new(320, 180);
    export_to_file(
        &presentation,
        &mut rasterizer,
        ExportFormat::Pptx,
        &no_settle(),
        &output,
    )
    .expect("Export failed");

    let mut archive = ZipArchive::new(fs::File::open(&output).unwrap()).unwrap();

    let content_types = read_entry(&mut archive, "[Content_Types].xml");
    assert_eq!(content_types.matches("/ppt/slides/slide").count(), 4);

    let presentation_xml = read_entry(&mut archive, "ppt/presentation.xml");
    assert_eq!(presentation_xml.matches("<p:sldId ").count(), 4);

    for n in 1..=4 {
        let slide = read_entry(&mut archive, &format!("ppt/slides/slide{}.xml", n));
        assert!(slide.contains(&format!("Topic {}", n)));
        assert!(archive.by_name(&format!("ppt/media/image{}.png", n)).is_ok());
    }
    assert!(read_entry(&mut archive, "ppt/slides/slide3.xml").contains(r#"<p:zoom dir="in"/>"#));
    assert!(read_entry(&mut archive, "ppt/notesSlides/notesSlide4.xml").contains("doors"));
    assert!(archive.by_name("ppt/notesMasters/notesMaster1.xml").is_ok());
}

#[test]
fn test_export_pdf_has_one_page_per_slide() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let presentation = sample_presentation();
    let output = temp_dir.path().join("nested").join("deck.pdf");

    let mut rasterizer = CanvasRasterizer::new(320, 180);
    export_to_file(
        &presentation,
        &mut rasterizer,
        ExportFormat::Pdf,
        &no_settle(),
        &output,
    )
    .expect("Export failed");

    let bytes = fs::read(&output).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.starts_with("%PDF-"));
    assert!(text.contains("/Count 4"));
    assert_eq!(text.matches("/DCTDecode").count(), 4);
    assert!(text.contains("(Export: Test)"));
}

#[test]
fn test_failed_export_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut presentation = sample_presentation();
    presentation.slides[3].image_url = "data:image/png;base64,????".to_string();
    let output = temp_dir.path().join("broken.pptx");

    let mut rasterizer = CanvasRasterizer::new(320, 180);
    let result = export_to_file(
        &presentation,
        &mut rasterizer,
        ExportFormat::Pptx,
        &no_settle(),
        &output,
    );

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().starts_with("Export failed"));
    assert!(!output.exists());
}

#[test]
#[ignore] // Ignore by default as it requires a headless browser
fn test_export_with_chrome() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let presentation = sample_presentation();
    let output = temp_dir.path().join("chrome.pptx");

    let mut rasterizer = ChromeRasterizer::new(RenderConfig::default());
    export_to_file(
        &presentation,
        &mut rasterizer,
        ExportFormat::Pptx,
        &ExportConfig::default(),
        &output,
    )
    .expect("Export failed");

    let archive = ZipArchive::new(fs::File::open(&output).unwrap()).unwrap();
    let images = archive
        .file_names()
        .filter(|name| name.starts_with("ppt/media/"))
        .count();
    assert_eq!(images, 4);
}
