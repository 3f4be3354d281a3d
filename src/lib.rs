// ABOUTME: Library module for the slideforge program.
// ABOUTME: Contains generation, editing, slideshow, rendering and PPTX/PDF export of presentations.

// Reexport modules
pub mod catalog;
pub mod config;
pub mod editor;
pub mod errors;
pub mod export;
pub mod generation;
pub mod html;
pub mod model;
pub mod navigation;
pub mod pdf;
pub mod player;
pub mod pptx;
pub mod render;
pub mod resources;
pub mod storage;
pub mod style;
pub mod template;
pub mod utils;

// Reexport common types and functions
pub use config::Config;
pub use editor::{Editor, Panel};
pub use errors::{ForgeError, Result};
pub use export::{
    DeckWriter, ExportConfig, ExportFormat, RenderedSlide, default_output_path,
    export_presentation, export_to_file,
};
pub use generation::{
    GenerationRequest, HttpGenerator, SlideGenerator, create_presentation, suggest_bullets,
};
pub use html::render_html;
pub use model::{Presentation, Slide};
pub use navigation::{Key, Navigator, Screen};
pub use player::{PlayState, Player, PlayerAction};
pub use pptx::{PptxConfig, PptxWriter};
pub use render::{CanvasRasterizer, ChromeRasterizer, Rasterizer, RenderConfig};
pub use resources::ImageSource;
pub use storage::{FileStorage, MemoryStorage, PanelLayout, SessionStore, Storage};
pub use style::style_for;
pub use template::layout_slide;
