// ABOUTME: Main entry point for the slideforge program.
// ABOUTME: Provides the CLI over generation, editing, slideshow playback and export.

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use slideforge::errors::ForgeError;
use slideforge::generation::StaticGenerator;
use slideforge::{
    CanvasRasterizer, ChromeRasterizer, Config, Editor, ExportFormat, FileStorage,
    GenerationRequest, HttpGenerator, Key, Navigator, Panel, Player, PlayerAction, Rasterizer,
    Result, Screen, SessionStore, SlideGenerator, catalog,
};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Session file holding the presentation and panel layout
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new presentation and store it
    Create(CreateArgs),

    /// Print the stored presentation
    Show,

    /// Add, delete, move or select slides
    #[command(subcommand)]
    Slide(SlideCommand),

    /// Set a slide's title
    Title {
        /// Slide position (1-based)
        slide: usize,
        text: String,
    },

    /// Edit a slide's bullet points
    #[command(subcommand)]
    Bullet(BulletCommand),

    /// Attach or remove a slide image
    #[command(subcommand)]
    Image(ImageCommand),

    /// Set a slide's transition
    Transition {
        /// Slide position (1-based)
        slide: usize,
        id: String,
    },

    /// Change deck-wide settings
    #[command(subcommand)]
    Deck(DeckCommand),

    /// Collapse or resize the editor side panels
    #[command(subcommand)]
    Panel(PanelCommand),

    /// Export the presentation to PPTX or PDF
    Export(ExportArgs),

    /// Run the slideshow in the terminal; type n, p, space or q and Enter to steer it
    Play(PlayArgs),

    /// List templates, themes and transitions
    Catalog,
}

#[derive(Args)]
struct CreateArgs {
    /// Presentation title (5-100 characters)
    #[arg(long)]
    title: String,

    /// What the presentation is about (10-500 characters)
    #[arg(long)]
    topic: String,

    /// Source text to build the slides from
    #[arg(long)]
    raw_text: Option<String>,

    #[arg(long, default_value = catalog::DEFAULT_TEMPLATE)]
    template: String,

    #[arg(long, default_value = catalog::DEFAULT_THEME)]
    theme: String,

    /// Use a saved generator response instead of calling the endpoint
    #[arg(long)]
    from_json: Option<PathBuf>,
}

#[derive(Subcommand)]
enum SlideCommand {
    Add,
    Delete { slide: usize },
    Move { from: usize, to: usize },
    Select { slide: usize },
}

#[derive(Subcommand)]
enum BulletCommand {
    Add { slide: usize },
    Edit { slide: usize, bullet: usize, text: String },
    Remove { slide: usize, bullet: usize },
    /// Replace the bullets with generated suggestions for the slide title
    Suggest {
        slide: usize,
        #[arg(long)]
        from_json: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ImageCommand {
    /// Embed a local file or remote URL as the slide image
    Set { slide: usize, source: String },
    Clear { slide: usize },
}

#[derive(Subcommand)]
enum DeckCommand {
    Template { id: String },
    Theme { id: String },
    /// Transition given to newly added slides
    Transition { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum PanelSide {
    Left,
    Right,
}

impl From<PanelSide> for Panel {
    fn from(side: PanelSide) -> Self {
        match side {
            PanelSide::Left => Panel::Left,
            PanelSide::Right => Panel::Right,
        }
    }
}

#[derive(Subcommand)]
enum PanelCommand {
    Collapse { side: PanelSide },
    Resize { side: PanelSide, width: u32 },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Pptx,
    Pdf,
}

#[derive(Clone, Copy, ValueEnum)]
enum RendererArg {
    /// Draw slides directly, no browser needed
    Canvas,
    /// Screenshot slides in headless Chrome
    Chrome,
}

#[derive(Args)]
struct ExportArgs {
    #[arg(short, long, value_enum, default_value = "pptx")]
    format: FormatArg,

    /// Output file (defaults to the deck title in the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "canvas")]
    renderer: RendererArg,

    /// Pause between rendering and capturing each slide
    #[arg(long)]
    settle_ms: Option<u64>,
}

#[derive(Args)]
struct PlayArgs {
    /// Auto-advance interval
    #[arg(long)]
    interval_ms: Option<u64>,
}

fn position(slide: usize) -> Result<usize> {
    slide.checked_sub(1).ok_or_else(|| {
        ForgeError::ValidationError("Positions start at 1".to_string())
    })
}

fn open_store(config: &Config) -> Result<SessionStore<FileStorage>> {
    Ok(SessionStore::new(FileStorage::open(&config.storage_path)?))
}

/// Open a screen that needs a deck, failing the way the app redirects to create.
fn open_screen(config: &Config, screen: Screen) -> Result<SessionStore<FileStorage>> {
    let store = open_store(config)?;
    match Navigator::new().open(screen, &store) {
        Screen::Create => Err(ForgeError::NoPresentation),
        _ => Ok(store),
    }
}

fn open_editor(config: &Config) -> Result<Editor<FileStorage>> {
    Editor::open(open_screen(config, Screen::Editor)?)
}

fn generator(config: &Config, from_json: Option<&PathBuf>) -> Result<Box<dyn SlideGenerator>> {
    match from_json {
        Some(path) => Ok(Box::new(StaticGenerator::from_file(path)?)),
        None => Ok(Box::new(HttpGenerator::new(
            config.generation_url()?,
            config.generation_api_key.clone(),
            config.default_timeout_ms,
        )?)),
    }
}

fn print_deck(editor: &Editor<FileStorage>) {
    let deck = editor.presentation();
    println!("{}", deck.title);
    println!(
        "template: {}  theme: {}  transition: {}",
        deck.template,
        deck.theme,
        deck.default_transition()
    );
    for (i, slide) in deck.slides.iter().enumerate() {
        let marker = if i == editor.active_index() { '>' } else { ' ' };
        let mut extras = Vec::new();
        if slide.has_transition() {
            extras.push(slide.transition.clone());
        }
        if slide.has_image() {
            extras.push("image".to_string());
        }
        let extras = if extras.is_empty() {
            String::new()
        } else {
            format!(" [{}]", extras.join(", "))
        };
        println!("{} {}. {}{}", marker, i + 1, slide.title, extras);
        for bullet in &slide.bullet_points {
            println!("      - {}", bullet);
        }
    }
    let layout = editor.layout();
    println!(
        "panels: left {}{}  right {}{}",
        layout.left_width,
        if layout.left_collapsed { " (collapsed)" } else { "" },
        layout.right_width,
        if layout.right_collapsed { " (collapsed)" } else { "" }
    );
}

fn create(config: &Config, args: &CreateArgs) -> Result<()> {
    let mut request =
        GenerationRequest::new(&args.title, &args.topic, &args.template, &args.theme);
    if let Some(raw_text) = &args.raw_text {
        request = request.with_raw_text(raw_text);
    }
    // Validate before building a client so bad input never needs an endpoint.
    request.validate()?;

    let generator = generator(config, args.from_json.as_ref())?;
    let presentation = slideforge::create_presentation(generator.as_ref(), &request)?;
    open_store(config)?.save_presentation(&presentation)?;
    println!(
        "Created {:?} with {} slides",
        presentation.title,
        presentation.len()
    );
    Ok(())
}

fn export(config: &Config, args: &ExportArgs) -> Result<()> {
    let store = open_store(config)?;
    let presentation = store.load_presentation()?.ok_or(ForgeError::NoPresentation)?;
    let format = match args.format {
        FormatArg::Pptx => ExportFormat::Pptx,
        FormatArg::Pdf => ExportFormat::Pdf,
    };
    let output = match &args.output {
        Some(path) => path.clone(),
        None => slideforge::default_output_path(&presentation, format, &std::env::current_dir()?),
    };

    let render_config = config.get_render_config(None, None, None)?;
    let export_config = config.get_export_config(args.settle_ms);
    let mut rasterizer: Box<dyn Rasterizer> = match args.renderer {
        RendererArg::Canvas => Box::new(CanvasRasterizer::from_config(&render_config)),
        RendererArg::Chrome => Box::new(ChromeRasterizer::new(render_config)),
    };

    let written = slideforge::export_to_file(
        &presentation,
        rasterizer.as_mut(),
        format,
        &export_config,
        &output,
    )?;
    println!("Exported {} slides to {:?}", presentation.len(), written);
    Ok(())
}

/// Forward key lines from stdin until it closes.
fn spawn_key_reader() -> Receiver<Key> {
    let (sender, receiver) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let name = if line.is_empty() { " " } else { line.trim() };
            if let Some(key) = Key::from_name(name) {
                if sender.send(key).is_err() {
                    break;
                }
            }
        }
    });
    receiver
}

fn show_slide(player: &Player) {
    let slide = player.current_slide();
    println!(
        "[{}/{}] {}",
        player.current_index() + 1,
        player.presentation().len(),
        slide.title
    );
    for bullet in &slide.bullet_points {
        println!("    - {}", bullet);
    }
}

fn play(config: &Config, args: &PlayArgs) -> Result<()> {
    let presentation = open_screen(config, Screen::Preview)?
        .load_presentation()?
        .ok_or(ForgeError::NoPresentation)?;
    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.auto_advance());

    let mut player = Player::new(presentation, interval, Instant::now())?;
    let mut keys = Some(spawn_key_reader());
    show_slide(&player);

    loop {
        let wait = player
            .deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()));
        if let Some(receiver) = &keys {
            let received = match wait {
                Some(wait) => receiver.recv_timeout(wait),
                None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(key) => {
                    let (index, state) = (player.current_index(), player.state());
                    if player.handle_key(key, Instant::now()) == PlayerAction::Exit {
                        break;
                    }
                    if index != player.current_index() {
                        show_slide(&player);
                    } else if state != player.state() {
                        println!("({:?})", player.state());
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    info!("Input closed, playing on the timer alone");
                    keys = None;
                }
            }
        } else {
            match wait {
                Some(wait) => std::thread::sleep(wait),
                None => break,
            }
        }
        if player.poll(Instant::now()) {
            show_slide(&player);
        }
    }
    info!("Slideshow stopped at slide {}", player.current_index() + 1);
    Ok(())
}

fn print_catalog() {
    println!("Templates:");
    for template in catalog::TEMPLATES {
        println!("  {:<20} {}", template.id, template.description);
    }
    println!("Themes:");
    for theme in catalog::THEMES {
        println!("  {:<20} {}", theme.id, theme.name);
    }
    println!("Transitions:");
    for transition in catalog::TRANSITIONS {
        println!("  {:<20} {}", transition.id, transition.name);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = Config::from_env();
    if let Some(storage) = &cli.storage {
        config.storage_path = storage.clone();
    }

    match &cli.command {
        Some(Commands::Create(args)) => create(&config, args),
        Some(Commands::Show) => {
            print_deck(&open_editor(&config)?);
            Ok(())
        }
        Some(Commands::Slide(command)) => {
            let mut editor = open_editor(&config)?;
            match command {
                SlideCommand::Add => {
                    let index = editor.add_slide()?;
                    println!("Added slide {}", index + 1);
                }
                SlideCommand::Delete { slide } => {
                    if !editor.delete_slide(position(*slide)?)? {
                        println!("A presentation needs at least one slide");
                    }
                }
                SlideCommand::Move { from, to } => {
                    editor.reorder(position(*from)?, position(*to)?)?;
                }
                SlideCommand::Select { slide } => editor.select(position(*slide)?),
            }
            print_deck(&editor);
            Ok(())
        }
        Some(Commands::Title { slide, text }) => {
            open_editor(&config)?.set_title(position(*slide)?, text)
        }
        Some(Commands::Bullet(command)) => {
            let mut editor = open_editor(&config)?;
            match command {
                BulletCommand::Add { slide } => {
                    editor.add_bullet(position(*slide)?)?;
                }
                BulletCommand::Edit { slide, bullet, text } => {
                    editor.edit_bullet(position(*slide)?, position(*bullet)?, text)?
                }
                BulletCommand::Remove { slide, bullet } => {
                    editor.remove_bullet(position(*slide)?, position(*bullet)?)?
                }
                BulletCommand::Suggest { slide, from_json } => {
                    let index = position(*slide)?;
                    let len = editor.presentation().len();
                    let title = editor
                        .presentation()
                        .slides
                        .get(index)
                        .map(|s| s.title.clone())
                        .ok_or(ForgeError::IndexOutOfRange {
                            what: "slide",
                            index,
                            len,
                        })?;
                    let generator = generator(&config, from_json.as_ref())?;
                    let bullets = slideforge::suggest_bullets(generator.as_ref(), &title)?;
                    editor.replace_bullets(index, bullets)?;
                }
            }
            print_deck(&editor);
            Ok(())
        }
        Some(Commands::Image(command)) => {
            let mut editor = open_editor(&config)?;
            match command {
                ImageCommand::Set { slide, source } => {
                    let data_url = slideforge::ImageSource::new(source).to_data_url()?;
                    editor.set_image(position(*slide)?, &data_url)
                }
                ImageCommand::Clear { slide } => editor.clear_image(position(*slide)?),
            }
        }
        Some(Commands::Transition { slide, id }) => {
            open_editor(&config)?.set_transition(position(*slide)?, id)
        }
        Some(Commands::Deck(command)) => {
            let mut editor = open_editor(&config)?;
            match command {
                DeckCommand::Template { id } => editor.set_template(id),
                DeckCommand::Theme { id } => editor.set_theme(id),
                DeckCommand::Transition { id } => editor.set_deck_transition(id),
            }
        }
        Some(Commands::Panel(command)) => {
            let mut editor = open_editor(&config)?;
            match command {
                PanelCommand::Collapse { side } => {
                    let collapsed = editor.toggle_panel((*side).into())?;
                    println!("{}", if collapsed { "collapsed" } else { "expanded" });
                }
                PanelCommand::Resize { side, width } => {
                    if !editor.resize_panel((*side).into(), *width)? {
                        println!("Width must be between 150 and 500 (exclusive)");
                    }
                }
            }
            Ok(())
        }
        Some(Commands::Export(args)) => export(&config, args),
        Some(Commands::Play(args)) => play(&config, args),
        Some(Commands::Catalog) => {
            print_catalog();
            Ok(())
        }
        None => {
            println!("No command specified. Use --help for usage information.");
            Ok(())
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
