//! Command line front end over the document core.
//!
//! ```bash
//! docview report.pdf info
//! docview report.pdf render --page 2 --output page3.png --scale 0.5
//! docview report.pdf search "quarterly   results"
//! docview slides.xps --mime application/oxps outline
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use docview::document::{BGR_CHANNELS, Document, LinkTarget, MupdfEngine};
use docview::settings::Settings;
use log::{LevelFilter, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode, WriteLogger};

#[derive(Parser, Debug)]
#[command(name = "docview")]
#[command(version, about = "Render, search and inspect PDF, XPS and CBZ documents")]
struct Args {
    /// Document to open
    file: PathBuf,

    /// MIME type hint; guessed from the extension when omitted
    #[arg(long, default_value = "")]
    mime: String,

    /// Password for encrypted documents
    #[arg(long)]
    password: Option<String>,

    /// Render resolution in dpi, overrides the config file
    #[arg(long)]
    resolution: Option<u32>,

    /// Settings file instead of the per-user config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of the terminal
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Page count and page sizes
    Info,
    /// Draw one page to a PNG file
    Render {
        /// Zero-based page number
        #[arg(short, long, default_value_t = 0)]
        page: i32,
        #[arg(short, long)]
        output: PathBuf,
        /// Output size relative to the page size at the render resolution
        #[arg(short, long, default_value_t = 1.0)]
        scale: f32,
        /// Invert colours (night mode)
        #[arg(long)]
        invert: bool,
    },
    /// Find text on a page, or on every page when none is given
    Search {
        needle: String,
        #[arg(short, long)]
        page: Option<i32>,
    },
    /// List links on a page
    Links {
        #[arg(short, long, default_value_t = 0)]
        page: i32,
    },
    /// Print the document outline
    Outline,
}

fn init_logging(args: &Args, settings: &Settings) -> Result<()> {
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        settings.log_level_filter()
    };
    match &args.log_file {
        Some(path) => WriteLogger::init(level, Config::default(), File::create(path)?)?,
        None => TermLogger::init(
            level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )?,
    }
    Ok(())
}

fn open(args: &Args, settings: &Settings) -> Result<Document<MupdfEngine>> {
    let mut options = settings.to_options();
    if let Some(resolution) = args.resolution {
        options.resolution = resolution;
    }

    let mut doc = Document::<MupdfEngine>::open_path(&args.file, &args.mime, options)
        .map_err(|e| anyhow!("cannot open {}: {e}", args.file.display()))?;

    if doc.needs_password() {
        let password = args
            .password
            .as_deref()
            .context("document is encrypted, pass --password")?;
        if !doc.authenticate_password(password) {
            bail!("wrong password");
        }
    }
    Ok(doc)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;
    init_logging(&args, &settings)?;
    info!("Opening {}", args.file.display());

    let mut doc = open(&args, &settings)?;
    let page_count = doc.page_count()?;

    match &args.command {
        Command::Info => {
            println!("format: {:?}", doc.engine().format());
            println!("pages: {page_count}");
            println!("resolution: {} dpi", doc.resolution());
            for number in 0..page_count {
                doc.goto_page(number)?;
                println!(
                    "page {number}: {}x{} px",
                    doc.page_width(),
                    doc.page_height()
                );
            }
        }
        Command::Render {
            page,
            output,
            scale,
            invert,
        } => render(&mut doc, *page, output, *scale, *invert)?,
        Command::Search { needle, page } => {
            let pages = match page {
                Some(page) => *page..*page + 1,
                None => 0..page_count,
            };
            for number in pages {
                doc.goto_page(number)?;
                for hit in doc.search_text(needle)? {
                    println!(
                        "page {number}: ({:.0}, {:.0}) - ({:.0}, {:.0})",
                        hit.x0, hit.y0, hit.x1, hit.y1
                    );
                }
            }
        }
        Command::Links { page } => {
            doc.goto_page(*page)?;
            for link in doc.links()? {
                let target = match &link.target {
                    LinkTarget::Internal { page } => format!("page {page}"),
                    LinkTarget::Remote {
                        page, file_spec, ..
                    } => format!("{file_spec} page {page}"),
                    LinkTarget::Uri { uri } => uri.clone(),
                };
                println!(
                    "({:.0}, {:.0}) - ({:.0}, {:.0}) -> {target}",
                    link.rect.x0, link.rect.y0, link.rect.x1, link.rect.y1
                );
            }
        }
        Command::Outline => {
            for item in doc.outline() {
                println!(
                    "{}{} ... {}",
                    "  ".repeat(item.level),
                    item.title,
                    item.page_number + 1
                );
            }
        }
    }
    Ok(())
}

fn render(
    doc: &mut Document<MupdfEngine>,
    page: i32,
    output: &Path,
    scale: f32,
    invert: bool,
) -> Result<()> {
    if scale <= 0.0 {
        bail!("scale must be positive");
    }
    doc.goto_page(page)?;
    let width = ((doc.page_width() as f32 * scale).round() as i32).max(1);
    let height = ((doc.page_height() as f32 * scale).round() as i32).max(1);

    let mut buffer = vec![0u8; width as usize * height as usize * BGR_CHANNELS];
    doc.draw_page(&mut buffer, 0, 0, width, height, invert)?;

    for px in buffer.chunks_exact_mut(BGR_CHANNELS) {
        px.swap(0, 2);
    }
    let image = image::RgbImage::from_raw(width as u32, height as u32, buffer)
        .context("render buffer does not match its dimensions")?;
    image
        .save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(
        "Rendered page {page} at {width}x{height} to {}",
        output.display()
    );
    Ok(())
}
