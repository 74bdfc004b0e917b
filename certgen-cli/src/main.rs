//! certgen: put a name and institution on a certificate background.
//!
//! Thin shell around `certgen-compose`: reads the background from disk,
//! fills the chosen layout, and writes `certificate-<name>.png` into the
//! output directory.

mod sink;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use certgen_compose::{Composer, ComposerConfig, FileSource, Layout, OutputSink};
use certgen_text::{FontRegistry, TextEngine};
use sink::DirectorySink;

/// Logical background name and its alternate spelling.
const DEFAULT_BACKGROUNDS: [&str; 2] = ["cert.jpg", "cert.jpeg"];

#[derive(Parser, Debug)]
#[command(name = "certgen", version, about = "Overlay a name and institution onto a certificate")]
struct Args {
    /// Recipient name. Blank draws the "Your Name" placeholder.
    #[arg(long, default_value = "")]
    name: String,

    /// Institution. Blank draws the "Your Institution" placeholder.
    #[arg(long, default_value = "")]
    institution: String,

    /// Background image (default: cert.jpg, then cert.jpeg).
    #[arg(long)]
    background: Option<PathBuf>,

    /// Built-in layout: classic or accent.
    #[arg(long, default_value = "classic")]
    preset: String,

    /// JSON layout file; overrides --preset.
    #[arg(long, conflicts_with = "preset")]
    layout: Option<PathBuf>,

    /// Extra font files (TTF/OTF) to make available.
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Directory the PNG is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Print the effective layout as JSON and exit.
    #[arg(long)]
    print_layout: bool,
}

async fn load_layout(args: &Args) -> Result<Layout> {
    match &args.layout {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading layout {}", path.display()))?;
            Layout::from_json(&json).with_context(|| format!("parsing layout {}", path.display()))
        }
        None => Ok(Layout::preset(&args.preset)?),
    }
}

async fn run(args: Args) -> Result<()> {
    let layout = load_layout(&args).await?;
    if args.print_layout {
        println!("{}", layout.to_json()?);
        return Ok(());
    }

    let mut engine = TextEngine::with_registry(FontRegistry::discover());
    for font in &args.fonts {
        let data = tokio::fs::read(font)
            .await
            .with_context(|| format!("reading font {}", font.display()))?;
        engine.load_font_data(data);
        info!("Loaded font {}", font.display());
    }

    let source = match &args.background {
        Some(path) => FileSource::new(path),
        None => FileSource::with_candidates(DEFAULT_BACKGROUNDS),
    };

    let mut composer = Composer::with_engine(engine, ComposerConfig::default());
    let fields = layout.fill(&args.name, &args.institution);
    let output = composer
        .generate(&source, &fields)
        .await
        .context("generating certificate")?;

    let mut sink = DirectorySink::new(&args.out_dir);
    let path = sink
        .deliver(&output)
        .with_context(|| format!("writing into {}", args.out_dir.display()))?;

    info!("Wrote {} ({}x{})", path.display(), output.width, output.height);
    println!("{}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run(Args::parse()).await
}
