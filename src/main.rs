use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};

use inkpage::config::ReaderConfig;
use inkpage::font_metrics::MonospaceMetrics;
use inkpage::reader::ReaderSession;
use inkpage::styled_text::StyledText;
use inkpage::theme::ReaderTheme;

/// Paginate a plain-text file and print its page map and starting locator.
#[derive(Parser, Debug)]
#[command(name = "inkpage", version, about = "Pagination and selection engine demo")]
struct Args {
    /// Plain-text file to paginate
    file: PathBuf,

    /// Viewport width in px
    #[arg(long, default_value_t = 600.0)]
    width: f32,

    /// Viewport height in px
    #[arg(long, default_value_t = 800.0)]
    height: f32,

    /// Font size in px
    #[arg(long, default_value_t = 16.0)]
    font_size: f32,
}

fn main() -> Result<()> {
    // Initialize logging
    WriteLogger::init(
        LevelFilter::Debug,
        Config::default(),
        File::create("inkpage.log")?,
    )?;

    let args = Args::parse();
    info!("paginating {}", args.file.display());

    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let config = ReaderConfig {
        font_size: args.font_size,
        ..ReaderConfig::default()
    };
    let session = ReaderSession::new(
        Arc::new(StyledText::plain(&raw)),
        Arc::new(MonospaceMetrics::new(args.font_size)),
        config,
        ReaderTheme::default(),
        (args.width, args.height),
        args.file.display().to_string(),
        0,
        1,
    )?;

    println!(
        "{} chars across {} pages at {}x{} px",
        session.text().len(),
        session.page_count(),
        args.width,
        args.height
    );
    for (i, page) in session.pages().iter().enumerate() {
        println!(
            "  page {:>4}: chars {:>6}..{:<6} lines {}..={}",
            i, page.start, page.end, page.first_line, page.last_line
        );
    }
    println!("{}", serde_json::to_string_pretty(&session.locator())?);
    Ok(())
}
