//! PDF Watermark CLI tool
//!
//! A command-line tool for stamping text or image watermarks onto PDFs.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use pdf_watermark::pdf::MetadataRecord;
use pdf_watermark::{run, WatermarkOptions};

/// PDF Watermark - Stamp a text or image watermark onto every page of a PDF
#[derive(Parser)]
#[command(name = "pdf-watermark")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Faint DRAFT across every page
    pdf-watermark --input_pdf report.pdf --watermark_text DRAFT report-draft.pdf

    # Red text with a drop shadow and a custom font
    pdf-watermark --input_pdf report.pdf --watermark_text CONFIDENTIAL \\
        --font_path fonts/DejaVuSans-Bold.ttf --text_color \"#CC0000\" --shadow out.pdf

    # Logo watermark on a Markdown document, with a new title
    pdf-watermark --markdown notes.md --watermark_image logo.png --title \"Notes\" notes.pdf

Set RUST_LOG=info (or debug) for progress output.")]
struct Cli {
    /// Output PDF file path
    output: PathBuf,

    /// Input PDF file
    #[arg(long = "input_pdf", visible_alias = "input-pdf", value_name = "PATH")]
    input_pdf: Option<PathBuf>,

    /// Markdown file to render into a PDF and watermark
    #[arg(long, value_name = "PATH")]
    markdown: Option<PathBuf>,

    /// Image to use as the watermark
    #[arg(long = "watermark_image", visible_alias = "watermark-image", value_name = "PATH")]
    watermark_image: Option<PathBuf>,

    /// Text to use as the watermark (use \n for line breaks)
    #[arg(long = "watermark_text", visible_alias = "watermark-text", value_name = "TEXT")]
    watermark_text: Option<String>,

    /// TrueType/OpenType font for text watermarks
    #[arg(long = "font_path", visible_alias = "font-path", value_name = "PATH")]
    font_path: Option<PathBuf>,

    /// Font size in points
    #[arg(long = "font_size", visible_alias = "font-size", default_value_t = 36)]
    font_size: u32,

    /// Text color as hex (#RRGGBB)
    #[arg(long = "text_color", visible_alias = "text-color", default_value = "#000000")]
    text_color: String,

    /// Text opacity (0.0 to 1.0)
    #[arg(long = "text_opacity", visible_alias = "text-opacity", default_value_t = 0.3)]
    text_opacity: f32,

    /// Image opacity (0.0 to 1.0)
    #[arg(long = "image_opacity", visible_alias = "image-opacity", default_value_t = 0.3)]
    image_opacity: f32,

    /// Add a drop shadow to the watermark
    #[arg(long)]
    shadow: bool,

    /// Shadow opacity (0.0 to 1.0)
    #[arg(long = "shadow_opacity", visible_alias = "shadow-opacity", default_value_t = 0.3)]
    shadow_opacity: f32,

    /// Shadow offset in pixels
    #[arg(long = "shadow_offset", visible_alias = "shadow-offset", default_value_t = 5)]
    shadow_offset: u32,

    /// Set the document title
    #[arg(long)]
    title: Option<String>,

    /// Set the document author
    #[arg(long)]
    author: Option<String>,

    /// Set the document subject
    #[arg(long)]
    subject: Option<String>,

    /// Set the document keywords
    #[arg(long)]
    keywords: Option<String>,

    /// Set the document creator
    #[arg(long)]
    creator: Option<String>,

    /// Set the document producer
    #[arg(long)]
    producer: Option<String>,
}

impl Cli {
    fn into_options(self) -> WatermarkOptions {
        WatermarkOptions {
            input_pdf: self.input_pdf,
            markdown: self.markdown,
            output: self.output,
            watermark_image: self.watermark_image,
            // a literal "\n" typed on the command line breaks the line
            watermark_text: self.watermark_text.map(|t| t.replace("\\n", "\n")),
            font_path: self.font_path,
            font_size: self.font_size,
            text_color: self.text_color,
            text_opacity: self.text_opacity,
            image_opacity: self.image_opacity,
            shadow: self.shadow,
            shadow_opacity: self.shadow_opacity,
            shadow_offset: self.shadow_offset,
            metadata: MetadataRecord {
                title: self.title,
                author: self.author,
                subject: self.subject,
                keywords: self.keywords,
                creator: self.creator,
                producer: self.producer,
            },
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    if let Err(e) = cmd_watermark(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Validate the options, then watermark the document
fn cmd_watermark(cli: Cli) -> Result<()> {
    let job = cli.into_options().into_job().context("Invalid options")?;

    run(&job).with_context(|| format!("Failed to watermark into {}", job.output.display()))?;

    println!("Output written to {}", job.output.display());
    Ok(())
}
