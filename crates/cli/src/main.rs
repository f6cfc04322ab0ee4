//! odotfill - fill ODOT daily report forms from report JSON
//!
//! Reads a daily report export, maps its contents onto the ODOT
//! template's form fields, optionally embeds site photos on the
//! photographs page, and writes the filled PDF.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use pdf_form::FormDocument;
use report::{build_field_mapping, fill_form_document};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "odotfill")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the daily report JSON export
    report: PathBuf,

    /// Path to the ODOT template PDF
    #[arg(short, long)]
    template: PathBuf,

    /// Where to write the filled PDF
    #[arg(short, long)]
    output: PathBuf,

    /// Site photo to embed; may be given up to six times
    #[arg(short, long = "photo", action = ArgAction::Append)]
    photos: Vec<PathBuf>,

    /// Use debug logging level
    #[arg(short, long, action = ArgAction::SetTrue)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug {
        "odotfill=debug,report=debug,pdf_form=debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let json = fs::read_to_string(&args.report)
        .with_context(|| format!("reading report {}", args.report.display()))?;
    let data: serde_json::Value =
        serde_json::from_str(&json).context("parsing report JSON")?;

    let mut photos = Vec::new();
    for path in &args.photos {
        let bytes =
            fs::read(path).with_context(|| format!("reading photo {}", path.display()))?;
        photos.push(bytes);
    }

    let mapping = build_field_mapping(&data);
    tracing::info!(
        fields = mapping.fields.len(),
        weekday = %mapping.weekday,
        photos = photos.len(),
        "mapping built"
    );

    let mut doc = FormDocument::open(&args.template)
        .with_context(|| format!("opening template {}", args.template.display()))?;
    fill_form_document(&mut doc, &mapping, &photos).context("filling form")?;
    doc.save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    tracing::info!(output = %args.output.display(), "filled report written");

    Ok(())
}
