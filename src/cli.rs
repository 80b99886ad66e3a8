use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate};
use clap::Parser;
use pdf_annots::backend::PdfFile;
use pdf_annots::config::{Config, ImageConfig, ImageFormat, OcrConfig};
use pdf_annots::ocr::TesseractProvider;
use pdf_annots::pipeline::Extractor;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "pdfannots")]
#[command(about = "Extract highlights, notes and marked regions from a PDF as JSON")]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Path to input PDF
    #[arg(value_name = "INPUT", required_unless_present = "version")]
    input: Option<PathBuf>,

    /// Display the current version
    #[arg(short = 'v', long)]
    version: bool,

    /// Ignore annotations added before this date (RFC 3339 or YYYY-MM-DD)
    #[arg(short = 'b', long, value_parser = parse_cutoff)]
    ignore_before: Option<DateTime<FixedOffset>>,

    /// Do not save images to disk
    #[arg(short = 'w', long)]
    no_write: bool,

    /// Output directory of image annotations
    #[arg(short = 'o', long)]
    image_output_path: Option<PathBuf>,

    /// Base name of saved images
    #[arg(short = 'n', long, default_value = "annot")]
    image_base_name: String,

    #[arg(short = 'f', long, value_enum, default_value_t = ImageFormat::Jpg)]
    image_format: ImageFormat,

    #[arg(short = 'd', long, default_value_t = 120, value_parser = clap::value_parser!(u32).range(1..))]
    image_dpi: u32,

    /// Only applies to jpg images
    #[arg(short = 'q', long, default_value_t = 90, value_parser = clap::value_parser!(u8).range(1..=100))]
    image_quality: u8,

    /// Attempt to extract text from images; tesseract must be installed
    #[arg(short = 'e', long)]
    attempt_ocr: bool,

    /// OCR language, several joined with '+', eg. 'eng+deu'
    #[arg(short = 'l', long, default_value = "eng")]
    ocr_lang: String,

    #[arg(long, env = "PDFANNOTS_TESSERACT_PATH", default_value = "tesseract")]
    tesseract_path: PathBuf,

    #[arg(long, env = "PDFANNOTS_TESSDATA_DIR")]
    tess_data_dir: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            ignore_before: self.ignore_before,
            images: ImageConfig {
                output_dir: self.image_output_path.clone(),
                base_name: self.image_base_name.clone(),
                format: self.image_format,
                dpi: self.image_dpi,
                quality: self.image_quality,
                write: !self.no_write,
            },
            ocr: self.attempt_ocr.then(|| OcrConfig {
                tesseract_path: self.tesseract_path.clone(),
                lang: self.ocr_lang.clone(),
                tessdata_dir: self.tess_data_dir.clone(),
            }),
            ..Config::default()
        }
    }
}

/// `2024-03-01T12:00:00+01:00`, or a bare date taken as midnight UTC
fn parse_cutoff(value: &str) -> std::result::Result<DateTime<FixedOffset>, String> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().fixed_offset())
        .ok_or_else(|| format!("expected an RFC 3339 timestamp or YYYY-MM-DD, got {value:?}"))
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    if cli.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let input = cli.input.clone().context("missing input PDF")?;
    let config = cli.config();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    let records = runtime.block_on(async move {
        let ocr = match &config.ocr {
            Some(ocr) => Some(TesseractProvider::check(ocr.clone()).await?),
            None => None,
        };

        let path = input.clone();
        let document = tokio::task::spawn_blocking(move || PdfFile::open(&path))
            .await?
            .with_context(|| format!("failed to open {}", input.display()))?;
        info!(path = %input.display(), "opened PDF");

        let mut extractor = Extractor::new(Arc::new(document), config);
        if let Some(provider) = ocr {
            extractor = extractor.with_ocr(Arc::new(provider));
        }
        anyhow::Ok(extractor.run().await?)
    })?;

    println!("{}", serde_json::to_string(&records)?);
    Ok(())
}
