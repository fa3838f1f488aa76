//! Command line front end.
//!
//! `export` turns a letter already on disk (or piped on stdin) into the PDF
//! and DOCX artifacts; `generate` asks the letter service for a new letter
//! first. Flags override values from the environment.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{parse_page_size, Config};
use crate::error::AppError;
use crate::export::ExportArtifact;
use crate::service::{DemandLetterRequest, LetterClient};
use crate::session::LetterSession;
use crate::typesetting::FontSpec;

/// Demand letter exporter
///
/// Examples:
///   demand-letter export letter.txt                 # PDF and DOCX into LETTER_OUT_DIR
///   demand-letter export --format pdf < letter.txt  # Read from stdin
///   demand-letter --font sans-serif export a.txt    # Override the export font
///   demand-letter generate request.json             # Generate, then export both
#[derive(Parser, Debug, Clone)]
#[command(name = "demand-letter", version, about = "Export demand letters as PDF and DOCX")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Directory the artifacts are written to
    #[arg(long, short = 'o', global = true)]
    pub out_dir: Option<PathBuf>,

    /// Export font: serif, sans-serif or monospace
    #[arg(long, short = 'f', global = true)]
    pub font: Option<FontSpec>,

    /// Font size in points
    #[arg(long, global = true)]
    pub font_size: Option<f32>,

    /// Page size for the PDF: a4 or letter
    #[arg(long, global = true)]
    pub page_size: Option<String>,

    /// Print artifacts as base64 on stdout instead of writing files
    #[arg(long, global = true)]
    pub base64: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Export existing letter text
    Export {
        /// Text file to export; stdin when omitted
        input: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Both)]
        format: Format,
    },
    /// Request a letter from the generation service and export it
    Generate {
        /// JSON file with the case details
        request: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Both)]
        format: Format,

        /// Generation service base URL
        #[arg(long)]
        api_url: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pdf,
    Docx,
    Both,
}

impl Format {
    fn wants_pdf(self) -> bool {
        matches!(self, Format::Pdf | Format::Both)
    }

    fn wants_docx(self) -> bool {
        matches!(self, Format::Docx | Format::Both)
    }
}

impl CliArgs {
    /// Folds the flags over the environment config.
    pub fn apply_to(&self, mut config: Config) -> Result<Config, AppError> {
        if let Some(dir) = &self.out_dir {
            config.out_dir = dir.clone();
        }
        if let Some(font) = self.font {
            config.font = font;
        }
        if let Some(size) = self.font_size {
            config.font_size_pt = size;
        }
        if let Some(page_size) = &self.page_size {
            config.page_size = parse_page_size(page_size)?;
        }
        if let Command::Generate {
            api_url: Some(url), ..
        } = &self.command
        {
            config.api_url = url.clone();
        }
        Ok(config)
    }
}

pub async fn run(args: CliArgs, config: Config) -> Result<Vec<ExportArtifact>, AppError> {
    let config = args.apply_to(config)?;
    let mut session = LetterSession::new(config.text_style(), config.page_geometry());

    let format = match &args.command {
        Command::Export { input, format } => {
            let text = read_input(input.as_deref())?;
            session.load_text(text);
            *format
        }
        Command::Generate {
            request, format, ..
        } => {
            let raw = std::fs::read_to_string(request)?;
            let request: DemandLetterRequest = serde_json::from_str(&raw)?;
            let client = LetterClient::new(config.api_url.clone())?;
            let response = client.generate(request).await?;
            session.apply_response(response)?;
            if let Some(metadata) = session.metadata() {
                tracing::info!(
                    client = %metadata.client,
                    opposing_party = %metadata.opposing_party,
                    deadline = %metadata.deadline_date,
                    "letter generated"
                );
            }
            *format
        }
    };

    let mut artifacts = Vec::new();
    if format.wants_pdf() {
        artifacts.push(session.export_pdf_async().await?);
    }
    if format.wants_docx() {
        artifacts.push(session.export_docx_async().await?);
    }

    for artifact in &artifacts {
        if args.base64 {
            println!("{}: {}", artifact.file_name(), artifact.to_base64());
        } else {
            let path = artifact.write_to_dir(&config.out_dir)?;
            tracing::info!(
                path = %path.display(),
                sha256 = %artifact.sha256_hex(),
                "wrote artifact"
            );
        }
    }

    Ok(artifacts)
}

fn read_input(path: Option<&Path>) -> Result<String, AppError> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
