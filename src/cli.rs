//! CLI interface for the resume screener

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resume-screener")]
#[command(about = "Rank candidate resumes against a job description")]
#[command(
    long_about = "Score and rank a batch of resumes against one job description using static embeddings, with optional entity overlap scoring"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank resumes against a job description
    Rank {
        /// Path to the job description file (PDF, TXT, MD)
        #[arg(short, long)]
        job: PathBuf,

        /// Directory containing resume files
        #[arg(short = 'd', long, conflicts_with = "resume", required_unless_present = "resume")]
        resumes_dir: Option<PathBuf>,

        /// Path to a resume file, repeatable
        #[arg(short, long, required_unless_present = "resumes_dir")]
        resume: Vec<PathBuf>,

        /// Keep only the best K candidates in the output
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Blend entity overlap into the score
        #[arg(long)]
        use_entities: bool,

        /// Weight of the semantic similarity term
        #[arg(long)]
        weight_semantic: Option<f32>,

        /// Weight of the entity overlap term
        #[arg(long)]
        weight_entity: Option<f32>,

        /// Embedding model to use ("hashing" or a model2vec model)
        #[arg(short, long)]
        model: Option<String>,

        /// Show matched entities per candidate
        #[arg(long)]
        detailed: bool,

        /// Output format: console, json, csv, markdown
        #[arg(short, long, default_value = "console", value_parser = parse_output_format)]
        output: OutputFormat,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "csv" => Ok(OutputFormat::Csv),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, csv, markdown",
            format
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &PathBuf, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
