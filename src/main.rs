//! Resume screener: rank candidate resumes against a job description

use clap::Parser;
use log::{error, info, warn};
use resume_screener::cli::{self, Cli, Commands, ConfigAction};
use resume_screener::config::{Config, OutputFormat};
use resume_screener::error::{Result, ScreenerError};
use resume_screener::input::file_detector::SUPPORTED_EXTENSIONS;
use resume_screener::input::DocumentLoader;
use resume_screener::output::formatter::{save_report_to_file, suggest_filename, ReportGenerator};
use resume_screener::processing::screener::{CancelToken, Screener};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let config = match Config::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Execute command
    if let Err(e) = run_command(cli.command, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config) -> Result<()> {
    match command {
        Commands::Rank {
            job,
            resumes_dir,
            resume,
            top_k,
            use_entities,
            weight_semantic,
            weight_entity,
            model,
            detailed,
            output,
            save,
        } => {
            cli::validate_file_extension(&job, SUPPORTED_EXTENSIONS)
                .map_err(|e| ScreenerError::InvalidInput(format!("Job description file: {}", e)))?;

            // CLI flags override the config file for this run.
            if let Some(model) = model {
                config.models.embedding_model = model;
            }
            if let Some(top_k) = top_k {
                config.ranking.top_k = Some(top_k);
            }
            if use_entities {
                config.ranking.use_entities = true;
            }
            if let Some(weight) = weight_semantic {
                config.ranking.weight_semantic = weight;
            }
            if let Some(weight) = weight_entity {
                config.ranking.weight_entity = weight;
            }
            if detailed {
                config.output.detailed = true;
            }
            config.output.format = output;

            let resume_paths = resolve_resume_paths(resumes_dir, resume).await?;
            if resume_paths.is_empty() {
                return Err(ScreenerError::InvalidInput(
                    "No resume files found to rank".to_string(),
                ));
            }

            // Machine formats keep stdout clean for piping.
            let chatty = output == OutputFormat::Console;
            if chatty {
                println!("🚀 Resume screening");
                println!("💼 Job description: {}", job.display());
                println!("📄 Resumes to rank: {}", resume_paths.len());
                println!("🧠 Embedding model: {}", config.models.embedding_model);
            }

            info!("Loading embedding model '{}'", config.models.embedding_model);
            let screener = Screener::new(&config)?;

            let cancel = CancelToken::new();
            let interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, cancelling run");
                    interrupt.cancel();
                }
            });

            let spinner = indicatif::ProgressBar::new_spinner();
            spinner.set_message(format!("Ranking {} candidates...", resume_paths.len()));
            spinner.enable_steady_tick(Duration::from_millis(100));

            let outcome = screener.rank_paths(&job, &resume_paths, &cancel).await;
            spinner.finish_and_clear();
            let report = outcome?;

            let generator = ReportGenerator::with_options(
                config.output.color_output,
                config.output.detailed,
                true,
                true,
            );
            let content = generator.generate(&report, output)?;

            match save {
                Some(path) => {
                    let target = if path.is_dir() {
                        path.join(suggest_filename(output, &job.to_string_lossy()))
                    } else {
                        path
                    };
                    save_report_to_file(&content, &target)?;
                    println!("💾 Report saved to {}", target.display());
                }
                None => print!("{}", content),
            }

            if chatty {
                if let Some(top) = report.top_result() {
                    println!("🥇 Top match: {} ({:.4})", top.candidate_id, top.score);
                }
                println!(
                    "🎯 Done: ranked {} of {} candidates in {}ms",
                    report.metadata.candidates_ranked,
                    report.metadata.candidates_total,
                    report.metadata.processing_time_ms
                );
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                println!("Models directory: {}", config.models_dir().display());
                println!("Embedding model: {}", config.models.embedding_model);
                println!("\nRanking:");
                println!("  Semantic weight: {:.2}", config.ranking.weight_semantic);
                println!("  Entity weight: {:.2}", config.ranking.weight_entity);
                println!(
                    "  Entity scoring: {}",
                    if config.ranking.use_entities {
                        "enabled"
                    } else {
                        "disabled"
                    }
                );
                match config.ranking.top_k {
                    Some(k) => println!("  Top K: {}", k),
                    None => println!("  Top K: all candidates"),
                }
                println!("\nProcessing:");
                println!("  Max concurrency: {}", config.processing.max_concurrency);
                println!("  Strip stop words: {}", config.processing.strip_stop_words);
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                let default_config = Config::default();
                default_config.save()?;
                println!("✅ Configuration reset successfully!");
            }

            Some(ConfigAction::Path) => {
                println!("{}", Config::config_path().display());
            }
        },
    }

    Ok(())
}

async fn resolve_resume_paths(
    resumes_dir: Option<PathBuf>,
    resume: Vec<PathBuf>,
) -> Result<Vec<PathBuf>> {
    match resumes_dir {
        Some(dir) => {
            let loader = DocumentLoader::new();
            let paths = loader.discover_resumes(&dir).await?;
            info!(
                "Discovered {} resume files in {}",
                paths.len(),
                dir.display()
            );
            Ok(paths)
        }
        None => Ok(resume),
    }
}
