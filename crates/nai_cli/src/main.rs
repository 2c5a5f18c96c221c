use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use nai_core::logging::{init_logging, Logger};
use nai_core::{
    ArticleInput, ArticleStats, ArticleStorage, NewArticleRecord, Pipeline, PipelineOutput,
    PipelineStages,
};
use nai_web::{AppState, NotificationConfig};

mod client;
mod config;
mod progress;
mod report;

use client::{ApiClient, HttpStages};
use config::Settings;
use progress::PipelineProgress;

#[derive(Parser, Debug)]
#[command(author, version, about = "News article summarizer with Arabic translation", long_about = None)]
pub struct Cli {
    /// Inference backend: openai or dummy
    #[arg(long, env = "NAI_BACKEND")]
    backend: Option<String>,
    /// Storage backend: memory or sqlite
    #[arg(long, env = "NAI_STORAGE")]
    storage: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:3000
        #[arg(long)]
        bind: Option<String>,
        /// Per-request time limit in seconds
        #[arg(long, default_value_t = 60)]
        timeout: u64,
    },
    /// Summarize one article
    Process {
        #[arg(long, conflicts_with_all = ["text", "file"])]
        url: Option<String>,
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        /// Read the article text from a file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Run the stages against a running server instead of in-process
        #[arg(long)]
        server: Option<String>,
        /// Write an HTML page with the highlighted matches
        #[arg(long)]
        report: Option<PathBuf>,
        /// Store the result as an article record
        #[arg(long)]
        save: bool,
    },
    /// Show how many summaries were saved and copied
    Stats {
        #[arg(long)]
        server: Option<String>,
    },
}

fn article_input(url: Option<String>, text: Option<String>, file: Option<PathBuf>) -> Result<ArticleInput> {
    match (url, text, file) {
        (Some(url), _, _) => Ok(ArticleInput::Url(url)),
        (_, Some(text), _) => Ok(ArticleInput::Text(text)),
        (_, _, Some(path)) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(ArticleInput::Text(text))
        }
        _ => bail!("One of --url, --text or --file is required"),
    }
}

async fn run_pipeline<S: PipelineStages>(stages: S, input: ArticleInput) -> Result<PipelineOutput> {
    let mut pipeline = Pipeline::new(stages);
    let mut progress = PipelineProgress::new();
    let result = pipeline.run(input, &mut progress).await;
    progress.finish();
    Ok(result?)
}

fn print_output(output: &PipelineOutput) {
    println!("{}\n", output.summary);
    println!("{}\n", output.arabic_summary);
    for (question, answer) in output.key_info.iter() {
        println!("• {}: {}", question.label(), answer);
    }
}

fn print_stats(stats: &ArticleStats) {
    println!("Articles saved: {}", stats.total);
    println!("Copied: {} ({:.1}%)", stats.copied, stats.rate);
}

async fn local_state(
    cli: &Cli,
    settings: &Settings,
    notification: Option<&NotificationConfig>,
) -> Result<AppState> {
    let model = nai_inference::create_model(&settings.inference_config(cli.backend.as_deref())?)?;
    let kind = settings.storage_kind(cli.storage.as_deref())?;
    let storage = nai_storage::create_storage(kind, settings.database_url.as_deref()).await?;
    let state = AppState::build(
        model,
        &settings.extractor_config(),
        storage,
        notification,
    )?;
    Ok(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let logger: Logger = init_logging().with_prefix("[nai]");
    let settings = Settings::from_env();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { bind, timeout } => {
            let config = settings.server_config(bind.as_deref(), Duration::from_secs(*timeout))?;
            let state = local_state(&cli, &settings, config.notification.as_ref()).await?;
            logger.info(&format!("✨ Starting server on {}", config.bind));
            nai_web::serve(&config, state).await?;
        }
        Commands::Process {
            url,
            text,
            file,
            server,
            report,
            save,
        } => {
            let input = article_input(url.clone(), text.clone(), file.clone())?;
            let (output, storage, client) = match server {
                Some(server) => {
                    let client = ApiClient::new(server)?;
                    logger.info(&format!("🌐 Running stages against {}", server));
                    let output = run_pipeline(HttpStages::new(client.clone()), input).await?;
                    (output, None, Some(client))
                }
                None => {
                    let state = local_state(&cli, &settings, None).await?;
                    let output = run_pipeline(state.stages.clone(), input).await?;
                    (output, Some(state.storage.clone()), None)
                }
            };
            print_output(&output);

            if let Some(path) = report {
                let report = report::render_report(&output);
                std::fs::write(path, &report.html)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                if !report.unmatched.is_empty() {
                    logger.warn(&format!(
                        "⚠️ {} matched sentences could not be located in the text",
                        report.unmatched.len()
                    ));
                }
                logger.info(&format!("📄 Report written to {}", path.display()));
            }

            if *save {
                let record = NewArticleRecord {
                    original_article: output.article.text().to_string(),
                    english_summary: output.summary.clone(),
                    arabic_summary: output.arabic_summary.clone(),
                };
                let saved = match (storage, client) {
                    (Some(storage), _) => storage.save_article(&record).await?,
                    (_, Some(client)) => client.save_article(&record).await?,
                    _ => bail!("No storage available"),
                };
                logger.info(&format!("💾 Saved article {}", saved.id));
            }
        }
        Commands::Stats { server } => {
            let stats = match server {
                Some(server) => ApiClient::new(server)?.article_stats().await?,
                None => {
                    let kind = settings.storage_kind(cli.storage.as_deref())?;
                    let storage: Arc<dyn ArticleStorage> =
                        nai_storage::create_storage(kind, settings.database_url.as_deref()).await?;
                    storage.article_stats().await?
                }
            };
            print_stats(&stats);
        }
    }

    Ok(())
}
