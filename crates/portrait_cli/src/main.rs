use anyhow::Context;
use clap::Parser;
use portrait_analysis::{build_classifier, Analyzer};
use portrait_core::PortraitConfig;
use portrait_memory::SqliteReports;
use portrait_telegram::TelegramClient;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod backend;
mod bot;

use backend::HttpFaceBackend;
use bot::Bot;

#[derive(Parser, Debug)]
#[command(name = "portrait", author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "portrait.toml")]
    config: String,

    /// Path to the report database (overrides config)
    #[arg(short, long, env = "PORTRAIT_DB_PATH")]
    db: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.log_json);

    info!("Initializing Portrait...");
    let mut config = PortraitConfig::load_or_default(&args.config);
    if let Some(db) = args.db {
        config.storage.db_path = db;
    }

    let token = config
        .telegram
        .token
        .clone()
        .context("TELEGRAM_BOT_TOKEN is not set (env or [telegram].token)")?;

    // Forest training is CPU-bound; keep it off the async workers.
    let classifier_config = config.classifier.clone();
    let classifier = tokio::task::spawn_blocking(move || build_classifier(&classifier_config))
        .await
        .context("Classifier training task panicked")?;
    let analyzer = Analyzer::new(classifier);

    info!("Opening report store at {}...", config.storage.db_path);
    let store = Arc::new(SqliteReports::new(&config.storage.db_path).await?);
    let backend = Arc::new(HttpFaceBackend::new(&config.backend)?);
    let telegram = TelegramClient::new(&config.telegram.api_base, &token)?;

    let bot = Arc::new(Bot::new(telegram, backend, analyzer, store, config.telegram.clone()));

    info!("Portrait online, face backend at {}", config.backend.url);
    tokio::select! {
        result = bot.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}
