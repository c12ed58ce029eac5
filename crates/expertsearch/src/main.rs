use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use expertsearch_common::{logger, AppConfig};
use expertsearch_server::AppState;
use expertsearch_storage::ProfileDatabase;
use std::path::PathBuf;
use std::sync::Arc;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    } else {
        // Fallback to default dotenv behavior
        dotenv::dotenv().ok();
    }
}

#[derive(Parser)]
#[command(name = "expertsearch")]
#[command(about = "Expert Search - semantic and literal search over expert profiles", long_about = None)]
struct Cli {
    /// Database path (overrides DATABASE_PATH)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a single search and print the results as JSON
    Search {
        /// Query text
        query: String,

        /// Use literal substring search instead of vector search
        #[arg(long)]
        literal: bool,
    },

    /// Print embedding store statistics as JSON
    Stats,

    /// Import an expert profile CSV export into the database
    Import {
        /// CSV with Name, Category, Label, Profile_Chunk and optional URL,
        /// Profile_Embedding, Label_Embedding columns
        csv: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_dotenv_from_project_root();

    let mut config = AppConfig::from_env()?;
    if let Some(db_path) = cli.db_path {
        config.database_path = db_path;
    }

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server_host = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }
            config.validate()?;

            logger::setup_logging(&config.log_dir, &config.log_level)?;

            tracing::info!("Expert search starting...");
            tracing::info!("Configuration loaded:");
            tracing::info!("  Bind: {}", config.server_bind_address());
            tracing::info!("  Database: {}", config.database_path.display());
            tracing::info!(
                "  Embedding: {} / {}",
                config.embedding_provider.as_str(),
                config.embedding_model
            );

            let embedder = expertsearch_embed::build_embedder(&config)?;
            let state = AppState::initialize(config, embedder)
                .await
                .context("Failed to load corpus; refusing to serve")?;

            println!("Server listening on http://{}", state.config.server_bind_address());
            expertsearch_server::start_server(Arc::new(state)).await?;
        }
        Commands::Search { query, literal } => {
            logger::setup_console_logging(&config.log_level)?;

            let output = if literal {
                let profiles = ProfileDatabase::open(&config.database_path)?;
                let results = profiles
                    .literal_search(&query, config.literal_profile_max_chars)
                    .await?;
                serde_json::to_string_pretty(&results)?
            } else {
                let embedder = expertsearch_embed::build_embedder(&config)?;
                let state = AppState::initialize(config, embedder).await?;
                let results = state.vector_search.search(&query).await?;
                serde_json::to_string_pretty(&results)?
            };

            println!("{}", output);
        }
        Commands::Stats => {
            logger::setup_console_logging(&config.log_level)?;

            let profiles = ProfileDatabase::open(&config.database_path)?;
            let expected_dim = config.embedding_dim;
            let store = tokio::task::spawn_blocking(move || {
                expertsearch_vector::EmbeddingStore::load(&profiles, expected_dim)
            })
            .await??;

            let report = serde_json::json!({
                "stats": store.stats(),
                "excluded": store.warnings(),
                "embedding_model": config.embedding_model,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Import { csv } => {
            logger::setup_console_logging(&config.log_level)?;

            let (_, inserted) = ProfileDatabase::import_csv(&config.database_path, &csv)
                .with_context(|| format!("Failed to import {}", csv.display()))?;
            println!(
                "Imported {} profiles into {}",
                inserted,
                config.database_path.display()
            );
        }
    }

    Ok(())
}
