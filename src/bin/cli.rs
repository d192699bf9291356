//! imgscrape CLI
//!
//! Searches image sources and prints the results as JSON on stdout.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use imgscrape::{
    error::{AppError, Result},
    models::{Config, SafeSearch, SearchRequest, SourceDescriptor, StrategyKind},
    pipeline,
    services::ImageExtractor,
};

/// imgscrape - Image Search Scraper
#[derive(Parser, Debug)]
#[command(
    name = "imgscrape",
    version,
    about = "Extract content images from web and image-search pages"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "imgscrape.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search a single source
    Search {
        /// Source id (see `sources list`)
        source: String,

        /// Search terms
        query: String,

        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Page size (default: fanout.default_limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Safe-search level: on, moderate or off
        #[arg(long, default_value = "moderate")]
        safe_search: SafeSearch,
    },

    /// Search several sources concurrently
    All {
        /// Search terms
        query: String,

        /// Comma-separated source ids (default: every configured source)
        #[arg(long, value_delimiter = ',')]
        sources: Vec<String>,

        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, default_value = "moderate")]
        safe_search: SafeSearch,

        /// Sources fetched at once (default: fanout.max_concurrent)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Extract images from a saved page without fetching it
    Extract {
        /// Source id whose strategies to apply
        source: String,

        /// Saved HTML or JSON document
        #[arg(long)]
        file: PathBuf,

        /// URL the document was fetched from, for resolving relative links
        #[arg(long)]
        url: String,

        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Manage the configured sources
    Sources {
        #[command(subcommand)]
        action: SourcesAction,
    },

    /// Validate the configuration file
    Validate,
}

#[derive(Subcommand, Debug)]
enum SourcesAction {
    /// Print the source table
    List,

    /// Add or replace a source
    Add {
        id: String,

        /// Search URL with `{query}` and optional `{page}` and `{safe}`
        template: String,

        /// Strategy chain in order: dom, metadata, linked, script, json_tree, json_fields
        #[arg(long = "strategy", value_delimiter = ',', default_value = "dom")]
        strategies: Vec<String>,
    },

    /// Remove a source
    Remove { id: String },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn parse_strategies(names: &[String]) -> Result<Vec<StrategyKind>> {
    names
        .iter()
        .map(|name| {
            StrategyKind::from_name(name)
                .ok_or_else(|| AppError::validation(format!("Unknown strategy '{name}'")))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        log::debug!("No config at {}, using defaults", cli.config.display());
        Config::default()
    };
    let default_limit = config.fanout.default_limit;

    match cli.command {
        Command::Search {
            source,
            query,
            page,
            limit,
            safe_search,
        } => {
            let extractor = ImageExtractor::from_config(&config)?;
            let request = SearchRequest::new(query, page, limit.unwrap_or(default_limit))
                .with_safe_search(safe_search);
            let outcome = pipeline::run_search(&extractor, &source, &request).await?;
            println!("{}", pipeline::to_json(&outcome, cli.pretty)?);
        }

        Command::All {
            query,
            sources,
            page,
            limit,
            safe_search,
            concurrency,
        } => {
            let extractor = ImageExtractor::from_config(&config)?;
            let request = SearchRequest::new(query, page, limit.unwrap_or(default_limit))
                .with_safe_search(safe_search);
            let concurrency = concurrency.unwrap_or(config.fanout.max_concurrent);
            let report = pipeline::run_fanout(&extractor, &sources, &request, concurrency).await;
            println!("{}", pipeline::to_json(&report, cli.pretty)?);
        }

        Command::Extract {
            source,
            file,
            url,
            page,
            limit,
        } => {
            let extractor = ImageExtractor::from_config(&config)?;
            let request = SearchRequest::new("", page, limit.unwrap_or(default_limit));
            let result =
                pipeline::run_extract_file(&extractor, &source, &file, &url, &request).await?;
            println!("{}", pipeline::to_json(&result, cli.pretty)?);
        }

        Command::Sources { action } => match action {
            SourcesAction::List => {
                let sources = pipeline::list_sources(&config);
                println!("{}", pipeline::to_json(&sources, cli.pretty)?);
            }
            SourcesAction::Add {
                id,
                template,
                strategies,
            } => {
                let source = SourceDescriptor::new(id, template)
                    .with_strategies(parse_strategies(&strategies)?);
                pipeline::run_add_source(&mut config, &cli.config, source)?;
            }
            SourcesAction::Remove { id } => {
                pipeline::run_remove_source(&mut config, &cli.config, &id)?;
            }
        },

        Command::Validate => {
            log::info!("Validating {}...", cli.config.display());

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Config OK: {} sources", config.sources.len());
        }
    }

    Ok(())
}
