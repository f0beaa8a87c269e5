use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use job_aggregator::app::enrich_use_case::EnrichUseCase;
use job_aggregator::app::push_use_case::PushUseCase;
use job_aggregator::app::sync_use_case::SyncUseCase;
use job_aggregator::config::Config;
use job_aggregator::geo::{Gazetteer, RegionResolver};
use job_aggregator::infra::http_client::ReqwestHttp;
use job_aggregator::infra::supabase_store::SupabaseStore;
use job_aggregator::infra::template_copywriter::TemplateCopywriter;
use job_aggregator::pipeline::filter::ContentFilter;
use job_aggregator::pipeline::normalize::JobNormalizer;
use job_aggregator::pipeline::Pipeline;
use job_aggregator::storage::{InMemoryStore, JobStore};
use job_aggregator::{logging, observability};

#[derive(Parser)]
#[command(name = "job_aggregator")]
#[command(about = "Merges scraped job postings into the listing site dataset")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the newest scraper outputs into the dataset
    Merge {
        /// Override the output file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Rebuild the dataset from the job store
    Sync {
        /// Override the output file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Upsert every job of the dataset into the job store
    Push {
        /// Dataset to push (defaults to the configured output file)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Use an in-memory store instead of Supabase
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch detail pages to fill in missing summaries
    Enrich {
        /// Dataset to enrich (defaults to the configured output file)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Override the number of jobs processed in one run
        #[arg(long)]
        batch_size: Option<usize>,
    },
}

fn build_normalizer(config: &Config) -> JobNormalizer {
    let gazetteer = Gazetteer::load(&config.paths.station_csv);
    if !gazetteer.is_empty() {
        println!("✅ Loaded {} stations from CSV", gazetteer.len());
    }
    JobNormalizer::new(
        ContentFilter::new(&config.filter),
        RegionResolver::new(Arc::new(gazetteer)),
    )
}

fn run_merge(config: &Config, output: &Path) -> anyhow::Result<()> {
    println!("🔄 Merging job data...");
    let normalizer = build_normalizer(config);
    let result = Pipeline::run(config, &normalizer, output)?;

    println!("\n📊 Merge Results:");
    for stats in &result.sources {
        println!(
            "   {}: {} received, {} kept, {} filtered out",
            stats.source, stats.received, stats.admitted, stats.filtered_out
        );
    }
    println!("   Duplicates dropped: {}", result.duplicates);
    println!("   Missing link: {}", result.missing_link);
    println!("   Total jobs: {}", result.total_jobs);
    println!("   Output file: {}", result.output_file);

    if !result.errors.is_empty() {
        warn!("{} errors encountered during merge", result.errors.len());
        println!("\n⚠️  Errors encountered:");
        for error in &result.errors {
            println!("   - {}", error);
        }
    }
    Ok(())
}

async fn run_sync(config: &Config, output: &Path) -> anyhow::Result<()> {
    println!("🚀 Starting sync from the job store...");
    let store = SupabaseStore::from_env(&config.sync.table)?;
    let normalizer = build_normalizer(config);
    let report = SyncUseCase::new(&store, &normalizer, &config.sync).run(output).await?;

    println!("\n📊 Sync Results:");
    println!("   Deleted stale: {}", report.deleted);
    println!("   Fetched: {}", report.fetched);
    println!("   Filtered out: {}", report.filtered_out);
    println!("   Total jobs: {}", report.total_jobs);
    if report.kept_existing {
        println!("⚠️  Store returned nothing, kept existing {}", report.output_file);
    } else {
        println!("🎉 Saved to {}", report.output_file);
    }
    Ok(())
}

async fn run_push(config: &Config, input: &Path, dry_run: bool) -> anyhow::Result<()> {
    let store: Box<dyn JobStore> = if dry_run {
        println!("🧪 Dry run: pushing into an in-memory store");
        Box::new(InMemoryStore::new())
    } else {
        Box::new(SupabaseStore::from_env(&config.sync.table)?)
    };

    println!("📤 Pushing {} to the job store...", input.display());
    let report = PushUseCase::new(store.as_ref()).run(input).await?;
    println!("\n📊 Push Results:");
    println!("   New: {}", report.inserted);
    println!("   Updated: {}", report.updated);
    println!("   Failed: {}", report.failed);
    Ok(())
}

async fn run_enrich(config: &Config, input: &Path, batch_size: Option<usize>) -> anyhow::Result<()> {
    let mut enrich_config = config.enrich.clone();
    if let Some(batch_size) = batch_size {
        enrich_config.batch_size = batch_size;
    }

    println!("🚀 Starting detail enrichment for {}...", input.display());
    let http = ReqwestHttp::new(enrich_config.timeout_secs, &enrich_config.user_agent)?;
    let use_case = EnrichUseCase::new(Box::new(http), Box::new(TemplateCopywriter), enrich_config);
    let report = use_case.run(input).await?;

    println!("\n📊 Enrichment Results:");
    println!("   Candidates: {}", report.candidates);
    println!("   Processed: {}", report.processed);
    println!("   Updated: {}", report.updated);
    println!("   Failed: {}", report.failed);
    if !report.rewritten {
        println!("   No changes to save.");
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let log_guard = logging::init_logging();

    let cli = Cli::parse();

    if let Err(e) = observability::init() {
        warn!("Metrics disabled: {}", e);
    }

    let config = match Config::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("❌ {}", e);
            drop(log_guard);
            std::process::exit(1);
        }
    };
    let dataset = config.paths.output_file.clone();

    let (instance, result) = match cli.command {
        Commands::Merge { output } => {
            let output = output.unwrap_or(dataset);
            ("merge", run_merge(&config, &output))
        }
        Commands::Sync { output } => {
            let output = output.unwrap_or(dataset);
            ("sync", run_sync(&config, &output).await)
        }
        Commands::Push { input, dry_run } => {
            let input = input.unwrap_or(dataset);
            ("push", run_push(&config, &input, dry_run).await)
        }
        Commands::Enrich { input, batch_size } => {
            let input = input.unwrap_or(dataset);
            ("enrich", run_enrich(&config, &input, batch_size).await)
        }
    };

    observability::push_all(instance).await;

    match result {
        Ok(()) => info!("{} finished", instance),
        Err(e) => {
            error!("{} failed: {:#}", instance, e);
            eprintln!("❌ {}: {:#}", instance, e);
            drop(log_guard);
            std::process::exit(1);
        }
    }
}
