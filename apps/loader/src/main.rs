//! CI telemetry loader - main entry point.
//!
//! Runs one ingestion pass over a batch file, then merges defects.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use ci_telemetry_lib::config::Config;
use ci_telemetry_lib::db::DbPool;
use ci_telemetry_lib::services::{
    IngestOptions, IngestPipeline, KeywordVariantManager, StaticDefectTracker,
    load_batch_from_path, merge_defects,
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    let Some(batch_path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("usage: ci-telemetry-loader <batch.json>");
        std::process::exit(2);
    };

    info!("========================================");
    info!("  CI Telemetry Loader");
    info!("  Environment: {}", config.environment);
    info!("  Release: {}", config.release);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    match pool.seed_suites(&config.known_suites).await {
        Ok(0) => {}
        Ok(n) => info!("Seeded {} test suites", n),
        Err(e) => {
            error!("Failed to seed test suites: {}", e);
            std::process::exit(1);
        }
    }

    let batch = match load_batch_from_path(&batch_path).await {
        Ok(batch) => batch,
        Err(e) => {
            error!("Failed to read batch {:?}: {}", batch_path, e);
            std::process::exit(1);
        }
    };

    let pipeline = IngestPipeline::new(
        pool.clone(),
        Arc::new(KeywordVariantManager),
        IngestOptions::from_config(&config),
    );
    let ingest = match pipeline.run(batch).await {
        Ok(run) => run,
        Err(e) => {
            error!("Ingestion aborted: {}", e);
            std::process::exit(1);
        }
    };
    if !ingest.summary.is_clean() {
        warn!(
            "Ingestion completed with {} failed jobs, {} failed runs and {} malformed runs",
            ingest.summary.jobs_failed.len(),
            ingest.summary.runs_failed.len(),
            ingest.summary.runs_malformed
        );
    }

    let tracker = match &config.defects_file {
        Some(path) => match StaticDefectTracker::from_path(path).await {
            Ok(tracker) => tracker,
            Err(e) => {
                warn!("Skipping defect file {:?}: {}", path, e);
                StaticDefectTracker::empty()
            }
        },
        None => StaticDefectTracker::empty(),
    };

    match merge_defects(&pool, &tracker, &ingest.tests, &ingest.jobs).await {
        Ok(report) => {
            for warning in &report.degraded {
                warn!("Defect lookup degraded: {}", warning);
            }
        }
        Err(e) if e.is_invariant_violation() => {
            error!("Defect merge aborted: {}", e);
            std::process::exit(1);
        }
        Err(e) => error!("Defect merge failed: {}", e),
    }

    info!("Loader finished");
}
