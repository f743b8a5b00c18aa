//! Reading raw job result batches from disk.

use std::path::Path;

use tracing::info;

use crate::error::AppResult;
use crate::models::RawJobResults;

/// Load a materialized batch of raw job results.
pub async fn load_batch_from_path(path: &Path) -> AppResult<RawJobResults> {
    let content = tokio::fs::read_to_string(path).await?;
    let batch: RawJobResults = serde_json::from_str(&content)?;
    info!("Loaded {} raw job results from {:?}", batch.jobs.len(), path);
    Ok(batch)
}
