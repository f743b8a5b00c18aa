//! Ingestion and reconciliation services.

pub mod batch;
pub mod defect_merge;
pub mod defect_tracker;
pub mod identity_cache;
pub mod pipeline;
pub mod reconciler;
pub mod suite_resolver;
pub mod upsert;
pub mod variants;

pub use batch::load_batch_from_path;
pub use defect_merge::merge_defects;
pub use defect_tracker::{DefectLookup, DefectTracker, StaticDefectTracker};
pub use identity_cache::{IdentityCache, JobCache, TestCache};
pub use pipeline::{IngestOptions, IngestPipeline, IngestRun};
pub use suite_resolver::SuiteResolver;
pub use upsert::UpsertService;
pub use variants::{KeywordVariantManager, VariantManager};
