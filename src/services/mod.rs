//! Services for normalizing, bucketing, aggregating and classifying reports

pub mod aggregator;
pub mod bucketer;
pub mod classifier;
pub mod normalizer;
pub mod pipeline;
pub mod record_source;
pub mod settings;

pub use aggregator::Aggregator;
pub use bucketer::bucket_key;
pub use classifier::classify;
pub use normalizer::{normalize, Normalized, SkipReason, SkippedRecord};
pub use pipeline::{rollup, RollupOutput};
pub use record_source::RecordSource;
pub use settings::{Settings, SettingsStore};
