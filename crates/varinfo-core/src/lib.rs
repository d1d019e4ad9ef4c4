//! varinfo-core: feature statistics and scoring engine for vw-style linear
//! models.
//!
//! This crate analyzes a sparse, namespaced feature-vector training corpus to
//! report, per feature, its observed value range, its learned linear-model
//! weight, and a normalized "distance from the best constant predictor"
//! score — a relative importance proxy, not a rigorous statistic.
//!
//! # Pipeline
//!
//! The run is a strict linear sequence over explicit owned state:
//!
//! 1. [`record`] parses each corpus line into `(namespace, key, value)`
//!    triples.
//! 2. [`catalog`] accumulates the feature universe, per-feature min/max, and
//!    cross-namespace pair expansion.
//! 3. [`probe`] emits one dense probe example per label so every known
//!    feature appears exactly once.
//! 4. The external trainer and auditor run via the [`pipeline`] capability
//!    traits.
//! 5. [`audit`] maps feature identities to hash codes and learned weights,
//!    correlating multi-class examples to labels by position.
//! 6. [`score`] normalizes weights into relative percentages and [`report`]
//!    renders the ranked tables.
//!
//! # Example
//!
//! ```
//! use varinfo_core::catalog::{FeatureCatalog, NamespaceFilter};
//! use varinfo_core::record::parse_record;
//!
//! let mut catalog = FeatureCatalog::new(NamespaceFilter::default());
//! catalog.ingest(&parse_record("1 |a x:2 y:3").unwrap());
//! catalog.finalize();
//! assert_eq!(catalog.feature_count(), 3);
//! ```

pub mod audit;
pub mod catalog;
pub mod options;
pub mod pipeline;
pub mod probe;
pub mod record;
pub mod report;
pub mod score;

pub use audit::{parse_audit_stream, AuditError, AuditOutcome};
pub use catalog::{FeatureCatalog, FeatureRange, NamespaceFilter, CONSTANT_FEATURE};
pub use options::{OptionsError, RankOrder, VwOptions};
pub use pipeline::{run_analysis, AnalysisConfig, Auditor, PipelineError, Trainer};
pub use probe::render_probe_lines;
pub use record::{parse_record, LabelSet, RecordError, SparseRecord};
pub use report::render_report;
pub use score::{score_features, ClassReport, ScoredFeature};
