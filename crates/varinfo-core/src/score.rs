//! Per-label scoring and normalization.
//!
//! The raw score of a feature is its learned weight (the identity metric).
//! Each label's scores are normalized against the maximum distance from zero
//! observed for that label, yielding a signed (or absolute) percentage — a
//! heuristic importance proxy, not a rigorous statistic.

use serde::Serialize;
use tracing::debug;

use crate::audit::AuditOutcome;
use crate::catalog::{FeatureCatalog, FeatureRange, CONSTANT_FEATURE};
use crate::options::RankOrder;

/// Substituted for a zero maximum distance so an all-zero label still reports
/// defined (near-zero) percentages instead of dividing by zero.
pub const ZERO_RANGE_EPSILON: f64 = 1e-10;

/// One report row: a feature with its audit identity and scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredFeature {
    /// Canonical feature name.
    pub name: String,
    /// Hash code from the audit output.
    pub hash: u64,
    /// Observed value range from the catalog; (0, 0) for identities the
    /// catalog never tracked.
    pub range: FeatureRange,
    /// Learned weight.
    pub weight: f64,
    /// Normalized score as a percentage in [-100, 100] (or [0, 100] in
    /// absolute mode).
    pub rel_score: f64,
}

/// A label's ranked feature table.
#[derive(Debug, Clone, Serialize)]
pub struct ClassReport {
    /// The class label.
    pub label: String,
    /// The auditor's prediction line for this label's probe example.
    pub prediction: String,
    /// Rows sorted by raw score descending, ties in first-observed order.
    pub rows: Vec<ScoredFeature>,
}

/// Scores every class in the audit outcome.
pub fn score_features(
    catalog: &FeatureCatalog,
    outcome: &AuditOutcome,
    order: &RankOrder,
) -> Vec<ClassReport> {
    outcome
        .classes
        .iter()
        .map(|class| {
            // Features the catalog knows but the audit never materialized are
            // excluded, not fatal: pair-only synthetic features may never be
            // materialized by the trainer.
            for name in catalog.known_features() {
                if !class.weights.contains_key(name) {
                    debug!(feature = name, label = %class.label, "no audited weight; excluded from ranking");
                }
            }

            let mut scored: Vec<(f64, ScoredFeature)> = Vec::with_capacity(class.order.len());
            let mut min_score = 0.0f64;
            let mut max_score = 0.0f64;
            for name in &class.order {
                let Some(&weight) = class.weights.get(name) else {
                    debug!(feature = %name, label = %class.label, "weight lookup failed; excluded");
                    continue;
                };
                let score = if name.starts_with(CONSTANT_FEATURE) {
                    0.0
                } else {
                    weight
                };
                if score < min_score {
                    min_score = score;
                }
                if score > max_score {
                    max_score = score;
                }
                scored.push((
                    score,
                    ScoredFeature {
                        name: name.clone(),
                        hash: outcome.hashes.get(name).copied().unwrap_or(0),
                        range: catalog.range_or_zero(name),
                        weight,
                        rel_score: 0.0,
                    },
                ));
            }

            let mut max_distance = max_score.abs().max(min_score.abs());
            if max_distance == 0.0 {
                max_distance = ZERO_RANGE_EPSILON;
            }
            for (score, row) in &mut scored {
                let normalized = *score / max_distance;
                let normalized = if order.absolute {
                    normalized.abs()
                } else {
                    normalized
                };
                row.rel_score = normalized * 100.0;
            }

            // Stable sort preserves first-observed order on ties.
            scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

            ClassReport {
                label: class.label.clone(),
                prediction: class.prediction.clone(),
                rows: scored.into_iter().map(|(_, row)| row).collect(),
            }
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::parse_audit_stream;
    use crate::catalog::{FeatureCatalog, NamespaceFilter};
    use crate::record::parse_record;

    fn outcome_from(text: &str, labels: &[&str], multiclass: bool) -> AuditOutcome {
        let labels: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
        parse_audit_stream(text, &labels, multiclass).unwrap()
    }

    fn empty_catalog() -> FeatureCatalog {
        let mut catalog = FeatureCatalog::new(NamespaceFilter::default());
        catalog.finalize();
        catalog
    }

    // -------------------------------------------------------------------------
    // Normalization tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_normalization_against_max_distance() {
        // Scores {-2, 0, 10}: max distance from zero is 10.
        let text = "0\na^p:1:1:-2 a^q:2:1:0 a^r:3:1:10\n";
        let outcome = outcome_from(text, &["1"], false);
        let reports = score_features(&empty_catalog(), &outcome, &RankOrder::default());

        let rows = &reports[0].rows;
        assert_eq!(rows[0].name, "a^r");
        assert_eq!(rows[0].rel_score, 100.0);
        let p = rows.iter().find(|r| r.name == "a^p").unwrap();
        assert_eq!(p.rel_score, -20.0);
    }

    #[test]
    fn test_absolute_order_mode() {
        let text = "0\na^p:1:1:-2 a^r:3:1:10\n";
        let outcome = outcome_from(text, &["1"], false);
        let order = RankOrder { absolute: true };
        let reports = score_features(&empty_catalog(), &outcome, &order);
        let p = reports[0].rows.iter().find(|r| r.name == "a^p").unwrap();
        assert_eq!(p.rel_score, 20.0);
    }

    #[test]
    fn test_all_zero_scores_stay_defined() {
        let text = "0\na^p:1:1:0 a^q:2:1:0\n";
        let outcome = outcome_from(text, &["1"], false);
        let reports = score_features(&empty_catalog(), &outcome, &RankOrder::default());
        for row in &reports[0].rows {
            assert_eq!(row.rel_score, 0.0);
            assert!(row.rel_score.is_finite());
        }
    }

    #[test]
    fn test_constant_forced_to_zero_score() {
        let text = "0\n:0:1:42 a^x:1:1:1\n";
        let outcome = outcome_from(text, &["1"], false);
        let reports = score_features(&empty_catalog(), &outcome, &RankOrder::default());
        let constant = reports[0]
            .rows
            .iter()
            .find(|r| r.name == "Constant")
            .unwrap();
        // The weight column keeps the real weight; only the score is forced.
        assert_eq!(constant.weight, 42.0);
        assert_eq!(constant.rel_score, 0.0);
        // a^x normalizes against 1, not 42.
        let x = reports[0].rows.iter().find(|r| r.name == "a^x").unwrap();
        assert_eq!(x.rel_score, 100.0);
    }

    // -------------------------------------------------------------------------
    // Ordering tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_rows_sorted_descending_by_raw_score() {
        let text = "0\na^p:1:1:0.5 a^q:2:1:2.0 a^r:3:1:-1.0\n";
        let outcome = outcome_from(text, &["1"], false);
        let reports = score_features(&empty_catalog(), &outcome, &RankOrder::default());
        let names: Vec<&str> = reports[0].rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a^q", "a^p", "a^r"]);
    }

    #[test]
    fn test_ties_keep_first_observed_order() {
        let text = "0\na^p:1:1:1.0 a^q:2:1:1.0 a^r:3:1:1.0\n";
        let outcome = outcome_from(text, &["1"], false);
        let reports = score_features(&empty_catalog(), &outcome, &RankOrder::default());
        let names: Vec<&str> = reports[0].rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a^p", "a^q", "a^r"]);
    }

    // -------------------------------------------------------------------------
    // Range plumbing tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_rows_carry_catalog_ranges() {
        let mut catalog = FeatureCatalog::new(NamespaceFilter::default());
        catalog.ingest(&parse_record("1 |a x:2 y:3").unwrap());
        catalog.ingest(&parse_record("-1 |a x:1").unwrap());
        catalog.finalize();

        let text = "0\na^x:1:1:0.5 a^y:2:1:0.2\n";
        let outcome = outcome_from(text, &["1"], false);
        let reports = score_features(&catalog, &outcome, &RankOrder::default());
        let x = reports[0].rows.iter().find(|r| r.name == "a^x").unwrap();
        assert_eq!((x.range.min, x.range.max), (0.0, 2.0));
        let y = reports[0].rows.iter().find(|r| r.name == "a^y").unwrap();
        assert_eq!((y.range.min, y.range.max), (0.0, 3.0));
    }

    #[test]
    fn test_multiclass_classes_scored_independently() {
        let text = "1\na^x:1:1:10\n2\na^x:1:1:-5\n";
        let outcome = outcome_from(text, &["1", "2"], true);
        let reports = score_features(&empty_catalog(), &outcome, &RankOrder::default());
        assert_eq!(reports[0].rows[0].rel_score, 100.0);
        assert_eq!(reports[1].rows[0].rel_score, -100.0);
    }
}
