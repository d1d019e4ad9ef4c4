//! Feature catalog: the universe of observed namespaces and features.
//!
//! The catalog is built by a single pass over the training corpus, extended
//! with synthetic cross-namespace pair features, finalized with the model's
//! bias term, and never mutated afterwards.
//!
//! # Example
//!
//! ```
//! use varinfo_core::catalog::{FeatureCatalog, NamespaceFilter};
//! use varinfo_core::record::parse_record;
//!
//! let mut catalog = FeatureCatalog::new(NamespaceFilter::default());
//! catalog.ingest(&parse_record("1 |a x:2 y:3").unwrap());
//! catalog.ingest(&parse_record("-1 |a x:1").unwrap());
//! catalog.finalize();
//!
//! let range = catalog.range_or_zero("a^x");
//! assert_eq!((range.min, range.max), (0.0, 2.0));
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::record::SparseRecord;

/// Separator joining namespace and key into a canonical feature name. Not
/// otherwise legal in either part of the wire format.
pub const FIELD_SEP: char = '^';

/// Canonical name of the model's bias term.
pub const CONSTANT_FEATURE: &str = "Constant";

/// Canonical string form of a feature identity.
pub fn feature_name(namespace: &str, key: &str) -> String {
    format!("{namespace}{FIELD_SEP}{key}")
}

/// Observed value range of one feature across the whole corpus.
///
/// Both bounds start at 0 and only widen: min never increases, max never
/// decreases. The zero baseline is retained unless crossed, so a feature only
/// ever seen at 3 has range [0, 3].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureRange {
    /// Smallest of 0 and every observed value.
    pub min: f64,
    /// Largest of 0 and every observed value.
    pub max: f64,
}

impl FeatureRange {
    /// Widens the range to cover `value`.
    pub fn widen(&mut self, value: f64) {
        if value > self.max {
            self.max = value;
        }
        if value < self.min {
            self.min = value;
        }
    }
}

// =============================================================================
// Namespace filter
// =============================================================================

/// Ignore/Keep namespace filtering by short code (a namespace's first char).
///
/// Ignore is checked before the Keep gate, so a code present in both sets is
/// dropped. The default (empty-named) namespace has no short code: it can
/// never be ignored by code, and is filtered out whenever Keep is non-empty.
#[derive(Debug, Clone, Default)]
pub struct NamespaceFilter {
    ignore: BTreeSet<char>,
    keep: BTreeSet<char>,
}

impl NamespaceFilter {
    /// Creates a filter from ignore and keep short-code sets.
    pub fn new(ignore: BTreeSet<char>, keep: BTreeSet<char>) -> Self {
        Self { ignore, keep }
    }

    /// Returns true if features in `namespace` should be admitted.
    pub fn admits(&self, namespace: &str) -> bool {
        let code = namespace.chars().next();
        if let Some(c) = code {
            if self.ignore.contains(&c) {
                return false;
            }
        }
        self.keep.is_empty() || code.is_some_and(|c| self.keep.contains(&c))
    }
}

// =============================================================================
// Feature catalog
// =============================================================================

/// Accumulated universe of namespaces, per-namespace keys, and feature ranges.
#[derive(Debug, Clone, Default)]
pub struct FeatureCatalog {
    /// Namespace -> key -> last-seen value. The value is only used to
    /// enumerate known keys, not to retain history.
    namespaces: BTreeMap<String, BTreeMap<String, f64>>,
    /// Canonical feature name -> observed range.
    ranges: BTreeMap<String, FeatureRange>,
    filter: NamespaceFilter,
}

impl FeatureCatalog {
    /// Creates an empty catalog with the given namespace filter.
    pub fn new(filter: NamespaceFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Ingests one parsed record: registers namespaces and keys, and widens
    /// each admitted feature's range. Key values are last-write-wins across
    /// the whole accumulation, not per record.
    pub fn ingest(&mut self, record: &SparseRecord) {
        for triple in &record.triples {
            if !self.filter.admits(&triple.namespace) {
                continue;
            }
            self.namespaces
                .entry(triple.namespace.clone())
                .or_default()
                .insert(triple.key.clone(), triple.value);
            self.ranges
                .entry(feature_name(&triple.namespace, &triple.key))
                .or_default()
                .widen(triple.value);
        }
    }

    /// Registers the synthetic cross-product features for each `(x, y)` pair
    /// of namespace short codes, mirroring the trainer's own quadratic
    /// expansion so interaction features appear in the probe and report.
    ///
    /// Pair features get a fixed (0, 0) range: their real value products are
    /// not tracked from raw data, only their presence. Idempotent.
    pub fn expand_pairs(&mut self, pairs: &[(char, char)]) {
        for &(x, y) in pairs {
            let left: Vec<String> = self
                .namespaces
                .keys()
                .filter(|ns| ns.starts_with(x))
                .cloned()
                .collect();
            let right: Vec<String> = self
                .namespaces
                .keys()
                .filter(|ns| ns.starts_with(y))
                .cloned()
                .collect();
            for ns1 in &left {
                for ns2 in &right {
                    let keys1: Vec<String> = self.namespaces[ns1].keys().cloned().collect();
                    let keys2: Vec<String> = self.namespaces[ns2].keys().cloned().collect();
                    for key1 in &keys1 {
                        for key2 in &keys2 {
                            let name = format!(
                                "{ns1}{FIELD_SEP}{key1}{FIELD_SEP}{ns2}{FIELD_SEP}{key2}"
                            );
                            self.ranges.entry(name).or_default();
                        }
                    }
                }
            }
        }
    }

    /// Ensures the bias term is present with a (0, 0) range.
    pub fn finalize(&mut self) {
        self.ranges.entry(CONSTANT_FEATURE.to_string()).or_default();
    }

    /// Range for `name`, or (0, 0) for identities the catalog never tracked
    /// (synthetic pair features the trainer materialized itself, per-class
    /// bias terms).
    pub fn range_or_zero(&self, name: &str) -> FeatureRange {
        self.ranges.get(name).copied().unwrap_or_default()
    }

    /// Iterates namespaces and their known keys in deterministic order.
    pub fn namespaces(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, f64>)> {
        self.namespaces.iter()
    }

    /// Iterates every known canonical feature name in deterministic order.
    pub fn known_features(&self) -> impl Iterator<Item = &str> {
        self.ranges.keys().map(|s| s.as_str())
    }

    /// Number of registered namespaces.
    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    /// Number of known feature identities, including synthetic ones.
    pub fn feature_count(&self) -> usize {
        self.ranges.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
