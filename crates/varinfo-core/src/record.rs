//! Training-record parsing for the namespaced sparse-vector format.
//!
//! One training record is a single line of the form
//! `<label-field>|<namespace-region>(|<namespace-region>)*`. A namespace
//! region starts with an optional namespace identifier (its leading token up
//! to the first whitespace or `:`), optionally followed by a `:weight`
//! suffix, and then whitespace-separated `key[:value]` feature tokens.
//!
//! # Example
//!
//! ```
//! use varinfo_core::record::parse_record;
//!
//! let record = parse_record("1 |a x:2 y:3 |b z").unwrap();
//! assert_eq!(record.label_field, "1");
//! assert_eq!(record.triples.len(), 3);
//! assert_eq!(record.triples[2].namespace, "b");
//! assert_eq!(record.triples[2].value, 1.0);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while parsing a training record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The line has no `|` separating the label field from the features.
    #[error("record has no '|' separator: {0:?}")]
    MissingSeparator(String),

    /// A feature token carried a value that is not a number.
    #[error("invalid value {value:?} for feature key {key:?}")]
    InvalidValue {
        /// The feature key the value belonged to.
        key: String,
        /// The unparseable value text.
        value: String,
    },
}

/// Result type for record parsing.
pub type Result<T> = std::result::Result<T, RecordError>;

/// One `(namespace, key, value)` observation from a training record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTriple {
    /// Namespace the feature belongs to; empty for the default namespace.
    pub namespace: String,
    /// Feature key within the namespace.
    pub key: String,
    /// Observed value; 1 when the token carried no explicit value.
    pub value: f64,
}

/// A parsed training record: the raw label field plus ordered feature triples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseRecord {
    /// The text before the first `|`, unparsed. Multi-class label extraction
    /// happens separately via [`LabelSet::observe`].
    pub label_field: String,
    /// Feature observations in the order they appeared on the line.
    pub triples: Vec<FeatureTriple>,
}

/// Parses one non-empty training line into a [`SparseRecord`].
///
/// Pure function; the caller owns accumulation across records.
pub fn parse_record(line: &str) -> Result<SparseRecord> {
    let Some((label_field, rest)) = line.split_once('|') else {
        return Err(RecordError::MissingSeparator(line.to_string()));
    };

    let mut triples = Vec::new();
    for region in rest.split('|') {
        let (namespace, body) = split_namespace(region);
        for token in body.split_whitespace() {
            let (key, value) = match token.split_once(':') {
                Some((key, text)) => {
                    let value = text.parse::<f64>().map_err(|_| RecordError::InvalidValue {
                        key: key.to_string(),
                        value: text.to_string(),
                    })?;
                    (key, value)
                }
                None => (token, 1.0),
            };
            if key.is_empty() {
                continue;
            }
            triples.push(FeatureTriple {
                namespace: namespace.to_string(),
                key: key.to_string(),
                value,
            });
        }
    }

    Ok(SparseRecord {
        label_field: label_field.trim().to_string(),
        triples,
    })
}

/// Splits a namespace region into its namespace identifier and feature body.
///
/// The identifier is the leading token up to the first whitespace or `:`; a
/// `:weight` suffix on the identifier is stripped. A region starting with
/// whitespace (or an empty region) belongs to the default namespace.
fn split_namespace(region: &str) -> (&str, &str) {
    if region.is_empty() || region.starts_with(char::is_whitespace) {
        return ("", region);
    }
    let end = region
        .find(|c: char| c.is_whitespace() || c == ':')
        .unwrap_or(region.len());
    let namespace = &region[..end];
    let mut body = &region[end..];
    if body.starts_with(':') {
        // Skip the namespace weight token; the weight itself is not used.
        let weight_end = body.find(char::is_whitespace).unwrap_or(body.len());
        body = &body[weight_end..];
    }
    (namespace, body)
}

// =============================================================================
// Multi-class label set
// =============================================================================

/// Accumulates multi-class labels across records.
///
/// A multi-class label field is `label[:weight] (label[:weight])* [tag]`. The
/// optional trailing tag is a token with no `:` whose label part is not a
/// number. Weights are accepted but only the label identifiers are used
/// downstream.
///
/// [`LabelSet::ordered_labels`] is the single ordering contract shared by
/// probe generation and audit-stream correlation: labels sorted ascending by
/// numeric value, non-numeric labels after them lexicographically.
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    weights: HashMap<String, f64>,
}

impl LabelSet {
    /// Creates an empty label set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a label field and records every label it names.
    pub fn observe(&mut self, label_field: &str) {
        let mut tokens: Vec<&str> = label_field.split_whitespace().collect();
        if let Some(last) = tokens.last() {
            if !last.contains(':') && last.parse::<f64>().is_err() {
                // Trailing tag, not a label.
                tokens.pop();
            }
        }
        for token in tokens {
            let (label, weight) = match token.split_once(':') {
                Some((label, text)) => (label, text.parse::<f64>().unwrap_or(1.0)),
                None => (token, 1.0),
            };
            if label.is_empty() {
                continue;
            }
            self.weights.insert(label.to_string(), weight);
        }
    }

    /// Returns true if no label has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Number of distinct labels observed.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Flattens the set into the shared ordered label list.
    pub fn ordered_labels(&self) -> Vec<String> {
        let mut labels: Vec<&String> = self.weights.keys().collect();
        labels.sort_by(|a, b| match (a.parse::<f64>(), b.parse::<f64>()) {
            (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        });
        labels.into_iter().cloned().collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
