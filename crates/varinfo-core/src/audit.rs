//! Audit-output parsing.
//!
//! The auditor emits exactly two lines per probe example: a prediction line
//! (opaque text, retained per class in multi-class mode) and a feature line
//! of whitespace-separated `name:hash:value:weight` tokens. Colons inside the
//! feature name are legal, so a token is sliced from the tail: the last three
//! `:`-fields are hash, value, and weight, and everything before them is the
//! name.
//!
//! The auditor does not echo labels. Example *i* of the stream belongs to
//! entry *i mod len(labels)* of the same ordered label list the probe file
//! was generated from; that positional correlation is the only way labels are
//! recovered.

use std::collections::HashMap;

use thiserror::Error;

use crate::catalog::CONSTANT_FEATURE;

/// Errors raised while parsing the audit stream. All are fatal: a silently
/// dropped feature would corrupt every subsequent report.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A feature token did not yield four trailing colon-fields.
    #[error("malformed audit token {token:?} (expected name:hash:value:weight)")]
    MalformedToken {
        /// The offending token text.
        token: String,
    },

    /// A hash, value, or weight field failed to parse.
    #[error("invalid {field} field in audit token {token:?}")]
    InvalidField {
        /// Which field was unparseable.
        field: &'static str,
        /// The offending token text.
        token: String,
    },

    /// The stream ended with a prediction line and no feature line.
    #[error("audit stream truncated: prediction line without a feature line")]
    TruncatedStream,
}

/// Result type for audit parsing.
pub type Result<T> = std::result::Result<T, AuditError>;

/// Per-class audit bookkeeping: the class's prediction, its feature weights,
/// and the order features were first observed in (the tie-break order for
/// reporting).
#[derive(Debug, Clone)]
pub struct ClassAudit {
    /// The label this class corresponds to.
    pub label: String,
    /// The prediction line for this class's probe example, verbatim.
    pub prediction: String,
    /// Feature name -> learned weight.
    pub weights: HashMap<String, f64>,
    /// Feature names in first-observed order.
    pub order: Vec<String>,
}

impl ClassAudit {
    fn new(label: String) -> Self {
        Self {
            label,
            prediction: String::new(),
            weights: HashMap::new(),
            order: Vec::new(),
        }
    }
}

/// Everything extracted from one audit stream.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    /// One entry per label, parallel to the ordered label list.
    pub classes: Vec<ClassAudit>,
    /// Feature name -> hash code, global across classes.
    pub hashes: HashMap<String, u64>,
    /// Every feature name observed in audit output, in first-observed order.
    /// This is the authoritative feature list for reporting; it may differ
    /// from the catalog's universe in both directions.
    pub observed: Vec<String>,
}

/// Parses a complete audit stream against the shared ordered label list.
pub fn parse_audit_stream(
    text: &str,
    labels: &[String],
    multiclass: bool,
) -> Result<AuditOutcome> {
    let mut outcome = AuditOutcome {
        classes: labels
            .iter()
            .map(|label| ClassAudit::new(label.clone()))
            .collect(),
        hashes: HashMap::new(),
        observed: Vec::new(),
    };

    if labels.is_empty() {
        return Ok(outcome);
    }

    let mut lines = text.lines();
    let mut example = 0usize;
    while let Some(prediction) = lines.next() {
        let Some(feature_line) = lines.next() else {
            return Err(AuditError::TruncatedStream);
        };
        let class_idx = example % labels.len();
        // Retained verbatim; multi-class reporting echoes it in the header.
        outcome.classes[class_idx].prediction = prediction.to_string();

        let label = labels[class_idx].clone();
        for token in feature_line.split_whitespace() {
            let (name, hash, _value, weight) = parse_token(token)?;
            let name = if name.is_empty() {
                // The bias term audits with an empty feature name.
                if multiclass {
                    format!("{CONSTANT_FEATURE}_{label}")
                } else {
                    CONSTANT_FEATURE.to_string()
                }
            } else {
                name
            };

            if !outcome.hashes.contains_key(&name) {
                outcome.observed.push(name.clone());
            }
            outcome.hashes.insert(name.clone(), hash);

            let class = &mut outcome.classes[class_idx];
            if !class.weights.contains_key(&name) {
                class.order.push(name.clone());
            }
            class.weights.insert(name, weight);
        }
        example += 1;
    }

    Ok(outcome)
}

/// Slices one audit token into (name, hash, value, weight).
///
/// Splits on `:` and takes a fixed-size suffix; the remainder is rejoined
/// with `:` as the feature name, so names containing colons survive intact.
fn parse_token(token: &str) -> Result<(String, u64, f64, f64)> {
    let parts: Vec<&str> = token.split(':').collect();
    let n = parts.len();
    if n < 4 {
        return Err(AuditError::MalformedToken {
            token: token.to_string(),
        });
    }
    let name = parts[..n - 3].join(":");
    let hash_text = parts[n - 3];
    let value_text = parts[n - 2];
    let weight_text = parts[n - 1];

    let hash = hash_text
        .parse::<u64>()
        .map_err(|_| AuditError::InvalidField {
            field: "hash",
            token: token.to_string(),
        })?;
    let value = value_text
        .parse::<f64>()
        .map_err(|_| AuditError::InvalidField {
            field: "value",
            token: token.to_string(),
        })?;
    let weight = weight_text
        .parse::<f64>()
        .map_err(|_| AuditError::InvalidField {
            field: "weight",
            token: token.to_string(),
        })?;

    Ok((name, hash, value, weight))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // -------------------------------------------------------------------------
    // Token slicing tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_token_basic() {
        let (name, hash, value, weight) = parse_token("a^x:12345:1:0.5").unwrap();
        assert_eq!(name, "a^x");
        assert_eq!(hash, 12345);
        assert_eq!(value, 1.0);
        assert_eq!(weight, 0.5);
    }

    #[test]
    fn test_parse_token_colons_in_name() {
        // Only the last three fields are authoritative; earlier colons belong
        // to the feature name.
        let (name, hash, _, weight) = parse_token("a^url:http://x:99:1:-0.25").unwrap();
        assert_eq!(name, "a^url:http://x");
        assert_eq!(hash, 99);
        assert_eq!(weight, -0.25);
    }

    #[test]
    fn test_parse_token_too_few_fields_is_fatal() {
        let err = parse_token("a^x:12345:1").unwrap_err();
        assert!(matches!(err, AuditError::MalformedToken { .. }));
    }

    #[test]
    fn test_parse_token_bad_hash() {
        let err = parse_token("a^x:nothash:1:0.5").unwrap_err();
        assert!(matches!(
            err,
            AuditError::InvalidField { field: "hash", .. }
        ));
    }

    // -------------------------------------------------------------------------
    // Stream parsing tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_single_label_stream() {
        let text = "0.5\na^x:100:1:0.25 a^y:101:1:-0.5 :0:1:0.1\n";
        let outcome = parse_audit_stream(text, &labels(&["1"]), false).unwrap();
        assert_eq!(outcome.observed, vec!["a^x", "a^y", "Constant"]);
        assert_eq!(outcome.hashes["a^x"], 100);
        assert_eq!(outcome.classes[0].weights["a^y"], -0.5);
        assert_eq!(outcome.classes[0].weights["Constant"], 0.1);
    }

    #[test]
    fn test_multiclass_bias_renamed_per_label() {
        let text = "1\n:0:1:0.1\n2\n:0:1:0.2\n";
        let outcome = parse_audit_stream(text, &labels(&["1", "2"]), true).unwrap();
        assert_eq!(outcome.classes[0].weights["Constant_1"], 0.1);
        assert_eq!(outcome.classes[1].weights["Constant_2"], 0.2);
    }

    #[test]
    fn test_label_cursor_wraps_modulo() {
        // 7 examples against 3 labels: example i belongs to labels[i % 3].
        let mut text = String::new();
        for i in 0..7 {
            text.push_str(&format!("{i}\na^x:5:1:{}.0\n", i));
        }
        let outcome = parse_audit_stream(&text, &labels(&["1", "2", "3"]), true).unwrap();
        // Examples 0, 3, 6 hit label "1"; the last write (6.0) wins.
        assert_eq!(outcome.classes[0].weights["a^x"], 6.0);
        // Examples 1, 4 hit label "2".
        assert_eq!(outcome.classes[1].weights["a^x"], 4.0);
        // Predictions retain the latest example for the class.
        assert_eq!(outcome.classes[0].prediction, "6");
    }

    #[test]
    fn test_truncated_stream_is_fatal() {
        let err = parse_audit_stream("0.5\n", &labels(&["1"]), false).unwrap_err();
        assert!(matches!(err, AuditError::TruncatedStream));
    }

    #[test]
    fn test_malformed_token_aborts_parse() {
        let text = "0.5\na^x:100:1:0.25 broken\n";
        let err = parse_audit_stream(text, &labels(&["1"]), false).unwrap_err();
        assert!(matches!(err, AuditError::MalformedToken { .. }));
    }

    #[test]
    fn test_observed_order_is_first_seen() {
        let text = "0\nb^z:3:1:1.0 a^x:1:1:2.0\n0\na^x:1:1:2.5 c^q:4:1:0.0\n";
        let outcome = parse_audit_stream(text, &labels(&["1"]), false).unwrap();
        assert_eq!(outcome.observed, vec!["b^z", "a^x", "c^q"]);
    }
}
