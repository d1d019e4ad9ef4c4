//! Dense probe-example generation.
//!
//! A probe example is a synthetic record containing every feature known to
//! the catalog at a fixed value, built solely to force the auditor to reveal
//! every feature's hash code and learned weight. One probe line is emitted
//! per label, in the shared ordered label list; the audit stream is later
//! correlated back to labels by position, so this order is a contract.

use crate::catalog::FeatureCatalog;

/// Fixed value every feature takes in a probe example.
pub const PROBE_VALUE: &str = "1";

/// Renders one probe line per label.
///
/// Multi-class label fields carry only the positive `<label>:1` marker; no
/// negative entries are emitted for the other labels, keeping one auditable
/// line per label. Single-label mode uses the bare label text.
///
/// Namespace and key iteration comes from the catalog's deterministic order,
/// so two runs over the same catalog produce identical probe files.
pub fn render_probe_lines(
    catalog: &FeatureCatalog,
    labels: &[String],
    multiclass: bool,
) -> Vec<String> {
    labels
        .iter()
        .map(|label| {
            let mut line = if multiclass {
                format!("{label}:{PROBE_VALUE}")
            } else {
                label.clone()
            };
            for (namespace, keys) in catalog.namespaces() {
                line.push_str(" |");
                line.push_str(namespace);
                for key in keys.keys() {
                    line.push(' ');
                    line.push_str(key);
                    line.push(':');
                    line.push_str(PROBE_VALUE);
                }
            }
            line
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
