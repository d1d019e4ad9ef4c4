//! Plain-text rendering of the ranked feature tables.
//!
//! Column sizing is purely presentational: the feature-name column stretches
//! to the longest name (minimum 10), and the weight column stretches to cover
//! the formatted weight range.

use std::io::{self, Write};

use crate::score::ClassReport;

const MIN_NAME_WIDTH: usize = 10;
const HASH_WIDTH: usize = 10;
const RANGE_WIDTH: usize = 8;
const MIN_WEIGHT_WIDTH: usize = 8;
const SCORE_WIDTH: usize = 9;

/// Writes every class table to `out`. Class header lines are only emitted in
/// multi-class mode.
pub fn render_report(
    reports: &[ClassReport],
    multiclass: bool,
    out: &mut dyn Write,
) -> io::Result<()> {
    let name_width = reports
        .iter()
        .flat_map(|r| r.rows.iter())
        .map(|row| row.name.len())
        .max()
        .unwrap_or(0)
        .max(MIN_NAME_WIDTH);

    // Weight range across all rows, used only to size the weight column.
    let mut min_weight = 0.0f64;
    let mut max_weight = 0.0f64;
    for row in reports.iter().flat_map(|r| r.rows.iter()) {
        min_weight = min_weight.min(row.weight);
        max_weight = max_weight.max(row.weight);
    }
    let weight_range = max_weight - min_weight;
    let weight_width = format!("{weight_range:+.4}").len().max(MIN_WEIGHT_WIDTH);
    let hash_width = HASH_WIDTH;
    let range_width = RANGE_WIDTH;
    let score_width = SCORE_WIDTH;

    for report in reports {
        if multiclass {
            writeln!(
                out,
                "=== Class Label: {}  Prediction: {}",
                report.label, report.prediction
            )?;
        }
        writeln!(
            out,
            "{:<name_width$} {:>hash_width$} {:>range_width$} {:>range_width$} {:>weight_width$} {:>score_width$}",
            "FeatureName", "HashVal", "MinVal", "MaxVal", "Weight", "RelScore",
        )?;
        for row in &report.rows {
            writeln!(
                out,
                "{:<name_width$} {:>hash_width$} {:>range_width$.2} {:>range_width$.2} {:>weight_width$} {:>score_width$}",
                row.name,
                row.hash,
                row.range.min,
                row.range.max,
                format!("{:+.4}", row.weight),
                format!("{:+.2}%", row.rel_score),
            )?;
        }
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FeatureRange;
    use crate::score::ScoredFeature;

    fn row(name: &str, hash: u64, weight: f64, rel: f64) -> ScoredFeature {
        ScoredFeature {
            name: name.to_string(),
            hash,
            range: FeatureRange { min: 0.0, max: 2.0 },
            weight,
            rel_score: rel,
        }
    }

    fn render(reports: &[ClassReport], multiclass: bool) -> String {
        let mut buf = Vec::new();
        render_report(reports, multiclass, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_single_label_has_no_class_header() {
        let reports = vec![ClassReport {
            label: "1".to_string(),
            prediction: "0.5".to_string(),
            rows: vec![row("a^x", 100, 0.25, 100.0)],
        }];
        let text = render(&reports, false);
        assert!(!text.contains("Class Label"));
        assert!(text.starts_with("FeatureName"));
    }

    #[test]
    fn test_multiclass_header_carries_prediction() {
        let reports = vec![ClassReport {
            label: "2".to_string(),
            prediction: "0.9".to_string(),
            rows: vec![],
        }];
        let text = render(&reports, true);
        assert!(text.contains("=== Class Label: 2  Prediction: 0.9"));
    }

    #[test]
    fn test_row_formats() {
        let reports = vec![ClassReport {
            label: "1".to_string(),
            prediction: String::new(),
            rows: vec![row("a^x", 12345, -0.5, -50.0)],
        }];
        let text = render(&reports, false);
        let data_line = text.lines().nth(1).unwrap();
        assert!(data_line.contains("12345"));
        assert!(data_line.contains("0.00"));
        assert!(data_line.contains("2.00"));
        assert!(data_line.contains("-0.5000"));
        assert!(data_line.contains("-50.00%"));
    }

    #[test]
    fn test_name_column_stretches_past_minimum() {
        let long = "somenamespace^averylongfeaturekey";
        let reports = vec![ClassReport {
            label: "1".to_string(),
            prediction: String::new(),
            rows: vec![row(long, 1, 1.0, 100.0), row("a^x", 2, 0.5, 50.0)],
        }];
        let text = render(&reports, false);
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        let first = lines.next().unwrap();
        let second = lines.next().unwrap();
        // All hash fields end at the same column.
        let col = long.len() + 1 + HASH_WIDTH;
        assert_eq!(&header[long.len()..long.len() + 1], " ");
        assert_eq!(first[..col].trim_end().len(), col);
        assert!(second[..long.len()].trim_end().len() <= long.len());
    }
}
