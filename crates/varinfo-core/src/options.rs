//! Extraction of the settings the core reacts to from the forwarded trainer
//! argument list.
//!
//! The trainer's own arguments are forwarded verbatim and never reparsed in
//! detail; this module only scans them for the handful of options that change
//! core behavior: `-q`/`--quadratic` pair expansion, `--ignore`/`--keep`
//! namespace filtering, and `--oaa` multi-class mode. Unsupported multi-class
//! reductions are rejected up front, before any corpus parsing begins.

use std::collections::BTreeSet;

use thiserror::Error;

/// Multi-class reductions the tool refuses to run with. Only one-against-all
/// positional audit correlation is supported.
const UNSUPPORTED_REDUCTIONS: &[&str] = &[
    "--ect",
    "--csoaa",
    "--csoaa_ldf",
    "--wap",
    "--wap_ldf",
    "--log_multi",
    "--recall_tree",
];

/// Errors raised while extracting settings from forwarded arguments.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// A pair argument was not exactly two namespace letters.
    #[error("-q/--quadratic expects exactly two namespace letters, got {0:?}")]
    BadPair(String),

    /// A flag that requires an argument appeared last.
    #[error("{0} expects an argument")]
    MissingArgument(String),

    /// A flag argument failed to parse.
    #[error("invalid argument {value:?} for {flag}")]
    InvalidArgument {
        /// The flag the argument belonged to.
        flag: String,
        /// The unparseable argument text.
        value: String,
    },

    /// A multi-class reduction other than one-against-all was requested.
    #[error("multi-class reduction {0:?} is not supported (only --oaa)")]
    UnsupportedReduction(String),

    /// A rank metric selector beyond the identity metric was requested.
    #[error("rank metric {0:?} is not implemented")]
    UnsupportedMetric(String),
}

/// Result type for option extraction.
pub type Result<T> = std::result::Result<T, OptionsError>;

/// The forwarded-option settings the core reacts to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VwOptions {
    /// Namespace short-code pairs from `-q`/`--quadratic`, in argument order.
    pub pairs: Vec<(char, char)>,
    /// Short codes from `--ignore`. Checked before the keep gate.
    pub ignore: BTreeSet<char>,
    /// Short codes from `--keep`. An empty set keeps everything.
    pub keep: BTreeSet<char>,
    /// Class count from `--oaa`; presence activates multi-class mode.
    pub oaa_classes: Option<u32>,
}

impl VwOptions {
    /// Returns true when one-against-all multi-class mode is active.
    pub fn multiclass(&self) -> bool {
        self.oaa_classes.is_some()
    }

    /// Scans a forwarded argument list.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut options = Self::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if UNSUPPORTED_REDUCTIONS.contains(&arg.as_str()) {
                return Err(OptionsError::UnsupportedReduction(arg.clone()));
            }
            match arg.as_str() {
                "-q" | "--quadratic" => {
                    let pair = iter
                        .next()
                        .ok_or_else(|| OptionsError::MissingArgument(arg.clone()))?;
                    options.pairs.push(parse_pair(pair)?);
                }
                "--ignore" => {
                    let codes = iter
                        .next()
                        .ok_or_else(|| OptionsError::MissingArgument(arg.clone()))?;
                    options.ignore.extend(codes.chars());
                }
                "--keep" => {
                    let codes = iter
                        .next()
                        .ok_or_else(|| OptionsError::MissingArgument(arg.clone()))?;
                    options.keep.extend(codes.chars());
                }
                "--oaa" => {
                    let count = iter
                        .next()
                        .ok_or_else(|| OptionsError::MissingArgument(arg.clone()))?;
                    let classes =
                        count
                            .parse::<u32>()
                            .map_err(|_| OptionsError::InvalidArgument {
                                flag: arg.clone(),
                                value: count.clone(),
                            })?;
                    options.oaa_classes = Some(classes);
                }
                other => {
                    // Attached form: -qab.
                    if let Some(pair) = other.strip_prefix("-q") {
                        if !pair.is_empty() {
                            options.pairs.push(parse_pair(pair)?);
                        }
                    }
                }
            }
        }
        Ok(options)
    }
}

fn parse_pair(text: &str) -> Result<(char, char)> {
    let mut chars = text.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(x), Some(y), None) => Ok((x, y)),
        _ => Err(OptionsError::BadPair(text.to_string())),
    }
}

// =============================================================================
// Rank order
// =============================================================================

/// Ranking configuration from the `-O` order option.
///
/// The selector is a single-letter metric choice with an optional leading `a`
/// requesting absolute percentages. Only the identity (weight) metric exists;
/// any other selector is an explicit not-implemented error rather than a
/// silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RankOrder {
    /// Report |normalized score| instead of the signed value.
    pub absolute: bool,
}

impl RankOrder {
    /// Parses an order selector. Empty and `w` select the identity metric.
    pub fn parse(spec: &str) -> Result<Self> {
        let (absolute, metric) = match spec.strip_prefix('a') {
            Some(rest) => (true, rest),
            None => (false, spec),
        };
        match metric {
            "" | "w" => Ok(Self { absolute }),
            other => Err(OptionsError::UnsupportedMetric(other.to_string())),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // -------------------------------------------------------------------------
    // VwOptions tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_default_is_single_label() {
        let options = VwOptions::from_args(&args(&["--loss_function", "logistic"])).unwrap();
        assert!(!options.multiclass());
        assert!(options.pairs.is_empty());
        assert!(options.ignore.is_empty());
    }

    #[test]
    fn test_quadratic_pairs() {
        let options = VwOptions::from_args(&args(&["-q", "ab", "--quadratic", "cd"])).unwrap();
        assert_eq!(options.pairs, vec![('a', 'b'), ('c', 'd')]);
    }

    #[test]
    fn test_attached_quadratic_pair() {
        let options = VwOptions::from_args(&args(&["-qab"])).unwrap();
        assert_eq!(options.pairs, vec![('a', 'b')]);
    }

    #[test]
    fn test_bad_pair_length() {
        let err = VwOptions::from_args(&args(&["-q", "abc"])).unwrap_err();
        assert!(matches!(err, OptionsError::BadPair(_)));
    }

    #[test]
    fn test_ignore_and_keep_codes() {
        let options = VwOptions::from_args(&args(&["--ignore", "ab", "--keep", "c"])).unwrap();
        assert!(options.ignore.contains(&'a'));
        assert!(options.ignore.contains(&'b'));
        assert!(options.keep.contains(&'c'));
    }

    #[test]
    fn test_oaa_activates_multiclass() {
        let options = VwOptions::from_args(&args(&["--oaa", "3"])).unwrap();
        assert!(options.multiclass());
        assert_eq!(options.oaa_classes, Some(3));
    }

    #[test]
    fn test_oaa_bad_count() {
        let err = VwOptions::from_args(&args(&["--oaa", "three"])).unwrap_err();
        assert!(matches!(err, OptionsError::InvalidArgument { .. }));
    }

    #[test]
    fn test_unsupported_reduction_rejected() {
        for flag in ["--ect", "--csoaa", "--wap", "--log_multi"] {
            let err = VwOptions::from_args(&args(&[flag, "3"])).unwrap_err();
            assert!(matches!(err, OptionsError::UnsupportedReduction(_)));
        }
    }

    #[test]
    fn test_missing_argument() {
        let err = VwOptions::from_args(&args(&["--ignore"])).unwrap_err();
        assert!(matches!(err, OptionsError::MissingArgument(_)));
    }

    // -------------------------------------------------------------------------
    // RankOrder tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_rank_order_default() {
        assert_eq!(RankOrder::parse("").unwrap(), RankOrder { absolute: false });
        assert_eq!(RankOrder::parse("w").unwrap(), RankOrder { absolute: false });
    }

    #[test]
    fn test_rank_order_absolute() {
        assert_eq!(RankOrder::parse("a").unwrap(), RankOrder { absolute: true });
        assert_eq!(RankOrder::parse("aw").unwrap(), RankOrder { absolute: true });
    }

    #[test]
    fn test_rank_order_unknown_metric_not_implemented() {
        let err = RankOrder::parse("z").unwrap_err();
        assert!(matches!(err, OptionsError::UnsupportedMetric(_)));
    }
}
