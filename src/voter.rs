//! Ensemble voting: metric set in, one ordered verdict out.
//!
//! Each configured metric has a weight and a band table mapping its weighted
//! value to a verdict. The final verdict is the maximum band across all
//! metrics: one strongly indicating metric escalates the whole vote, and is
//! never diluted by averaging against benign ones. Metrics present in the
//! set but absent from the configuration are ignored, so the metric
//! vocabulary can grow without touching the voter.

use std::collections::HashMap;

use crate::metrics::MetricSet;
use crate::verdict::Verdict;

/// Invalid voter configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Metric weight must be positive.
    #[error("metric weight must be positive, got {weight}")]
    NonPositiveWeight { weight: f64 },

    /// Band thresholds must sit in (0, 1].
    #[error("band threshold {value} outside (0, 1]")]
    ThresholdOutOfRange { value: f64 },

    /// Band thresholds must be non-decreasing.
    #[error("band thresholds not ordered: soft {soft} <= hard {hard} <= tripwire {tripwire} required")]
    UnorderedBands { soft: f64, hard: f64, tripwire: f64 },
}

/// Weight and verdict band thresholds for one metric.
///
/// A weighted value falls into the band of the highest threshold it meets.
/// Thresholds are inclusive lower bounds: a value exactly equal to a
/// threshold lands in that threshold's band. Equal thresholds collapse the
/// lower bands, which is how binary tripwire metrics are expressed.
#[derive(Debug, Clone, Copy)]
pub struct MetricBands {
    weight: f64,
    soft: f64,
    hard: f64,
    tripwire: f64,
}

impl MetricBands {
    /// Validated band table.
    pub fn new(weight: f64, soft: f64, hard: f64, tripwire: f64) -> Result<Self, ConfigError> {
        if !(weight > 0.0) {
            return Err(ConfigError::NonPositiveWeight { weight });
        }
        for value in [soft, hard, tripwire] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::ThresholdOutOfRange { value });
            }
        }
        if !(soft <= hard && hard <= tripwire) {
            return Err(ConfigError::UnorderedBands {
                soft,
                hard,
                tripwire,
            });
        }
        Ok(Self {
            weight,
            soft,
            hard,
            tripwire,
        })
    }

    /// Band table for a binary metric that goes straight to tripwire.
    pub fn tripwire_only(threshold: f64) -> Result<Self, ConfigError> {
        Self::new(1.0, threshold, threshold, threshold)
    }

    /// Classify a raw metric value into its verdict band.
    pub fn classify(&self, value: f64) -> Verdict {
        let weighted = (value * self.weight).clamp(0.0, 1.0);
        if weighted >= self.tripwire {
            Verdict::Tripwire
        } else if weighted >= self.hard {
            Verdict::Hard
        } else if weighted >= self.soft {
            Verdict::Soft
        } else {
            Verdict::Clear
        }
    }
}

/// Per-metric voting configuration.
#[derive(Debug, Clone)]
pub struct VoterConfig {
    bands: HashMap<String, MetricBands>,
}

impl VoterConfig {
    /// Empty configuration: every metric is ignored and every vote is clear.
    pub fn empty() -> Self {
        Self {
            bands: HashMap::new(),
        }
    }

    /// Assign bands to a metric name.
    pub fn set_bands(&mut self, metric: impl Into<String>, bands: MetricBands) {
        self.bands.insert(metric.into(), bands);
    }

    /// Bands for a metric, if configured.
    pub fn bands(&self, metric: &str) -> Option<&MetricBands> {
        self.bands.get(metric)
    }
}

impl Default for VoterConfig {
    fn default() -> Self {
        let mut config = Self::empty();
        config.set_bands(
            "pliny_score",
            MetricBands::new(1.0, 0.3, 0.6, 0.85).expect("default pliny bands are valid"),
        );
        config.set_bands(
            "rogue_glyphs",
            MetricBands::new(1.0, 0.05, 0.1, 0.4).expect("default glyph bands are valid"),
        );
        config.set_bands(
            "tool_drift",
            MetricBands::tripwire_only(1.0).expect("default tool-drift bands are valid"),
        );
        config
    }
}

/// The result of one ensemble vote.
#[derive(Debug, Clone, PartialEq)]
pub struct Vote {
    /// Maximum band across all configured metrics.
    pub verdict: Verdict,
    /// Human-readable reason naming the deciding metric.
    pub reason: String,
}

/// Combines a metric set into a single verdict.
pub struct EnsembleVoter {
    config: VoterConfig,
}

impl EnsembleVoter {
    /// Build a voter over a band configuration.
    pub fn new(config: VoterConfig) -> Self {
        Self { config }
    }

    /// Vote on a metric set. Deterministic and total: defined for every
    /// possible set, including empty, all-zero, and all-unknown.
    pub fn vote(&self, metrics: &MetricSet) -> Vote {
        let mut verdict = Verdict::Clear;
        let mut deciding: Option<(&str, f64)> = None;

        // MetricSet iterates in name order, so ties resolve deterministically
        // to the first metric reaching the final band.
        for (name, value) in metrics.iter() {
            let Some(bands) = self.config.bands(name) else {
                continue; // unknown metric, forward compatibility
            };
            let band = bands.classify(value);
            if band > verdict {
                verdict = band;
                deciding = Some((name, value));
            }
        }

        let reason = match deciding {
            Some((name, value)) => {
                format!("{name} scored {value:.2}, {verdict} band")
            }
            None => "all metrics below soft band".to_string(),
        };

        Vote { verdict, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn voter() -> EnsembleVoter {
        EnsembleVoter::new(VoterConfig::default())
    }

    fn set(pairs: &[(&str, f64)]) -> MetricSet {
        pairs.iter().map(|&(n, v)| (n, v)).collect()
    }

    #[test]
    fn test_all_zero_votes_clear() {
        let vote = voter().vote(&set(&[
            ("pliny_score", 0.0),
            ("rogue_glyphs", 0.0),
            ("tool_drift", 0.0),
        ]));
        assert_eq!(vote.verdict, Verdict::Clear);
    }

    #[test]
    fn test_empty_set_votes_clear() {
        assert_eq!(voter().vote(&MetricSet::new()).verdict, Verdict::Clear);
    }

    #[test]
    fn test_single_tripwire_metric_decides() {
        // One maximal signal wins regardless of everything else being zero.
        let vote = voter().vote(&set(&[
            ("pliny_score", 0.9),
            ("rogue_glyphs", 0.0),
            ("tool_drift", 0.0),
        ]));
        assert_eq!(vote.verdict, Verdict::Tripwire);
        assert!(vote.reason.contains("pliny_score"));
    }

    #[test]
    fn test_max_of_bands_not_average() {
        // Averaging would dilute this to soft; max-of-bands must not.
        let vote = voter().vote(&set(&[("pliny_score", 0.9), ("rogue_glyphs", 0.01)]));
        assert_eq!(vote.verdict, Verdict::Tripwire);
    }

    #[test]
    fn test_band_boundaries() {
        let v = voter();
        assert_eq!(v.vote(&set(&[("pliny_score", 0.29)])).verdict, Verdict::Clear);
        assert_eq!(v.vote(&set(&[("pliny_score", 0.3)])).verdict, Verdict::Soft);
        assert_eq!(v.vote(&set(&[("pliny_score", 0.6)])).verdict, Verdict::Hard);
        assert_eq!(v.vote(&set(&[("pliny_score", 0.85)])).verdict, Verdict::Tripwire);
    }

    #[test]
    fn test_tool_drift_is_tripwire_only() {
        let v = voter();
        assert_eq!(v.vote(&set(&[("tool_drift", 1.0)])).verdict, Verdict::Tripwire);
        assert_eq!(v.vote(&set(&[("tool_drift", 0.99)])).verdict, Verdict::Clear);
    }

    #[test]
    fn test_unknown_metric_ignored() {
        let vote = voter().vote(&set(&[("novel_metric", 1.0)]));
        assert_eq!(vote.verdict, Verdict::Clear);
    }

    #[test]
    fn test_deterministic() {
        let metrics = set(&[("pliny_score", 0.55), ("rogue_glyphs", 0.07)]);
        let a = voter().vote(&metrics);
        let b = voter().vote(&metrics);
        assert_eq!(a, b);
    }

    #[test]
    fn test_weight_scales_value() {
        let mut config = VoterConfig::empty();
        config.set_bands("m", MetricBands::new(2.0, 0.3, 0.6, 0.85).unwrap());
        let v = EnsembleVoter::new(config);
        // 0.35 * 2.0 = 0.7 -> hard band.
        assert_eq!(v.vote(&set(&[("m", 0.35)])).verdict, Verdict::Hard);
    }

    #[test]
    fn test_invalid_bands_rejected() {
        assert!(MetricBands::new(0.0, 0.3, 0.6, 0.85).is_err());
        assert!(MetricBands::new(1.0, 0.0, 0.6, 0.85).is_err());
        assert!(MetricBands::new(1.0, 0.6, 0.3, 0.85).is_err());
        assert!(MetricBands::new(1.0, 0.3, 0.6, 1.5).is_err());
    }
}
