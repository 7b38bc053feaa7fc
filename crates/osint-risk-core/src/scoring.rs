use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::snapshot::{Severity, SeverityCounts};

/// Penalty points subtracted from a perfect score for each finding of a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityWeights {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

/// Shared weighting used by the scorer and by callers that rank findings.
pub const DEFAULT_SEVERITY_WEIGHTS: SeverityWeights = SeverityWeights {
    critical: 10,
    high: 5,
    medium: 2,
    low: 1,
};

impl Default for SeverityWeights {
    fn default() -> Self {
        DEFAULT_SEVERITY_WEIGHTS
    }
}

impl SeverityWeights {
    pub fn weight(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    /// Weighted penalty for the given counts. Saturates instead of overflowing.
    pub fn penalty(&self, counts: &SeverityCounts) -> u64 {
        Severity::ALL.iter().fold(0u64, |acc, severity| {
            let contribution =
                u64::from(self.weight(*severity)).saturating_mul(u64::from(counts.get(*severity)));
            acc.saturating_add(contribution)
        })
    }
}

/// Lower bounds (inclusive) of each qualitative tier, evaluated top-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub excellent: u8,
    pub good: u8,
    pub fair: u8,
    pub poor: u8,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            excellent: 90,
            good: 75,
            fair: 60,
            poor: 40,
        }
    }
}

impl TierThresholds {
    fn table(&self) -> [(&'static str, u8, RiskLabel, ColorTier); 4] {
        [
            ("excellent", self.excellent, RiskLabel::Excellent, ColorTier::Green),
            ("good", self.good, RiskLabel::Good, ColorTier::Blue),
            ("fair", self.fair, RiskLabel::Fair, ColorTier::Yellow),
            ("poor", self.poor, RiskLabel::Poor, ColorTier::Orange),
        ]
    }

    /// Map a clamped score onto its label and color tier.
    pub fn classify(&self, score: u8) -> (RiskLabel, ColorTier) {
        self.table()
            .into_iter()
            .find(|(_, threshold, _, _)| score >= *threshold)
            .map(|(_, _, label, color)| (label, color))
            .unwrap_or((RiskLabel::Critical, ColorTier::Red))
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let table = self.table();
        for (tier, value, _, _) in table {
            if value > 100 {
                return Err(ConfigValidationError::ThresholdOutOfRange { tier, value });
            }
        }
        for pair in table.windows(2) {
            let (upper, upper_value, _, _) = pair[0];
            let (lower, lower_value, _, _) = pair[1];
            if upper_value <= lower_value {
                return Err(ConfigValidationError::ThresholdsNotDescending { upper, lower });
            }
        }
        Ok(())
    }
}

/// Tunable configuration for the vulnerability scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: SeverityWeights,
    pub thresholds: TierThresholds,
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.thresholds.validate()
    }
}

/// Errors emitted while validating scoring configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("threshold `{tier}` must be within 0..=100 (got {value})")]
    ThresholdOutOfRange { tier: &'static str, value: u8 },
    #[error("threshold `{upper}` must be strictly greater than `{lower}`")]
    ThresholdsNotDescending {
        upper: &'static str,
        lower: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLabel {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
    /// No vulnerability data was supplied; not the same as worst-case risk.
    Unknown,
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::Critical => "Critical",
            Self::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Presentation color token attached to each label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTier {
    Green,
    Blue,
    Yellow,
    Orange,
    Red,
    Neutral,
}

impl fmt::Display for ColorTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Neutral => "neutral",
        };
        f.write_str(token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Security score in `0..=100`; higher is safer.
    pub score: u8,
    pub label: RiskLabel,
    pub color_tier: ColorTier,
}

impl RiskAssessment {
    /// Assessment used when no vulnerability data exists.
    pub fn unknown() -> Self {
        Self {
            score: 0,
            label: RiskLabel::Unknown,
            color_tier: ColorTier::Neutral,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.label == RiskLabel::Unknown
    }
}

/// Score severity counts with the default weights and thresholds.
pub fn score(counts: Option<&SeverityCounts>) -> RiskAssessment {
    score_with_config(counts, &ScoringConfig::default())
}

pub fn score_with_config(counts: Option<&SeverityCounts>, config: &ScoringConfig) -> RiskAssessment {
    let Some(counts) = counts else {
        return RiskAssessment::unknown();
    };
    let penalty = config.weights.penalty(counts);
    // 100 - penalty, floored at zero, always fits in u8.
    let score = 100u64.saturating_sub(penalty) as u8;
    let (label, color_tier) = config.thresholds.classify(score);
    RiskAssessment {
        score,
        label,
        color_tier,
    }
}

/// Share of findings per tier, each rounded to a whole percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityDistribution {
    pub total: u64,
    pub critical: u8,
    pub high: u8,
    pub medium: u8,
    pub low: u8,
}

impl SeverityDistribution {
    pub fn percentage(&self, severity: Severity) -> u8 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

pub fn distribution(counts: Option<&SeverityCounts>) -> SeverityDistribution {
    let Some(counts) = counts else {
        return SeverityDistribution::default();
    };
    let total = counts.total();
    if total == 0 {
        return SeverityDistribution::default();
    }
    let share = |severity| rounded_percent(u64::from(counts.get(severity)), total);
    SeverityDistribution {
        total,
        critical: share(Severity::Critical),
        high: share(Severity::High),
        medium: share(Severity::Medium),
        low: share(Severity::Low),
    }
}

/// `round(part / whole * 100)` with halves rounded up; `whole` must be non-zero.
pub(crate) fn rounded_percent(part: u64, whole: u64) -> u8 {
    let part = u128::from(part.min(whole));
    let whole = u128::from(whole);
    ((part * 200 + whole) / (whole * 2)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_findings_is_excellent() {
        let assessment = score(Some(&SeverityCounts::default()));
        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.label, RiskLabel::Excellent);
        assert_eq!(assessment.color_tier, ColorTier::Green);
    }

    #[test]
    fn many_criticals_clamp_to_zero() {
        let assessment = score(Some(&SeverityCounts::new(100, 0, 0, 0)));
        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.label, RiskLabel::Critical);
        assert_eq!(assessment.color_tier, ColorTier::Red);
    }

    #[test]
    fn missing_counts_are_unknown_not_critical() {
        let assessment = score(None);
        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.label, RiskLabel::Unknown);
        assert_eq!(assessment.color_tier, ColorTier::Neutral);
        assert!(assessment.is_unknown());
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        let thresholds = TierThresholds::default();
        assert_eq!(thresholds.classify(90).0, RiskLabel::Excellent);
        assert_eq!(thresholds.classify(89).0, RiskLabel::Good);
        assert_eq!(thresholds.classify(75).0, RiskLabel::Good);
        assert_eq!(thresholds.classify(74), (RiskLabel::Fair, ColorTier::Yellow));
        assert_eq!(thresholds.classify(60).0, RiskLabel::Fair);
        assert_eq!(thresholds.classify(59), (RiskLabel::Poor, ColorTier::Orange));
        assert_eq!(thresholds.classify(40).0, RiskLabel::Poor);
        assert_eq!(thresholds.classify(39).0, RiskLabel::Critical);
    }

    #[test]
    fn weighted_penalty_matches_table() {
        // 10*1 + 5*2 + 2*3 + 1*4 = 30
        let assessment = score(Some(&SeverityCounts::new(1, 2, 3, 4)));
        assert_eq!(assessment.score, 70);
        assert_eq!(assessment.label, RiskLabel::Fair);
    }

    #[test]
    fn huge_counts_saturate() {
        let counts = SeverityCounts::new(u32::MAX, u32::MAX, u32::MAX, u32::MAX);
        assert_eq!(score(Some(&counts)).score, 0);
    }

    #[test]
    fn custom_config_changes_classification() {
        let config = ScoringConfig {
            weights: SeverityWeights {
                critical: 50,
                ..SeverityWeights::default()
            },
            thresholds: TierThresholds {
                excellent: 95,
                ..TierThresholds::default()
            },
        };
        config.validate().unwrap();
        let assessment = score_with_config(Some(&SeverityCounts::new(1, 0, 0, 0)), &config);
        assert_eq!(assessment.score, 50);
        assert_eq!(assessment.label, RiskLabel::Poor);
        let clean = score_with_config(Some(&SeverityCounts::new(0, 0, 0, 7)), &config);
        assert_eq!(clean.label, RiskLabel::Good);
    }

    #[test]
    fn validation_rejects_overlapping_thresholds() {
        let thresholds = TierThresholds {
            good: 60,
            ..TierThresholds::default()
        };
        assert_eq!(
            thresholds.validate().unwrap_err(),
            ConfigValidationError::ThresholdsNotDescending {
                upper: "good",
                lower: "fair"
            }
        );
        let too_high = TierThresholds {
            excellent: 101,
            ..TierThresholds::default()
        };
        assert!(matches!(
            too_high.validate(),
            Err(ConfigValidationError::ThresholdOutOfRange {
                tier: "excellent",
                value: 101
            })
        ));
    }

    #[test]
    fn distribution_rounds_each_share() {
        let dist = distribution(Some(&SeverityCounts::new(1, 1, 1, 0)));
        assert_eq!(dist.total, 3);
        assert_eq!((dist.critical, dist.high, dist.medium, dist.low), (33, 33, 33, 0));

        let dist = distribution(Some(&SeverityCounts::new(1, 0, 0, 7)));
        // 12.5 rounds half up
        assert_eq!(dist.critical, 13);
        assert_eq!(dist.low, 88);
    }

    #[test]
    fn empty_distribution_never_divides_by_zero() {
        assert_eq!(
            distribution(Some(&SeverityCounts::default())),
            SeverityDistribution::default()
        );
        assert_eq!(distribution(None).total, 0);
    }

    fn counts_strategy() -> impl Strategy<Value = SeverityCounts> {
        (0u32..500, 0u32..500, 0u32..500, 0u32..500)
            .prop_map(|(c, h, m, l)| SeverityCounts::new(c, h, m, l))
    }

    proptest! {
        #[test]
        fn score_stays_within_bounds(counts in counts_strategy()) {
            let assessment = score(Some(&counts));
            prop_assert!(assessment.score <= 100);
            prop_assert_ne!(assessment.label, RiskLabel::Unknown);
        }

        #[test]
        fn score_is_monotonic_per_tier(
            counts in counts_strategy(),
            tier in 0usize..4,
            extra in 1u32..50,
        ) {
            let severity = Severity::ALL[tier];
            let mut worse = counts;
            worse.set(severity, counts.get(severity) + extra);
            prop_assert!(score(Some(&worse)).score <= score(Some(&counts)).score);
        }

        #[test]
        fn distribution_shares_are_percentages(counts in counts_strategy()) {
            let dist = distribution(Some(&counts));
            for severity in Severity::ALL {
                prop_assert!(dist.percentage(severity) <= 100);
            }
            prop_assert_eq!(dist.total, counts.total());
        }
    }
}
