//! Referral likelihood: how likely a contact is to produce a referral or warm
//! introduction at a target company, as an integer in [0, 100].
//!
//! Four independent contributions are summed, clamped to [0, 1] and scaled:
//! 1. base by connection degree (categorical)
//! 2. flat bonus when the contact works at the target company (exact, case-insensitive)
//! 3. relationship strength, linear up to a cap
//! 4. recency of last contact, tiered by calendar days
//!
//! Every constant lives in `ReferralWeights` so it can be tuned through config.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::contact::{ConnectionDegree, ContactRow};

pub const MS_PER_DAY: f64 = 86_400_000.0;

// ────────────────────────────────────────────────────────────────────────────
// Weights
// ────────────────────────────────────────────────────────────────────────────

/// Bonus applied when the last contact is at most `max_days` ago.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecencyTier {
    pub max_days: f64,
    pub bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferralWeights {
    pub base_first_degree: f64,
    pub base_second_degree: f64,
    pub base_third_degree: f64,
    pub company_match: f64,
    pub max_strength_bonus: f64,
    /// Strength value that earns the full strength bonus.
    pub strength_scale: f64,
    /// Ordered by ascending `max_days`; first matching tier wins.
    pub recency_tiers: Vec<RecencyTier>,
}

impl Default for ReferralWeights {
    fn default() -> Self {
        Self {
            base_first_degree: 0.80,
            base_second_degree: 0.60,
            base_third_degree: 0.30,
            company_match: 0.25,
            max_strength_bonus: 0.30,
            strength_scale: 5.0,
            recency_tiers: vec![
                RecencyTier {
                    max_days: 7.0,
                    bonus: 0.15,
                },
                RecencyTier {
                    max_days: 30.0,
                    bonus: 0.12,
                },
                RecencyTier {
                    max_days: 90.0,
                    bonus: 0.08,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightsError {
    #[error("{0} must be a finite, non-negative number")]
    InvalidWeight(&'static str),

    #[error("strength_scale must be greater than zero")]
    StrengthScale,

    #[error("recency tier thresholds must be positive and strictly increasing")]
    TierOrder,
}

impl ReferralWeights {
    pub fn validate(&self) -> Result<(), WeightsError> {
        let fields = [
            ("base_first_degree", self.base_first_degree),
            ("base_second_degree", self.base_second_degree),
            ("base_third_degree", self.base_third_degree),
            ("company_match", self.company_match),
            ("max_strength_bonus", self.max_strength_bonus),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightsError::InvalidWeight(name));
            }
        }
        if !self.strength_scale.is_finite() || self.strength_scale <= 0.0 {
            return Err(WeightsError::StrengthScale);
        }

        let mut previous = 0.0_f64;
        for tier in &self.recency_tiers {
            if !tier.bonus.is_finite() || tier.bonus < 0.0 {
                return Err(WeightsError::InvalidWeight("recency_tiers.bonus"));
            }
            if !tier.max_days.is_finite() || tier.max_days <= previous {
                return Err(WeightsError::TierOrder);
            }
            previous = tier.max_days;
        }
        Ok(())
    }

    pub fn base_for(&self, degree: ConnectionDegree) -> f64 {
        match degree {
            ConnectionDegree::First => self.base_first_degree,
            ConnectionDegree::Second => self.base_second_degree,
            ConnectionDegree::Third => self.base_third_degree,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// The four contact signals the score depends on.
#[derive(Debug, Clone, Copy)]
pub struct ReferralSignals<'a> {
    pub company: Option<&'a str>,
    pub degree: ConnectionDegree,
    pub relationship_strength: f64,
    /// Epoch milliseconds; `None` means never contacted.
    pub last_contacted_at_ms: Option<i64>,
}

impl<'a> From<&'a ContactRow> for ReferralSignals<'a> {
    fn from(contact: &'a ContactRow) -> Self {
        Self {
            company: contact.company.as_deref(),
            degree: contact.connection_degree,
            relationship_strength: contact.relationship_strength,
            last_contacted_at_ms: contact.last_contacted_at.map(|t| t.timestamp_millis()),
        }
    }
}

/// Per-term contributions, kept for explaining a score to the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferralBreakdown {
    pub base: f64,
    pub company_bonus: f64,
    pub strength_bonus: f64,
    pub recency_bonus: f64,
    /// Sum before clamping.
    pub raw_total: f64,
    pub score: u8,
}

pub fn score_referral(
    signals: &ReferralSignals<'_>,
    target_company: &str,
    now_ms: i64,
    weights: &ReferralWeights,
) -> u8 {
    explain_referral(signals, target_company, now_ms, weights).score
}

pub fn explain_referral(
    signals: &ReferralSignals<'_>,
    target_company: &str,
    now_ms: i64,
    weights: &ReferralWeights,
) -> ReferralBreakdown {
    let base = weights.base_for(signals.degree);

    let company_bonus = if company_matches(signals.company, target_company) {
        weights.company_match
    } else {
        0.0
    };

    let strength_bonus = strength_bonus(signals.relationship_strength, weights);

    let recency_bonus = signals
        .last_contacted_at_ms
        .map(|last| recency_bonus(days_since(last, now_ms), weights))
        .unwrap_or(0.0);

    let raw_total = base + company_bonus + strength_bonus + recency_bonus;
    let score = to_percent(raw_total);

    ReferralBreakdown {
        base,
        company_bonus,
        strength_bonus,
        recency_bonus,
        raw_total,
        score,
    }
}

/// Scales a clamped total to [0, 100], rounding halves up.
///
/// Sums like 0.30 + 0.255 land just below 0.555 in binary floating point, so
/// the percentage is snapped to six decimals before rounding to an integer.
fn to_percent(raw_total: f64) -> u8 {
    let pct = raw_total.clamp(0.0, 1.0) * 100.0;
    ((pct * 1e6).round() / 1e6).round() as u8
}

/// Case-insensitive, whitespace-trimmed equality. A blank contact company never matches.
pub fn company_matches(contact_company: Option<&str>, target_company: &str) -> bool {
    let Some(company) = contact_company.map(str::trim).filter(|c| !c.is_empty()) else {
        return false;
    };
    company.to_lowercase() == target_company.trim().to_lowercase()
}

fn strength_bonus(strength: f64, weights: &ReferralWeights) -> f64 {
    if !strength.is_finite() {
        return 0.0;
    }
    (strength / weights.strength_scale * weights.max_strength_bonus).min(weights.max_strength_bonus)
}

/// Calendar days between `last_ms` and `now_ms`. A timestamp in the future counts as today.
fn days_since(last_ms: i64, now_ms: i64) -> f64 {
    (now_ms.saturating_sub(last_ms) as f64 / MS_PER_DAY).max(0.0)
}

fn recency_bonus(days: f64, weights: &ReferralWeights) -> f64 {
    weights
        .recency_tiers
        .iter()
        .find(|tier| days <= tier.max_days)
        .map(|tier| tier.bonus)
        .unwrap_or(0.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_760_000_000_000;
    const DAY: i64 = 86_400_000;

    fn signals(
        company: Option<&str>,
        degree: ConnectionDegree,
        strength: f64,
        last: Option<i64>,
    ) -> ReferralSignals<'_> {
        ReferralSignals {
            company,
            degree,
            relationship_strength: strength,
            last_contacted_at_ms: last,
        }
    }

    fn score(s: &ReferralSignals<'_>, target: &str) -> u8 {
        score_referral(s, target, NOW, &ReferralWeights::default())
    }

    #[test]
    fn test_default_weights_are_valid() {
        assert_eq!(ReferralWeights::default().validate(), Ok(()));
    }

    #[test]
    fn test_all_signals_maxed_clamps_to_100() {
        // 0.80 + 0.25 + 0.30 + 0.15 = 1.50 → 1.00
        let s = signals(Some("Acme"), ConnectionDegree::First, 5.0, Some(NOW - DAY));
        let breakdown = explain_referral(&s, "Acme", NOW, &ReferralWeights::default());
        assert!((breakdown.raw_total - 1.50).abs() < 1e-9);
        assert_eq!(breakdown.score, 100);
    }

    #[test]
    fn test_floor_is_third_degree_base() {
        let s = signals(None, ConnectionDegree::Third, 0.0, None);
        assert_eq!(score(&s, "Acme"), 30);
    }

    #[test]
    fn test_degree_bases() {
        assert_eq!(score(&signals(None, ConnectionDegree::First, 0.0, None), "x"), 80);
        assert_eq!(score(&signals(None, ConnectionDegree::Second, 0.0, None), "x"), 60);
        assert_eq!(score(&signals(None, ConnectionDegree::Third, 0.0, None), "x"), 30);
    }

    #[test]
    fn test_company_match_is_case_insensitive_and_trimmed() {
        let s = signals(Some("  acme corp "), ConnectionDegree::Third, 0.0, None);
        assert_eq!(score(&s, "ACME Corp"), 55);
    }

    #[test]
    fn test_company_match_is_exact_not_substring() {
        let s = signals(Some("Acme Corp"), ConnectionDegree::Third, 0.0, None);
        assert_eq!(score(&s, "Acme Corporation"), 30);
        let s = signals(Some("Amazon"), ConnectionDegree::Third, 0.0, None);
        assert_eq!(score(&s, "Amazon Web Services"), 30);
    }

    #[test]
    fn test_blank_company_never_matches() {
        assert!(!company_matches(Some("   "), "   "));
        assert!(!company_matches(None, "Acme"));
        assert!(!company_matches(Some(""), ""));
    }

    #[test]
    fn test_strength_is_linear_and_capped() {
        let w = ReferralWeights::default();
        assert!((strength_bonus(5.0, &w) - 0.30).abs() < 1e-12);
        assert!((strength_bonus(2.5, &w) - 0.15).abs() < 1e-12);
        assert_eq!(strength_bonus(0.0, &w), 0.0);
        assert!((strength_bonus(50.0, &w) - 0.30).abs() < 1e-12);
        assert_eq!(strength_bonus(f64::NAN, &w), 0.0);
        assert_eq!(strength_bonus(f64::INFINITY, &w), 0.0);
    }

    #[test]
    fn test_half_points_round_up() {
        // 0.30 + 4.25 / 5 * 0.30 = 0.555
        let s = signals(None, ConnectionDegree::Third, 4.25, None);
        assert_eq!(score(&s, "Acme"), 56);
        assert_eq!(to_percent(0.30 + 0.255), 56);
        assert_eq!(to_percent(0.554), 55);
    }

    #[test]
    fn test_negative_strength_still_bounded() {
        let s = signals(None, ConnectionDegree::Third, -100.0, None);
        assert_eq!(score(&s, "Acme"), 0);
    }

    #[test]
    fn test_recency_tier_boundaries() {
        let w = ReferralWeights::default();
        let bonus_at = |days: i64| {
            explain_referral(
                &signals(None, ConnectionDegree::Third, 0.0, Some(NOW - days * DAY)),
                "x",
                NOW,
                &w,
            )
            .recency_bonus
        };
        assert_eq!(bonus_at(7), 0.15);
        assert_eq!(bonus_at(8), 0.12);
        assert_eq!(bonus_at(30), 0.12);
        assert_eq!(bonus_at(31), 0.08);
        assert_eq!(bonus_at(90), 0.08);
        assert_eq!(bonus_at(91), 0.0);
    }

    #[test]
    fn test_just_past_seven_days_drops_tier() {
        let w = ReferralWeights::default();
        let s = signals(None, ConnectionDegree::Third, 0.0, Some(NOW - 7 * DAY - 1));
        assert_eq!(explain_referral(&s, "x", NOW, &w).recency_bonus, 0.12);
    }

    #[test]
    fn test_never_contacted_gets_no_recency_bonus() {
        let w = ReferralWeights::default();
        let s = signals(None, ConnectionDegree::Second, 0.0, None);
        assert_eq!(explain_referral(&s, "x", NOW, &w).recency_bonus, 0.0);
    }

    #[test]
    fn test_future_contact_counts_as_today() {
        let w = ReferralWeights::default();
        let s = signals(None, ConnectionDegree::Third, 0.0, Some(NOW + 3 * DAY));
        assert_eq!(explain_referral(&s, "x", NOW, &w).recency_bonus, 0.15);
    }

    #[test]
    fn test_output_always_bounded() {
        let degrees = [
            ConnectionDegree::First,
            ConnectionDegree::Second,
            ConnectionDegree::Third,
        ];
        let strengths = [-10.0, 0.0, 1.0, 2.5, 5.0, 9.0];
        let lasts = [None, Some(NOW), Some(NOW - 20 * DAY), Some(NOW - 400 * DAY)];
        for degree in degrees {
            for strength in strengths {
                for last in lasts {
                    for company in [None, Some("Acme"), Some("Other")] {
                        let value = score(&signals(company, degree, strength, last), "Acme");
                        assert!(value <= 100, "score {value} out of range");
                    }
                }
            }
        }
    }

    #[test]
    fn test_monotonic_in_strength() {
        let mut previous = 0;
        for step in 0..=20 {
            let strength = step as f64 * 0.5;
            let value = score(&signals(None, ConnectionDegree::Third, strength, None), "x");
            assert!(value >= previous, "strength {strength} decreased score");
            previous = value;
        }
    }

    #[test]
    fn test_monotonic_in_recency() {
        let mut previous = 0;
        for days_ago in (0..=120).rev() {
            let s = signals(None, ConnectionDegree::Third, 1.0, Some(NOW - days_ago * DAY));
            let value = score(&s, "x");
            assert!(value >= previous, "{days_ago} days ago decreased score");
            previous = value;
        }
    }

    #[test]
    fn test_monotonic_in_degree() {
        let third = score(&signals(None, ConnectionDegree::Third, 3.0, None), "x");
        let second = score(&signals(None, ConnectionDegree::Second, 3.0, None), "x");
        let first = score(&signals(None, ConnectionDegree::First, 3.0, None), "x");
        assert!(third <= second && second <= first);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let s = signals(Some("Globex"), ConnectionDegree::Second, 3.0, Some(NOW - 40 * DAY));
        assert_eq!(score(&s, "Globex"), score(&s, "Globex"));
    }

    #[test]
    fn test_custom_weights_are_respected() {
        let weights = ReferralWeights {
            company_match: 0.0,
            recency_tiers: vec![],
            ..ReferralWeights::default()
        };
        let s = signals(Some("Acme"), ConnectionDegree::Second, 0.0, Some(NOW));
        assert_eq!(score_referral(&s, "Acme", NOW, &weights), 60);
    }

    #[test]
    fn test_validate_rejects_unordered_tiers() {
        let weights = ReferralWeights {
            recency_tiers: vec![
                RecencyTier {
                    max_days: 30.0,
                    bonus: 0.1,
                },
                RecencyTier {
                    max_days: 7.0,
                    bonus: 0.2,
                },
            ],
            ..ReferralWeights::default()
        };
        assert_eq!(weights.validate(), Err(WeightsError::TierOrder));
    }

    #[test]
    fn test_validate_rejects_zero_scale() {
        let weights = ReferralWeights {
            strength_scale: 0.0,
            ..ReferralWeights::default()
        };
        assert_eq!(weights.validate(), Err(WeightsError::StrengthScale));
    }
}
