//! Composite opportunity score.

use chrono::NaiveDateTime;

use crate::calendar::SessionCalendar;
use crate::config::ScoreWeights;
use crate::models::GexProfile;

/// Scores a symbol's analysis on a 0 to 100 scale.
///
/// The score is a weighted sum of market maker vulnerability, dealer pain and
/// best-signal confidence, plus bonuses for proximity to the gamma flip and
/// for event windows. Every term is non-decreasing in its input, so the
/// composite is monotonic before clamping.
#[derive(Debug, Clone, Default)]
pub struct OpportunityScorer {
    weights: ScoreWeights,
    calendar: SessionCalendar,
}

impl OpportunityScorer {
    /// Create a scorer.
    #[must_use]
    pub const fn new(weights: ScoreWeights, calendar: SessionCalendar) -> Self {
        Self { weights, calendar }
    }

    /// Score weights in use.
    #[must_use]
    pub const fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Score one symbol. A missing profile scores 0.
    #[must_use]
    pub fn score(
        &self,
        profile: Option<&GexProfile>,
        best_confidence: f64,
        mm_vulnerability: f64,
        now: NaiveDateTime,
    ) -> f64 {
        let Some(profile) = profile else {
            return 0.0;
        };
        let w = &self.weights;

        let mut score = w.vulnerability * mm_vulnerability.max(0.0)
            + w.dealer_pain * profile.dealer_pain().max(0.0)
            + w.confidence * best_confidence.max(0.0)
            + self.flip_bonus(profile.distance_to_flip());

        let today = now.date();
        if self.calendar.is_opex_week(today) {
            score += w.opex_bonus;
        }
        if self.calendar.is_quad_witching_week(today) {
            score += w.quad_witching_bonus;
        }
        if self.calendar.is_friday_afternoon(now) {
            score += w.friday_afternoon_bonus;
        }

        if score.is_finite() {
            score.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    fn flip_bonus(&self, distance_to_flip: f64) -> f64 {
        let distance = distance_to_flip.abs();
        self.weights
            .flip_bonuses
            .iter()
            .filter(|tier| distance < tier.within)
            .map(|tier| tier.bonus)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StrikeAggregate;
    use crate::signals::fixtures::profile;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, 0, 0))
            .unwrap()
    }

    // Wednesday 2026-04-08: not OPEX week, not Friday
    fn quiet_day() -> NaiveDateTime {
        at(2026, 4, 8, 11)
    }

    // Flip near 98.3 with spot 105, well outside every flip tier
    fn far_from_flip(pain: f64) -> GexProfile {
        profile(
            "IWM",
            105.0,
            vec![
                StrikeAggregate::new(95.0, 0.0, -1e8),
                StrikeAggregate::new(105.0, 3e8, 0.0),
            ],
            pain,
        )
    }

    #[test]
    fn test_missing_profile_scores_zero() {
        let scorer = OpportunityScorer::default();
        assert_eq!(scorer.score(None, 90.0, 90.0, quiet_day()), 0.0);
    }

    #[test]
    fn test_weighted_components() {
        let scorer = OpportunityScorer::default();
        let p = far_from_flip(50.0);
        // 0.4*80 + 0.2*50 + 0.2*70
        let score = scorer.score(Some(&p), 70.0, 80.0, quiet_day());
        assert!((score - 56.0).abs() < 1e-9);
    }

    #[test]
    fn test_event_bonuses_stack() {
        let scorer = OpportunityScorer::default();
        let p = far_from_flip(0.0);
        // OPEX Friday in a quarterly month, afternoon
        let score = scorer.score(Some(&p), 0.0, 0.0, at(2026, 3, 20, 15));
        assert!((score - 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_flip_bonus_uses_closest_tier() {
        let scorer = OpportunityScorer::default();
        assert_eq!(scorer.flip_bonus(0.2), 10.0);
        assert_eq!(scorer.flip_bonus(-0.7), 7.0);
        assert_eq!(scorer.flip_bonus(1.5), 3.0);
        assert_eq!(scorer.flip_bonus(2.0), 0.0);
    }

    #[test]
    fn test_clamped_to_hundred() {
        let scorer = OpportunityScorer::default();
        let p = far_from_flip(100.0);
        let score = scorer.score(Some(&p), 100.0, 100.0, at(2026, 3, 20, 15));
        assert_eq!(score, 100.0);
    }

    proptest! {
        #[test]
        fn prop_score_monotonic_and_bounded(
            pain in 0.0f64..100.0,
            confidence in 0.0f64..100.0,
            vulnerability in 0.0f64..100.0,
            bump in 0.0f64..50.0,
        ) {
            let scorer = OpportunityScorer::default();
            let now = quiet_day();
            let base_profile = far_from_flip(pain);
            let base = scorer.score(Some(&base_profile), confidence, vulnerability, now);
            prop_assert!((0.0..=100.0).contains(&base));

            let more_conf = scorer.score(Some(&base_profile), confidence + bump, vulnerability, now);
            let more_vuln = scorer.score(Some(&base_profile), confidence, vulnerability + bump, now);
            let more_pain_profile = far_from_flip((pain + bump).min(100.0));
            let more_pain = scorer.score(Some(&more_pain_profile), confidence, vulnerability, now);

            prop_assert!(more_conf >= base);
            prop_assert!(more_vuln >= base);
            prop_assert!(more_pain >= base);
        }
    }
}
