// src/matching/weights.rs
//! Scoring policy: how the five dimensions combine and where the status
//! thresholds sit.

use crate::models::MatchStatus;

/// Overall score at or above this is `Matched`.
pub const MATCHED_THRESHOLD: f64 = 80.0;
/// Overall score at or above this (and below `MATCHED_THRESHOLD`) is `PartialMatch`.
pub const PARTIAL_MATCH_THRESHOLD: f64 = 50.0;

/// Required skills and experience/education dominate; preferred skills and
/// certifications nudge.
pub const MATCH_WEIGHTS: Weights = Weights {
    required_skills: 0.35,
    preferred_skills: 0.10,
    experience: 0.20,
    education: 0.20,
    certification: 0.15,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub required_skills: f64,
    pub preferred_skills: f64,
    pub experience: f64,
    pub education: f64,
    pub certification: f64,
}

impl Default for Weights {
    fn default() -> Self {
        MATCH_WEIGHTS
    }
}

pub fn classify(overall: f64) -> MatchStatus {
    if overall >= MATCHED_THRESHOLD {
        MatchStatus::Matched
    } else if overall >= PARTIAL_MATCH_THRESHOLD {
        MatchStatus::PartialMatch
    } else {
        MatchStatus::NoMatch
    }
}

/// Next threshold above `overall`, if any, with its status
pub fn next_threshold(overall: f64) -> Option<(f64, MatchStatus)> {
    if overall < PARTIAL_MATCH_THRESHOLD {
        Some((PARTIAL_MATCH_THRESHOLD, MatchStatus::PartialMatch))
    } else if overall < MATCHED_THRESHOLD {
        Some((MATCHED_THRESHOLD, MatchStatus::Matched))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        let w = MATCH_WEIGHTS;
        let sum = w.required_skills + w.preferred_skills + w.experience + w.education + w.certification;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn required_dimensions_outweigh_optional_ones() {
        assert!(MATCH_WEIGHTS.required_skills > MATCH_WEIGHTS.preferred_skills);
        assert!(MATCH_WEIGHTS.experience > MATCH_WEIGHTS.certification);
        assert!(MATCH_WEIGHTS.education > MATCH_WEIGHTS.preferred_skills);
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(classify(100.0), MatchStatus::Matched);
        assert_eq!(classify(80.0), MatchStatus::Matched);
        assert_eq!(classify(79.99), MatchStatus::PartialMatch);
        assert_eq!(classify(50.0), MatchStatus::PartialMatch);
        assert_eq!(classify(49.99), MatchStatus::NoMatch);
        assert_eq!(classify(0.0), MatchStatus::NoMatch);
    }

    #[test]
    fn next_threshold_points_upward() {
        assert_eq!(next_threshold(10.0), Some((50.0, MatchStatus::PartialMatch)));
        assert_eq!(next_threshold(65.0), Some((80.0, MatchStatus::Matched)));
        assert_eq!(next_threshold(80.0), None);
    }
}
