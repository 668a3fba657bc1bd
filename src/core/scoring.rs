use std::collections::HashSet;

use crate::core::distance::distance_km;
use crate::models::{InteractionRecord, ScoringWeights, UserProfile};

/// Ordered education scale used for proximity scoring.
const EDUCATION_LEVELS: [&str; 5] = ["none", "high_school", "bachelor", "master", "phd"];

/// Ordinal rank of a verification level; unrecognized levels rank lowest.
pub fn verification_rank(level: &str) -> u8 {
    match level {
        "none" => 0,
        "email" => 1,
        "phone" => 2,
        "identity" => 3,
        "premium" => 4,
        _ => 0,
    }
}

/// Calculate a compatibility score (0-1) for a candidate against a user
///
/// Scoring formula:
/// score = (
///     collaborative_score * 0.40 +   # Past interaction success with similar users
///     content_score * 0.30 +         # Interests, goals, age, education, lifestyle
///     geographic_score * 0.20 +      # Closer = higher score
///     behavioral_score * 0.10        # Activity, reputation, verification closeness
/// )
///
/// Also produces human-readable reasons: a common-interests entry (up to 3
/// named) followed by a relationship-goal entry, in generation order.
pub fn compatibility_score(
    user: &UserProfile,
    candidate: &UserProfile,
    interactions: &[InteractionRecord],
    similar_users: &HashSet<String>,
    weights: &ScoringWeights,
) -> (f64, Vec<String>) {
    let mut reasons = Vec::new();

    let collaborative = collaborative_score(interactions, similar_users);
    let content = content_score(user, candidate, &mut reasons);
    let geographic = geographic_score(user, candidate);
    let behavioral = behavioral_score(user, candidate);

    let final_score = collaborative * weights.collaborative
        + content * weights.content
        + geographic * weights.geographic
        + behavioral * weights.behavioral;

    (final_score.clamp(0.0, 1.0), reasons)
}

/// Collaborative filtering signal (0-1)
///
/// Success ratio of the user's past interactions restricted to users similar
/// to the candidate. Falls back to a 0.5 neutral score when there is no
/// history or no similar users, so new users are not penalized.
pub fn collaborative_score(
    interactions: &[InteractionRecord],
    similar_users: &HashSet<String>,
) -> f64 {
    if interactions.is_empty() || similar_users.is_empty() {
        return 0.5;
    }

    let mut successful = 0usize;
    let mut total = 0usize;
    for interaction in interactions {
        if similar_users.contains(&interaction.target_user_id) {
            total += 1;
            if interaction.success_outcome {
                successful += 1;
            }
        }
    }

    if total > 0 {
        successful as f64 / total as f64
    } else {
        0.5
    }
}

/// Content-based score (0-1)
///
/// Weighted sum of five sub-factors: shared interests (0.3), relationship
/// goal (0.25), age gap (0.2), education proximity (0.15), lifestyle (0.1).
pub fn content_score(user: &UserProfile, candidate: &UserProfile, reasons: &mut Vec<String>) -> f64 {
    let mut score = 0.0;

    // Shared interests ratio
    let common = user.common_interests(candidate);
    let interest_score =
        common.len() as f64 / user.interests.len().max(candidate.interests.len()).max(1) as f64;
    score += interest_score * 0.3;

    if !common.is_empty() {
        let named: Vec<&str> = common.iter().take(3).map(String::as_str).collect();
        reasons.push(format!("Common interests: {}", named.join(", ")));
    }

    // Relationship goal match
    let goal_score = if user.relationship_goal == candidate.relationship_goal {
        1.0
    } else {
        0.3
    };
    score += goal_score * 0.25;

    if goal_score > 0.5 {
        reasons.push("Matching relationship goals".to_string());
    }

    // Age gap buckets
    let age_gap = user.age.abs_diff(candidate.age);
    let age_score = if age_gap <= 5 {
        1.0
    } else if age_gap <= 10 {
        0.7
    } else {
        0.3
    };
    score += age_score * 0.2;

    // Education proximity on the ordered scale; 0.5 neutral on unknown levels
    let education_score = match (
        education_rank(&user.education_level),
        education_rank(&candidate.education_level),
    ) {
        (Some(a), Some(b)) => (1.0 - 0.2 * a.abs_diff(b) as f64).max(0.0),
        _ => 0.5,
    };
    score += education_score * 0.15;

    // Lifestyle: "no_preference" on either side counts as compatible
    let compatible = user
        .lifestyle()
        .iter()
        .zip(candidate.lifestyle().iter())
        .filter(|(a, b)| **a == "no_preference" || **b == "no_preference" || a == b)
        .count();
    let lifestyle_score = compatible as f64 / 5.0;
    score += lifestyle_score * 0.1;

    score
}

fn education_rank(level: &str) -> Option<usize> {
    let lower = level.to_lowercase();
    EDUCATION_LEVELS.iter().position(|l| *l == lower)
}

/// Geographic score (0-1), a step function of distance
#[inline]
pub fn geographic_score(user: &UserProfile, candidate: &UserProfile) -> f64 {
    let distance = distance_km(user.location.as_ref(), candidate.location.as_ref());

    if distance <= 5.0 {
        1.0
    } else if distance <= 25.0 {
        0.8
    } else if distance <= 50.0 {
        0.6
    } else if distance <= 100.0 {
        0.3
    } else {
        0.1
    }
}

/// Behavioral score (0-1)
///
/// Closeness of activity level (0.4), reputation (0.3) and verification
/// level (0.3).
pub fn behavioral_score(user: &UserProfile, candidate: &UserProfile) -> f64 {
    let mut score = 0.0;

    let activity_diff = (user.activity_score - candidate.activity_score).abs();
    score += (1.0 - activity_diff).max(0.0) * 0.4;

    let reputation_diff = (user.reputation_score - candidate.reputation_score).abs();
    score += (1.0 - reputation_diff).max(0.0) * 0.3;

    let ver1 = verification_rank(&user.verification_level);
    let ver2 = verification_rank(&candidate.verification_level);
    let verification_score = if ver1 == ver2 {
        1.0
    } else if ver1.abs_diff(ver2) <= 1 {
        0.7
    } else {
        0.4
    };
    score += verification_score * 0.3;

    score
}
