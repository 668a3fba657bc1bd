use crate::core::distance::distance_km;
use crate::models::UserProfile;

/// Predict the success probability of a potential match (0-1)
///
/// Mean of four normalized factors: shared-interest count (capped at 5),
/// inverted distance over 100 km, mean reputation, mean activity.
pub fn predict_success_rate(user: &UserProfile, candidate: &UserProfile) -> f64 {
    let common = user.common_interests(candidate).len() as f64;
    let interest_factor = (common / 5.0).min(1.0);

    let distance = distance_km(user.location.as_ref(), candidate.location.as_ref());
    let distance_factor = if distance.is_finite() {
        (1.0 - distance / 100.0).max(0.0)
    } else {
        0.0
    };

    let reputation_factor = (user.reputation_score + candidate.reputation_score) / 2.0;
    let activity_factor = (user.activity_score + candidate.activity_score) / 2.0;

    (interest_factor + distance_factor + reputation_factor + activity_factor) / 4.0
}

/// Flag vocabulary for candidate risk assessment. Conditions are evaluated
/// independently; a candidate can trigger any subset.
pub fn assess_risk_factors(candidate: &UserProfile) -> Vec<String> {
    let mut risks = Vec::new();

    if matches!(candidate.verification_level.as_str(), "none" | "email") {
        risks.push("low_verification".to_string());
    }

    if candidate.activity_score < 0.3 {
        risks.push("low_recent_activity".to_string());
    }

    if candidate.reputation_score < 0.5 {
        risks.push("low_reputation".to_string());
    }

    if candidate.photo_count < 2 || candidate.bio_length < 50 {
        risks.push("incomplete_profile".to_string());
    }

    risks
}
