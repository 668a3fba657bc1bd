use crate::core::distance::{self, distance_km};
use crate::models::{CandidateFilters, UserProfile};

/// Check if a candidate's gender satisfies the requester's stated
/// preference. An empty preference set places no constraint.
#[inline]
pub fn matches_gender_preference(requester: &UserProfile, candidate: &UserProfile) -> bool {
    requester.preferred_genders.is_empty()
        || requester.preferred_genders.contains(&candidate.gender)
}

/// Check explicit candidate filters (age bounds, verification level).
#[inline]
pub fn matches_filters(candidate: &UserProfile, filters: &CandidateFilters) -> bool {
    if let Some(min_age) = filters.min_age {
        if candidate.age < min_age {
            return false;
        }
    }

    if let Some(max_age) = filters.max_age {
        if candidate.age > max_age {
            return false;
        }
    }

    if let Some(level) = &filters.verification_level {
        if candidate.verification_level != *level {
            return false;
        }
    }

    true
}

/// Check the distance cutoff with a cheap bounding-box pre-check before the
/// exact haversine computation. Malformed locations are infinitely far and
/// never pass.
#[inline]
pub fn within_distance(requester: &UserProfile, candidate: &UserProfile, max_km: f64) -> bool {
    let (center, point) = match (&requester.location, &candidate.location) {
        (Some(a), Some(b)) if a.is_valid() && b.is_valid() => (a, b),
        _ => return false,
    };

    let bbox = distance::calculate_bounding_box(center.lat, center.lng, max_km);
    if !distance::is_within_bounding_box(point.lat, point.lng, &bbox) {
        return false;
    }

    distance_km(requester.location.as_ref(), candidate.location.as_ref()) <= max_km
}

/// Full candidate-pool admission policy: active, gender pairing, explicit
/// filters, distance cutoff, never the requester.
pub fn eligible_candidate(
    requester: &UserProfile,
    candidate: &UserProfile,
    filters: &CandidateFilters,
    max_km: f64,
) -> bool {
    candidate.user_id != requester.user_id
        && candidate.is_active
        && matches_gender_preference(requester, candidate)
        && matches_filters(candidate, filters)
        && within_distance(requester, candidate, max_km)
}
