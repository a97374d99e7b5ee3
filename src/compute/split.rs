//! Bill-splitting computations.
//!
//! All splits use plain floating-point arithmetic; no rounding or remainder
//! distribution is performed.

use std::collections::BTreeMap;

use super::error::ComputeError;

/// Split an amount evenly among a number of people.
///
/// # Errors
///
/// Returns [`ComputeError::InvalidPeopleCount`] when `people` is not positive.
pub fn split_equally(amount: f64, people: i64) -> Result<f64, ComputeError> {
    if people <= 0 {
        return Err(ComputeError::InvalidPeopleCount);
    }
    #[allow(clippy::cast_precision_loss)]
    let share = amount / people as f64;
    Ok(share)
}

/// Split a tip-adjusted amount evenly among a number of people.
///
/// The tip percentage is applied to the amount before the division.
///
/// # Errors
///
/// Returns [`ComputeError::InvalidPeopleCount`] when `people` is not positive.
pub fn split_with_tip(amount: f64, people: i64, tip_percentage: f64) -> Result<f64, ComputeError> {
    if people <= 0 {
        return Err(ComputeError::InvalidPeopleCount);
    }
    let total = amount * (1.0 + tip_percentage / 100.0);
    #[allow(clippy::cast_precision_loss)]
    let share = total / people as f64;
    Ok(share)
}

/// Split an amount proportionally to a list of ratios.
///
/// Each share is `amount * ratio / ratio_sum`, in input order.
///
/// # Errors
///
/// Returns [`ComputeError::EmptyRatios`] for an empty list and
/// [`ComputeError::NonPositiveRatioSum`] when the ratios sum to zero or less.
pub fn split_custom(amount: f64, ratios: &[f64]) -> Result<Vec<f64>, ComputeError> {
    if ratios.is_empty() {
        return Err(ComputeError::EmptyRatios);
    }
    let total_ratio: f64 = ratios.iter().sum();
    if total_ratio <= 0.0 {
        return Err(ComputeError::NonPositiveRatioSum);
    }
    Ok(ratios
        .iter()
        .map(|ratio| amount * (ratio / total_ratio))
        .collect())
}

/// Split the total of a set of priced items evenly among participants.
///
/// Every participant receives the identical share `total / participants.len()`;
/// item ownership carries no per-item attribution.
///
/// # Errors
///
/// Returns [`ComputeError::EmptyParticipants`] or [`ComputeError::EmptyItems`]
/// for empty inputs, and [`ComputeError::NonPositiveTotal`] when the item
/// values sum to zero or less.
pub fn split_by_items(
    items: &BTreeMap<String, f64>,
    participants: &[String],
) -> Result<BTreeMap<String, f64>, ComputeError> {
    if participants.is_empty() {
        return Err(ComputeError::EmptyParticipants);
    }
    if items.is_empty() {
        return Err(ComputeError::EmptyItems);
    }

    let total: f64 = items.values().sum();
    if total <= 0.0 {
        return Err(ComputeError::NonPositiveTotal);
    }

    #[allow(clippy::cast_precision_loss)]
    let per_person = total / participants.len() as f64;

    Ok(participants
        .iter()
        .map(|participant| (participant.clone(), per_person))
        .collect())
}
