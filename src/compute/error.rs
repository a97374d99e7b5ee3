//! Validation errors for the computations.
//!
//! Messages are client-visible verbatim, so they stay stable.

/// A precondition violation in a computation's inputs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    #[error("Cannot divide by zero")]
    DivideByZero,

    #[error("Number of people must be greater than zero")]
    InvalidPeopleCount,

    #[error("At least one ratio is required")]
    EmptyRatios,

    #[error("Ratio sum must be greater than zero")]
    NonPositiveRatioSum,

    #[error("At least one item is required")]
    EmptyItems,

    #[error("At least one participant is required")]
    EmptyParticipants,

    #[error("Total amount must be greater than zero")]
    NonPositiveTotal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_verbatim() {
        assert_eq!(ComputeError::DivideByZero.to_string(), "Cannot divide by zero");
        assert_eq!(
            ComputeError::InvalidPeopleCount.to_string(),
            "Number of people must be greater than zero"
        );
        assert_eq!(
            ComputeError::EmptyRatios.to_string(),
            "At least one ratio is required"
        );
        assert_eq!(
            ComputeError::NonPositiveRatioSum.to_string(),
            "Ratio sum must be greater than zero"
        );
        assert_eq!(
            ComputeError::EmptyItems.to_string(),
            "At least one item is required"
        );
        assert_eq!(
            ComputeError::EmptyParticipants.to_string(),
            "At least one participant is required"
        );
        assert_eq!(
            ComputeError::NonPositiveTotal.to_string(),
            "Total amount must be greater than zero"
        );
    }
}
