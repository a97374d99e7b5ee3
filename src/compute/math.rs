//! Elementary arithmetic operations.

use super::error::ComputeError;

/// Sum of two numbers.
#[must_use]
pub fn add(a: f64, b: f64) -> f64 {
    a + b
}

/// Difference of two numbers.
#[must_use]
pub fn subtract(a: f64, b: f64) -> f64 {
    a - b
}

/// Product of two numbers.
#[must_use]
pub fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

/// Quotient of two numbers.
///
/// # Errors
///
/// Returns [`ComputeError::DivideByZero`] when the divisor is zero.
pub fn divide(a: f64, b: f64) -> Result<f64, ComputeError> {
    if b == 0.0 {
        return Err(ComputeError::DivideByZero);
    }
    Ok(a / b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_add() {
        assert!((add(2.0, 3.0) - 5.0).abs() < TOLERANCE);
        assert!((add(-2.5, 2.5)).abs() < TOLERANCE);
    }

    #[test]
    fn test_subtract() {
        assert!((subtract(5.0, 3.0) - 2.0).abs() < TOLERANCE);
        assert!((subtract(3.0, 5.0) + 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_multiply() {
        assert!((multiply(4.0, 2.5) - 10.0).abs() < TOLERANCE);
        assert!((multiply(4.0, 0.0)).abs() < TOLERANCE);
    }

    #[test]
    fn test_divide() {
        assert!((divide(10.0, 4.0).unwrap() - 2.5).abs() < TOLERANCE);
        assert!((divide(-9.0, 3.0).unwrap() + 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(divide(1.0, 0.0), Err(ComputeError::DivideByZero));
        // Negative zero is still zero.
        assert_eq!(divide(1.0, -0.0), Err(ComputeError::DivideByZero));
    }
}
