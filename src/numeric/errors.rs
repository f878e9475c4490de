// ============================================================================
// Numeric Errors
// Error types for arbitrary-precision arithmetic
// ============================================================================

use std::fmt;

/// Errors that can occur while constructing or operating on real values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericError {
    /// Input is infinite, or a result exceeds the exponent range
    Overflow,
    /// Result is too small for the exponent range
    Underflow,
    /// Attempted division by zero
    DivisionByZero,
    /// Argument outside the function's domain (sqrt(-1), ln(0), asin(2), ...)
    Domain,
    /// Input string or value is invalid
    InvalidInput,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::Overflow => {
                write!(f, "arithmetic overflow: value is infinite or out of range")
            },
            NumericError::Underflow => {
                write!(f, "arithmetic underflow: result below minimum magnitude")
            },
            NumericError::DivisionByZero => write!(f, "division by zero"),
            NumericError::Domain => write!(f, "argument outside the domain of the function"),
            NumericError::InvalidInput => write!(f, "invalid input: could not parse value"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Result type alias for numeric operations
pub type NumericResult<T> = Result<T, NumericError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            NumericError::Overflow.to_string(),
            "arithmetic overflow: value is infinite or out of range"
        );
        assert_eq!(NumericError::DivisionByZero.to_string(), "division by zero");
        assert!(NumericError::Domain.to_string().contains("domain"));
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(NumericError::Overflow, NumericError::Overflow);
        assert_ne!(NumericError::Overflow, NumericError::Underflow);
    }

    #[test]
    fn test_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(NumericError::InvalidInput);
        assert!(err.to_string().starts_with("invalid input"));
    }
}
