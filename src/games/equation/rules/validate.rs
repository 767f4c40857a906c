//! Structural and semantic rules for a legal guess.

use super::super::types::{EQUATION_LENGTH, is_equation_char, is_operator};
use super::evaluate::evaluate;
use tracing::{debug, instrument};

/// The first rule a guess failed.
///
/// Variants are listed in the order the rules are applied.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum ValidationError {
    /// Not exactly six characters.
    #[display("Equation must be exactly {} characters long (got {})", EQUATION_LENGTH, _0)]
    WrongLength(usize),

    /// A character outside `0-9 + - * /`.
    #[display("Equation may only use digits and + - * / (found {:?})", _0)]
    InvalidCharacter(char),

    /// Starts or ends with an operator.
    #[display("Equation cannot start or end with an operator")]
    BoundaryOperator,

    /// Contains the literal `/0`.
    #[display("Equation cannot divide by zero")]
    DivisionByZero,

    /// Two operators side by side.
    #[display("Equation cannot contain consecutive operators")]
    ConsecutiveOperators,

    /// Does not evaluate to the target.
    #[display("Equation must equal {}", target)]
    TargetMismatch {
        /// The required value.
        target: f64,
        /// What the guess evaluated to, if anything.
        actual: Option<f64>,
    },
}

impl std::error::Error for ValidationError {}

/// Checks a guess against every rule, stopping at the first failure.
///
/// When `target` is `None` only the structural rules apply.
///
/// # Errors
///
/// Returns the [`ValidationError`] for the first rule that fails.
#[instrument]
pub fn check_equation(guess: &str, target: Option<f64>) -> Result<(), ValidationError> {
    let chars: Vec<char> = guess.chars().collect();

    if chars.len() != EQUATION_LENGTH {
        return Err(ValidationError::WrongLength(chars.len()));
    }

    if let Some(&bad) = chars.iter().find(|c| !is_equation_char(**c)) {
        return Err(ValidationError::InvalidCharacter(bad));
    }

    // Length was checked above, so first/last exist.
    if chars.first().is_some_and(|c| is_operator(*c))
        || chars.last().is_some_and(|c| is_operator(*c))
    {
        return Err(ValidationError::BoundaryOperator);
    }

    if guess.contains("/0") {
        return Err(ValidationError::DivisionByZero);
    }

    if chars.windows(2).any(|w| is_operator(w[0]) && is_operator(w[1])) {
        return Err(ValidationError::ConsecutiveOperators);
    }

    if let Some(target) = target {
        let actual = evaluate(guess);
        if actual != Some(target) {
            debug!(?actual, target, "Guess does not reach target");
            return Err(ValidationError::TargetMismatch { target, actual });
        }
    }

    Ok(())
}

/// Returns whether a guess passes every rule.
#[instrument]
pub fn is_valid_equation(guess: &str, target: Option<f64>) -> bool {
    check_equation(guess, target).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        assert_eq!(
            check_equation("12+3", None),
            Err(ValidationError::WrongLength(4))
        );
        assert_eq!(
            check_equation("1234567", None),
            Err(ValidationError::WrongLength(7))
        );
        assert!(!is_valid_equation("", None));
    }

    #[test]
    fn test_characters() {
        assert_eq!(
            check_equation("12+3a6", None),
            Err(ValidationError::InvalidCharacter('a'))
        );
        assert_eq!(
            check_equation("12 3+4", None),
            Err(ValidationError::InvalidCharacter(' '))
        );
    }

    #[test]
    fn test_boundary_operators() {
        assert_eq!(
            check_equation("+12345", None),
            Err(ValidationError::BoundaryOperator)
        );
        assert_eq!(
            check_equation("12345+", None),
            Err(ValidationError::BoundaryOperator)
        );
        assert_eq!(
            check_equation("-12345", None),
            Err(ValidationError::BoundaryOperator)
        );
    }

    #[test]
    fn test_division_by_zero_literal() {
        assert_eq!(
            check_equation("12/034", None),
            Err(ValidationError::DivisionByZero)
        );
        assert_eq!(
            check_equation("12/0+3", None),
            Err(ValidationError::DivisionByZero)
        );
        // Only the literal pattern is caught.
        assert!(is_valid_equation("10/5+0", None));
        assert!(is_valid_equation("0/5+12", None));
    }

    #[test]
    fn test_consecutive_operators() {
        assert_eq!(
            check_equation("12++34", None),
            Err(ValidationError::ConsecutiveOperators)
        );
        assert_eq!(
            check_equation("12*-34", None),
            Err(ValidationError::ConsecutiveOperators)
        );
    }

    #[test]
    fn test_divide_by_zero_checked_before_adjacency() {
        assert_eq!(
            check_equation("1/0*-2", None),
            Err(ValidationError::DivisionByZero)
        );
    }

    #[test]
    fn test_structure_only() {
        assert!(is_valid_equation("12+3*2", None));
        assert!(is_valid_equation("123456", None));
    }

    #[test]
    fn test_target() {
        assert!(is_valid_equation("12/4+2", Some(5.0)));
        assert_eq!(
            check_equation("12/4+2", Some(6.0)),
            Err(ValidationError::TargetMismatch {
                target: 6.0,
                actual: Some(5.0)
            })
        );
    }

    #[test]
    fn test_target_zero_is_checked() {
        assert!(is_valid_equation("5-5+00", None));
        assert!(is_valid_equation("12-6*2", Some(0.0)));
        assert!(!is_valid_equation("12-6*1", Some(0.0)));
    }

    #[test]
    fn test_target_fractional() {
        assert!(is_valid_equation("1/3+10", Some(10.33)));
        assert!(!is_valid_equation("1/3+10", Some(10.333)));
    }

    #[test]
    fn test_unevaluable_guess_fails_target() {
        // Structurally fine, but `05` is not a valid number.
        assert!(is_valid_equation("1+2*05", None));
        assert!(!is_valid_equation("1+2*05", Some(11.0)));
    }
}
