//! Random generation of the daily secret equation.

use super::rules::{evaluate, is_valid_equation, round_half_up};
use super::types::{EQUATION_LENGTH, GeneratedExpression, OPERATORS};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, instrument, warn};

/// Number of candidates tried before giving up.
pub const MAX_GENERATION_ATTEMPTS: u32 = 1000;

/// Generation ran out of attempts without finding a valid equation.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Failed to generate a valid expression after {} attempts", attempts)]
pub struct GenerationError {
    /// Candidates tried.
    pub attempts: u32,
}

/// Builds one `D O D O D D` candidate.
fn candidate<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..EQUATION_LENGTH)
        .map(|i| {
            if i % 2 == 0 || i == EQUATION_LENGTH - 1 {
                char::from(b'0' + rng.gen_range(0..10u8))
            } else {
                *OPERATORS.choose(rng).unwrap_or(&'+')
            }
        })
        .collect()
}

/// Generates a secret equation using the given random source.
///
/// The published answer is the evaluated value re-rounded to three
/// decimal places.
///
/// # Errors
///
/// Returns [`GenerationError`] after [`MAX_GENERATION_ATTEMPTS`] rejected
/// candidates.
#[instrument(skip(rng))]
pub fn generate_expression_with<R: Rng + ?Sized>(
    rng: &mut R,
) -> Result<GeneratedExpression, GenerationError> {
    for attempt in 1..=MAX_GENERATION_ATTEMPTS {
        let expression = candidate(rng);

        if !is_valid_equation(&expression, None) {
            continue;
        }

        if let Some(value) = evaluate(&expression) {
            let answer = round_half_up((value + f64::EPSILON) * 1000.0) / 1000.0;
            info!(%expression, answer, attempt, "Generated expression");
            return Ok(GeneratedExpression::new(expression, answer));
        }

        debug!(%expression, attempt, "Candidate did not evaluate");
    }

    warn!(attempts = MAX_GENERATION_ATTEMPTS, "Expression generation exhausted");
    Err(GenerationError {
        attempts: MAX_GENERATION_ATTEMPTS,
    })
}

/// Generates a secret equation from the thread-local random source.
///
/// # Errors
///
/// Returns [`GenerationError`] if no valid candidate was found.
#[instrument]
pub fn generate_expression() -> Result<GeneratedExpression, GenerationError> {
    generate_expression_with(&mut rand::thread_rng())
}
