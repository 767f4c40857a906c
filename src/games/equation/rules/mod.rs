//! Game rules for the equation puzzle.
//!
//! Pure functions only: evaluation, guess validation and feedback scoring.
//! Generation and session state build on these.

pub mod evaluate;
pub mod feedback;
pub mod validate;

pub use evaluate::{EvalError, evaluate, round_half_up, round_to, try_evaluate};
pub use feedback::get_feedback;
pub use validate::{ValidationError, check_equation, is_valid_equation};
