//! The daily equation puzzle: engine, session state and result history.

mod generator;
mod history;
mod rules;
mod session;
mod types;

pub use generator::{
    GenerationError, MAX_GENERATION_ATTEMPTS, generate_expression, generate_expression_with,
};
pub use history::{GameResultRecord, RecordChange, ResultHistory};
pub use rules::{
    EvalError, ValidationError, check_equation, evaluate, get_feedback, is_valid_equation,
    round_to, try_evaluate,
};
pub use session::{ANONYMOUS_USER_ID, GameState, GuessError, GuessOutcome, Identity};
pub use types::{
    CellFeedback, EQUATION_LENGTH, FeedbackStatus, GameStatus, GeneratedExpression, MAX_ATTEMPTS,
    OPERATORS, Puzzle, is_equation_char, is_operator,
};
