//! Arithmetic evaluation over the restricted equation alphabet.
//!
//! Grammar (whitespace separates tokens and is otherwise ignored):
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := ('+' | '-') unary | number
//! number := '0' | [1-9][0-9]*
//! ```
//!
//! Division by zero follows IEEE-754 and yields an infinity, which is a
//! valid result. Only `NaN` is reported as invalid.
//!
//! Deliberately rejected, although a general-purpose arithmetic parser
//! might accept them:
//!
//! - multi-digit numbers with a leading zero (`05`, `00`);
//! - `++` and `--` written without whitespace between the signs;
//! - `**` (exponentiation) and `//`.
//!
//! None of these can appear in a valid guess, since the validator rejects
//! adjacent operators.

use tracing::{debug, instrument};

/// Why an expression could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum EvalError {
    /// Nothing but whitespace.
    #[display("Expression is empty")]
    Empty,

    /// A character outside digits, operators and whitespace.
    #[display("Invalid character {:?}", _0)]
    InvalidCharacter(char),

    /// A multi-digit number starting with `0`.
    #[display("Number {} has a leading zero", _0)]
    LeadingZero(String),

    /// `++` or `--` written without separating whitespace.
    #[display("Doubled operator {:?}", _0)]
    DoubledOperator(String),

    /// A token appeared where it cannot.
    #[display("Unexpected {} at token {}", _0, _1)]
    UnexpectedToken(String, usize),

    /// The expression stopped where an operand was required.
    #[display("Expression ends before an operand")]
    UnexpectedEnd,

    /// Evaluation produced `NaN`, e.g. `0/0`.
    #[display("Result is not a number")]
    NotANumber,
}

impl std::error::Error for EvalError {}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
}

impl Token {
    fn describe(self) -> String {
        match self {
            Token::Num(n) => format!("number {}", n),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
        }
    }
}

fn tokenize(expression: &str) -> Result<Vec<Token>, EvalError> {
    let chars: Vec<char> = expression.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let literal: String = chars[start..i].iter().collect();
            if literal.len() > 1 && literal.starts_with('0') {
                return Err(EvalError::LeadingZero(literal));
            }
            let value = literal
                .parse::<f64>()
                .map_err(|_| EvalError::UnexpectedToken(literal.clone(), tokens.len()))?;
            tokens.push(Token::Num(value));
            continue;
        }

        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            other => return Err(EvalError::InvalidCharacter(other)),
        };

        // `++` and `--` are a single invalid token, never two signs.
        if matches!(c, '+' | '-') && chars.get(i + 1) == Some(&c) {
            return Err(EvalError::DoubledOperator(format!("{c}{c}")));
        }

        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.bump();
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.bump();
            let rhs = self.unary()?;
            value = if op == Token::Star { value * rhs } else { value / rhs };
        }
        Ok(value)
    }

    /// Sign prefixes are folded in a loop, so chain length never grows the stack.
    fn unary(&mut self) -> Result<f64, EvalError> {
        let mut negative = false;
        while let Some(sign @ (Token::Plus | Token::Minus)) = self.peek() {
            self.bump();
            if sign == Token::Minus {
                negative = !negative;
            }
        }

        let at = self.pos;
        let value = match self.bump() {
            Some(Token::Num(n)) => n,
            Some(other) => return Err(EvalError::UnexpectedToken(other.describe(), at)),
            None => return Err(EvalError::UnexpectedEnd),
        };
        Ok(if negative { -value } else { value })
    }
}

/// Rounds halves toward positive infinity: `2.5` to `3`, `-2.5` to `-2`.
///
/// Infinities pass through unchanged.
pub fn round_half_up(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let floor = value.floor();
    if value - floor >= 0.5 { floor + 1.0 } else { floor }
}

/// Rounds to `decimals` places by scaling, rounding and scaling back.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    round_half_up(value * factor) / factor
}

/// Evaluates an expression, reporting why it is invalid.
///
/// The result is rounded to two decimal places.
///
/// # Errors
///
/// Returns [`EvalError`] for characters outside the alphabet, malformed
/// operator sequences, or a `NaN` result.
#[instrument]
pub fn try_evaluate(expression: &str) -> Result<f64, EvalError> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(EvalError::Empty);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if let Some(extra) = parser.peek() {
        return Err(EvalError::UnexpectedToken(extra.describe(), parser.pos));
    }

    if value.is_nan() {
        return Err(EvalError::NotANumber);
    }

    Ok(round_to(value, 2))
}

/// Evaluates an expression, returning `None` when it is invalid.
///
/// Never panics. `evaluate("3/0")` is `Some(f64::INFINITY)`.
#[instrument]
pub fn evaluate(expression: &str) -> Option<f64> {
    match try_evaluate(expression) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "Expression rejected by evaluator");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate("3+2*55"), Some(113.0));
        assert_eq!(evaluate("12/4+12"), Some(15.0));
        assert_eq!(evaluate("2+3*4-6/2"), Some(11.0));
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(evaluate("8-3-2"), Some(3.0));
        assert_eq!(evaluate("8/4/2"), Some(1.0));
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        assert_eq!(evaluate("1/3"), Some(0.33));
        assert_eq!(evaluate("2/3"), Some(0.67));
        assert_eq!(evaluate("1/8"), Some(0.13));
    }

    #[test]
    fn test_half_rounds_toward_positive_infinity() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
        assert_eq!(round_half_up(0.49999999999999994), 0.0);
    }

    #[test]
    fn test_division_by_zero_is_infinite() {
        assert_eq!(evaluate("3/0"), Some(f64::INFINITY));
        assert_eq!(evaluate("6/0+1"), Some(f64::INFINITY));
        assert_eq!(evaluate("-3/0"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn test_zero_over_zero_is_invalid() {
        assert_eq!(try_evaluate("0/0"), Err(EvalError::NotANumber));
        assert_eq!(evaluate("1-5/0+5/0"), None);
    }

    #[test]
    fn test_doubled_operators() {
        assert_eq!(evaluate("3++2"), None);
        assert_eq!(evaluate("3--2"), None);
        assert_eq!(evaluate("3**2"), None);
        assert_eq!(evaluate("3//2"), None);
    }

    #[test]
    fn test_unary_signs() {
        assert_eq!(evaluate("3+-2"), Some(1.0));
        assert_eq!(evaluate("3*-2"), Some(-6.0));
        assert_eq!(evaluate("-3"), Some(-3.0));
        assert_eq!(evaluate("3- -2"), Some(5.0));
        assert_eq!(evaluate("+-+-1"), Some(1.0));
        assert_eq!(evaluate("2*-+-3"), Some(6.0));
        assert_eq!(evaluate("-+3"), Some(-3.0));
    }

    #[test]
    fn test_long_sign_chain_does_not_overflow() {
        let even = format!("{}1", "+-".repeat(100_000));
        assert_eq!(evaluate(&even), Some(1.0));

        let odd = format!("-{}7", "+-".repeat(100_000));
        assert_eq!(evaluate(&odd), Some(-7.0));

        let dangling = "+-".repeat(100_000);
        assert_eq!(try_evaluate(&dangling), Err(EvalError::UnexpectedEnd));
    }

    #[test]
    fn test_whitespace() {
        assert_eq!(evaluate(" 1 + 2 "), Some(3.0));
        assert_eq!(evaluate("1 2"), None);
        assert_eq!(try_evaluate("   "), Err(EvalError::Empty));
        assert_eq!(try_evaluate(""), Err(EvalError::Empty));
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(evaluate("bad input"), None);
        assert_eq!(try_evaluate("1.5+1"), Err(EvalError::InvalidCharacter('.')));
        assert_eq!(evaluate("(1+2)"), None);
    }

    #[test]
    fn test_leading_zero() {
        assert_eq!(
            try_evaluate("1+2*05"),
            Err(EvalError::LeadingZero("05".to_string()))
        );
        assert_eq!(evaluate("0+1"), Some(1.0));
        assert_eq!(evaluate("10*0"), Some(0.0));
    }

    #[test]
    fn test_trailing_operator() {
        assert_eq!(try_evaluate("1+"), Err(EvalError::UnexpectedEnd));
        assert!(matches!(
            try_evaluate("*1"),
            Err(EvalError::UnexpectedToken(_, 0))
        ));
    }
}
