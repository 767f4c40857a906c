//! Tests for the per-player game state machine and result history.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use strictly_mathle::{
    FeedbackStatus, GameResultRecord, GameState, GameStatus, GuessError, MAX_ATTEMPTS, Puzzle,
    RecordChange, ResultHistory, ValidationError,
};

fn puzzle() -> Puzzle {
    Puzzle::new(
        7,
        "12+3*4".to_string(),
        24.0,
        NaiveDate::from_ymd_opt(2026, 10, 18).expect("Invalid date"),
    )
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0)
        .single()
        .expect("Invalid time")
}

/// Submits a guess that must be accepted.
fn play(state: &GameState, guess: &str) -> GameState {
    state
        .submit_guess(&puzzle(), guess, start())
        .expect("Guess rejected")
        .state
}

#[test]
fn test_valid_wrong_guess_keeps_playing() {
    let state = GameState::for_puzzle(&puzzle());
    let outcome = state
        .submit_guess(&puzzle(), "4*3+12", start())
        .expect("Guess rejected");

    assert_eq!(outcome.state.status(), GameStatus::Playing);
    assert_eq!(outcome.state.attempts(), 1);
    assert_eq!(outcome.state.guesses().to_vec(), vec!["4*3+12".to_string()]);
    assert_eq!(outcome.state.feedbacks().len(), 1);
    assert_eq!(outcome.feedback.len(), 6);
}

#[test]
fn test_sixth_miss_loses_and_reveals_answer() {
    let mut state = GameState::new(7, 24.0, start());
    for _ in 0..MAX_ATTEMPTS - 1 {
        state = play(&state, "4*3+12");
        assert_eq!(state.status(), GameStatus::Playing);
    }

    let outcome = state
        .submit_guess(&puzzle(), "3*4+12", start())
        .expect("Guess rejected");

    assert_eq!(outcome.state.status(), GameStatus::Lost);
    assert_eq!(outcome.state.attempts(), MAX_ATTEMPTS);
    assert_eq!(outcome.state.remaining_attempts(), 0);
    assert_eq!(outcome.correct_answer.as_deref(), Some("12+3*4"));
    assert!(outcome.duration_ms.is_none());
}

#[test]
fn test_win_on_last_attempt() {
    let mut state = GameState::new(7, 24.0, start());
    for _ in 0..MAX_ATTEMPTS - 1 {
        state = play(&state, "4*3+12");
    }

    let outcome = state
        .submit_guess(&puzzle(), "12+3*4", start() + Duration::milliseconds(61_500))
        .expect("Guess rejected");

    assert_eq!(outcome.state.status(), GameStatus::Won);
    assert_eq!(outcome.state.attempts(), 6);
    assert_eq!(outcome.duration_ms, Some(61_500));
    assert!(
        outcome
            .feedback
            .iter()
            .all(|c| c.status == FeedbackStatus::Correct)
    );
}

#[test]
fn test_terminal_states_reject_guesses() {
    let won = play(&GameState::new(7, 24.0, start()), "12+3*4");
    assert_eq!(
        won.submit_guess(&puzzle(), "12+3*4", start()),
        Err(GuessError::GameOver)
    );

    let mut lost = GameState::new(7, 24.0, start());
    for _ in 0..MAX_ATTEMPTS {
        lost = play(&lost, "4*3+12");
    }
    assert_eq!(lost.status(), GameStatus::Lost);
    assert_eq!(
        lost.submit_guess(&puzzle(), "12+3*4", start()),
        Err(GuessError::GameOver)
    );
}

#[test]
fn test_invalid_guess_leaves_state_untouched() {
    let state = play(&GameState::new(7, 24.0, start()), "4*3+12");
    let before = state.clone();

    for (guess, expected) in [
        ("12+3", ValidationError::WrongLength(4)),
        ("12+3x4", ValidationError::InvalidCharacter('x')),
        ("12/0+3", ValidationError::DivisionByZero),
        ("12++34", ValidationError::ConsecutiveOperators),
    ] {
        assert_eq!(
            state.submit_guess(&puzzle(), guess, start()),
            Err(GuessError::Invalid(expected))
        );
    }

    assert_eq!(state, before);
    assert_eq!(state.attempts(), 1);
}

#[test]
fn test_guess_against_another_days_puzzle_rejected() {
    let state = play(&GameState::new(7, 24.0, start()), "4*3+12");
    let tomorrow = Puzzle::new(
        8,
        "9*9-70".to_string(),
        11.0,
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("Invalid date"),
    );

    assert_eq!(
        state.submit_guess(&tomorrow, "9*9-70", start()),
        Err(GuessError::WrongPuzzle {
            expected: 7,
            got: 8
        })
    );
    assert_eq!(state.attempts(), 1);
    assert_eq!(state.status(), GameStatus::Playing);
}

#[test]
fn test_board_shows_played_rows_first() {
    let state = play(&GameState::new(7, 24.0, start()), "4*3+12");
    let board = state.board();

    assert_eq!(board.len(), MAX_ATTEMPTS as usize);
    assert_eq!(board[0], state.feedbacks()[0]);
    assert!(
        board[1..]
            .iter()
            .flatten()
            .all(|c| c.status == FeedbackStatus::Empty)
    );
}

#[test]
fn test_history_keeps_best_result_per_puzzle() {
    let won_fast = play(&GameState::new(7, 24.0, start()), "12+3*4");
    let won_slow = play(&play(&GameState::new(7, 24.0, start()), "4*3+12"), "12+3*4");
    let date = *puzzle().date();

    let mut history = ResultHistory::new();
    let slow = GameResultRecord::from_state(&won_slow, date, 30_000).expect("Game not finished");
    let fast = GameResultRecord::from_state(&won_fast, date, 50_000).expect("Game not finished");

    assert_eq!(history.record(slow), RecordChange::Inserted);
    assert_eq!(history.record(fast.clone()), RecordChange::Improved);
    assert_eq!(history.get(7), Some(&fast));

    let again = GameResultRecord::from_state(&won_slow, date, 1_000).expect("Game not finished");
    assert_eq!(history.record(again), RecordChange::Kept);
    assert_eq!(history.len(), 1);
}

#[test]
fn test_history_ignores_unfinished_game() {
    let playing = play(&GameState::new(7, 24.0, start()), "4*3+12");
    assert!(GameResultRecord::from_state(&playing, *puzzle().date(), 0).is_none());
}

#[test]
fn test_history_json_round_trip() {
    let won = play(&GameState::new(7, 24.0, start()), "12+3*4");
    let mut history = ResultHistory::new();
    history.record(
        GameResultRecord::from_state(&won, *puzzle().date(), 12_000).expect("Game not finished"),
    );

    let json = serde_json::to_string(&history).expect("Serialize failed");
    let restored: ResultHistory = serde_json::from_str(&json).expect("Deserialize failed");
    assert_eq!(restored, history);
}
