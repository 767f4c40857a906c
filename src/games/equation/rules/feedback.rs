//! Per-character feedback with duplicate-aware accounting.

use super::super::types::{CellFeedback, FeedbackStatus};
use tracing::instrument;

/// Scores a guess against the secret equation.
///
/// 1. Exact matches are marked [`FeedbackStatus::Correct`] and consume
///    both positions.
/// 2. Remaining guess characters, left to right, claim the first unclaimed
///    secret position holding the same character
///    ([`FeedbackStatus::WrongPosition`]) or are marked
///    [`FeedbackStatus::NotUsed`].
///
/// Each secret character is claimed at most once. The output has one cell
/// per guess character and never contains [`FeedbackStatus::Empty`].
#[instrument]
pub fn get_feedback(guess: &str, secret: &str) -> Vec<CellFeedback> {
    let guess: Vec<char> = guess.chars().collect();
    let secret: Vec<char> = secret.chars().collect();

    let mut statuses: Vec<Option<FeedbackStatus>> = vec![None; guess.len()];
    let mut secret_used = vec![false; secret.len()];

    for (i, &g) in guess.iter().enumerate() {
        if secret.get(i) == Some(&g) {
            statuses[i] = Some(FeedbackStatus::Correct);
            secret_used[i] = true;
        }
    }

    for (i, &g) in guess.iter().enumerate() {
        if statuses[i].is_some() {
            continue;
        }
        let claimed = secret
            .iter()
            .zip(secret_used.iter_mut())
            .find(|(s, used)| !**used && **s == g);
        statuses[i] = Some(match claimed {
            Some((_, used)) => {
                *used = true;
                FeedbackStatus::WrongPosition
            }
            None => FeedbackStatus::NotUsed,
        });
    }

    guess
        .into_iter()
        .zip(statuses)
        .map(|(ch, status)| CellFeedback::new(ch, status.unwrap_or(FeedbackStatus::NotUsed)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use FeedbackStatus::{Correct, NotUsed, WrongPosition};

    fn statuses(guess: &str, secret: &str) -> Vec<FeedbackStatus> {
        get_feedback(guess, secret).iter().map(|c| c.status).collect()
    }

    #[test]
    fn test_full_match() {
        assert_eq!(statuses("12+3*4", "12+3*4"), vec![Correct; 6]);
    }

    #[test]
    fn test_transposition() {
        assert_eq!(
            statuses("12+3*4", "21+3*4"),
            vec![WrongPosition, WrongPosition, Correct, Correct, Correct, Correct]
        );
    }

    #[test]
    fn test_nothing_used() {
        assert_eq!(statuses("999999", "123456"), vec![NotUsed; 6]);
    }

    #[test]
    fn test_mixed_duplicates() {
        assert_eq!(
            statuses("13+2+3", "33+1+2"),
            vec![WrongPosition, Correct, Correct, WrongPosition, Correct, WrongPosition]
        );
    }

    #[test]
    fn test_exact_match_takes_priority_over_earlier_duplicate() {
        // The first `1` must not steal the secret's only `1`, which the
        // last guess position matches exactly.
        assert_eq!(
            statuses("1+2+31", "4+5*61"),
            vec![NotUsed, Correct, NotUsed, NotUsed, NotUsed, Correct]
        );
    }

    #[test]
    fn test_surplus_duplicates_not_used() {
        assert_eq!(
            statuses("777+12", "1*7+70"),
            vec![WrongPosition, NotUsed, Correct, Correct, WrongPosition, NotUsed]
        );
    }

    #[test]
    fn test_characters_preserved() {
        let cells = get_feedback("9-8/41", "12+3*4");
        let chars: String = cells.iter().map(|c| c.ch).collect();
        assert_eq!(chars, "9-8/41");
    }
}
