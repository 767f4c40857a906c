//! Strictly Mathle - Unified CLI
//!
//! Play the daily equation puzzle and browse the leaderboard.

#![warn(missing_docs)]

mod cli;

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Command};
use serde::Serialize;
use strictly_mathle::{
    AppConfig, CellFeedback, FeedbackStatus, GameResultRecord, GameState, Identity, MAX_ATTEMPTS,
    PuzzleRepository, PuzzleService, RecordChange, ResultHistory, check_equation,
    generate_expression, try_evaluate,
};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(db_path) = cli.db_path.clone() {
        config.apply_database_override(db_path);
    }

    match cli.command {
        Command::Today => run_today(&config, cli.json),
        Command::Play { user_id, user_name } => {
            let identity = match user_id {
                Some(id) => {
                    let name = user_name.unwrap_or_else(|| id.clone());
                    Identity::new(id, name)
                }
                None => Identity::anonymous(),
            };
            run_play(&config, identity)
        }
        Command::Check { guess, target } => run_check(&guess, target, cli.json),
        Command::Generate { count } => run_generate(count, cli.json),
        Command::Leaderboard { limit, today } => {
            let limit = limit.unwrap_or(*config.leaderboard_limit());
            run_leaderboard(&config, limit, today, cli.json)
        }
        Command::Stats { user_id } => run_stats(&config, &user_id, cli.json),
        Command::Problems => run_problems(&config, cli.json),
    }
}

/// Logs go to stderr so they never interleave with the board.
fn initialize_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the database and applies migrations.
#[instrument(skip(config), fields(db_path = %config.database_path()))]
fn open_service(config: &AppConfig) -> Result<PuzzleService> {
    let repository = PuzzleRepository::new(config.database_path().clone())?;
    repository.migrate()?;
    Ok(PuzzleService::new(repository))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct TodayView {
    problem_id: i32,
    date: chrono::NaiveDate,
    target: f64,
}

/// Show today's target
fn run_today(config: &AppConfig, json: bool) -> Result<()> {
    let service = open_service(config)?;
    let problem = service.todays_problem()?;

    if json {
        return print_json(&TodayView {
            problem_id: *problem.id(),
            date: *problem.date(),
            target: *problem.answer(),
        });
    }

    println!("Puzzle #{} for {}", problem.id(), problem.date());
    println!("Find a six-character equation equal to {}", problem.answer());
    Ok(())
}

fn cell_text(cell: &CellFeedback) -> String {
    match cell.status {
        FeedbackStatus::Correct => format!("[{}]", cell.ch),
        FeedbackStatus::WrongPosition => format!("({})", cell.ch),
        FeedbackStatus::NotUsed => format!(" {} ", cell.ch),
        FeedbackStatus::Empty => " _ ".to_string(),
    }
}

fn render_row(row: &[CellFeedback]) -> String {
    row.iter().map(cell_text).collect::<Vec<_>>().join("")
}

fn load_history(path: &Path) -> Result<ResultHistory> {
    if !path.exists() {
        return Ok(ResultHistory::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_history(path: &Path, history: &ResultHistory) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(history)?)?;
    Ok(())
}

/// Play today's puzzle on stdin/stdout
#[instrument(skip(config))]
fn run_play(config: &AppConfig, identity: Identity) -> Result<()> {
    let service = open_service(config)?;
    let problem = service.todays_problem()?;
    let puzzle = problem.to_puzzle();
    let mut state = GameState::for_puzzle(&puzzle);
    let mut duration_ms = None;

    println!("Puzzle #{} - target {}", puzzle.id(), puzzle.answer());
    println!("[x] right place, (x) wrong place, x not in the equation");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    while !state.status().is_terminal() {
        print!("Guess {}/{}: ", state.attempts() + 1, MAX_ATTEMPTS);
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            info!("Input closed before game end");
            return Ok(());
        };
        let line = line?;
        let guess = line.trim();
        if guess.is_empty() {
            continue;
        }

        match state.submit_guess(&puzzle, guess, Utc::now()) {
            Ok(outcome) => {
                println!("        {}", render_row(&outcome.feedback));
                if let Some(answer) = &outcome.correct_answer {
                    println!("The equation was {}", answer);
                }
                duration_ms = outcome.duration_ms;
                state = outcome.state;
            }
            Err(e) => println!("{}", e),
        }
    }

    println!();
    for row in state.board() {
        println!("{}", render_row(&row));
    }

    let elapsed = duration_ms.unwrap_or_else(|| state.elapsed_ms(Utc::now()));
    println!("{} in {} attempt(s), {}s", state.status(), state.attempts(), elapsed / 1000);

    if let Some(entry) = service.record_win(&identity, &state, elapsed)? {
        println!("Leaderboard score: {}", entry.score());
    }

    if let Some(path) = config.history_path() {
        let mut history = load_history(path)?;
        if let Some(record) = GameResultRecord::from_state(&state, *puzzle.date(), elapsed) {
            match history.record(record) {
                RecordChange::Kept => info!("Previous result for this puzzle was better"),
                change => info!(?change, "History updated"),
            }
            save_history(path, &history)?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct CheckView {
    guess: String,
    value: Option<f64>,
    valid: bool,
    error: Option<String>,
}

/// Evaluate and validate a single equation
fn run_check(guess: &str, target: Option<f64>, json: bool) -> Result<()> {
    let value = try_evaluate(guess);
    let verdict = check_equation(guess, target);

    if json {
        return print_json(&CheckView {
            guess: guess.to_string(),
            value: value.as_ref().ok().copied(),
            valid: verdict.is_ok(),
            error: verdict.as_ref().err().map(|e| e.to_string()),
        });
    }

    match value {
        Ok(v) => println!("{} = {}", guess, v),
        Err(e) => println!("{} does not evaluate: {}", guess, e),
    }
    match verdict {
        Ok(()) => println!("valid"),
        Err(e) => println!("invalid: {}", e),
    }
    Ok(())
}

/// Print freshly generated equations
fn run_generate(count: usize, json: bool) -> Result<()> {
    let generated = (0..count)
        .map(|_| generate_expression())
        .collect::<Result<Vec<_>, _>>()?;

    if json {
        return print_json(&generated);
    }
    for g in &generated {
        println!("{} = {}", g.expression(), g.answer());
    }
    Ok(())
}

/// Print the global or today's leaderboard
fn run_leaderboard(config: &AppConfig, limit: usize, today: bool, json: bool) -> Result<()> {
    let service = open_service(config)?;

    if today {
        let problem = service.todays_problem()?;
        let entries = service.todays_leaderboard(*problem.id(), limit)?;
        if json {
            return print_json(&entries);
        }
        println!("Puzzle #{} ({})", problem.id(), problem.date());
        for (rank, e) in entries.iter().enumerate() {
            println!(
                "{:>3}. {:<20} {:>6}  {} attempt(s), {}s",
                rank + 1,
                e.user_name(),
                e.score(),
                e.attempts(),
                e.duration_ms() / 1000
            );
        }
        return Ok(());
    }

    let rows = service.global_leaderboard(limit)?;
    if json {
        return print_json(&rows);
    }
    for (rank, r) in rows.iter().enumerate() {
        println!(
            "{:>3}. {:<20} avg {:>7.1}  best {:>5}  games {}",
            rank + 1,
            r.user_name(),
            r.average_score(),
            r.best_score(),
            r.games_played()
        );
    }
    Ok(())
}

/// Print one player's statistics
fn run_stats(config: &AppConfig, user_id: &str, json: bool) -> Result<()> {
    let service = open_service(config)?;
    let Some(stats) = service.user_stats(user_id)? else {
        warn!(user_id, "No games recorded");
        println!("No games recorded for {}", user_id);
        return Ok(());
    };

    if json {
        return print_json(&stats);
    }
    println!("Games played:     {}", stats.games_played());
    println!("Average score:    {}", stats.average_score());
    println!("Best score:       {}", stats.best_score());
    println!("Average attempts: {}", stats.average_attempts());
    for e in stats.recent_games() {
        println!("  puzzle #{}: score {} ({} attempts)", e.problem_id(), e.score(), e.attempts());
    }
    Ok(())
}

/// List recent puzzles; today's equation stays hidden
fn run_problems(config: &AppConfig, json: bool) -> Result<()> {
    let service = open_service(config)?;
    let today = Utc::now().date_naive();
    let problems = service.published_problems(today)?;

    if json {
        return print_json(&problems);
    }
    for p in &problems {
        let expression = p.expression().as_deref().unwrap_or("??????");
        println!("#{:<4} {}  {:>10}  {}", p.id(), p.date(), p.answer(), expression);
    }
    Ok(())
}
