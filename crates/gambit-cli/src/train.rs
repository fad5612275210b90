//! Interactive training loop
//!
//! Reads one command per line and drives a [`TrainingSession`] until the
//! learner quits, input ends, or nothing is left to review.

use std::io::{BufRead, Write};
use std::sync::Arc;

use colored::Colorize;
use gambit_core::{
    AttemptOutcome, Clock, OverrideKind, PerformanceStore, Position, QueueMode, Scheduler,
    SessionRecord, TrainingSession,
};
use rand::Rng;

/// One line of learner input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Move(String),
    /// Give up on this problem without seeing the answer
    Skip,
    /// Show the answer, counting the problem as missed
    Reveal,
    /// Count the problem as solved
    Correct,
    Quit,
    Empty,
}

pub fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    match trimmed.to_lowercase().as_str() {
        "" => Input::Empty,
        "skip" | "s" => Input::Skip,
        "reveal" | "r" => Input::Reveal,
        "correct" | "c" => Input::Correct,
        "quit" | "q" | "exit" => Input::Quit,
        _ => Input::Move(trimmed.to_string()),
    }
}

/// Run a session over `active` and return its summary
pub fn run_training<S, C, R, I, O>(
    scheduler: &Scheduler<S, C>,
    active: Vec<Arc<Position>>,
    rng: &mut R,
    input: &mut I,
    out: &mut O,
) -> anyhow::Result<SessionRecord>
where
    S: PerformanceStore,
    C: Clock,
    R: Rng + ?Sized,
    I: BufRead,
    O: Write,
{
    let mut session = TrainingSession::start(scheduler, active, rng)?;
    let metrics = session.metrics();

    writeln!(out, "{}", "=== Gambit Training ===".cyan().bold())?;
    writeln!(
        out,
        "{} due, {} new, {} in corpus",
        metrics.due_count, metrics.new_count, metrics.total_count
    )?;
    if session.mode() == QueueMode::Degraded {
        writeln!(
            out,
            "{}",
            "Performance data unavailable: practising without scheduling.".yellow()
        )?;
    }

    let mut line = String::new();
    loop {
        let Some(exposure) = session.current() else {
            if session.is_caught_up() {
                writeln!(out, "{}", "All caught up. Nothing is due right now.".green().bold())?;
                break;
            }
            if session.mode() == QueueMode::Degraded {
                break;
            }
            session.refresh(rng)?;
            continue;
        };

        let position = exposure.position().clone();
        if exposure.attempts() == 0 {
            writeln!(out)?;
            print_position(out, &position, session.remaining())?;
        }

        write!(out, "Your move (UCI), or skip / reveal / correct / quit: ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        match parse_input(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Move(candidate) => match session.submit_move(&candidate)? {
                AttemptOutcome::Solved(_) => {
                    writeln!(out, "{}", "Correct!".green().bold())?;
                }
                AttemptOutcome::Incorrect { attempts_remaining } => {
                    writeln!(
                        out,
                        "{} {} attempt(s) left.",
                        "Not the best move.".red(),
                        attempts_remaining
                    )?;
                }
                AttemptOutcome::AutoRevealed { best_move, .. } => {
                    writeln!(out, "{} {}", "The best move was".yellow(), best_move.bold())?;
                }
            },
            Input::Skip => {
                session.override_completion(OverrideKind::Skip)?;
                writeln!(out, "{}", "Skipped.".dimmed())?;
            }
            Input::Reveal => {
                session.override_completion(OverrideKind::Reveal)?;
                writeln!(out, "{} {}", "The best move was".yellow(), position.best_move.bold())?;
            }
            Input::Correct => {
                session.override_completion(OverrideKind::MarkCorrect)?;
                writeln!(out, "{}", "Marked correct.".green())?;
            }
        }
    }

    let stats = session.stats().clone();
    let record = session.finish();

    writeln!(out)?;
    writeln!(
        out,
        "{}: {} completed, {} correct ({:.1}%), {} auto-revealed, {} revealed, {} skipped",
        "Session".white().bold(),
        stats.completed_problems,
        stats.correct_answers,
        stats.accuracy(),
        stats.auto_revealed,
        stats.revealed,
        stats.skipped
    )?;

    Ok(record)
}

fn print_position<O: Write>(out: &mut O, position: &Position, remaining: usize) -> std::io::Result<()> {
    writeln!(
        out,
        "{} ({} left)",
        format!("{} #{}", position.error_type, position.index).magenta().bold(),
        remaining
    )?;
    writeln!(out, "  {} {}", "FEN:".dimmed(), position.fen)?;
    writeln!(out, "  {} {}", "To move:".dimmed(), position.player_color)?;
    if position.move_number > 0 {
        writeln!(out, "  {} {}", "Move:".dimmed(), position.move_number)?;
    }
    writeln!(out, "  {} {}", "You played:".dimmed(), position.player_move)?;
    if let Some(drop) = position.eval_drop() {
        writeln!(out, "  {} {} cp", "Cost:".dimmed(), drop)?;
    }
    if let Some(url) = &position.game_url {
        writeln!(out, "  {} {}", "Game:".dimmed(), url)?;
    }
    Ok(())
}
