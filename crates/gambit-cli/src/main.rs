//! Gambit CLI
//!
//! Command-line trainer for the chess mistakes found in your own games.

mod train;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use gambit_core::{
    Corpus, CorpusFilter, ErrorType, PerformanceStore, PlayerColor, Position, QueueItem,
    QueueMetrics, QueueMode, Scheduler, SchedulerConfig, Storage, SystemClock,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Gambit - spaced repetition for your own chess mistakes
#[derive(Parser)]
#[command(name = "gambit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Drill the mistakes from your own games with spaced repetition")]
#[command(long_about = "Gambit schedules the blunders, mistakes and inaccuracies found in your games.\n\nPositions you keep solving come back less often; positions you miss come back first.")]
struct Cli {
    /// Analysis results (JSON array of positions)
    #[arg(long, global = true, default_value = "analysis_results.json")]
    corpus: PathBuf,

    /// Directory holding the performance database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Only train these error types (comma-separated)
    #[arg(long = "error-type", global = true, value_delimiter = ',')]
    error_types: Vec<ErrorType>,

    /// Only train positions where you played this color
    #[arg(long, global = true)]
    color: Option<PlayerColor>,

    /// Seed for a reproducible queue order
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show queue metrics and the upcoming queue
    Queue {
        /// Entries to list
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive training session
    Train,

    /// Show training statistics
    Stats {
        /// Days of daily statistics to show
        #[arg(long, default_value = "7")]
        days: u32,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List recent training sessions
    Sessions {
        #[arg(long, default_value = "10")]
        limit: u32,
    },

    /// Show the corpus breakdown
    Corpus,

    /// Export all performance data as JSON
    Export {
        /// Output file path
        output: PathBuf,
    },

    /// Delete all performance data
    Reset {
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Create a full backup of the SQLite database
    Backup {
        /// Output file path for the backup
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Queue { limit, json } => run_queue(&cli, *limit, *json),
        Commands::Train => run_train(&cli),
        Commands::Stats { days, json } => run_stats(&cli, *days, *json),
        Commands::Sessions { limit } => run_sessions(&cli, *limit),
        Commands::Corpus => run_corpus(&cli),
        Commands::Export { output } => run_export(&cli, output),
        Commands::Reset { yes } => run_reset(&cli, *yes),
        Commands::Backup { output } => run_backup(&cli, output),
    }
}

// ============================================================================
// SHARED SETUP
// ============================================================================

fn open_storage(cli: &Cli) -> anyhow::Result<Storage> {
    let path = match &cli.data_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            Some(dir.join(gambit_core::storage::DB_FILE_NAME))
        }
        None => None,
    };
    Ok(Storage::new(path)?)
}

fn load_active(cli: &Cli) -> anyhow::Result<(Corpus, Vec<Arc<Position>>)> {
    let corpus = Corpus::load(&cli.corpus)?;
    let filter = CorpusFilter {
        error_types: (!cli.error_types.is_empty()).then(|| cli.error_types.clone()),
        player_color: cli.color,
    };
    let active = corpus.filtered(&filter);
    Ok((corpus, active))
}

fn make_rng(cli: &Cli) -> StdRng {
    match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn open_scheduler(cli: &Cli) -> anyhow::Result<Scheduler<Storage, SystemClock>> {
    Ok(Scheduler::new(open_storage(cli)?, SystemClock, SchedulerConfig::from_env()))
}

fn print_distribution_bar(label: &str, count: usize, total: usize, color: &str) {
    let percentage = if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    let bar_width: usize = 30;
    let filled = ((percentage / 100.0) * bar_width as f64) as usize;
    let empty = bar_width.saturating_sub(filled);

    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));
    let colored_bar = match color {
        "green" => bar.green(),
        "yellow" => bar.yellow(),
        "red" => bar.red(),
        _ => bar.white(),
    };

    println!(
        "  {:15} [{:30}] {:>5} ({:>5.1}%)",
        label, colored_bar, count, percentage
    );
}

fn error_type_color(error_type: &str) -> &'static str {
    match error_type {
        "blunder" => "red",
        "mistake" => "yellow",
        "inaccuracy" => "green",
        _ => "white",
    }
}

// ============================================================================
// QUEUE
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueueEntry {
    problem_id: String,
    index: usize,
    error_type: ErrorType,
    player_color: PlayerColor,
    is_new: bool,
    mastery: Option<u8>,
    days_since_seen: Option<String>,
    priority: Option<i64>,
    fen: String,
}

impl From<&QueueItem> for QueueEntry {
    fn from(item: &QueueItem) -> Self {
        let position = &item.position;
        Self {
            problem_id: position.problem_id().key(),
            index: position.index,
            error_type: position.error_type,
            player_color: position.player_color,
            is_new: item.is_new,
            mastery: item.mastery.map(|m| m.value()),
            days_since_seen: item.days_since_seen.map(|d| d.to_string()),
            priority: item.priority,
            fen: position.fen.clone(),
        }
    }
}

#[derive(Serialize)]
struct QueuePreview {
    metrics: QueueMetrics,
    mode: QueueMode,
    items: Vec<QueueEntry>,
}

fn run_queue(cli: &Cli, limit: usize, json: bool) -> anyhow::Result<()> {
    let (_, active) = load_active(cli)?;
    let scheduler = open_scheduler(cli)?;
    let queue = scheduler.build_queue(&active, &mut make_rng(cli))?;

    let preview = QueuePreview {
        metrics: queue.metrics,
        mode: queue.mode,
        items: queue.items.iter().take(limit).map(QueueEntry::from).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    println!("{}", "=== Gambit Queue ===".cyan().bold());
    println!();
    println!("{}: {}", "Due".white().bold(), preview.metrics.due_count);
    println!("{}: {}", "New".white().bold(), preview.metrics.new_count);
    println!("{}: {}", "Corpus".white().bold(), preview.metrics.total_count);
    println!("{}: {}", "Queued".white().bold(), queue.len());

    if queue.mode == QueueMode::Degraded {
        println!();
        println!(
            "{}",
            "Performance data unavailable: showing an unscheduled sample.".yellow()
        );
    }

    if queue.is_caught_up() {
        println!();
        println!("{}", "All caught up. Nothing is due right now.".green().bold());
        return Ok(());
    }

    println!();
    for (i, entry) in preview.items.iter().enumerate() {
        let kind = if entry.is_new {
            "new".green().to_string()
        } else {
            format!(
                "L{} {}d p{}",
                entry.mastery.unwrap_or(0),
                entry.days_since_seen.as_deref().unwrap_or("?"),
                entry.priority.unwrap_or(0)
            )
            .yellow()
            .to_string()
        };
        println!(
            "{:>3}. {:<11} {:<6} {:<16} {}",
            i + 1,
            entry.error_type.to_string(),
            entry.player_color.to_string(),
            kind,
            entry.fen.dimmed()
        );
    }
    if queue.len() > preview.items.len() {
        println!("{}", format!("... and {} more", queue.len() - preview.items.len()).dimmed());
    }

    Ok(())
}

// ============================================================================
// TRAIN
// ============================================================================

fn run_train(cli: &Cli) -> anyhow::Result<()> {
    let (_, active) = load_active(cli)?;
    let scheduler = open_scheduler(cli)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    let record = train::run_training(&scheduler, active, &mut make_rng(cli), &mut input, &mut out)?;

    if record.completed_problems > 0 {
        scheduler.store().save_session(&record)?;
    }
    Ok(())
}

// ============================================================================
// STATS
// ============================================================================

fn run_stats(cli: &Cli, days: u32, json: bool) -> anyhow::Result<()> {
    let storage = open_storage(cli)?;
    let stats = storage.get_stats()?;
    let categories = storage.category_stats()?;
    let daily = storage.daily_stats(days)?;

    if json {
        let value = serde_json::json!({
            "stats": stats,
            "categoryStats": categories,
            "dailyStats": daily,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "=== Gambit Training Statistics ===".cyan().bold());
    println!();
    println!("{}: {}", "Problems Solved".white().bold(), stats.total_problems);
    println!("{}: {}", "Total Attempts".white().bold(), stats.total_attempts);
    println!("{}: {}", "Correct".white().bold(), stats.total_correct);
    println!("{}: {:.1}%", "Success Rate".white().bold(), stats.success_rate);
    println!("{}: {}", "Current Streak".white().bold(), stats.current_streak);
    println!("{}: {}", "Best Streak".white().bold(), stats.best_streak);
    if let Some(last) = stats.last_update {
        println!("{}: {}", "Last Trained".white().bold(), last.format("%Y-%m-%d %H:%M:%S"));
    }

    if !categories.is_empty() {
        println!();
        println!("{}", "=== Accuracy by Category ===".yellow().bold());
        for category in &categories {
            let color = error_type_color(&category.category_value);
            print_distribution_bar(
                &category.category_value,
                category.correct as usize,
                category.attempts as usize,
                color,
            );
        }
    }

    if !daily.is_empty() {
        println!();
        println!("{}", "=== Recent Days ===".yellow().bold());
        for day in &daily {
            println!(
                "  {}  {:>4} attempts  {:>4} correct  {:>3} newly solved",
                day.date, day.attempts, day.correct, day.problems
            );
        }
    }

    Ok(())
}

fn run_sessions(cli: &Cli, limit: u32) -> anyhow::Result<()> {
    let storage = open_storage(cli)?;
    let sessions = storage.list_sessions(limit)?;

    println!("{}", "=== Recent Sessions ===".cyan().bold());
    println!();

    if sessions.is_empty() {
        println!("{}", "No sessions recorded yet.".dimmed());
        return Ok(());
    }

    for session in &sessions {
        let minutes = session
            .end_time
            .map(|end| (end - session.start_time).num_minutes().to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "{}  {:>3} done  {:>3} correct  {:>3} auto  {:>3} revealed  {:>3} skipped  {} min",
            session.start_time.format("%Y-%m-%d %H:%M"),
            session.completed_problems,
            session.correct_answers.to_string().green(),
            session.auto_revealed,
            session.revealed,
            session.skipped,
            minutes
        );
    }

    Ok(())
}

fn run_corpus(cli: &Cli) -> anyhow::Result<()> {
    let (corpus, active) = load_active(cli)?;
    let summary = corpus.summary();

    println!("{}", "=== Gambit Corpus ===".cyan().bold());
    println!();
    println!("{}: {}", "File".white().bold(), cli.corpus.display());
    println!("{}: {}", "Positions".white().bold(), summary.total);
    println!("{}: {}", "Active".white().bold(), active.len());
    println!();

    for error_type in ErrorType::ALL {
        let count = summary.by_error_type.get(&error_type).copied().unwrap_or(0);
        print_distribution_bar(error_type.as_str(), count, summary.total, error_type_color(error_type.as_str()));
    }
    print_distribution_bar("as white", summary.white, summary.total, "white");
    print_distribution_bar("as black", summary.black, summary.total, "white");

    Ok(())
}

// ============================================================================
// MAINTENANCE
// ============================================================================

fn run_export(cli: &Cli, output: &Path) -> anyhow::Result<()> {
    println!("{}", "=== Gambit Export ===".cyan().bold());
    println!();

    let storage = open_storage(cli)?;
    let bundle = storage.export(Utc::now())?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::fs::File::create(output)?;
    let mut writer = io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &bundle)?;
    writer.flush()?;

    println!("{}: {}", "Problems".white().bold(), bundle.problem_stats.len());
    println!("{}: {}", "Sessions".white().bold(), bundle.sessions.len());
    println!();
    println!(
        "{}",
        format!("Export complete: {}", output.display()).green().bold()
    );

    Ok(())
}

fn run_reset(cli: &Cli, yes: bool) -> anyhow::Result<()> {
    let storage = open_storage(cli)?;
    let stats = storage.get_stats()?;

    // Confirmation prompt (unless --yes)
    if !yes {
        print!(
            "{} Delete all training history ({} attempts)? This cannot be undone. [y/N] ",
            "WARNING:".red().bold(),
            stats.total_attempts
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input != "y" && input != "yes" {
            println!("{}", "Aborted.".yellow());
            return Ok(());
        }
    }

    storage.reset()?;
    println!("{}", "Training history deleted.".green().bold());
    Ok(())
}

fn run_backup(cli: &Cli, output: &Path) -> anyhow::Result<()> {
    println!("{}", "=== Gambit Backup ===".cyan().bold());
    println!();

    let storage = open_storage(cli)?;

    println!("Flushing WAL checkpoint...");
    storage.checkpoint()?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    println!("Copying database...");
    println!("  {} {}", "From:".dimmed(), storage.path().display());
    println!("  {}   {}", "To:".dimmed(), output.display());

    std::fs::copy(storage.path(), output)?;

    let file_size = std::fs::metadata(output)?.len();
    let size_display = if file_size >= 1024 * 1024 {
        format!("{:.2} MB", file_size as f64 / (1024.0 * 1024.0))
    } else if file_size >= 1024 {
        format!("{:.1} KB", file_size as f64 / 1024.0)
    } else {
        format!("{} bytes", file_size)
    };

    println!();
    println!(
        "{}",
        format!("Backup complete: {} ({})", output.display(), size_display)
            .green()
            .bold()
    );

    Ok(())
}
