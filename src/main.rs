/// Main entry point for the habit-stats command line tool
///
/// This file sets up logging, parses command line arguments and dispatches
/// to the tracker. Results are printed to stdout as JSON, logs go to stderr.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use chrono::{DateTime, Datelike, Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use habit_stats::analytics::YearMonth;
use habit_stats::preferences::DashboardLayout;
use habit_stats::{AnalyticsConfig, HabitColor, HabitId, HabitTracker, TrackerError};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        dirs::home_dir().map(|mut p| {
            p.push(".habit_stats");
            p
        }),
        dirs::data_dir().map(|mut p| {
            p.push("habit_stats");
            p
        }),
        dirs::config_dir().map(|mut p| {
            p.push("habit_stats");
            p
        }),
        std::env::current_dir().ok().map(|mut p| {
            p.push(".habit_stats");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if let Ok(()) = std::fs::create_dir_all(potential_path) {
            // Test if we can write to this directory
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("habits.db"));
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let mut temp_path = std::env::temp_dir();
    temp_path.push("habit_stats");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("habits.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Habit statistics from the command line
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Number of days in the recent activity row
    #[arg(long, default_value_t = 7)]
    window: usize,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new habit
    AddHabit {
        name: String,
        #[arg(long, default_value = "Blue")]
        color: HabitColor,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Record a completion, now unless --at is given (RFC 3339)
    Log {
        habit_id: i64,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Recent activity, streak and completion rate of every active habit
    Status,
    /// Completions per week or month up to today
    Chart {
        #[arg(long, value_enum, default_value_t = Period::Week)]
        period: Period,
        #[arg(long)]
        habit_id: Option<i64>,
    },
    /// Completion heatmap for a month (YYYY-MM), the current one by default
    Heatmap {
        #[arg(long)]
        month: Option<YearMonth>,
    },
    /// Most completed habits and busiest weekdays
    Top {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Write a backup archive
    Export { path: PathBuf },
    /// Replace all data with a backup archive
    Import { path: PathBuf },
    /// Read or change preferences
    Pref {
        #[command(subcommand)]
        action: PrefCommand,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Period {
    Week,
    Month,
}

#[derive(Subcommand, Debug)]
enum PrefCommand {
    /// Show all preferences
    Show,
    /// Set the dashboard layout (list or grid)
    Layout { layout: DashboardLayout },
    /// Record the last finished onboarding step
    Onboarding { step: u32 },
    /// Show or hide the heatmap
    Heatmap {
        #[arg(action = clap::ArgAction::Set)]
        show: bool,
    },
}

#[derive(Serialize)]
struct PreferencesView {
    dashboard_layout: DashboardLayout,
    onboarding_step: u32,
    show_heatmap: bool,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), TrackerError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(tracker: &HabitTracker, command: Command) -> Result<(), TrackerError> {
    let now = Local::now();
    let today = now.date_naive();
    let storage = tracker.storage();
    let analytics = tracker.analytics();

    match command {
        Command::AddHabit { name, color, notes } => {
            print_json(&tracker.add_habit(&name, color, &notes)?)?;
        }
        Command::Log { habit_id, at } => {
            let timestamp = at.unwrap_or_else(|| now.with_timezone(&Utc));
            print_json(&tracker.log_action(HabitId(habit_id), timestamp)?)?;
        }
        Command::Status => {
            print_json(&tracker.overviews(today, &Local)?)?;
        }
        Command::Chart { period, habit_id } => {
            let habit_id = habit_id.map(HabitId);
            let chart = match period {
                Period::Week => analytics.weekly_chart(storage, habit_id, today)?,
                Period::Month => analytics.monthly_chart(storage, habit_id, today)?,
            };
            print_json(&chart)?;
        }
        Command::Heatmap { month } => {
            let month = month.unwrap_or_else(|| YearMonth::new(today.year(), today.month()));
            print_json(&analytics.heatmap(storage, month)?)?;
        }
        Command::Top { limit } => {
            print_json(&serde_json::json!({
                "habits": analytics.top_habits(storage, limit)?,
                "week_days": analytics.top_week_days(storage, &Local)?,
            }))?;
        }
        Command::Export { path } => {
            let mut out = BufWriter::new(File::create(&path)?);
            let summary = tracker.export(&mut out)?;
            info!("Backup written to {}", path.display());
            print_json(&summary)?;
        }
        Command::Import { path } => {
            let mut reader = BufReader::new(File::open(&path)?);
            print_json(&tracker.import(&mut reader)?)?;
        }
        Command::Pref { action } => {
            let prefs = tracker.preferences();
            match action {
                PrefCommand::Show => {}
                PrefCommand::Layout { layout } => prefs.set_dashboard_layout(layout)?,
                PrefCommand::Onboarding { step } => prefs.set_onboarding_step(step)?,
                PrefCommand::Heatmap { show } => prefs.set_show_heatmap(show)?,
            }
            print_json(&PreferencesView {
                dashboard_layout: prefs.dashboard_layout()?,
                onboarding_step: prefs.onboarding_step()?,
                show_heatmap: prefs.show_heatmap()?,
            })?;
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_stats={}", log_level))
        .with_writer(std::io::stderr) // Send logs to stderr, not stdout
        .init();

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let config = AnalyticsConfig {
        recent_window_days: args.window,
    };
    let tracker = HabitTracker::new(db_path, config)?;

    if let Err(e) = run(&tracker, args.command) {
        if let TrackerError::Backup(backup_error) = &e {
            if backup_error.is_version_too_high() {
                eprintln!("This backup was made by a newer version and cannot be imported.");
            }
        }
        return Err(e.into());
    }

    Ok(())
}
