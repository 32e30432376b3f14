//! Command definitions for the Pomodoro board CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::calendar::YearMonth;
use crate::tasks::TaskDraft;
use crate::types::TaskId;

// ============================================================================
// CLI Structure
// ============================================================================

/// Pomodoro board - a focus timer with session logging and a task list
#[derive(Parser, Debug)]
#[command(
    name = "pomodoro-board",
    version,
    about = "Pomodoro timer with session logging and a task list",
    long_about = "A Pomodoro timer daemon with light, medium and deep focus modes.\n\
                  Completed work phases are logged to the session API, and tasks\n\
                  from the task API can be attached to the running timer.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the timer daemon in the foreground
    Daemon,

    /// Start the countdown
    Start,

    /// Pause the countdown
    Pause,

    /// Stop and restore the full work duration
    Reset,

    /// Select a mode (light, medium, deep, or a configured one)
    Mode {
        /// Mode name
        name: String,
    },

    /// Show current timer status
    Status,

    /// Follow the countdown live
    Watch,

    /// Attach a task from the task list to the timer
    Select {
        /// Task id
        id: TaskId,
    },

    /// Detach the current task
    Unselect,

    /// Show session statistics
    Stats,

    /// List tasks
    Tasks,

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Show the clock and a month calendar
    Calendar(CalendarArgs),

    /// List the available modes
    Modes,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    /// Add a task
    Add(TaskAddArgs),

    /// Mark a task as completed
    Done {
        /// Task id
        id: TaskId,
    },

    /// Mark a task as not completed
    Undo {
        /// Task id
        id: TaskId,
    },

    /// Delete a task
    Rm {
        /// Task id
        id: TaskId,
    },
}

// ============================================================================
// Task Arguments
// ============================================================================

/// Arguments for `task add`
#[derive(Args, Debug, Clone, Default)]
pub struct TaskAddArgs {
    /// Task name
    #[arg(value_parser = validate_task_name)]
    pub name: String,

    /// Estimated hours
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u32).range(0..=99))]
    pub hours: u32,

    /// Estimated minutes
    #[arg(short, long, default_value = "0", value_parser = clap::value_parser!(u32).range(0..=59))]
    pub minutes: u32,

    /// Category: university, work, personal or other
    #[arg(long, default_value = "university")]
    pub category: String,

    /// Label for the "other" category
    #[arg(long)]
    pub custom_category: Option<String>,

    /// Course (university tasks only)
    #[arg(long)]
    pub course: Option<String>,

    /// Priority label
    #[arg(long)]
    pub priority: Option<String>,

    /// Urgency label
    #[arg(long)]
    pub urgency: Option<String>,
}

impl TaskAddArgs {
    /// Converts the arguments into an unvalidated draft.
    pub fn into_draft(self) -> TaskDraft {
        TaskDraft {
            name: self.name,
            hours: self.hours,
            minutes: self.minutes,
            category: self.category,
            custom_category: self.custom_category.unwrap_or_default(),
            course: self.course.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            urgency: self.urgency.unwrap_or_default(),
        }
    }
}

// ============================================================================
// Calendar Arguments
// ============================================================================

/// Arguments for `calendar`
#[derive(Args, Debug, Clone, Default)]
pub struct CalendarArgs {
    /// Month to show, as YYYY-MM (defaults to the current month)
    #[arg(long, value_parser = parse_year_month)]
    pub month: Option<YearMonth>,

    /// Months to move forward (negative moves back)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub shift: i32,
}

impl CalendarArgs {
    /// Resolves the month to display.
    pub fn target(&self, current: YearMonth) -> YearMonth {
        let mut month = self.month.unwrap_or(current);
        for _ in 0..self.shift.unsigned_abs() {
            month = if self.shift < 0 {
                month.prev()
            } else {
                month.next()
            };
        }
        month
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates the task name.
///
/// - Must not be blank
/// - Must not exceed 200 characters
fn validate_task_name(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("Task name must not be empty".to_string());
    }
    if s.chars().count() > 200 {
        return Err("Task name must be at most 200 characters".to_string());
    }
    Ok(s.to_string())
}

/// Parses `YYYY-MM`.
fn parse_year_month(s: &str) -> Result<YearMonth, String> {
    let invalid = || format!("Invalid month '{}', expected YYYY-MM", s);
    let (year, month) = s.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    YearMonth::new(year, month).ok_or_else(invalid)
}

// ============================================================================
// Tests
// ============================================================================
