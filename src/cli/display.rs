//! Display utilities for the Pomodoro board CLI.
//!
//! This module provides formatted output for:
//! - Command results and errors
//! - Timer status and the live watch line
//! - Statistics, the task list and the mode list
//! - Clock and calendar

use chrono::{DateTime, Local};

use crate::api::ApiError;
use crate::calendar::{clock_text, date_text, offset_text, render_month, YearMonth};
use crate::presentation::progress_bar;
use crate::tasks::{pomodoro_estimates, tags, time_text};
use crate::types::{IpcResponse, ModeRegistry, ResponseData, Stats, Task, TimerPhase};

/// Width of the status progress bar in cells.
const BAR_WIDTH: usize = 30;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the result of a timer command followed by the status.
    pub fn show_response(response: &IpcResponse) {
        if !response.message.is_empty() {
            println!("* {}", response.message);
        }
        if let Some(data) = &response.data {
            print!("{}", Self::render_status(data));
        }
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        match &response.data {
            Some(data) => print!("{}", Self::render_status(data)),
            None => println!("No status available"),
        }
    }

    /// Shows an error with its cause chain.
    pub fn show_error(err: &anyhow::Error) {
        eprintln!("{}", Self::render_error(err));
    }

    /// Renders an error, adding a hint when an API error is in the chain.
    pub fn render_error(err: &anyhow::Error) -> String {
        let mut out = format!("Error: {:#}", err);
        if let Some(api) = err.chain().find_map(|e| e.downcast_ref::<ApiError>()) {
            out.push_str(&format!("\nHint: {}", api.suggestion()));
            if api.is_transient() {
                out.push_str(" (the failure may be temporary; try again)");
            }
        }
        out
    }

    /// Renders the full status block.
    pub fn render_status(data: &ResponseData) -> String {
        let state = if data.running {
            "running"
        } else if data.auto_start_pending {
            "break starting"
        } else {
            "paused"
        };

        let mut out = String::new();
        out.push_str(&format!(
            "{}  {}  [{} mode, {}]\n",
            data.phase_label, data.time_text, data.mode, state
        ));
        out.push_str(&format!(
            "{} {:>3.0}%\n",
            progress_bar(data.progress, BAR_WIDTH),
            data.progress * 100.0
        ));
        out.push_str(&format!(
            "Task: {}\n",
            data.task_name.as_deref().unwrap_or("none")
        ));
        if let Some(stats) = &data.stats {
            out.push_str(&format!("Today: {}\n", Self::stats_line(stats)));
        }
        if let Some(warning) = &data.warning {
            out.push_str(&format!("Warning: {}\n", warning));
        }
        if data.flash {
            let done = match data.phase {
                TimerPhase::Break => "Work phase complete!",
                TimerPhase::Work => "Break over!",
            };
            out.push_str(&format!("{}\n", done));
        }
        out
    }

    /// Renders the single-line view used by `watch`.
    pub fn render_watch_line(data: &ResponseData) -> String {
        let marker = if data.flash { " *" } else { "" };
        format!(
            "{}  {} {:>3.0}%{}",
            data.title,
            progress_bar(data.progress, BAR_WIDTH),
            data.progress * 100.0,
            marker
        )
    }

    /// `"3 pomodoros, 75 min focused"`.
    pub fn stats_line(stats: &Stats) -> String {
        format!("{}, {}", stats.pomodoros_text(), stats.minutes_text())
    }

    /// Shows session statistics.
    pub fn show_stats(stats: &Stats) {
        println!("{}", Self::stats_line(stats));
    }

    /// Renders the task list with estimates for every mode.
    pub fn render_tasks(tasks: &[Task], registry: &ModeRegistry) -> String {
        if tasks.is_empty() {
            return "No tasks\n".to_string();
        }

        let mut out = String::new();
        for task in tasks {
            let check = if task.completed { "x" } else { " " };
            out.push_str(&format!(
                "[{}] {:>4}  {}  ({})\n",
                check,
                task.id,
                task.name,
                tags(task).join(", ")
            ));

            let estimates = pomodoro_estimates(task.estimated_minutes, registry)
                .into_iter()
                .map(|(mode, count)| format!("{} {}", mode, count))
                .collect::<Vec<_>>()
                .join(" / ");
            out.push_str(&format!(
                "          {}  pomodoros: {}\n",
                time_text(task.estimated_minutes),
                estimates
            ));
        }
        out
    }

    /// Shows the task list.
    pub fn show_tasks(tasks: &[Task], registry: &ModeRegistry) {
        print!("{}", Self::render_tasks(tasks, registry));
    }

    /// Renders the registered modes.
    pub fn render_modes(registry: &ModeRegistry) -> String {
        registry
            .iter()
            .map(|mode| {
                format!(
                    "{:<10} {:>3} min work  {:>3} min break  {}\n",
                    mode.name, mode.work_minutes, mode.break_minutes, mode.color
                )
            })
            .collect()
    }

    /// Shows the registered modes.
    pub fn show_modes(registry: &ModeRegistry) {
        print!("{}", Self::render_modes(registry));
    }

    /// Renders the clock header and the month grid.
    pub fn render_calendar(now: &DateTime<Local>, month: YearMonth) -> String {
        format!(
            "{}\n{} ({})\n\n{}",
            clock_text(now),
            date_text(now),
            offset_text(now),
            render_month(month, now.date_naive())
        )
    }

    /// Shows the clock and calendar.
    pub fn show_calendar(now: &DateTime<Local>, month: YearMonth) {
        print!("{}", Self::render_calendar(now, month));
    }
}

// ============================================================================
// Tests
// ============================================================================
