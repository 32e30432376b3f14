//! Projection of timer state into renderable values.
//!
//! Everything here is a pure function of a [`TimerState`]; it is safe to
//! call on every tick.

use std::f64::consts::PI;

use crate::types::TimerState;

/// Radius of the progress ring drawn by graphical render targets.
pub const RING_RADIUS: f64 = 90.0;

/// Circumference of the progress ring.
pub const RING_CIRCUMFERENCE: f64 = 2.0 * PI * RING_RADIUS;

/// Renderable view of a timer state.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Remaining time as `mm:ss`
    pub time_text: String,
    /// "WORK" or "BREAK"
    pub phase_label: &'static str,
    /// Elapsed fraction of the phase in `[0, 1]`
    pub progress: f64,
}

/// Projects a timer state into display values.
pub fn project(state: &TimerState) -> Projection {
    Projection {
        time_text: format_time(state.remaining_seconds),
        phase_label: state.phase.label(),
        progress: progress_fraction(state.remaining_seconds, state.total_seconds),
    }
}

/// Formats seconds as zero-padded `mm:ss`. Minutes are not wrapped at 60.
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// `1 - remaining / total`, clamped to `[0, 1]`; 0 when `total` is 0.
pub fn progress_fraction(remaining_seconds: u32, total_seconds: u32) -> f64 {
    if total_seconds == 0 {
        return 0.0;
    }
    let fraction = 1.0 - f64::from(remaining_seconds) / f64::from(total_seconds);
    fraction.clamp(0.0, 1.0)
}

/// Window / terminal title, e.g. `"24:59 - Work | Pomodoro"`.
pub fn title_text(state: &TimerState) -> String {
    format!(
        "{} - {} | Pomodoro",
        format_time(state.remaining_seconds),
        state.phase.title()
    )
}

/// Stroke dash offset of the progress ring for the given progress.
pub fn ring_dash_offset(progress: f64) -> f64 {
    RING_CIRCUMFERENCE * (1.0 - progress.clamp(0.0, 1.0))
}

/// Text progress bar of `width` cells.
pub fn progress_bar(progress: f64, width: usize) -> String {
    let filled = (progress.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
