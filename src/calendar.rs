//! Clock and month calendar.

use chrono::{DateTime, Datelike, Local, NaiveDate, Offset, TimeZone};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Weekday header, Sunday first.
pub const WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

// ============================================================================
// Clock
// ============================================================================

/// 24-hour clock text, `HH:MM:SS`.
pub fn clock_text<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%H:%M:%S").to_string()
}

/// Long date, e.g. `"Monday, October 19, 2026"`.
pub fn date_text<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%A, %B %-d, %Y").to_string()
}

/// UTC offset, e.g. `"UTC+09:00"`, or `"UTC"` at zero.
pub fn offset_text<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    let seconds = now.offset().fix().local_minus_utc();
    if seconds == 0 {
        return "UTC".to_string();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("UTC{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

// ============================================================================
// Month grid
// ============================================================================

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    year: i32,
    /// 1-based month, always within 1..=12
    month: u32,
}

impl YearMonth {
    /// Creates a month, or None if `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1-based month number.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The current local month.
    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    /// Previous month, wrapping into the previous year.
    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                month: self.month - 1,
                ..self
            }
        }
    }

    /// Next month, wrapping into the next year.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                month: self.month + 1,
                ..self
            }
        }
    }

    /// `"October 2026"`.
    pub fn title(&self) -> String {
        let name = self
            .month
            .checked_sub(1)
            .and_then(|i| MONTH_NAMES.get(i as usize))
            .unwrap_or(&"");
        format!("{} {}", name, self.year)
    }

    fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Number of days in the month.
    pub fn days(&self) -> u32 {
        let next = self.next();
        match (self.first_day(), next.first_day()) {
            (Some(first), Some(after)) => (after - first).num_days() as u32,
            _ => 0,
        }
    }
}

/// One cell of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    /// Belongs to the previous or next month
    pub other_month: bool,
    pub today: bool,
}

/// Month grid in whole weeks starting on Sunday.
///
/// Leading cells are the last days of the previous month; trailing cells
/// are the first days of the next month.
pub fn month_grid(month: YearMonth, today: NaiveDate) -> Vec<DayCell> {
    let Some(first) = month.first_day() else {
        return Vec::new();
    };
    let leading = first.weekday().num_days_from_sunday();
    let days = month.days();
    let prev_days = month.prev().days();
    let is_current = YearMonth::of(today) == month;

    let mut cells = Vec::with_capacity(42);
    for i in (0..leading).rev() {
        cells.push(DayCell {
            day: prev_days.saturating_sub(i),
            other_month: true,
            today: false,
        });
    }
    for day in 1..=days {
        cells.push(DayCell {
            day,
            other_month: false,
            today: is_current && today.day() == day,
        });
    }
    let trailing = (7 - cells.len() % 7) % 7;
    for day in 1..=trailing as u32 {
        cells.push(DayCell {
            day,
            other_month: true,
            today: false,
        });
    }
    cells
}

/// Renders the month as text. Today is bracketed; days of other months
/// are left blank.
pub fn render_month(month: YearMonth, today: NaiveDate) -> String {
    let mut out = format!("{:^28}\n", month.title());
    for name in WEEKDAYS {
        out.push_str(&format!(" {} ", name));
    }
    out.push('\n');

    for week in month_grid(month, today).chunks(7) {
        for cell in week {
            let text = if cell.today {
                format!("[{:>2}]", cell.day)
            } else if cell.other_month {
                "    ".to_string()
            } else {
                format!(" {:>2} ", cell.day)
            };
            out.push_str(&text);
        }
        out.push('\n');
    }
    out
}
