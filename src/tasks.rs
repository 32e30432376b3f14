//! Task list helpers.
//!
//! Builds and validates new tasks and derives the per-task display values:
//! estimated time, pomodoro counts per mode and category label.

use thiserror::Error;

use crate::types::{ModeRegistry, NewTask, Task};

/// Categories offered when creating a task.
pub const CATEGORIES: [&str; 4] = ["university", "work", "personal", "other"];

/// Category assumed for tasks stored without one.
pub const DEFAULT_CATEGORY: &str = "university";

/// Errors raised while building a new task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task name must not be empty")]
    EmptyName,

    #[error("estimated time must be greater than zero")]
    NoEstimate,

    #[error("estimated time is too large ({hours}h {minutes}m)")]
    EstimateTooLarge { hours: u32, minutes: u32 },

    #[error("unknown category '{0}' (expected one of university, work, personal, other)")]
    UnknownCategory(String),
}

/// Input for a new task before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub hours: u32,
    pub minutes: u32,
    pub category: String,
    pub custom_category: String,
    pub course: String,
    pub priority: String,
    pub urgency: String,
}

impl TaskDraft {
    /// Validates the draft and builds the API payload.
    ///
    /// The course is kept only for university tasks and the custom
    /// category only for "other".
    pub fn build(self) -> Result<NewTask, TaskError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(TaskError::EmptyName);
        }
        let estimated_minutes = self
            .hours
            .checked_mul(60)
            .and_then(|m| m.checked_add(self.minutes))
            .ok_or(TaskError::EstimateTooLarge {
                hours: self.hours,
                minutes: self.minutes,
            })?;
        if estimated_minutes == 0 {
            return Err(TaskError::NoEstimate);
        }
        let category = if self.category.is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            self.category.to_lowercase()
        };
        if !CATEGORIES.contains(&category.as_str()) {
            return Err(TaskError::UnknownCategory(category));
        }

        let course = if category == "university" {
            self.course
        } else {
            String::new()
        };
        let custom_category = if category == "other" {
            self.custom_category.trim().to_string()
        } else {
            String::new()
        };

        Ok(NewTask {
            name,
            estimated_minutes,
            category,
            custom_category,
            course,
            priority: self.priority,
            urgency: self.urgency,
        })
    }
}

/// `"1h 30m"` for 90 minutes, `"45m"` below an hour.
pub fn time_text(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// Number of work phases needed for `minutes` of work in each mode.
pub fn pomodoro_estimates(minutes: u32, registry: &ModeRegistry) -> Vec<(String, u32)> {
    registry
        .iter()
        .map(|mode| (mode.name.clone(), minutes.div_ceil(mode.work_minutes)))
        .collect()
}

/// Category shown for a task; "other" shows the custom label when set.
pub fn category_label(task: &Task) -> &str {
    let category = task
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY);
    if category == "other" {
        if let Some(custom) = task.custom_category.as_deref().filter(|c| !c.is_empty()) {
            return custom;
        }
    }
    category
}

/// Tags shown after the task name: category, course, priority, urgency.
pub fn tags(task: &Task) -> Vec<String> {
    let mut tags = vec![category_label(task).to_string()];
    for tag in [&task.course, &task.priority, &task.urgency]
        .into_iter()
        .flatten()
    {
        if !tag.is_empty() {
            tags.push(tag.clone());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mode;

    fn task(category: Option<&str>, custom: Option<&str>) -> Task {
        Task {
            id: 1,
            name: "Read".to_string(),
            estimated_minutes: 90,
            completed: false,
            category: category.map(str::to_string),
            custom_category: custom.map(str::to_string),
            course: None,
            priority: None,
            urgency: None,
        }
    }

    mod draft_tests {
        use super::*;

        fn draft() -> TaskDraft {
            TaskDraft {
                name: "Essay".to_string(),
                hours: 1,
                minutes: 30,
                category: "university".to_string(),
                course: "HIST 101".to_string(),
                ..TaskDraft::default()
            }
        }

        #[test]
        fn test_build_valid() {
            let task = draft().build().unwrap();
            assert_eq!(task.name, "Essay");
            assert_eq!(task.estimated_minutes, 90);
            assert_eq!(task.course, "HIST 101");
        }

        #[test]
        fn test_blank_name_rejected() {
            let result = TaskDraft {
                name: "   ".to_string(),
                ..draft()
            }
            .build();
            assert_eq!(result, Err(TaskError::EmptyName));
        }

        #[test]
        fn test_zero_estimate_rejected() {
            let result = TaskDraft {
                hours: 0,
                minutes: 0,
                ..draft()
            }
            .build();
            assert_eq!(result, Err(TaskError::NoEstimate));
        }

        #[test]
        fn test_overflowing_estimate_rejected() {
            let result = TaskDraft {
                hours: u32::MAX / 60 + 1,
                minutes: 0,
                ..draft()
            }
            .build();
            assert!(matches!(result, Err(TaskError::EstimateTooLarge { .. })));

            let result = TaskDraft {
                hours: u32::MAX / 60,
                minutes: u32::MAX,
                ..draft()
            }
            .build();
            assert!(matches!(result, Err(TaskError::EstimateTooLarge { .. })));
        }

        #[test]
        fn test_course_dropped_outside_university() {
            let task = TaskDraft {
                category: "work".to_string(),
                ..draft()
            }
            .build()
            .unwrap();
            assert!(task.course.is_empty());
        }

        #[test]
        fn test_custom_category_only_for_other() {
            let task = TaskDraft {
                category: "other".to_string(),
                custom_category: " Gym ".to_string(),
                ..draft()
            }
            .build()
            .unwrap();
            assert_eq!(task.custom_category, "Gym");

            let task = TaskDraft {
                custom_category: "Gym".to_string(),
                ..draft()
            }
            .build()
            .unwrap();
            assert!(task.custom_category.is_empty());
        }

        #[test]
        fn test_unknown_category() {
            let result = TaskDraft {
                category: "hobby".to_string(),
                ..draft()
            }
            .build();
            assert!(matches!(result, Err(TaskError::UnknownCategory(_))));
        }

        #[test]
        fn test_empty_category_defaults() {
            let task = TaskDraft {
                category: String::new(),
                ..draft()
            }
            .build()
            .unwrap();
            assert_eq!(task.category, DEFAULT_CATEGORY);
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn test_time_text() {
            assert_eq!(time_text(90), "1h 30m");
            assert_eq!(time_text(60), "1h 0m");
            assert_eq!(time_text(45), "45m");
        }

        #[test]
        fn test_pomodoro_estimates() {
            let estimates = pomodoro_estimates(90, &ModeRegistry::reference());
            assert_eq!(
                estimates,
                vec![
                    ("light".to_string(), 4),
                    ("medium".to_string(), 3),
                    ("deep".to_string(), 2)
                ]
            );
        }

        #[test]
        fn test_pomodoro_estimates_exact_multiple() {
            let mut registry = ModeRegistry::new();
            registry.register(Mode::light()).unwrap();
            assert_eq!(pomodoro_estimates(50, &registry)[0].1, 2);
            assert_eq!(pomodoro_estimates(1, &registry)[0].1, 1);
        }

        #[test]
        fn test_category_label() {
            assert_eq!(category_label(&task(None, None)), "university");
            assert_eq!(category_label(&task(Some("work"), None)), "work");
            assert_eq!(category_label(&task(Some("other"), Some("Gym"))), "Gym");
            assert_eq!(category_label(&task(Some("other"), Some(""))), "other");
        }

        #[test]
        fn test_tags() {
            let mut t = task(Some("university"), None);
            t.course = Some("MATH 2".to_string());
            t.priority = Some("high".to_string());
            t.urgency = Some(String::new());
            assert_eq!(tags(&t), vec!["university", "MATH 2", "high"]);
        }
    }
}
