use serde::{Deserialize, Serialize};

/// Priority of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Sort rank: high sorts before medium sorts before low
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Cycle to the next priority (for the task form)
    pub fn next(&self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium => Self::Low,
            Self::Low => Self::High,
        }
    }
}

/// Task visibility filter for the active list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }

    /// Cycle to the next filter (All -> Active -> Completed -> All)
    pub fn next(&self) -> Self {
        match self {
            Self::All => Self::Active,
            Self::Active => Self::Completed,
            Self::Completed => Self::All,
        }
    }
}

/// Session type for the pomodoro timer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    #[default]
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pomodoro => "Focus",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }

    /// All modes in tab order
    pub fn all() -> &'static [TimerMode] {
        &[Self::Pomodoro, Self::ShortBreak, Self::LongBreak]
    }
}

/// Which main view is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Tasks,
    Timer,
}

/// UI mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Normal,
    TaskForm,
    ListManager,
    TimerConfig,
    ConfirmClear,
}
