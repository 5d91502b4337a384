use serde::{Deserialize, Serialize};

/// Accent colors offered by the theme picker; the first is the default
pub const ACCENT_PALETTE: &[&str] = &[
    "#9764c7", "#4a90d9", "#27ae60", "#e67e22", "#e74c3c", "#f1c40f",
];

/// Application-wide display and behavior settings
///
/// Missing fields fall back to defaults on load, so a settings record from
/// an older backup still imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub dark_mode: bool,
    pub accent_color: String,
    pub notifications_enabled: bool,
    /// Daily reminder time as "HH:MM"
    pub reminder_time: String,
    pub sync_enabled: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            accent_color: ACCENT_PALETTE[0].to_string(),
            notifications_enabled: false,
            reminder_time: "09:00".to_string(),
            sync_enabled: false,
        }
    }
}

impl AppSettings {
    /// Advance the accent color to the next palette entry. An accent that is
    /// not in the palette (e.g. from an imported backup) restarts at the
    /// first entry.
    pub fn cycle_accent(&mut self) {
        let position = ACCENT_PALETTE
            .iter()
            .position(|c| *c == self.accent_color);
        let next = match position {
            Some(i) => (i + 1) % ACCENT_PALETTE.len(),
            None => 0,
        };
        self.accent_color = ACCENT_PALETTE[next].to_string();
    }
}
