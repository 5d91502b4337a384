use crate::domain::{AppSettings, Priority};
use ratatui::style::{Color, Modifier, Style};

/// Resolved display colors, derived from the configured accent color.
/// Lighter and darker variants are computed, not configured.
pub struct Theme {
    pub accent: Color,
    pub accent_light: Color,
    pub accent_dark: Color,
    pub dark_mode: bool,
}

impl Theme {
    pub fn from_settings(settings: &AppSettings) -> Self {
        // Fall back to the default purple if the stored hex is unusable
        let (r, g, b) = parse_hex(&settings.accent_color).unwrap_or((0x97, 0x64, 0xc7));
        Self {
            accent: Color::Rgb(r, g, b),
            accent_light: shift_color(r, g, b, 15),
            accent_dark: shift_color(r, g, b, -15),
            dark_mode: settings.dark_mode,
        }
    }

    /// Default text style
    pub fn text(&self) -> Style {
        if self.dark_mode {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::Black)
        }
    }

    /// Dimmed text for hints and secondary info
    pub fn dim(&self) -> Style {
        Style::default().fg(Color::DarkGray)
    }

    /// Pane title style
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Selected row highlight
    pub fn selected(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.accent_light)
            .add_modifier(Modifier::BOLD)
    }

    /// Border style
    pub fn border(&self) -> Style {
        Style::default().fg(Color::Gray)
    }

    /// Completed task style
    pub fn done(&self) -> Style {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    }

    /// Running countdown badge
    pub fn running(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Paused countdown badge
    pub fn paused(&self) -> Style {
        Style::default().fg(Color::Yellow)
    }

    /// Progress gauge style
    pub fn gauge(&self) -> Style {
        Style::default().fg(self.accent_dark).bg(Color::DarkGray)
    }

    /// Modal background style
    pub fn modal_bg(&self) -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    /// Modal title / highlighted key style
    pub fn modal_title(&self) -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    /// Priority indicator style
    pub fn priority(&self, priority: Priority) -> Style {
        let color = match priority {
            Priority::High => Color::Red,
            Priority::Medium => Color::Yellow,
            Priority::Low => Color::Green,
        };
        Style::default().fg(color)
    }
}

/// Parse "#rrggbb" into its channels
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    Some(((value >> 16) as u8, (value >> 8 & 0xff) as u8, (value & 0xff) as u8))
}

/// Lighten (positive percent) or darken (negative) a color by shifting each
/// channel 2.55 units per percent point, clamped to the channel range
fn shift_color(r: u8, g: u8, b: u8, percent: i32) -> Color {
    let amount = (2.55 * percent as f64).round() as i32;
    let clamp = |channel: u8| (channel as i32 + amount).clamp(0, 255) as u8;
    Color::Rgb(clamp(r), clamp(g), clamp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#9764c7"), Some((0x97, 0x64, 0xc7)));
        assert_eq!(parse_hex("#000000"), Some((0, 0, 0)));
        assert_eq!(parse_hex("#ffffff"), Some((255, 255, 255)));
        assert_eq!(parse_hex("9764c7"), None);
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_shift_color_lightens_and_darkens() {
        // 15% is a 38-unit shift per channel
        assert_eq!(
            shift_color(0x97, 0x64, 0xc7, 15),
            Color::Rgb(189, 138, 237)
        );
        assert_eq!(
            shift_color(0x97, 0x64, 0xc7, -15),
            Color::Rgb(113, 62, 161)
        );
    }

    #[test]
    fn test_shift_color_clamps_at_channel_bounds() {
        assert_eq!(shift_color(250, 250, 250, 15), Color::Rgb(255, 255, 255));
        assert_eq!(shift_color(5, 5, 5, -15), Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_theme_survives_malformed_accent() {
        let settings = AppSettings {
            accent_color: "purple".to_string(),
            ..AppSettings::default()
        };
        let theme = Theme::from_settings(&settings);
        assert_eq!(theme.accent, Color::Rgb(0x97, 0x64, 0xc7));
    }
}
