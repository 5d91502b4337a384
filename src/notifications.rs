/// Desktop notification support for session endings
/// Currently only implements macOS notifications
use crate::domain::TimerMode;
use std::io::Write;

#[cfg(target_os = "macos")]
use std::process::Command;

/// Send a notification when a timer session completes
pub fn notify_session_complete(mode: TimerMode) {
    let body = match mode {
        TimerMode::Pomodoro => "Focus session complete. Time for a break.",
        TimerMode::ShortBreak => "Short break over. Back to it.",
        TimerMode::LongBreak => "Long break over. Ready for another round?",
    };

    #[cfg(target_os = "macos")]
    {
        let script = format!(
            r#"display notification "{}" with title "Focusdeck - {}""#,
            body.replace('"', "\\\""),
            mode.name()
        );

        let _ = Command::new("osascript")
            .arg("-e")
            .arg(&script)
            .output();
    }

    #[cfg(not(target_os = "macos"))]
    {
        // No-op on other platforms
        let _ = body;
    }
}

/// Ring the terminal bell (the sound-enabled path)
pub fn terminal_bell() {
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(b"\x07");
    let _ = stdout.flush();
}
