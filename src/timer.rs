use crate::domain::TimerMode;
use crate::persistence::{keys, read_json, write_json, KvStore};
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const DEFAULT_POMODORO_MINUTES: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;

/// Per-mode session lengths (in minutes) and the sound preference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerSettings {
    pub pomodoro: u32,
    pub short_break: u32,
    pub long_break: u32,
    pub sound_enabled: bool,
    pub sound_theme: String,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            pomodoro: DEFAULT_POMODORO_MINUTES,
            short_break: DEFAULT_SHORT_BREAK_MINUTES,
            long_break: DEFAULT_LONG_BREAK_MINUTES,
            sound_enabled: true,
            sound_theme: "classic".to_string(),
        }
    }
}

impl TimerSettings {
    /// Configured length of a mode in seconds
    pub fn duration_secs(&self, mode: TimerMode) -> u32 {
        let minutes = match mode {
            TimerMode::Pomodoro => self.pomodoro,
            TimerMode::ShortBreak => self.short_break,
            TimerMode::LongBreak => self.long_break,
        };
        minutes.saturating_mul(60)
    }

    /// Build settings from raw form input. Minute fields that do not parse
    /// to a positive integer fall back to the per-mode default; bad input is
    /// never an error.
    pub fn from_input(
        pomodoro: &str,
        short_break: &str,
        long_break: &str,
        sound_enabled: bool,
        sound_theme: String,
    ) -> Self {
        Self {
            pomodoro: coerce_minutes(pomodoro, DEFAULT_POMODORO_MINUTES),
            short_break: coerce_minutes(short_break, DEFAULT_SHORT_BREAK_MINUTES),
            long_break: coerce_minutes(long_break, DEFAULT_LONG_BREAK_MINUTES),
            sound_enabled,
            sound_theme,
        }
    }
}

fn coerce_minutes(input: &str, fallback: u32) -> u32 {
    input
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|minutes| *minutes >= 1)
        .unwrap_or(fallback)
}

/// The persisted record sufficient to resume after a restart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimerSnapshot {
    seconds: u32,
    is_running: bool,
    last_timestamp: i64,
}

/// Change notification emitted by every state-changing timer operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerChange {
    /// Remaining time or running flag changed
    Snapshot,
    Mode,
    Settings,
    /// A session counted down to zero in real time
    SessionFinished(TimerMode),
}

/// Countdown state machine with three session modes, persisted on every
/// mutation and reconciled against the wall clock on load.
///
/// Every time-dependent operation takes `now_millis` explicitly; the caller
/// owns the clock. The event loop is the only tick driver, and `tick` is a
/// no-op unless the timer is running, so pausing or reaching zero cannot
/// leave a stray countdown behind.
#[derive(Debug)]
pub struct PomodoroTimer {
    mode: TimerMode,
    remaining_seconds: u32,
    is_running: bool,
    last_tick_millis: i64,
    settings: TimerSettings,
    changes: Vec<TimerChange>,
}

impl PomodoroTimer {
    /// Restore the timer from the store, or start fresh with defaults.
    ///
    /// If the persisted snapshot was running, the whole seconds elapsed since
    /// its `lastTimestamp` are subtracted before resuming, so the session
    /// kept counting down while the process was gone. A session that ran out
    /// in the meantime lands in idle at zero; its end-of-session notification
    /// is not replayed.
    pub fn load(store: &mut dyn KvStore, now_millis: i64) -> Result<Self> {
        let settings: TimerSettings =
            read_json(store, keys::POMODORO_SETTINGS)?.unwrap_or_default();
        let mode: TimerMode = read_json(store, keys::POMODORO_MODE)?.unwrap_or_default();
        let snapshot: Option<TimerSnapshot> = read_json(store, keys::POMODORO_TIMER_STATE)?;

        let mut timer = Self {
            mode,
            remaining_seconds: settings.duration_secs(mode),
            is_running: false,
            last_tick_millis: now_millis,
            settings,
            changes: Vec::new(),
        };

        if let Some(snapshot) = snapshot {
            if snapshot.is_running {
                let elapsed = whole_seconds_between(snapshot.last_timestamp, now_millis);
                timer.remaining_seconds = snapshot.seconds.saturating_sub(elapsed);
                if timer.remaining_seconds > 0 {
                    timer.is_running = true;
                }
            } else {
                timer.remaining_seconds = snapshot.seconds;
            }
            timer.persist_snapshot(store)?;
        }

        Ok(timer)
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    /// Configured length of the current mode in seconds
    pub fn session_length_secs(&self) -> u32 {
        self.settings.duration_secs(self.mode)
    }

    /// Fraction of the current session already elapsed, 0.0..=1.0
    pub fn progress(&self) -> f64 {
        let total = self.session_length_secs();
        if total == 0 {
            return 1.0;
        }
        1.0 - (self.remaining_seconds as f64 / total as f64)
    }

    /// Begin counting down. No-op when already running or nothing remains.
    pub fn start(&mut self, store: &mut dyn KvStore, now_millis: i64) -> Result<()> {
        if self.is_running || self.remaining_seconds == 0 {
            return Ok(());
        }
        self.is_running = true;
        self.last_tick_millis = now_millis;
        self.changes.push(TimerChange::Snapshot);
        self.persist_snapshot(store)
    }

    /// Stop counting down, keeping the remaining time. No-op when idle.
    pub fn pause(&mut self, store: &mut dyn KvStore) -> Result<()> {
        if !self.is_running {
            return Ok(());
        }
        self.is_running = false;
        self.changes.push(TimerChange::Snapshot);
        self.persist_snapshot(store)
    }

    /// Stop and restore the current mode's full configured duration
    pub fn reset(&mut self, store: &mut dyn KvStore) -> Result<()> {
        self.is_running = false;
        self.remaining_seconds = self.session_length_secs();
        self.changes.push(TimerChange::Snapshot);
        self.persist_snapshot(store)
    }

    /// Switch session type. Always lands idle at the new mode's full
    /// duration; a running countdown is stopped first. No-op for the
    /// current mode.
    pub fn change_mode(&mut self, store: &mut dyn KvStore, new_mode: TimerMode) -> Result<()> {
        if new_mode == self.mode {
            return Ok(());
        }
        self.is_running = false;
        self.mode = new_mode;
        self.remaining_seconds = self.session_length_secs();
        self.changes.push(TimerChange::Mode);
        self.changes.push(TimerChange::Snapshot);
        self.persist_mode(store)?;
        self.persist_snapshot(store)
    }

    /// Advance the countdown to `now_millis`.
    ///
    /// Called at sub-second polling granularity; state only moves on whole
    /// second boundaries, and always by the wall-clock delta since the last
    /// processed boundary, so delayed or missed polls never desynchronize
    /// the countdown from real elapsed time.
    pub fn tick(&mut self, store: &mut dyn KvStore, now_millis: i64) -> Result<()> {
        if !self.is_running {
            return Ok(());
        }

        let elapsed = whole_seconds_between(self.last_tick_millis, now_millis);
        if elapsed < 1 {
            return Ok(());
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(elapsed);
        self.last_tick_millis = now_millis;

        if self.remaining_seconds == 0 {
            self.is_running = false;
            self.changes.push(TimerChange::SessionFinished(self.mode));
        }
        self.changes.push(TimerChange::Snapshot);
        self.persist_snapshot(store)
    }

    /// Replace the duration configuration and reset the current mode so the
    /// displayed time reflects it
    pub fn configure(&mut self, store: &mut dyn KvStore, settings: TimerSettings) -> Result<()> {
        self.settings = settings;
        self.changes.push(TimerChange::Settings);
        write_json(store, keys::POMODORO_SETTINGS, &self.settings)?;
        self.reset(store)
    }

    /// Take the change notifications accumulated since the last drain
    pub fn drain_changes(&mut self) -> Vec<TimerChange> {
        std::mem::take(&mut self.changes)
    }

    fn persist_snapshot(&self, store: &mut dyn KvStore) -> Result<()> {
        write_json(
            store,
            keys::POMODORO_TIMER_STATE,
            &TimerSnapshot {
                seconds: self.remaining_seconds,
                is_running: self.is_running,
                last_timestamp: self.last_tick_millis,
            },
        )
    }

    fn persist_mode(&self, store: &mut dyn KvStore) -> Result<()> {
        write_json(store, keys::POMODORO_MODE, &self.mode)
    }
}

/// Whole seconds between two epoch-millisecond stamps, floored, never
/// negative (a clock that moved backwards counts as no time passing)
fn whole_seconds_between(from_millis: i64, to_millis: i64) -> u32 {
    let elapsed = (to_millis - from_millis).max(0) / 1000;
    elapsed.min(u32::MAX as i64) as u32
}

/// Format a second count as a countdown clock, e.g. "25:00"
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    const T0: i64 = 1_700_000_000_000;

    fn secs(n: i64) -> i64 {
        T0 + n * 1000
    }

    fn started_timer(store: &mut MemoryStore) -> PomodoroTimer {
        let mut timer = PomodoroTimer::load(store, T0).unwrap();
        timer.start(store, T0).unwrap();
        timer
    }

    #[test]
    fn test_fresh_timer_defaults() {
        let mut store = MemoryStore::new();
        let timer = PomodoroTimer::load(&mut store, T0).unwrap();

        assert_eq!(timer.mode(), TimerMode::Pomodoro);
        assert_eq!(timer.remaining_seconds(), 25 * 60);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_tick_subtracts_elapsed_seconds() {
        for elapsed in [1u32, 5, 60, 299, 1500] {
            let mut store = MemoryStore::new();
            let mut timer = started_timer(&mut store);
            timer.tick(&mut store, secs(elapsed as i64)).unwrap();
            assert_eq!(
                timer.remaining_seconds(),
                1500 - elapsed,
                "elapsed={}",
                elapsed
            );
        }
    }

    #[test]
    fn test_tick_ignores_sub_second_intervals() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);

        timer.tick(&mut store, T0 + 999).unwrap();
        assert_eq!(timer.remaining_seconds(), 1500);

        timer.tick(&mut store, T0 + 1000).unwrap();
        assert_eq!(timer.remaining_seconds(), 1499);
    }

    #[test]
    fn test_tick_derives_from_timestamps_not_poll_count() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);

        // One delayed poll covering 3.7 s advances by 3 whole seconds
        timer.tick(&mut store, T0 + 3700).unwrap();
        assert_eq!(timer.remaining_seconds(), 1497);

        // The 0.7 s remainder is not lost: the next boundary lands at 4.7 s
        timer.tick(&mut store, T0 + 4000).unwrap();
        assert_eq!(timer.remaining_seconds(), 1497);
        timer.tick(&mut store, T0 + 4700).unwrap();
        assert_eq!(timer.remaining_seconds(), 1496);
    }

    #[test]
    fn test_tick_when_idle_is_a_no_op() {
        let mut store = MemoryStore::new();
        let mut timer = PomodoroTimer::load(&mut store, T0).unwrap();

        timer.tick(&mut store, secs(60)).unwrap();
        assert_eq!(timer.remaining_seconds(), 1500);
    }

    #[test]
    fn test_tick_clamps_at_zero_and_finishes() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);
        timer.remaining_seconds = 5;

        timer.tick(&mut store, secs(60)).unwrap();

        assert_eq!(timer.remaining_seconds(), 0);
        assert!(!timer.is_running());
        let changes = timer.drain_changes();
        assert!(changes.contains(&TimerChange::SessionFinished(TimerMode::Pomodoro)));
    }

    #[test]
    fn test_clock_moving_backwards_counts_as_no_time() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);

        timer.tick(&mut store, T0 - 30_000).unwrap();
        assert_eq!(timer.remaining_seconds(), 1500);
        assert!(timer.is_running());
    }

    #[test]
    fn test_full_session_ends_exactly_at_zero() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);

        for i in 1..=1500 {
            timer.tick(&mut store, secs(i)).unwrap();
        }

        assert_eq!(timer.remaining_seconds(), 0);
        assert!(!timer.is_running());
        let finishes = timer
            .drain_changes()
            .into_iter()
            .filter(|c| matches!(c, TimerChange::SessionFinished(_)))
            .count();
        assert_eq!(finishes, 1);

        // Extra ticks after the end change nothing
        timer.tick(&mut store, secs(2000)).unwrap();
        assert_eq!(timer.remaining_seconds(), 0);
        assert!(timer.drain_changes().is_empty());
    }

    #[test]
    fn test_start_is_a_no_op_when_running_or_finished() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);

        // Already running: the tick baseline must not move forward
        timer.start(&mut store, secs(100)).unwrap();
        timer.tick(&mut store, secs(10)).unwrap();
        assert_eq!(timer.remaining_seconds(), 1490);

        // Finished: start must not revive the session
        timer.remaining_seconds = 0;
        timer.is_running = false;
        timer.start(&mut store, secs(200)).unwrap();
        assert!(!timer.is_running());
    }

    #[test]
    fn test_pause_keeps_remaining_and_stops_countdown() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);

        timer.tick(&mut store, secs(100)).unwrap();
        timer.pause(&mut store).unwrap();
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_seconds(), 1400);

        // Time passing while paused is not deducted
        timer.tick(&mut store, secs(500)).unwrap();
        assert_eq!(timer.remaining_seconds(), 1400);

        // Resuming restarts the baseline from the resume instant
        timer.start(&mut store, secs(500)).unwrap();
        timer.tick(&mut store, secs(510)).unwrap();
        assert_eq!(timer.remaining_seconds(), 1390);
    }

    #[test]
    fn test_pause_when_idle_is_a_no_op() {
        let mut store = MemoryStore::new();
        let mut timer = PomodoroTimer::load(&mut store, T0).unwrap();

        timer.pause(&mut store).unwrap();
        assert!(timer.drain_changes().is_empty());
    }

    #[test]
    fn test_reset_restores_configured_duration() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);

        timer.tick(&mut store, secs(300)).unwrap();
        timer.reset(&mut store).unwrap();

        assert_eq!(timer.remaining_seconds(), 1500);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_change_mode_resets_to_new_duration_and_stops() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);
        timer.tick(&mut store, secs(60)).unwrap();

        timer.change_mode(&mut store, TimerMode::ShortBreak).unwrap();

        assert_eq!(timer.mode(), TimerMode::ShortBreak);
        assert_eq!(timer.remaining_seconds(), 5 * 60);
        assert!(!timer.is_running());

        // The new mode survives a reload
        let reloaded = PomodoroTimer::load(&mut store, secs(120)).unwrap();
        assert_eq!(reloaded.mode(), TimerMode::ShortBreak);
        assert_eq!(reloaded.remaining_seconds(), 5 * 60);
    }

    #[test]
    fn test_change_mode_to_current_is_a_no_op() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);
        timer.tick(&mut store, secs(60)).unwrap();
        timer.drain_changes();

        timer.change_mode(&mut store, TimerMode::Pomodoro).unwrap();

        assert!(timer.is_running());
        assert_eq!(timer.remaining_seconds(), 1440);
        assert!(timer.drain_changes().is_empty());
    }

    #[test]
    fn test_resume_after_restart_subtracts_downtime() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);
        timer.tick(&mut store, secs(100)).unwrap();
        drop(timer);

        // 40 s pass while the process is down
        let resumed = PomodoroTimer::load(&mut store, secs(140)).unwrap();
        assert_eq!(resumed.remaining_seconds(), 1500 - 140);
        assert!(resumed.is_running());
    }

    #[test]
    fn test_resume_reconciliation_is_idempotent() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);
        timer.tick(&mut store, secs(100)).unwrap();
        drop(timer);

        // Loading twice at the same instant yields the same state
        let first = PomodoroTimer::load(&mut store, secs(140)).unwrap();
        let again = PomodoroTimer::load(&mut store, secs(140)).unwrap();
        assert_eq!(first.remaining_seconds(), again.remaining_seconds());
        assert_eq!(first.is_running(), again.is_running());
    }

    #[test]
    fn test_session_expiring_while_away_lands_idle_without_notification() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);
        timer.tick(&mut store, secs(100)).unwrap(); // 1400 left
        drop(timer);

        // Far more than the remaining time passes while the app is closed
        let mut resumed = PomodoroTimer::load(&mut store, secs(100 + 5000)).unwrap();
        assert_eq!(resumed.remaining_seconds(), 0);
        assert!(!resumed.is_running());
        // The missed session end is not replayed
        assert!(resumed
            .drain_changes()
            .iter()
            .all(|c| !matches!(c, TimerChange::SessionFinished(_))));
    }

    #[test]
    fn test_resume_at_exact_boundary_lands_idle() {
        let mut store = MemoryStore::new();
        let mut timer = PomodoroTimer::load(&mut store, T0).unwrap();
        timer.remaining_seconds = 100;
        timer.start(&mut store, T0).unwrap();
        drop(timer);

        let resumed = PomodoroTimer::load(&mut store, secs(100)).unwrap();
        assert_eq!(resumed.remaining_seconds(), 0);
        assert!(!resumed.is_running());
    }

    #[test]
    fn test_paused_snapshot_restores_verbatim() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);
        timer.tick(&mut store, secs(100)).unwrap();
        timer.pause(&mut store).unwrap();
        drop(timer);

        // Downtime is irrelevant for a paused snapshot
        let resumed = PomodoroTimer::load(&mut store, secs(99_999)).unwrap();
        assert_eq!(resumed.remaining_seconds(), 1400);
        assert!(!resumed.is_running());
    }

    #[test]
    fn test_load_rejects_malformed_snapshot() {
        let mut store = MemoryStore::new();
        store
            .set(keys::POMODORO_TIMER_STATE, "{broken")
            .unwrap();

        assert!(PomodoroTimer::load(&mut store, T0).is_err());
    }

    #[test]
    fn test_configure_replaces_durations_and_resets() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);
        timer.tick(&mut store, secs(60)).unwrap();

        let settings = TimerSettings::from_input("50", "10", "20", false, "digital".into());
        timer.configure(&mut store, settings).unwrap();

        assert_eq!(timer.remaining_seconds(), 50 * 60);
        assert!(!timer.is_running());
        assert_eq!(timer.settings().short_break, 10);
        assert!(!timer.settings().sound_enabled);

        // New settings survive a reload
        let reloaded = PomodoroTimer::load(&mut store, secs(120)).unwrap();
        assert_eq!(reloaded.settings().pomodoro, 50);
        assert_eq!(reloaded.settings().sound_theme, "digital");
    }

    #[test]
    fn test_invalid_duration_input_falls_back_to_defaults() {
        let settings =
            TimerSettings::from_input("abc", "0", "-5", true, "classic".into());
        assert_eq!(settings.pomodoro, 25);
        assert_eq!(settings.short_break, 5);
        assert_eq!(settings.long_break, 15);

        let settings = TimerSettings::from_input(" 45 ", "", "90", true, "classic".into());
        assert_eq!(settings.pomodoro, 45);
        assert_eq!(settings.short_break, 5);
        assert_eq!(settings.long_break, 90);
    }

    #[test]
    fn test_progress_fraction() {
        let mut store = MemoryStore::new();
        let mut timer = started_timer(&mut store);

        assert!(timer.progress().abs() < f64::EPSILON);
        timer.tick(&mut store, secs(750)).unwrap();
        assert!((timer.progress() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(5400), "90:00");
    }
}
