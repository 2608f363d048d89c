use std::fmt::Write as _;
use std::io::{self, Write};

use timer_core::{focus_minutes, format_clock, Dot, SessionEngine, Settings, SettingsField};

pub const BAR_WIDTH: usize = 30;

pub const HELP_TEXT: &str = "\
Commands:
  start | pause | toggle (or ENTER)
  reset                     rewind the current phase
  skip                      jump to the next phase, no credit
  set WORK SHORT LONG N     minutes, minutes, minutes, sessions per long break
  status                    show settings and statistics
  help                      this text
  quit";

/// Elapsed part of the phase as a bar; full when the phase is about to end.
pub fn progress_bar(remaining_fraction: f64, width: usize) -> String {
    let elapsed = (1.0 - remaining_fraction).clamp(0.0, 1.0);
    let filled = ((elapsed * width as f64).round() as usize).min(width);
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.extend(std::iter::repeat('#').take(filled));
    bar.extend(std::iter::repeat('-').take(width - filled));
    bar.push(']');
    bar
}

pub fn cycle_dots(dots: &[Dot]) -> String {
    dots.iter()
        .map(|d| match d {
            Dot::Completed => '●',
            Dot::Current => '◉',
            Dot::Pending => '○',
        })
        .collect()
}

pub fn status_line(engine: &SessionEngine) -> String {
    let snap = engine.snapshot();
    let mut line = String::new();
    write!(
        line,
        "{:<11} {} {} {}",
        snap.phase.label(),
        format_clock(snap.current_time),
        progress_bar(engine.remaining_fraction(), BAR_WIDTH),
        cycle_dots(&engine.progress_dots()),
    )
    .ok();
    if !snap.is_running {
        line.push_str(" (paused)");
    }
    line
}

pub fn stats_text(engine: &SessionEngine) -> String {
    let snap = engine.snapshot();
    format!(
        "Sessions: {}  Focus: {} min  Streak: {}",
        snap.completed_sessions,
        focus_minutes(snap.total_focus_time),
        snap.current_streak
    )
}

pub fn settings_text(settings: &Settings) -> String {
    format!(
        "Work {} min, short break {} min, long break {} min, long break every {} sessions",
        settings.work_duration / 60,
        settings.short_break_duration / 60,
        settings.long_break_duration / 60,
        settings.sessions_before_long_break
    )
}

pub fn range_warning(field: SettingsField) -> String {
    let (lo, hi) = field.bounds();
    match field {
        SettingsField::SessionsBeforeLongBreak => {
            format!("warning: {} should be at least {}", field.label(), lo)
        }
        _ => format!(
            "warning: {} should be {}-{} minutes",
            field.label(),
            lo / 60,
            hi / 60
        ),
    }
}

/// Rewrite the status line in place.
pub fn draw_status(out: &mut impl Write, engine: &SessionEngine) -> io::Result<()> {
    write!(out, "\r\x1b[2K{}", status_line(engine))?;
    out.flush()
}

pub fn draw_summary(out: &mut impl Write, engine: &SessionEngine) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", settings_text(engine.settings()))?;
    writeln!(out, "{}", stats_text(engine))?;
    out.flush()
}

pub fn draw_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", HELP_TEXT)?;
    out.flush()
}
