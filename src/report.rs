//! Reporting capability injected into the pipeline
//!
//! The core never writes to a global logger directly; it reports through a
//! [`Reporter`]. [`LogReporter`] forwards to the `log` facade and
//! [`RecordingReporter`] additionally keeps the lines so they can be copied
//! into the run metadata file.

use std::sync::Mutex;

/// Sink for human-readable progress and warning messages
///
/// Must be `Sync` because the cohort iterator reports from worker threads.
pub trait Reporter: Sync {
    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    /// Called periodically while cohorts are processed
    fn progress(&self, done: usize, total: usize) {
        let percent = if total > 0 {
            done as f64 / total as f64 * 100.0
        } else {
            100.0
        };
        self.info(&format!("Progress: {}/{} ({:.1}%)", done, total, percent));
    }
}

/// Forwards every message to the `log` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn info(&self, message: &str) {
        log::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        log::warn!("{}", message);
    }
}

/// Severity of a recorded line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
}

/// Reporter that logs and buffers every line
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<(Level, String)>>,
    timestamps: bool,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix each buffered line with the wall-clock time
    pub fn with_timestamps() -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            timestamps: true,
        }
    }

    fn record(&self, level: Level, message: &str) {
        let line = if self.timestamps {
            let label = match level {
                Level::Info => "LOG",
                Level::Warn => "WARN",
            };
            format!("[{}] {}: {}", chrono::Local::now().format("%H:%M:%S"), label, message)
        } else {
            message.to_string()
        };
        // A poisoned buffer only loses log lines, never results
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, line));
        }
    }

    /// All buffered lines in arrival order
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.iter().map(|(_, line)| line.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of warnings recorded so far
    pub fn warning_count(&self) -> usize {
        self.lines
            .lock()
            .map(|lines| lines.iter().filter(|(level, _)| *level == Level::Warn).count())
            .unwrap_or(0)
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        log::info!("{}", message);
        self.record(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        log::warn!("{}", message);
        self.record(Level::Warn, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_reporter_keeps_order() {
        let reporter = RecordingReporter::new();
        reporter.info("first");
        reporter.warn("second");
        reporter.progress(1, 4);

        assert_eq!(reporter.lines(), vec!["first", "second", "Progress: 1/4 (25.0%)"]);
        assert_eq!(reporter.warning_count(), 1);
    }

    #[test]
    fn test_timestamped_lines_carry_level() {
        let reporter = RecordingReporter::with_timestamps();
        reporter.warn("cohort excluded");
        let lines = reporter.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("WARN: cohort excluded"));
    }
}
