//! Per-run progress log
//!
//! A [`RunLog`] keeps the timestamped lines a caller shows next to the
//! results, optionally streaming them to a file as they happen. Every line is
//! mirrored to the `log` facade as well.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use log::Level;

/// Timestamped progress messages of a single run
pub struct RunLog {
    lines: Vec<String>,
    sink: Option<Box<dyn Write + Send>>,
    /// First sink write failure; later writes are skipped
    sink_error: Option<io::Error>,
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RunLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLog")
            .field("lines", &self.lines.len())
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

impl RunLog {
    /// In-memory log only
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            sink: None,
            sink_error: None,
        }
    }

    /// Stream lines to a writer as they are recorded
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Some(Box::new(writer)),
            ..Self::new()
        }
    }

    /// Append lines to a log file, creating it if needed
    pub fn append_to(path: &Path) -> io::Result<Self> {
        let file = File::options().create(true).append(true).open(path)?;
        Ok(Self::with_writer(file))
    }

    /// Record a message at the given level
    pub fn record(&mut self, level: Level, message: impl AsRef<str>) {
        let message = message.as_ref();
        log::log!(level, "{message}");

        let line = format!(
            "{} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level,
            message
        );
        if self.sink_error.is_none() {
            if let Some(sink) = self.sink.as_mut() {
                if let Err(err) = writeln!(sink, "{line}").and_then(|_| sink.flush()) {
                    log::warn!("Run log sink failed, continuing in memory: {err}");
                    self.sink_error = Some(err);
                }
            }
        }
        self.lines.push(line);
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.record(Level::Info, message);
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.record(Level::Warn, message);
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        self.record(Level::Error, message);
    }

    /// Lines recorded so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Error from the streaming sink, if it failed
    pub fn sink_error(&self) -> Option<&io::Error> {
        self.sink_error.as_ref()
    }
}

/// Record on an optional run log
pub(crate) fn note(log: &mut Option<&mut RunLog>, level: Level, message: impl AsRef<str>) {
    match log {
        Some(run_log) => run_log.record(level, message),
        None => log::log!(level, "{}", message.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_line_format() {
        let mut log = RunLog::new();
        log.info("stiffness matrix completed");
        log.warn("solver fell back");
        let lines = log.lines();
        assert_eq!(lines.len(), 2);
        // "YYYY-MM-DD HH:MM:SS - INFO - ..."
        assert_eq!(&lines[0][4..5], "-");
        assert_eq!(&lines[0][19..], " - INFO - stiffness matrix completed");
        assert!(lines[1].ends_with(" - WARN - solver fell back"));
    }

    #[test]
    fn test_writer_receives_lines() {
        let shared = Shared::default();
        let mut log = RunLog::with_writer(shared.clone());
        log.info("first");
        log.error("second");
        let text = String::from_utf8(shared.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("ERROR - second"));
        assert!(log.sink_error().is_none());
    }

    #[test]
    fn test_file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        {
            let mut log = RunLog::append_to(&path).unwrap();
            log.info("one");
        }
        {
            let mut log = RunLog::append_to(&path).unwrap();
            log.info("two");
        }
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
