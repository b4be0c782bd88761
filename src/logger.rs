use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub enum LogOutput {
    Stdout,
    Stderr,
}

pub struct Logger {
    pub write_to_std: Option<LogOutput>,
    pub severity: Level,
    pub file: Option<Mutex<File>>,
    pub enable_colors: bool,
}

impl Logger {
    /// Create a new logger; `file_path` of `None` logs to the standard streams only
    pub fn new(
        file_path: Option<PathBuf>,
        severity: Option<Level>,
        write_to_std: Option<LogOutput>,
        enable_colors: bool,
    ) -> Self {
        let file = file_path.and_then(|path| {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            OpenOptions::new().create(true).append(true).open(path).ok().map(Mutex::new)
        });

        Logger {
            write_to_std,
            severity: severity.unwrap_or(Level::Info),
            file,
            enable_colors,
        }
    }

    fn timestamp() -> String {
        OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "-".to_string())
    }

    /// Get color code for log level
    fn color(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[36m",
            Level::Debug => "\x1b[35m",
            Level::Trace => "\x1b[37m",
        }
    }

    /// Initialize logger with environment variables
    ///
    /// `TUTORIAL_LOG` (or `RUST_LOG`) sets the level, `TUTORIAL_LOG_FILE` names a
    /// file to append to, and `NO_COLOR` disables ANSI colours.
    pub fn init() -> Result<(), log::SetLoggerError> {
        let severity = std::env::var("TUTORIAL_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string())
            .parse::<Level>()
            .unwrap_or(Level::Info);

        let file_path = std::env::var("TUTORIAL_LOG_FILE").ok().map(PathBuf::from);
        let enable_colors = std::env::var("NO_COLOR").is_err();

        let logger = Logger::new(file_path, Some(severity), Some(LogOutput::Stderr), enable_colors);
        log::set_max_level(LevelFilter::Trace);
        log::set_logger(Box::leak(Box::new(logger)))?;
        Ok(())
    }

    fn format_line(&self, record: &Record, colored: bool) -> String {
        let timestamp = Self::timestamp();
        let level = record.level().as_str();
        let target = record.target();
        let args = record.args();
        if colored {
            let color = Self::color(record.level());
            format!("{color}[{timestamp}] {level:<5}\x1b[0m {target}: {args}\n")
        } else {
            format!("[{timestamp}] {level:<5} {target}: {args}\n")
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // Dependencies (sqlx, hyper) are noisy below info.
        let ours = metadata.target().starts_with("tutorial_wiki");
        metadata.level() <= self.severity && (ours || metadata.level() <= Level::Info)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if let Some(output) = &self.write_to_std {
            let line = self.format_line(record, self.enable_colors);
            let _ = match output {
                LogOutput::Stdout => std::io::stdout().write_all(line.as_bytes()),
                LogOutput::Stderr => std::io::stderr().write_all(line.as_bytes()),
            };
        }

        if let Some(file) = &self.file {
            if let Ok(mut guard) = file.lock() {
                let _ = guard.write_all(self.format_line(record, false).as_bytes());
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
        if let Some(file) = &self.file {
            if let Ok(mut guard) = file.lock() {
                let _ = guard.flush();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_output_is_uncolored_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("wiki.log");
        let logger = Logger::new(Some(path.clone()), Some(Level::Info), None, true);

        logger.log(
            &Record::builder()
                .args(format_args!("page created"))
                .level(Level::Info)
                .target("tutorial_wiki::services")
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("too chatty"))
                .level(Level::Debug)
                .target("tutorial_wiki::services")
                .build(),
        );
        logger.flush();

        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("INFO  tutorial_wiki::services: page created"));
        assert!(!written.contains("too chatty"));
        assert!(!written.contains("\x1b["));
    }

    #[test]
    fn dependency_debug_is_hidden() {
        let logger = Logger::new(None, Some(Level::Trace), None, false);
        let ours = Metadata::builder().level(Level::Debug).target("tutorial_wiki::routes").build();
        let theirs = Metadata::builder().level(Level::Debug).target("sqlx::query").build();
        assert!(logger.enabled(&ours));
        assert!(!logger.enabled(&theirs));
    }
}
