//! Verbosity-gated progress output for the command line

/// Log levels for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Progress and results, no verbose flag
    Normal = 0,
    /// One verbose flag (-v)
    Info = 1,
    /// Two verbose flags (-v -v)
    Debug = 2,
}

/// Prints progress lines to stdout and warnings to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger {
    verbosity: u8,
}

impl Logger {
    pub fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }

    /// Whether a message at `level` would be printed
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.verbosity >= level as u8
    }

    pub fn log(&self, msg: &str, level: LogLevel) {
        if !self.enabled(level) {
            return;
        }
        match level {
            LogLevel::Normal => println!("{msg}"),
            LogLevel::Info => println!("info: {msg}"),
            LogLevel::Debug => println!("dbg: {msg}"),
        }
    }

    /// Always displayed
    pub fn normal(&self, msg: &str) {
        self.log(msg, LogLevel::Normal);
    }

    /// verbose >= 1
    pub fn info(&self, msg: &str) {
        self.log(msg, LogLevel::Info);
    }

    /// verbose >= 2
    pub fn debug(&self, msg: &str) {
        self.log(msg, LogLevel::Debug);
    }

    /// Always displayed, on stderr
    pub fn warn(&self, msg: &str) {
        eprintln!("warn: {msg}");
    }

    /// Print a heading followed by one `  - item` line per entry
    pub fn items<S: AsRef<str>>(&self, heading: &str, items: &[S]) {
        self.normal(heading);
        for item in items {
            self.normal(&format!("  - {}", item.as_ref()));
        }
    }
}
