// Standard library
use std::env;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// Internal imports
use crate::fields::Fields;
use crate::level::Level;

/// Configuration for a [`LogFacade`](crate::LogFacade)
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub level: Level,
    pub output: LogOutput,
    pub initial_fields: Fields,
    pub on_fatal: FatalAction,
}

/// Destination of every record written by one facade.
#[derive(Debug, Clone, Default)]
pub enum LogOutput {
    #[default]
    Stderr,
    Stdout,
    /// Appended to; parent directories are created on open.
    File(PathBuf),
    Writer(SharedWriter),
}

/// What happens after a fatal record has been flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalAction {
    /// Terminate the process with the given status code.
    Exit(i32),
    /// Unwind the calling thread instead of exiting.
    Panic,
}

impl Default for FatalAction {
    fn default() -> Self {
        FatalAction::Exit(1)
    }
}

/// A caller-provided writer, shared between the config and the sink built from it.
#[derive(Clone)]
pub struct SharedWriter(Arc<Mutex<Box<dyn Write + Send>>>);

impl SharedWriter {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self(Arc::new(Mutex::new(Box::new(writer))))
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut writer = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let mut writer = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut writer = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.flush()
    }
}

impl fmt::Debug for SharedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedWriter")
    }
}

impl LogConfig {
    /// Create configuration from environment variables
    ///
    /// - `LOG_LEVEL`: `DEBUG`, `INFO`, `WARNING`, `ERROR` or `FATAL` (exact match)
    /// - `LOG_OUTPUT`: `stderr`, `stdout` or `file`
    /// - `LOG_FILE`: path used when `LOG_OUTPUT=file`
    ///
    /// Missing or unrecognized values keep their defaults.
    pub fn from_env() -> Self {
        Self {
            level: parse_log_level(),
            output: parse_log_output(),
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_initial_fields(mut self, fields: Fields) -> Self {
        self.initial_fields = fields;
        self
    }

    pub fn with_fatal_action(mut self, action: FatalAction) -> Self {
        self.on_fatal = action;
        self
    }
}

// Environment variable parsing functions

fn parse_log_level() -> Level {
    env::var("LOG_LEVEL")
        .map(|name| Level::from_name(&name))
        .unwrap_or_default()
}

fn parse_log_output() -> LogOutput {
    env::var("LOG_OUTPUT")
        .ok()
        .and_then(|s| match s.to_lowercase().as_str() {
            "stderr" => Some(LogOutput::Stderr),
            "stdout" => Some(LogOutput::Stdout),
            "file" => determine_file_path().map(LogOutput::File),
            _ => None,
        })
        .unwrap_or_default()
}

fn determine_file_path() -> Option<PathBuf> {
    env::var("LOG_FILE")
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::cache_dir().map(|dir| dir.join("logo").join("logo.log")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("LOG_LEVEL");
        env::remove_var("LOG_OUTPUT");
        env::remove_var("LOG_FILE");
    }

    #[test]
    fn test_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::Info);
        assert!(matches!(config.output, LogOutput::Stderr));
        assert!(config.initial_fields.is_empty());
        assert_eq!(config.on_fatal, FatalAction::Exit(1));
    }

    #[test]
    fn test_from_env() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
        clear_env();

        env::set_var("LOG_LEVEL", "WARNING");
        env::set_var("LOG_OUTPUT", "file");
        env::set_var("LOG_FILE", "/tmp/logo-test.log");
        let config = LogConfig::from_env();
        assert_eq!(config.level, Level::Warning);
        match config.output {
            LogOutput::File(path) => assert_eq!(path, PathBuf::from("/tmp/logo-test.log")),
            other => panic!("expected file output, got {other:?}"),
        }

        clear_env();
    }

    #[test]
    fn test_from_env_unrecognized_values() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
        clear_env();

        env::set_var("LOG_LEVEL", "warning");
        env::set_var("LOG_OUTPUT", "syslog");
        let config = LogConfig::from_env();
        assert_eq!(config.level, Level::Info);
        assert!(matches!(config.output, LogOutput::Stderr));

        env::set_var("LOG_OUTPUT", "STDOUT");
        assert!(matches!(LogConfig::from_env().output, LogOutput::Stdout));

        clear_env();
    }

    #[test]
    fn test_builder_methods() {
        let config = LogConfig::default()
            .with_level(Level::Debug)
            .with_output(LogOutput::Stdout)
            .with_initial_fields(crate::fields! { "service" => "billing" })
            .with_fatal_action(FatalAction::Panic);

        assert_eq!(config.level, Level::Debug);
        assert!(matches!(config.output, LogOutput::Stdout));
        assert_eq!(config.initial_fields.len(), 1);
        assert_eq!(config.on_fatal, FatalAction::Panic);
    }
}
