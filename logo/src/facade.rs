//! The logging facade.
//!
//! A [`LogFacade`] owns one configured logger: a severity threshold, one
//! output sink and a set of initial fields written on every record. It is
//! immutable once built and cheap to clone; clones share the same logger.
//!
//! ## Usage
//!
//! ```rust
//! use logo::{fields, LogFacade};
//!
//! let logger = LogFacade::new("WARNING", Some(fields! { "service" => "billing" }));
//!
//! logger.info("suppressed below WARNING", None);
//! logger.warning("disk usage high", Some(&fields! { "percent" => 91 }));
//! logger.close();
//! ```

use std::fmt;
use std::panic::Location;
use std::process;
use std::sync::{Arc, OnceLock};

use chrono::Local;

use crate::config::{FatalAction, LogConfig};
use crate::encoder::{self, Caller, Entry};
use crate::error::Result;
use crate::fields::{self, Fields};
use crate::level::Level;
use crate::sink::Sink;

/// Process-wide fallback used when no facade is bound
static DEFAULT_FACADE: OnceLock<LogFacade> = OnceLock::new();

/// Leveled, structured JSON logger handle.
#[derive(Clone)]
pub struct LogFacade {
    inner: Arc<Inner>,
}

struct Inner {
    level: Level,
    initial_fields: Fields,
    on_fatal: FatalAction,
    sink: Arc<Sink>,
}

impl LogFacade {
    /// Build a facade writing JSON to stderr.
    ///
    /// `level_name` is resolved with [`Level::from_name`], so unknown names
    /// yield an `INFO` threshold. A facade that cannot be built terminates the
    /// process: nothing downstream is expected to run without a logger.
    pub fn new(level_name: &str, initial_fields: Option<Fields>) -> Self {
        Self::try_new(level_name, initial_fields).unwrap_or_else(|e| abort_construction(e))
    }

    /// Like [`LogFacade::new`] but reports construction failure to the caller.
    pub fn try_new(level_name: &str, initial_fields: Option<Fields>) -> Result<Self> {
        Self::from_config(
            LogConfig::default()
                .with_level(Level::from_name(level_name))
                .with_initial_fields(initial_fields.unwrap_or_default()),
        )
    }

    /// Build a facade from a full configuration.
    pub fn from_config(config: LogConfig) -> Result<Self> {
        let sink = Sink::open(&config.output)?;
        Ok(Self {
            inner: Arc::new(Inner {
                level: config.level,
                initial_fields: config.initial_fields,
                on_fatal: config.on_fatal,
                sink: Arc::new(sink),
            }),
        })
    }

    /// Like [`LogFacade::from_config`], terminating the process on failure.
    pub fn build(config: LogConfig) -> Self {
        Self::from_config(config).unwrap_or_else(|e| abort_construction(e))
    }

    /// Minimum severity this facade writes.
    pub fn level(&self) -> Level {
        self.inner.level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.inner.level
    }

    pub fn initial_fields(&self) -> &Fields {
        &self.inner.initial_fields
    }

    /// Derive a child logger that shares this facade's sink and threshold and
    /// adds `fields` to every record it writes.
    pub fn with_fields(&self, fields: &Fields) -> Self {
        let mut initial_fields = self.inner.initial_fields.clone();
        fields::merge(&mut initial_fields, fields);
        Self {
            inner: Arc::new(Inner {
                level: self.inner.level,
                initial_fields,
                on_fatal: self.inner.on_fatal,
                sink: Arc::clone(&self.inner.sink),
            }),
        }
    }

    /// Emit one record at `level`. A `Fatal` record terminates afterwards,
    /// exactly as [`LogFacade::fatal`] does.
    #[track_caller]
    pub fn log(&self, level: Level, message: &str, fields: Option<&Fields>) {
        self.emit(level, message, fields, Caller::from(Location::caller()));
        if level == Level::Fatal {
            self.terminate(message);
        }
    }

    #[track_caller]
    pub fn debug(&self, message: &str, fields: Option<&Fields>) {
        self.log(Level::Debug, message, fields);
    }

    #[track_caller]
    pub fn info(&self, message: &str, fields: Option<&Fields>) {
        self.log(Level::Info, message, fields);
    }

    #[track_caller]
    pub fn warning(&self, message: &str, fields: Option<&Fields>) {
        self.log(Level::Warning, message, fields);
    }

    #[track_caller]
    pub fn error(&self, message: &str, fields: Option<&Fields>) {
        self.log(Level::Error, message, fields);
    }

    /// Write a fatal record, flush, then run the configured [`FatalAction`].
    #[track_caller]
    pub fn fatal(&self, message: &str, fields: Option<&Fields>) -> ! {
        self.emit(Level::Fatal, message, fields, Caller::from(Location::caller()));
        self.terminate(message)
    }

    /// Flush buffered records without closing.
    pub fn flush(&self) {
        self.inner.sink.flush();
    }

    /// Flush and close the sink. Safe to call repeatedly; records emitted
    /// after close (through this facade or any clone or child) are dropped.
    pub fn close(&self) {
        self.inner.sink.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.sink.is_closed()
    }

    /// Whether both handles refer to the same logger.
    pub fn ptr_eq(a: &LogFacade, b: &LogFacade) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub(crate) fn emit(
        &self,
        level: Level,
        message: &str,
        fields: Option<&Fields>,
        caller: Caller<'_>,
    ) {
        if !self.enabled(level) || self.is_closed() {
            return;
        }
        let entry = Entry {
            level,
            message,
            caller,
            time: Local::now(),
        };
        let record = encoder::encode(&entry, &self.inner.initial_fields, fields);
        self.inner.sink.write_record(&record);
    }

    fn terminate(&self, message: &str) -> ! {
        self.inner.sink.flush();
        match self.inner.on_fatal {
            FatalAction::Exit(code) => process::exit(code),
            FatalAction::Panic => panic!("fatal: {}", message),
        }
    }
}

impl fmt::Debug for LogFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogFacade")
            .field("level", &self.inner.level)
            .field("initial_fields", &self.inner.initial_fields)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// The shared fallback facade: `INFO` threshold, JSON to stderr.
///
/// Built on first use and never torn down; stderr is unbuffered, so nothing
/// is lost at process exit.
pub fn default_facade() -> LogFacade {
    DEFAULT_FACADE
        .get_or_init(|| LogFacade::new(Level::Info.name(), None))
        .clone()
}

fn abort_construction(err: crate::error::LogError) -> ! {
    eprintln!("Failed to initialize logging: {}", err);
    process::exit(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogOutput, SharedWriter};
    use crate::testing::MemoryWriter;
    use serde_json::{json, Value};

    fn capture(level: Level, initial: Fields) -> (LogFacade, MemoryWriter) {
        let memory = MemoryWriter::new();
        let facade = LogFacade::from_config(
            LogConfig::default()
                .with_level(level)
                .with_output(LogOutput::Writer(SharedWriter::new(memory.clone())))
                .with_initial_fields(initial)
                .with_fatal_action(FatalAction::Panic),
        )
        .unwrap();
        (facade, memory)
    }

    #[test]
    fn test_threshold_from_level_name() {
        for (name, expected) in [
            ("DEBUG", Level::Debug),
            ("INFO", Level::Info),
            ("WARNING", Level::Warning),
            ("ERROR", Level::Error),
            ("FATAL", Level::Fatal),
            ("TRACE", Level::Info),
            ("", Level::Info),
            ("debug", Level::Info),
        ] {
            assert_eq!(LogFacade::new(name, None).level(), expected, "{name:?}");
        }
    }

    #[test]
    fn test_warning_threshold_suppresses_lower_levels() {
        let (facade, memory) = capture(Level::Warning, Fields::new());

        facade.debug("debug", None);
        facade.info("info", None);
        facade.warning("warning", None);
        facade.error("error", None);

        let levels: Vec<Value> = memory.records().iter().map(|r| r["level"].clone()).collect();
        assert_eq!(levels, vec![json!("warn"), json!("error")]);
    }

    #[test]
    fn test_caller_points_at_call_site() {
        let (facade, memory) = capture(Level::Debug, Fields::new());

        let line = line!() + 1;
        facade.info("here", None);

        let caller = memory.records()[0]["caller"].as_str().unwrap().to_string();
        assert!(caller.ends_with(&format!("facade.rs:{line}")), "{caller}");
    }

    #[test]
    fn test_child_shares_sink_and_adds_fields() {
        let (parent, memory) = capture(Level::Info, crate::fields! { "service" => "api" });
        let child = parent.with_fields(&crate::fields! { "request_id" => "r-1" });

        child.info("from child", None);
        parent.info("from parent", None);

        let records = memory.records();
        assert_eq!(records[0]["service"], "api");
        assert_eq!(records[0]["request_id"], "r-1");
        assert_eq!(records[1]["service"], "api");
        assert!(records[1].get("request_id").is_none());
        assert!(!LogFacade::ptr_eq(&parent, &child));
        assert_eq!(child.level(), parent.level());
    }

    #[test]
    fn test_close_is_idempotent_and_silences() {
        let (facade, memory) = capture(Level::Info, Fields::new());

        facade.info("before", None);
        facade.close();
        facade.close();
        facade.error("after", None);
        facade.clone().info("after, via clone", None);

        assert!(facade.is_closed());
        assert_eq!(memory.records().len(), 1);
    }

    #[test]
    #[should_panic(expected = "fatal: unrecoverable")]
    fn test_fatal_panics_when_configured() {
        let (facade, _memory) = capture(Level::Error, Fields::new());
        facade.fatal("unrecoverable", None);
    }

    #[test]
    fn test_fatal_record_written_before_unwinding() {
        let (facade, memory) = capture(Level::Info, Fields::new());
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            facade.log(Level::Fatal, "boom", Some(&crate::fields! { "code" => 7 }));
        }));

        assert!(result.is_err());
        let records = memory.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["level"], "fatal");
        assert_eq!(records[0]["code"], 7);
        assert!(records[0]["stacktrace"].is_string());
    }

    #[test]
    fn test_error_stacktrace_starts_past_emit_path() {
        let (facade, memory) = capture(Level::Info, Fields::new());

        facade.error("failed", None);

        let records = memory.records();
        let stacktrace = records[0]["stacktrace"].as_str().unwrap();
        assert!(!stacktrace.contains("LogFacade::emit"), "{stacktrace}");
        assert!(!stacktrace.contains("logo::encoder::encode"), "{stacktrace}");
    }

    #[test]
    fn test_default_facade_is_shared() {
        let a = default_facade();
        let b = default_facade();
        assert!(LogFacade::ptr_eq(&a, &b));
        assert_eq!(a.level(), Level::Info);
    }
}
