use std::backtrace::Backtrace;

use chrono::{DateTime, Local};
use serde_json::{json, Map, Value};

use crate::fields::{self, Fields};
use crate::level::Level;

pub(crate) const LEVEL_KEY: &str = "level";
pub(crate) const TIME_KEY: &str = "datetime";
pub(crate) const CALLER_KEY: &str = "caller";
pub(crate) const MESSAGE_KEY: &str = "msg";
pub(crate) const STACKTRACE_KEY: &str = "stacktrace";

/// ISO-8601 with millisecond precision and numeric UTC offset.
pub(crate) const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Leading frames belonging to the capture itself or to the emit path.
const INTERNAL_FRAME_PREFIXES: &[&str] = &[
    "std::backtrace",
    "logo::encoder::caller_stacktrace",
    "logo::encoder::encode",
    "logo::facade::LogFacade::",
    "<logo::facade::LogFacade as log::Log>::",
    "log::__private_api",
];

/// Source location a record was emitted from.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Caller<'a> {
    pub file: &'a str,
    pub line: u32,
}

impl<'a> From<&'a std::panic::Location<'a>> for Caller<'a> {
    fn from(location: &'a std::panic::Location<'a>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

/// Everything needed to render one record.
pub(crate) struct Entry<'a> {
    pub level: Level,
    pub message: &'a str,
    pub caller: Caller<'a>,
    pub time: DateTime<Local>,
}

/// Render a record as one newline-terminated JSON object.
///
/// User fields are laid down first (initial, then per-call), so the
/// reserved keys always hold the facade's own values.
pub(crate) fn encode(entry: &Entry<'_>, initial: &Fields, extra: Option<&Fields>) -> Vec<u8> {
    let mut record = initial.clone();
    if let Some(extra) = extra {
        fields::merge(&mut record, extra);
    }

    record.insert(LEVEL_KEY.to_string(), json!(entry.level));
    record.insert(
        TIME_KEY.to_string(),
        Value::String(entry.time.format(TIME_FORMAT).to_string()),
    );
    record.insert(
        CALLER_KEY.to_string(),
        Value::String(format!("{}:{}", entry.caller.file, entry.caller.line)),
    );
    record.insert(
        MESSAGE_KEY.to_string(),
        Value::String(entry.message.to_string()),
    );
    if entry.level.captures_stacktrace() {
        record.insert(
            STACKTRACE_KEY.to_string(),
            Value::String(caller_stacktrace()),
        );
    }

    to_line(&record)
}

/// A backtrace starting at the frame that called into the facade.
fn caller_stacktrace() -> String {
    trim_internal_frames(&Backtrace::force_capture().to_string())
}

/// Drop leading internal frames from a rendered backtrace and renumber the
/// rest. A trace made only of internal (or unsymbolized) frames is kept whole.
fn trim_internal_frames(trace: &str) -> String {
    let mut frames: Vec<(&str, Vec<&str>)> = Vec::new();
    for line in trace.lines() {
        match frame_symbol(line) {
            Some(symbol) => frames.push((symbol, Vec::new())),
            None => {
                if let Some((_, locations)) = frames.last_mut() {
                    locations.push(line);
                }
            }
        }
    }

    let skip = frames
        .iter()
        .take_while(|(symbol, _)| {
            INTERNAL_FRAME_PREFIXES
                .iter()
                .any(|prefix| symbol.starts_with(prefix))
        })
        .count();
    if skip == 0 || skip == frames.len() {
        return trace.to_string();
    }

    let mut trimmed = String::new();
    for (index, (symbol, locations)) in frames[skip..].iter().enumerate() {
        trimmed.push_str(&format!("{index:>4}: {symbol}\n"));
        for location in locations {
            trimmed.push_str(location);
            trimmed.push('\n');
        }
    }
    trimmed
}

/// Symbol of a frame header line such as `   3: app::main`.
fn frame_symbol(line: &str) -> Option<&str> {
    let (index, symbol) = line.trim_start().split_once(": ")?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(symbol)
}

fn to_line(record: &Map<String, Value>) -> Vec<u8> {
    let mut line = serde_json::to_vec(record)
        .unwrap_or_else(|_| b"{\"msg\":\"Failed to serialize log entry\"}".to_vec());
    line.push(b'\n');
    line
}
