//! Leveled, structured JSON logging
//!
//! `logo` wraps one configured logger per [`LogFacade`]: a severity
//! threshold, a single output sink (stderr by default) and a set of initial
//! fields. Each emit call writes at most one JSON object per line carrying
//! `level`, `datetime` (ISO-8601), `caller`, `msg`, the facade's initial
//! fields, the call's own fields and, from `ERROR` up, a `stacktrace`.
//!
//! Facades travel with a request either explicitly through a [`Context`]
//! ([`with_facade`] / [`from_context`]) or implicitly through a thread or
//! task [`scope`]. Lookups never come back empty: without a bound facade the
//! shared default (`INFO`, stderr) is returned.
//!
//! Level names are matched exactly; an unrecognized name selects `INFO`
//! rather than failing.

pub mod bridge;
pub mod config;
pub mod context;
mod encoder;
pub mod error;
pub mod facade;
pub mod fields;
pub mod level;
pub mod scope;
mod sink;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use bridge::install;
pub use config::{FatalAction, LogConfig, LogOutput, SharedWriter};
pub use context::{from_context, with_facade, Context, ContextKey};
pub use error::{LogError, Result};
pub use facade::{default_facade, LogFacade};
pub use fields::Fields;
pub use level::Level;

#[doc(hidden)]
pub use serde_json as __serde_json;
