//! Routing of `log` crate macros into a facade.

use log::{Metadata, Record};

use crate::encoder::Caller;
use crate::error::Result;
use crate::facade::LogFacade;
use crate::level::Level;

/// Key under which the `log` target of bridged records is written
pub const TARGET_KEY: &str = "logger";

impl log::Log for LogFacade {
    fn enabled(&self, metadata: &Metadata) -> bool {
        LogFacade::enabled(self, Level::from(metadata.level()))
    }

    fn log(&self, record: &Record) {
        if !log::Log::enabled(self, record.metadata()) {
            return;
        }

        let mut fields = crate::Fields::new();
        fields.insert(TARGET_KEY.to_string(), record.target().into());
        let message = record.args().to_string();
        let caller = Caller {
            file: record.file().unwrap_or("unknown"),
            line: record.line().unwrap_or(0),
        };

        self.emit(Level::from(record.level()), &message, Some(&fields), caller);
    }

    fn flush(&self) {
        LogFacade::flush(self);
    }
}

/// Install `facade` as the global `log` logger
///
/// Fails with [`LogError::AlreadyInstalled`](crate::LogError::AlreadyInstalled)
/// once any global logger exists.
pub fn install(facade: LogFacade) -> Result<()> {
    let max_level = facade.level().to_level_filter();
    log::set_boxed_logger(Box::new(facade))?;
    log::set_max_level(max_level);
    Ok(())
}
