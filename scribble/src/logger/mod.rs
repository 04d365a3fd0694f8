// Logging collaborator injected into the store

use log::{Level, LevelFilter};
use std::fmt;

const TARGET: &str = "scribble";

/// A leveled logging sink.
///
/// The store only ever emits `info` and `debug` notices through this trait;
/// nothing it does depends on what the sink does with them.
pub trait Logger: Send + Sync {
    fn fatal(&self, args: fmt::Arguments<'_>);
    fn error(&self, args: fmt::Arguments<'_>);
    fn warn(&self, args: fmt::Arguments<'_>);
    fn info(&self, args: fmt::Arguments<'_>);
    fn debug(&self, args: fmt::Arguments<'_>);
    fn trace(&self, args: fmt::Arguments<'_>);
}

/// Default logger. Forwards to the `log` facade, so whatever backend the host
/// installed (env_logger, etc.) receives the messages.
#[derive(Debug, Clone, Copy)]
pub struct LogFacade {
    level: LevelFilter,
}

impl LogFacade {
    pub fn new(level: LevelFilter) -> Self {
        LogFacade { level }
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        if level <= self.level {
            log::log!(target: TARGET, level, "{args}");
        }
    }
}

impl Default for LogFacade {
    fn default() -> Self {
        LogFacade::new(LevelFilter::Info)
    }
}

impl Logger for LogFacade {
    fn fatal(&self, args: fmt::Arguments<'_>) {
        // `log` has no fatal level
        if Level::Error <= self.level {
            log::error!(target: TARGET, "FATAL {args}");
        }
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, args);
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, args);
    }

    fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args);
    }

    fn trace(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Trace, args);
    }
}
