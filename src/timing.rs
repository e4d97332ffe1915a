//! Elapsed-time logging.

use std::time::Instant;

/// RAII timer that logs elapsed time on drop.
pub struct Timed {
    name: String,
    start: Instant,
    level: log::Level,
}

impl Timed {
    /// Logs at INFO level when dropped.
    pub fn info(name: impl Into<String>) -> Self {
        Self::new(name.into(), log::Level::Info)
    }

    /// Logs at DEBUG level when dropped.
    pub fn debug(name: impl Into<String>) -> Self {
        Self::new(name.into(), log::Level::Debug)
    }

    fn new(name: String, level: log::Level) -> Self {
        log::trace!("{}...", name);
        Self {
            name,
            start: Instant::now(),
            level,
        }
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        log::log!(self.level, "{}: {:.3?}", self.name, self.start.elapsed());
    }
}
