//! Default `Reporter` that turns status and fault displays into log events.

use pour_traits::Reporter;

/// Used when no display is attached. Remembers whether a fault is showing so
/// `clear_error` only logs when something was actually cleared.
#[derive(Debug, Default)]
pub struct TracingReporter {
    showing_error: bool,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_showing_error(&self) -> bool {
        self.showing_error
    }
}

impl Reporter for TracingReporter {
    fn message(&mut self, msg: &str) {
        tracing::info!(target: "pour::display", "{msg}");
    }

    fn error(&mut self, msg: &str) {
        self.showing_error = true;
        tracing::warn!(target: "pour::display", "{msg}");
    }

    fn clear_error(&mut self) {
        if std::mem::take(&mut self.showing_error) {
            tracing::info!(target: "pour::display", "fault cleared");
        }
    }
}
