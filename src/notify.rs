//! User-facing notification sink.
//!
//! The original surface raised toast notifications; here the sink is a
//! trait so the CLI can print them and tests can record them.
//! Notifications are fire-and-forget: nothing is returned and failures
//! to display are not a concern of the callers.

/// Severity of a notification, mirroring the platform toast variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// Sink for user-facing notifications.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str, severity: Severity);
}

/// Terminal notifier: informational toasts go to stdout, warnings and
/// errors to stderr.
pub struct TermNotifier;

impl Notifier for TermNotifier {
    fn notify(&self, title: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Warning | Severity::Error => {
                eprintln!("[{}] {}: {}", severity.as_str(), title, message);
            }
            Severity::Info | Severity::Success => {
                println!("[{}] {}: {}", severity.as_str(), title, message);
            }
        }
    }
}

/// Records notifications instead of printing them.
#[cfg(test)]
pub struct RecordingNotifier {
    pub events: std::cell::RefCell<Vec<(String, String, Severity)>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            events: std::cell::RefCell::new(Vec::new()),
        }
    }

    pub fn count(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn last_severity(&self) -> Option<Severity> {
        self.events.borrow().last().map(|(_, _, s)| *s)
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str, severity: Severity) {
        self.events
            .borrow_mut()
            .push((title.to_string(), message.to_string(), severity));
    }
}
