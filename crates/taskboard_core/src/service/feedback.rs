//! User-facing feedback sinks used by view-models.

use log::info;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Blocking alerts and non-blocking confirmations shown to the user.
pub trait Notifier {
    fn alert(&self, message: &str);
    fn confirm(&self, message: &str);
}

/// System clipboard access.
pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<(), String>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn alert(&self, message: &str) {
        (**self).alert(message);
    }

    fn confirm(&self, message: &str) {
        (**self).confirm(message);
    }
}

impl<C: Clipboard + ?Sized> Clipboard for &C {
    fn write_text(&self, text: &str) -> Result<(), String> {
        (**self).write_text(text)
    }
}

/// Records every message; backs tests and the CLI.
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    alerts: Mutex<Vec<String>>,
    confirmations: Mutex<Vec<String>>,
    clipboard: Mutex<Option<String>>,
    clipboard_denied: bool,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose clipboard refuses every write.
    pub fn without_clipboard() -> Self {
        Self {
            clipboard_denied: true,
            ..Self::default()
        }
    }

    pub fn alerts(&self) -> Vec<String> {
        lock(&self.alerts).clone()
    }

    pub fn confirmations(&self) -> Vec<String> {
        lock(&self.confirmations).clone()
    }

    pub fn clipboard(&self) -> Option<String> {
        lock(&self.clipboard).clone()
    }
}

impl Notifier for RecordingFeedback {
    fn alert(&self, message: &str) {
        info!("event=user_alert module=service status=shown");
        lock(&self.alerts).push(message.to_string());
    }

    fn confirm(&self, message: &str) {
        lock(&self.confirmations).push(message.to_string());
    }
}

impl Clipboard for RecordingFeedback {
    fn write_text(&self, text: &str) -> Result<(), String> {
        if self.clipboard_denied {
            return Err("clipboard access denied".to_string());
        }
        *lock(&self.clipboard) = Some(text.to_string());
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
