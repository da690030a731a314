use std::time::Duration;

use tokio::task::JoinHandle;

use crate::platform::SharedWindowFocus;

/// Delays window-focus requests; a new request replaces any pending one.
pub struct FocusDebouncer {
    focus: Option<SharedWindowFocus>,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl FocusDebouncer {
    pub fn new(focus: Option<SharedWindowFocus>, delay: Duration) -> Self {
        Self {
            focus,
            delay,
            pending: None,
        }
    }

    pub fn request(&mut self) {
        let Some(focus) = self.focus.clone() else {
            return;
        };
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(error) = focus.focus_main_window() {
                tracing::warn!("failed to show main window: {error}");
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl Drop for FocusDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
