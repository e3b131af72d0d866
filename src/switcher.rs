//! External input-method switching.
//!
//! Resolves a [`SwitchAction`] into an invocation of the configured selector
//! tool (`macism`, `im-select`, ...). Invocations are fire-and-forget: each
//! one runs in a detached task, and a failure is logged and discarded so it
//! can never stall or corrupt the watcher. If the state flips faster than the
//! tool responds, a stale invocation just becomes a redundant command.

use tokio::process::Command;

use crate::settings::ImeSettings;
use crate::watcher::{SwitchAction, SwitchSink};

/// Switches input methods by running the configured selector executable with
/// the target input-method identifier as its argument.
///
/// Holds an immutable settings snapshot taken at initialization; the concrete
/// command line is resolved fresh at every dispatch.
pub struct ImeSwitcher {
    settings: ImeSettings,
}

impl ImeSwitcher {
    pub fn new(settings: ImeSettings) -> Self {
        Self { settings }
    }
}

impl SwitchSink for ImeSwitcher {
    fn dispatch(&self, action: SwitchAction) {
        let target = match action {
            SwitchAction::EnterMathInput => self.settings.math_input.clone(),
            SwitchAction::LeaveMathInput => self.settings.restore.clone(),
        };
        let selector = self.settings.selector_tool.clone();

        tokio::spawn(async move {
            match Command::new(&selector).arg(&target).output().await {
                Ok(output) if !output.status.success() => {
                    eprintln!(
                        "input method selector {} exited with {}: {}",
                        selector.display(),
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    );
                }
                Ok(_) => {}
                Err(err) => {
                    eprintln!(
                        "failed to run input method selector {}: {}",
                        selector.display(),
                        err
                    );
                }
            }
        });
    }
}
