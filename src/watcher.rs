//! Caret observation and the switch-action state machine.

use std::sync::Arc;

use crate::scanner::MathScanner;

/// The two commands a membership transition can request. How they are
/// resolved into a concrete action belongs to the [`SwitchSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchAction {
    /// The caret entered a math span.
    EnterMathInput,
    /// The caret left a math span.
    LeaveMathInput,
}

impl SwitchAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchAction::EnterMathInput => "enter-math-input",
            SwitchAction::LeaveMathInput => "leave-math-input",
        }
    }
}

/// Downstream collaborator that turns a transition into an input-method
/// switch. Dispatch is fire-and-forget: the watcher never learns whether the
/// switch succeeded, and a failed switch must not affect later observations.
pub trait SwitchSink {
    fn dispatch(&self, action: SwitchAction);
}

/// Tracks whether the caret is inside a math span across observations and
/// dispatches a switch action on every transition, and only on transitions.
///
/// Single-writer: `observe` runs synchronously on the notification thread,
/// never concurrently with itself, so the state needs no locking.
pub struct CaretWatcher {
    scanner: Box<dyn MathScanner + Send + Sync>,
    sink: Arc<dyn SwitchSink + Send + Sync>,
    inside: bool,
}

impl CaretWatcher {
    /// Scan the initial document and caret. An initial position already
    /// inside math dispatches one enter action right away, so a document
    /// opened with the caret in a math span switches immediately.
    pub fn new(
        scanner: Box<dyn MathScanner + Send + Sync>,
        sink: Arc<dyn SwitchSink + Send + Sync>,
        text: &str,
        caret: usize,
    ) -> Self {
        let inside = scanner.is_inside_math(text, caret);
        if inside {
            sink.dispatch(SwitchAction::EnterMathInput);
        }
        Self {
            scanner,
            sink,
            inside,
        }
    }

    /// Re-evaluate membership for the current snapshot. Called once per
    /// content-change or caret-move notification; why the document changed
    /// is irrelevant, only the before/after membership matters.
    pub fn observe(&mut self, text: &str, caret: usize) {
        let inside = self.scanner.is_inside_math(text, caret);
        if inside != self.inside {
            self.inside = inside;
            self.sink.dispatch(if inside {
                SwitchAction::EnterMathInput
            } else {
                SwitchAction::LeaveMathInput
            });
        }
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::scanner::{scanner_for, ScanStrategy};

    #[derive(Default)]
    struct RecordingSink {
        actions: Mutex<Vec<SwitchAction>>,
    }

    impl SwitchSink for RecordingSink {
        fn dispatch(&self, action: SwitchAction) {
            self.actions.lock().unwrap().push(action);
        }
    }

    impl RecordingSink {
        fn log(&self) -> Vec<SwitchAction> {
            self.actions.lock().unwrap().clone()
        }
    }

    fn watcher_at(text: &str, caret: usize) -> (CaretWatcher, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let watcher = CaretWatcher::new(
            scanner_for(ScanStrategy::Structural),
            sink.clone(),
            text,
            caret,
        );
        (watcher, sink)
    }

    #[test]
    fn transition_sequence_fires_one_command_each_way() {
        let doc = "a $x$ b";
        let (mut watcher, sink) = watcher_at(doc, 0);
        watcher.observe(doc, 3); // inside x
        watcher.observe(doc, 6); // on the trailing space
        assert_eq!(
            sink.log(),
            vec![SwitchAction::EnterMathInput, SwitchAction::LeaveMathInput]
        );
    }

    #[test]
    fn repeated_observation_is_idempotent() {
        let doc = "a $x$ b";
        let (mut watcher, sink) = watcher_at(doc, 3);
        watcher.observe(doc, 3);
        watcher.observe(doc, 3);
        watcher.observe(doc, 4);
        assert_eq!(sink.log(), vec![SwitchAction::EnterMathInput]);
        assert!(watcher.is_inside());
    }

    #[test]
    fn initial_caret_inside_math_switches_at_construction() {
        let (watcher, sink) = watcher_at("$$x$$", 3);
        assert!(watcher.is_inside());
        assert_eq!(sink.log(), vec![SwitchAction::EnterMathInput]);
    }

    #[test]
    fn initial_caret_outside_math_stays_silent() {
        let (watcher, sink) = watcher_at("plain", 2);
        assert!(!watcher.is_inside());
        assert!(sink.log().is_empty());
    }

    #[test]
    fn content_change_can_trigger_transition() {
        // Typing the opening delimiters in front of the caret.
        let (mut watcher, sink) = watcher_at("x", 1);
        watcher.observe("$$x", 3);
        watcher.observe("$$x$$", 3);
        assert_eq!(sink.log(), vec![SwitchAction::EnterMathInput]);
        assert!(watcher.is_inside());
    }
}
