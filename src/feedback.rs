use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Discrete events fired by the session engine for audio/visual collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Error,
    Finish,
}

/// Fire-and-forget sink: the engine never waits on it and a failing sink
/// must not affect session state
pub trait FeedbackSink {
    fn on_feedback(&mut self, event: Feedback);
}

/// Discards everything. Default sink for headless use
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FeedbackSink for NullSink {
    fn on_feedback(&mut self, _event: Feedback) {}
}

/// Records events so tests (and the visual error flash) can observe them.
/// Clones share the same buffer
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<Feedback>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Feedback> {
        self.events.borrow().clone()
    }
}

impl FeedbackSink for RecordingSink {
    fn on_feedback(&mut self, event: Feedback) {
        self.events.borrow_mut().push(event);
    }
}

/// Minimal audio feedback for a terminal: rings the bell on errors.
/// Write failures are swallowed on purpose
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl FeedbackSink for TerminalBell {
    fn on_feedback(&mut self, event: Feedback) {
        if event == Feedback::Error {
            let mut out = std::io::stdout();
            let _ = out.write_all(b"\x07");
            let _ = out.flush();
        }
    }
}
