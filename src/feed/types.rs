use crate::location::SourceLocation;

/// Kind of a program-location event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A callable was entered; a frame is pushed.
    Call,
    /// Execution reached a line inside the innermost call.
    Line,
    /// The innermost call returned; its frame is popped.
    Return,
    /// An exception unwound the innermost call; its frame is popped.
    Exception,
}

/// One observed program step, with a snapshot of the locals visible at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub kind: EventKind,
    pub location: SourceLocation,
    pub locals: Vec<(String, String)>,
}

impl TraceEvent {
    pub fn new(kind: EventKind, location: SourceLocation) -> Self {
        Self {
            kind,
            location,
            locals: Vec::new(),
        }
    }

    pub fn with_locals(mut self, locals: Vec<(String, String)>) -> Self {
        self.locals = locals;
        self
    }
}
