use crate::errors::DebugError;
use crate::location::SourceLocation;

/// One active call. The caller link is implicit: the frame below this one on
/// the stack, or none at index 0. `id` is assigned once per call and survives
/// line updates, so a UI can keep comparing against the frame it was handed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub id: u64,
    pub location: SourceLocation,
    pub locals: Vec<(String, String)>,
}

/// The live call stack plus an "inspected frame" index used for stack
/// browsing while suspended. Index 0 is the outermost frame.
pub struct ExecutionContext {
    stack: Vec<Frame>,
    inspected: usize,
    next_frame_id: u64,
    drained: bool,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            inspected: 0,
            next_frame_id: 0,
            drained: false,
        }
    }

    /// Enter a call; returns the new frame's identity. Fails once the
    /// outermost frame has already returned, since no further calls can
    /// legally arrive after that.
    pub fn push(
        &mut self,
        location: SourceLocation,
        locals: Vec<(String, String)>,
    ) -> Result<u64, DebugError> {
        if self.drained {
            return Err(DebugError::StackCorruption(format!(
                "call event at {} after the outermost frame returned",
                location
            )));
        }
        let id = self.next_frame_id;
        self.next_frame_id += 1;
        self.stack.push(Frame {
            id,
            location,
            locals,
        });
        self.inspected = self.stack.len() - 1;
        Ok(id)
    }

    /// Leave the innermost call, on return or on exception unwind.
    pub fn pop(&mut self) -> Result<Frame, DebugError> {
        let frame = self.stack.pop().ok_or(DebugError::EmptyStack)?;
        if self.stack.is_empty() {
            self.drained = true;
        }
        if self.inspected >= self.stack.len() {
            self.inspected = self.stack.len().saturating_sub(1);
        }
        Ok(frame)
    }

    /// Record a line event inside the innermost call. Only location and the
    /// locals snapshot change; frame identity is preserved.
    pub fn update_top(
        &mut self,
        location: SourceLocation,
        locals: Vec<(String, String)>,
    ) -> Result<(), DebugError> {
        let top = self.stack.last_mut().ok_or(DebugError::EmptyStack)?;
        top.location = location;
        top.locals = locals;
        Ok(())
    }

    /// Move the inspected-frame index by `delta`, clamped to stack bounds.
    /// Negative deltas move toward the outermost frame.
    pub fn navigate(&mut self, delta: isize) -> Result<&Frame, DebugError> {
        if self.stack.is_empty() {
            return Err(DebugError::EmptyStack);
        }
        let max = self.stack.len() as isize - 1;
        self.inspected = (self.inspected as isize + delta).clamp(0, max) as usize;
        Ok(&self.stack[self.inspected])
    }

    /// Snap the inspected frame back to the live top of stack. Called on
    /// every fresh suspension.
    pub fn reset_inspection(&mut self) {
        self.inspected = self.stack.len().saturating_sub(1);
    }

    pub fn stack(&self) -> &[Frame] {
        &self.stack
    }

    /// Depth of the innermost frame: 0 for the outermost call.
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn top(&self) -> Option<&Frame> {
        self.stack.last()
    }

    pub fn inspected_index(&self) -> usize {
        self.inspected
    }

    pub fn inspected_frame(&self) -> Option<&Frame> {
        self.stack.get(self.inspected)
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
