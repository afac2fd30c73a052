use super::breakpoints::Breakpoints;
use super::context::{ExecutionContext, Frame};
use super::stepping::StepMode;
use crate::errors::DebugError;
use crate::feed::{EventKind, TraceEvent};
use crate::location::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Running,
    Suspended,
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendReason {
    Breakpoint,
    Step,
}

/// Snapshot handed to the host when execution halts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspendInfo {
    pub location: SourceLocation,
    pub depth: usize,
    pub reason: SuspendReason,
}

/// What a location event did. `Resumed` means keep feeding events;
/// `Suspended` means the operator has control until a resuming command;
/// `Finished` means the outermost frame returned and the session is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Resumed,
    Suspended(SuspendInfo),
    Finished,
}

/// The execution-control state machine. Receives location events from an
/// event source the host owns, consults the breakpoint registry and the
/// active stepping mode, and decides suspend-or-continue. Commands are only
/// accepted while `Suspended`; resuming commands flip the state back to
/// `Running`, which the host observes before pumping the next event.
pub struct TraceController {
    context: ExecutionContext,
    breakpoints: Breakpoints,
    mode: StepMode,
    state: ExecutionState,
}

impl TraceController {
    pub fn new() -> Self {
        Self {
            context: ExecutionContext::new(),
            breakpoints: Breakpoints::new(),
            mode: StepMode::Continue,
            state: ExecutionState::Running,
        }
    }

    /// Process one location event from the observed program.
    ///
    /// Suspension is a boolean OR of the breakpoint and stepping conditions:
    /// a breakpoint plus an active step at the same location suspends exactly
    /// once. A contract violation by the feed (event while suspended, pop
    /// past an empty stack, call after the outermost return) is fatal and
    /// transitions the session to `Exited`.
    pub fn handle_event(&mut self, event: TraceEvent) -> Result<EventOutcome, DebugError> {
        match self.state {
            // After quit the program may run to completion; nothing suspends.
            ExecutionState::Exited => return Ok(EventOutcome::Resumed),
            ExecutionState::Suspended => {
                self.state = ExecutionState::Exited;
                return Err(DebugError::StackCorruption(
                    "location event received while suspended".to_string(),
                ));
            }
            ExecutionState::Running => {}
        }

        let TraceEvent {
            kind,
            location,
            locals,
        } = event;

        match kind {
            EventKind::Call => {
                if let Err(e) = self.context.push(location.clone(), locals) {
                    self.state = ExecutionState::Exited;
                    return Err(e);
                }
                // Stepping modes take effect at the first line event inside
                // the callee, not at the call itself; only a breakpoint on
                // the entered location suspends here.
                if self.breakpoints.is_set(&location) {
                    return Ok(self.suspend(location, SuspendReason::Breakpoint));
                }
                Ok(EventOutcome::Resumed)
            }
            EventKind::Line => {
                if let Err(e) = self.context.update_top(location.clone(), locals) {
                    self.state = ExecutionState::Exited;
                    return Err(e);
                }
                Ok(self.evaluate_suspend(location, self.context.depth()))
            }
            EventKind::Return => {
                // The event fired inside the returning frame, so stepping
                // eligibility uses that frame's depth; a step-over in the
                // caller does not stop at the callee's return line.
                let depth = self.context.depth();
                if let Err(e) = self.context.pop() {
                    self.state = ExecutionState::Exited;
                    return Err(e);
                }
                if self.context.is_empty() {
                    self.state = ExecutionState::Exited;
                    return Ok(EventOutcome::Finished);
                }
                Ok(self.evaluate_suspend(location, depth))
            }
            EventKind::Exception => {
                // One frame unwinds per event. No suspend check until the
                // line event of the frame that handles or re-raises.
                if let Err(e) = self.context.pop() {
                    self.state = ExecutionState::Exited;
                    return Err(e);
                }
                if self.context.is_empty() {
                    self.state = ExecutionState::Exited;
                    return Ok(EventOutcome::Finished);
                }
                Ok(EventOutcome::Resumed)
            }
        }
    }

    fn evaluate_suspend(&mut self, location: SourceLocation, depth: usize) -> EventOutcome {
        let at_breakpoint = self.breakpoints.is_set(&location);
        let step_stop = match self.mode {
            StepMode::Continue => false,
            StepMode::StepInto => true,
            // `<=`, not `==`: stepping can land shallower than the target
            // when returns collapse more than one level.
            StepMode::StepOver { target_depth } => depth <= target_depth,
        };
        if at_breakpoint {
            self.suspend(location, SuspendReason::Breakpoint)
        } else if step_stop {
            self.suspend(location, SuspendReason::Step)
        } else {
            EventOutcome::Resumed
        }
    }

    fn suspend(&mut self, location: SourceLocation, reason: SuspendReason) -> EventOutcome {
        self.state = ExecutionState::Suspended;
        self.context.reset_inspection();
        EventOutcome::Suspended(SuspendInfo {
            location,
            depth: self.context.depth(),
            reason,
        })
    }

    fn require_suspended(&self) -> Result<(), DebugError> {
        if self.state != ExecutionState::Suspended {
            return Err(DebugError::NotSuspended);
        }
        Ok(())
    }

    /// Resume, suspending at the very next line event.
    pub fn step_into(&mut self) -> Result<(), DebugError> {
        self.require_suspended()?;
        self.mode = StepMode::StepInto;
        self.state = ExecutionState::Running;
        Ok(())
    }

    /// Resume, suspending at the next line at the current depth or shallower.
    pub fn step_over(&mut self) -> Result<(), DebugError> {
        self.require_suspended()?;
        self.mode = StepMode::StepOver {
            target_depth: self.context.depth(),
        };
        self.state = ExecutionState::Running;
        Ok(())
    }

    /// Resume until the current call returns. At depth 0 there is nothing to
    /// step out of, so this degenerates to `continue_`.
    pub fn step_out(&mut self) -> Result<(), DebugError> {
        self.require_suspended()?;
        let depth = self.context.depth();
        self.mode = if depth == 0 {
            StepMode::Continue
        } else {
            StepMode::StepOver {
                target_depth: depth - 1,
            }
        };
        self.state = ExecutionState::Running;
        Ok(())
    }

    /// Resume with stepping cleared; only breakpoints suspend.
    pub fn continue_(&mut self) -> Result<(), DebugError> {
        self.require_suspended()?;
        self.mode = StepMode::Continue;
        self.state = ExecutionState::Running;
        Ok(())
    }

    /// Flip a breakpoint without resuming. Returns the resulting state.
    pub fn toggle_breakpoint(&mut self, location: SourceLocation) -> Result<bool, DebugError> {
        self.require_suspended()?;
        Ok(self.breakpoints.toggle(location))
    }

    /// Move the inspected frame by `delta` without resuming.
    pub fn navigate_stack(&mut self, delta: isize) -> Result<&Frame, DebugError> {
        self.require_suspended()?;
        self.context.navigate(delta)
    }

    /// Terminal transition. No command is accepted afterwards and no further
    /// event suspends.
    pub fn quit(&mut self) -> Result<(), DebugError> {
        self.require_suspended()?;
        self.mode = StepMode::Continue;
        self.state = ExecutionState::Exited;
        Ok(())
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn mode(&self) -> StepMode {
        self.mode
    }

    /// Pre-session setup, e.g. stop-on-entry before the first event arrives.
    pub fn set_mode(&mut self, mode: StepMode) {
        self.mode = mode;
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    /// Mutable registry access for host setup (restoring persisted
    /// breakpoints before the session starts).
    pub fn breakpoints_mut(&mut self) -> &mut Breakpoints {
        &mut self.breakpoints
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn stack(&self) -> &[Frame] {
        self.context.stack()
    }

    pub fn inspected_frame(&self) -> Option<&Frame> {
        self.context.inspected_frame()
    }
}

impl Default for TraceController {
    fn default() -> Self {
        Self::new()
    }
}
