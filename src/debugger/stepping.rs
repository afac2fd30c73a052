/// Stepping policy in effect while the observed program runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Run until a breakpoint.
    Continue,
    /// Suspend at the next line event, at any depth.
    StepInto,
    /// Suspend at the next line event at `target_depth` or shallower.
    /// Step-out is this mode with a target one level above the issuing frame.
    StepOver { target_depth: usize },
}
